//! Scene state shared by the simulator and the renderer.

use super::particles::Cloud;

/// Surface dimensions plus the clouds currently on screen.
///
/// Only the tick, resize and reconfiguration handlers mutate a scene.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	/// Surface width in pixels.
	pub width: f64,
	/// Surface height in pixels.
	pub height: f64,
	/// Clouds on screen, in draw order.
	pub clouds: Vec<Cloud>,
}

impl Scene {
	/// An empty scene of the given size.
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			clouds: Vec::new(),
		}
	}

	/// Updates the stored bounds. Clouds keep their positions and pick up
	/// the new bounds the next time they leave the screen.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Number of clouds on screen.
	pub fn cloud_count(&self) -> usize {
		self.clouds.len()
	}
}
