//! Drifting cloud particles.
//!
//! Clouds only move horizontally. A cloud that has fully left the screen on
//! its exit edge is moved back just outside a randomly chosen edge. Entering
//! from the right always flips the cloud to leftward motion, while entering
//! from the left keeps whatever direction it had, so a cloud that once went
//! left keeps going left until its speed is redrawn.

use fastrand::Rng;
use log::warn;

use super::config::{SkyConfig, ordered};
use super::sprites::SpriteId;
use super::state::Scene;

/// Distance outside the visible width where clouds (re)enter.
pub const OFFSCREEN_MARGIN: f64 = 200.0;

/// Fraction of the surface height, from the top, that clouds spawn in.
pub const SKY_BAND: f64 = 0.7;

/// A single drifting cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct Cloud {
	sprite: Option<SpriteId>,
	/// Multiplier on the sprite's natural size.
	pub scale: f64,
	/// Pixels per frame; the sign is the direction of travel.
	pub speed: f64,
	/// Horizontal center, in surface pixels.
	pub x: f64,
	/// Vertical center, in surface pixels.
	pub y: f64,
}

impl Cloud {
	/// Sprite drawn for this cloud. `None` when no sprite had loaded at
	/// creation time, in which case the cloud is never drawn.
	pub fn sprite(&self) -> Option<SpriteId> {
		self.sprite
	}
}

/// Edge a cloud re-enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
	/// Enters at `-OFFSCREEN_MARGIN`.
	Left,
	/// Enters at `width + OFFSCREEN_MARGIN`, moving left.
	Right,
}

/// Creates, repositions and advances clouds.
#[derive(Clone, Debug)]
pub struct CloudSimulator {
	rng: Rng,
	min_speed: f64,
	max_speed: f64,
	min_scale: f64,
	max_scale: f64,
}

/// Uniform sample in `[min, max]`; degenerate ranges return `min`.
fn random_range(rng: &mut Rng, min: f64, max: f64) -> f64 {
	let range = max - min;
	if range < f64::EPSILON {
		return min;
	}
	min + rng.f64() * range
}

impl CloudSimulator {
	/// Takes speed and scale bounds from `config`, ordering inverted ranges.
	pub fn new(config: &SkyConfig, rng: Rng) -> Self {
		let (min_speed, max_speed) = ordered(config.min_speed, config.max_speed);
		let (min_scale, max_scale) = ordered(config.min_scale, config.max_scale);
		Self {
			rng,
			min_speed,
			max_speed,
			min_scale,
			max_scale,
		}
	}

	/// Current `(min, max)` speed magnitude.
	pub fn speed_range(&self) -> (f64, f64) {
		(self.min_speed, self.max_speed)
	}

	/// `(min, max)` scale factor.
	pub fn scale_range(&self) -> (f64, f64) {
		(self.min_scale, self.max_scale)
	}

	/// A fresh cloud with a random ready sprite, scale and speed, placed
	/// just outside one edge of the scene.
	pub fn create_cloud(&mut self, scene: &Scene, ready: &[SpriteId]) -> Cloud {
		let sprite = if ready.is_empty() {
			None
		} else {
			Some(ready[self.rng.usize(..ready.len())])
		};
		let mut cloud = Cloud {
			sprite,
			scale: random_range(&mut self.rng, self.min_scale, self.max_scale),
			speed: random_range(&mut self.rng, self.min_speed, self.max_speed),
			x: 0.0,
			y: 0.0,
		};
		self.reset_position(&mut cloud, scene.width, scene.height);
		cloud
	}

	/// Rerolls the cloud's height and entry edge. Speed magnitude is kept.
	pub fn reset_position(&mut self, cloud: &mut Cloud, width: f64, height: f64) -> Side {
		cloud.y = self.rng.f64() * height * SKY_BAND;
		let side = if self.rng.bool() {
			Side::Left
		} else {
			Side::Right
		};
		place_at_edge(cloud, side, width);
		side
	}

	/// Moves the cloud one frame. Returns `true` if it left the screen and
	/// was reset.
	pub fn advance(&mut self, cloud: &mut Cloud, width: f64, height: f64) -> bool {
		cloud.x += cloud.speed;
		let exited = (cloud.speed > 0.0 && cloud.x > width + OFFSCREEN_MARGIN)
			|| (cloud.speed < 0.0 && cloud.x < -OFFSCREEN_MARGIN);
		if exited {
			self.reset_position(cloud, width, height);
		}
		exited
	}

	/// Advances every cloud in the scene by one frame.
	pub fn advance_all(&mut self, scene: &mut Scene) {
		let (width, height) = (scene.width, scene.height);
		for cloud in &mut scene.clouds {
			self.advance(cloud, width, height);
		}
	}

	/// Replaces every cloud in the scene with `count` new ones.
	pub fn populate(&mut self, scene: &mut Scene, count: usize, ready: &[SpriteId]) {
		let clouds = (0..count).map(|_| self.create_cloud(scene, ready)).collect();
		scene.clouds = clouds;
	}

	/// Sets new speed bounds and redraws every cloud's speed from them.
	/// Draws are non-negative, so all clouds head right until their next
	/// reset.
	///
	/// Non-finite bounds are ignored and leave every cloud untouched; the
	/// return value says whether the range was applied.
	pub fn set_speed_range(&mut self, min: f64, max: f64, clouds: &mut [Cloud]) -> bool {
		if !min.is_finite() || !max.is_finite() {
			warn!("cloud-sky: ignoring non-finite speed range {}..{}", min, max);
			return false;
		}
		(self.min_speed, self.max_speed) = ordered(min, max);
		for cloud in clouds {
			cloud.speed = random_range(&mut self.rng, self.min_speed, self.max_speed);
		}
		true
	}
}

fn place_at_edge(cloud: &mut Cloud, side: Side, width: f64) {
	match side {
		Side::Left => cloud.x = -OFFSCREEN_MARGIN,
		Side::Right => {
			cloud.x = width + OFFSCREEN_MARGIN;
			cloud.speed = -cloud.speed.abs();
		}
	}
}
