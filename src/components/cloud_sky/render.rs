//! Canvas rendering for the cloud sky.
//!
//! A frame is painted in three passes: clear, gradient background, clouds.
//! Drawing goes through [`SkySurface`] so the passes can be exercised
//! without a browser.

use log::trace;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::config::{Color, SkyConfig};
use super::sprites::SpriteSheet;
use super::state::Scene;

/// The 2D drawing operations the sky needs.
pub trait SkySurface {
	/// Image type sprites are drawn from.
	type Image;

	/// Erases `(0, 0, width, height)`.
	fn clear(&mut self, width: f64, height: f64);
	/// Fills `(0, 0, width, height)` with a top-to-bottom linear gradient.
	fn fill_vertical_gradient(&mut self, width: f64, height: f64, top: Color, bottom: Color);
	/// Pushes the drawing state.
	fn save(&mut self);
	/// Pops the drawing state pushed by the matching `save`.
	fn restore(&mut self);
	/// Alpha applied to subsequent draws.
	fn set_global_alpha(&mut self, alpha: f64);
	/// Draws `image` scaled into the given rectangle.
	fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, width: f64, height: f64);
}

impl SkySurface for CanvasRenderingContext2d {
	type Image = HtmlImageElement;

	fn clear(&mut self, width: f64, height: f64) {
		self.clear_rect(0.0, 0.0, width, height);
	}

	fn fill_vertical_gradient(&mut self, width: f64, height: f64, top: Color, bottom: Color) {
		let gradient = self.create_linear_gradient(0.0, 0.0, 0.0, height);
		let _ = gradient.add_color_stop(0.0, &top.to_css());
		let _ = gradient.add_color_stop(1.0, &bottom.to_css());

		#[allow(deprecated)]
		self.set_fill_style(&gradient);
		self.fill_rect(0.0, 0.0, width, height);
	}

	fn save(&mut self) {
		CanvasRenderingContext2d::save(self);
	}

	fn restore(&mut self) {
		CanvasRenderingContext2d::restore(self);
	}

	fn set_global_alpha(&mut self, alpha: f64) {
		CanvasRenderingContext2d::set_global_alpha(self, alpha);
	}

	fn draw_image(&mut self, image: &HtmlImageElement, x: f64, y: f64, width: f64, height: f64) {
		let _ = self.draw_image_with_html_image_element_and_dw_and_dh(image, x, y, width, height);
	}
}

/// Renders the complete sky to the surface.
pub fn render<S: SkySurface>(
	scene: &Scene,
	sprites: &SpriteSheet<S::Image>,
	config: &SkyConfig,
	surface: &mut S,
) {
	surface.clear(scene.width, scene.height);
	draw_background(scene, config, surface);
	draw_clouds(scene, sprites, config.opacity, surface);
}

pub fn draw_background<S: SkySurface>(scene: &Scene, config: &SkyConfig, surface: &mut S) {
	surface.fill_vertical_gradient(
		scene.width,
		scene.height,
		config.top_color(),
		config.bottom_color(),
	);
}

/// Draws every cloud whose sprite is ready, centered on its position.
pub fn draw_clouds<S: SkySurface>(
	scene: &Scene,
	sprites: &SpriteSheet<S::Image>,
	opacity: f64,
	surface: &mut S,
) {
	for cloud in &scene.clouds {
		let Some(sprite) = cloud.sprite().and_then(|id| sprites.ready(id)) else {
			trace!("cloud-sky: skipping cloud without a ready sprite");
			continue;
		};
		let (width, height) = (sprite.width * cloud.scale, sprite.height * cloud.scale);

		surface.save();
		surface.set_global_alpha(opacity);
		surface.draw_image(
			&sprite.image,
			cloud.x - width / 2.0,
			cloud.y - height / 2.0,
			width,
			height,
		);
		surface.restore();
	}
}


#[cfg(test)]
mod tests {
	use fastrand::Rng;

	use super::testing::{Op, RecordingSurface};
	use super::*;
	use crate::components::cloud_sky::particles::CloudSimulator;
	use crate::components::cloud_sky::sprites::{Sprite, SpriteId};

	fn sheet(loaded: &[Option<(u32, f64, f64)>]) -> SpriteSheet<u32> {
		let sources: Vec<String> = (0..loaded.len()).map(|i| format!("cloud{i}.png")).collect();
		let mut sheet = SpriteSheet::new(&sources);
		for (i, entry) in loaded.iter().enumerate() {
			if let Some((image, width, height)) = *entry {
				sheet.settle(SpriteId(i), Some(Sprite { image, width, height }));
			}
		}
		sheet
	}

	fn scene_with_one_cloud(sprite: SpriteId) -> Scene {
		let mut sim = CloudSimulator::new(&SkyConfig::default(), Rng::with_seed(1));
		let mut scene = Scene::new(1000.0, 800.0);
		sim.populate(&mut scene, 1, &[sprite]);
		let cloud = &mut scene.clouds[0];
		cloud.x = 300.0;
		cloud.y = 200.0;
		cloud.scale = 0.5;
		scene
	}

	#[test]
	fn frame_is_clear_then_background_then_clouds() {
		let scene = scene_with_one_cloud(SpriteId(0));
		let sprites = sheet(&[Some((7, 200.0, 100.0))]);
		let config = SkyConfig::default();
		let mut surface = RecordingSurface::new();

		render(&scene, &sprites, &config, &mut surface);

		assert_eq!(
			surface.ops,
			vec![
				Op::Clear,
				Op::Gradient {
					height: 800.0,
					top: config.top_color(),
					bottom: config.bottom_color(),
				},
				Op::Save,
				Op::Alpha(0.25),
				Op::Image {
					id: 7,
					x: 250.0,
					y: 175.0,
					w: 100.0,
					h: 50.0,
					alpha: 0.25,
				},
				Op::Restore,
			]
		);
		assert_eq!(surface.alpha(), 1.0);
	}

	#[test]
	fn clouds_with_unready_sprites_are_skipped() {
		let mut scene = scene_with_one_cloud(SpriteId(0));
		scene.clouds.extend(scene_with_one_cloud(SpriteId(1)).clouds);
		// slot 0 failed, slot 1 still pending
		let mut sprites = sheet(&[None, None]);
		sprites.settle(SpriteId(0), None);
		let mut surface = RecordingSurface::new();

		draw_clouds(&scene, &sprites, 0.25, &mut surface);
		assert!(surface.ops.is_empty());

		sprites.settle(
			SpriteId(1),
			Some(Sprite {
				image: 3,
				width: 10.0,
				height: 10.0,
			}),
		);
		draw_clouds(&scene, &sprites, 0.25, &mut surface);
		assert_eq!(surface.images(), 1);
	}

	#[test]
	fn spriteless_scene_paints_background_only() {
		let mut sim = CloudSimulator::new(&SkyConfig::default(), Rng::with_seed(2));
		let mut scene = Scene::new(640.0, 480.0);
		sim.populate(&mut scene, 5, &[]);
		let sprites: SpriteSheet<u32> = sheet(&[]);
		let mut surface = RecordingSurface::new();

		render(&scene, &sprites, &SkyConfig::default(), &mut surface);
		assert_eq!(surface.backgrounds(), 1);
		assert_eq!(surface.images(), 0);
	}
}
