//! Frame loop driving the simulation and the renderer.
//!
//! The driver is either `Stopped` or `Running`. While running it keeps
//! exactly one frame request outstanding; every frame advances all clouds,
//! repaints the surface and requests the next frame.

use std::cell::RefCell;
use std::rc::Rc;

use fastrand::Rng;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::Window;

use super::config::SkyConfig;
use super::particles::CloudSimulator;
use super::render::{self, SkySurface};
use super::sprites::SpriteSheet;
use super::state::Scene;

/// Requests and cancels display-refresh callbacks.
pub trait FrameScheduler {
	/// Token identifying one outstanding request.
	type Handle: Copy;

	/// Schedules one callback. `None` if the host refused.
	fn request_frame(&mut self) -> Option<Self::Handle>;
	/// Cancels a request that has not fired yet.
	fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Shared slot for the per-frame callback handed to `requestAnimationFrame`.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// [`FrameScheduler`] backed by `window.requestAnimationFrame`.
pub struct RafScheduler {
	window: Window,
	callback: FrameCallback,
}

impl RafScheduler {
	/// Scheduler requesting frames for whatever closure `callback` holds.
	pub fn new(window: Window, callback: FrameCallback) -> Self {
		Self { window, callback }
	}
}

impl FrameScheduler for RafScheduler {
	type Handle = i32;

	fn request_frame(&mut self) -> Option<i32> {
		let callback = self.callback.borrow();
		let cb = callback.as_ref()?;
		self.window
			.request_animation_frame(cb.as_ref().unchecked_ref())
			.ok()
	}

	fn cancel_frame(&mut self, handle: i32) {
		let _ = self.window.cancel_animation_frame(handle);
	}
}

/// Whether the frame loop is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// No frame request outstanding.
	Stopped,
	/// One frame request outstanding at all times.
	Running,
}

/// Owns the scene and advances it once per display refresh.
pub struct AnimationDriver<S: SkySurface, F: FrameScheduler> {
	config: SkyConfig,
	scene: Scene,
	sprites: SpriteSheet<S::Image>,
	simulator: CloudSimulator,
	surface: S,
	scheduler: F,
	phase: Phase,
	pending: Option<F::Handle>,
}

impl<S: SkySurface, F: FrameScheduler> AnimationDriver<S, F> {
	/// Builds a stopped driver for a `width × height` surface, paints the
	/// background once and populates the configured number of clouds.
	pub fn new(
		config: SkyConfig,
		sprites: SpriteSheet<S::Image>,
		surface: S,
		scheduler: F,
		rng: Rng,
		width: f64,
		height: f64,
	) -> Self {
		let config = config.normalized();
		let mut driver = Self {
			simulator: CloudSimulator::new(&config, rng),
			scene: Scene::new(width, height),
			config,
			sprites,
			surface,
			scheduler,
			phase: Phase::Stopped,
			pending: None,
		};
		driver.resize(width, height);
		driver.set_cloud_count(driver.config.cloud_count);
		driver
	}

	/// Current loop phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// `true` in [`Phase::Running`].
	pub fn is_running(&self) -> bool {
		self.phase == Phase::Running
	}

	/// Bounds and clouds as of the last frame.
	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	/// Configuration, including reconfigured count and speed range.
	pub fn config(&self) -> &SkyConfig {
		&self.config
	}

	/// The surface frames are painted on.
	pub fn surface(&self) -> &S {
		&self.surface
	}

	#[cfg(test)]
	pub(crate) fn scheduler(&self) -> &F {
		&self.scheduler
	}

	/// Starts the loop with an immediate frame. No-op while running.
	pub fn start(&mut self) {
		if self.is_running() {
			return;
		}
		debug!("cloud-sky: animation started");
		self.phase = Phase::Running;
		self.frame();
	}

	/// Cancels the outstanding frame request. Safe to call in any phase.
	pub fn stop(&mut self) {
		if let Some(handle) = self.pending.take() {
			self.scheduler.cancel_frame(handle);
		}
		if self.is_running() {
			debug!("cloud-sky: animation stopped");
		}
		self.phase = Phase::Stopped;
	}

	/// Entry point for the scheduled display-refresh callback.
	pub fn on_frame(&mut self) {
		self.pending = None;
		if self.is_running() {
			self.frame();
		}
	}

	fn frame(&mut self) {
		self.simulator.advance_all(&mut self.scene);
		render::render(&self.scene, &self.sprites, &self.config, &mut self.surface);
		self.pending = self.scheduler.request_frame();
		if self.pending.is_none() {
			warn!("cloud-sky: frame request refused, stopping animation");
			self.phase = Phase::Stopped;
		}
	}

	/// Stores new surface bounds and repaints the background once. Clouds
	/// are left untouched.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.scene.resize(width, height);
		render::draw_background(&self.scene, &self.config, &mut self.surface);
	}

	/// Replaces all clouds with `count` new ones.
	pub fn set_cloud_count(&mut self, count: usize) {
		self.config.cloud_count = count;
		self.simulator
			.populate(&mut self.scene, count, self.sprites.ready_ids());
	}

	/// Sets the speed bounds and redraws every cloud's speed from them.
	/// Returns `false`, changing nothing, for non-finite bounds.
	pub fn set_speed_range(&mut self, min: f64, max: f64) -> bool {
		if !self
			.simulator
			.set_speed_range(min, max, &mut self.scene.clouds)
		{
			return false;
		}
		(self.config.min_speed, self.config.max_speed) = self.simulator.speed_range();
		true
	}
}


#[cfg(test)]
mod tests {
	use super::testing::{FakeScheduler, ready_sheet};
	use super::*;
	use crate::components::cloud_sky::render::testing::{Op, RecordingSurface};

	type TestDriver = AnimationDriver<RecordingSurface, FakeScheduler>;

	fn driver() -> TestDriver {
		AnimationDriver::new(
			SkyConfig::default(),
			ready_sheet(6),
			RecordingSurface::new(),
			FakeScheduler::default(),
			Rng::with_seed(5),
			1000.0,
			800.0,
		)
	}

	/// Simulates the host firing the outstanding frame request.
	fn fire(driver: &mut TestDriver) {
		driver.scheduler.outstanding.pop().expect("a frame is scheduled");
		assert!(driver.scheduler.outstanding.is_empty());
		driver.on_frame();
	}

	#[test]
	fn new_driver_is_stopped_with_configured_clouds_and_background() {
		let d = driver();
		assert_eq!(d.phase(), Phase::Stopped);
		assert_eq!(d.scene().cloud_count(), 5);
		assert_eq!(d.surface().ops.len(), 1);
		assert_eq!(d.surface().backgrounds(), 1);
		assert!(d.scheduler.outstanding.is_empty());
	}

	#[test]
	fn start_renders_immediately_and_keeps_one_request_outstanding() {
		let mut d = driver();
		d.start();
		assert!(d.is_running());
		assert_eq!(d.scheduler.outstanding.len(), 1);
		assert_eq!(d.surface().images(), 5);

		fire(&mut d);
		fire(&mut d);
		assert_eq!(d.surface().count(|op| *op == Op::Clear), 3);
		assert_eq!(d.scheduler.outstanding.len(), 1);
	}

	#[test]
	fn start_twice_is_a_no_op() {
		let mut d = driver();
		d.start();
		d.start();
		assert_eq!(d.scheduler.next, 1);
		assert_eq!(d.surface().count(|op| *op == Op::Clear), 1);
	}

	#[test]
	fn stop_cancels_pending_frame_and_is_idempotent() {
		let mut d = driver();
		d.start();
		d.stop();
		assert_eq!(d.phase(), Phase::Stopped);
		assert_eq!(d.scheduler.cancelled, vec![1]);
		assert!(d.scheduler.outstanding.is_empty());

		d.stop();
		assert_eq!(d.phase(), Phase::Stopped);
		assert_eq!(d.scheduler.cancelled, vec![1]);

		// a stale callback after stop paints nothing
		let before = d.surface().ops.len();
		d.on_frame();
		assert_eq!(d.surface().ops.len(), before);
	}

	#[test]
	fn stop_before_start_is_harmless() {
		let mut d = driver();
		d.stop();
		assert_eq!(d.phase(), Phase::Stopped);
		assert!(d.scheduler.cancelled.is_empty());
	}

	#[test]
	fn restart_after_stop_resumes() {
		let mut d = driver();
		d.start();
		d.stop();
		d.start();
		assert!(d.is_running());
		assert_eq!(d.scheduler.outstanding, vec![2]);
	}

	#[test]
	fn resize_paints_one_background_and_keeps_clouds() {
		let mut d = driver();
		let clouds = d.scene().clouds.clone();
		let before = d.surface().backgrounds();

		d.resize(1280.0, 720.0);

		assert_eq!((d.scene().width, d.scene().height), (1280.0, 720.0));
		assert_eq!(d.surface().backgrounds(), before + 1);
		assert_eq!(d.surface().count(|op| *op == Op::Clear), 0);
		assert_eq!(d.scene().clouds, clouds);
	}

	#[test]
	fn reconfiguring_count_replaces_clouds() {
		let mut d = driver();
		d.set_cloud_count(10);
		assert_eq!(d.scene().cloud_count(), 10);
		assert_eq!(d.config().cloud_count, 10);
		for cloud in &d.scene().clouds {
			assert!(cloud.x == -200.0 || cloud.x == 1200.0);
			assert!(cloud.sprite().is_some());
		}
	}

	#[test]
	fn reconfiguring_speed_updates_config_and_clouds() {
		let mut d = driver();
		assert!(d.set_speed_range(1.0, 2.0));
		assert_eq!((d.config().min_speed, d.config().max_speed), (1.0, 2.0));
		assert!(d.scene().clouds.iter().all(|c| (1.0..=2.0).contains(&c.speed)));
	}

	#[test]
	fn non_finite_speed_leaves_config_and_clouds_alone() {
		let mut d = driver();
		let clouds = d.scene().clouds.clone();
		assert!(!d.set_speed_range(f64::NAN, 2.0));
		assert_eq!((d.config().min_speed, d.config().max_speed), (0.05, 0.2));
		assert_eq!(d.scene().clouds, clouds);
	}

	#[test]
	fn refused_frame_request_stops_the_loop() {
		let mut d = driver();
		d.scheduler.refuse = true;
		d.start();
		assert_eq!(d.phase(), Phase::Stopped);
	}
}
