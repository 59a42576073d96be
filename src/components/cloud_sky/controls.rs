//! Start/stop and reconfiguration requests that may arrive before the
//! sprites have loaded.
//!
//! Until the driver exists, requests only update the pending configuration
//! and the autostart flag. [`SkyControls::install`] applies them to the
//! freshly built driver.

use log::warn;

use super::config::{SkyConfig, ordered};
use super::driver::{AnimationDriver, FrameScheduler};
use super::render::SkySurface;

pub struct SkyControls<S: SkySurface, F: FrameScheduler> {
	config: SkyConfig,
	autostart: bool,
	driver: Option<AnimationDriver<S, F>>,
}

impl<S: SkySurface, F: FrameScheduler> SkyControls<S, F> {
	pub fn new(config: SkyConfig) -> Self {
		Self {
			config: config.normalized(),
			autostart: true,
			driver: None,
		}
	}

	/// Configuration the driver is built from, including any reconfiguration
	/// requested so far.
	pub fn config(&self) -> &SkyConfig {
		&self.config
	}

	pub fn driver_mut(&mut self) -> Option<&mut AnimationDriver<S, F>> {
		self.driver.as_mut()
	}

	pub fn is_running(&self) -> bool {
		self.driver.as_ref().is_some_and(|d| d.is_running())
	}

	/// Hands over the driver built once loading settled, and starts it
	/// unless a stop was requested in the meantime.
	pub fn install(&mut self, mut driver: AnimationDriver<S, F>) {
		if self.autostart {
			driver.start();
		}
		self.driver = Some(driver);
	}

	pub fn start(&mut self) {
		self.autostart = true;
		if let Some(driver) = self.driver.as_mut() {
			driver.start();
		}
	}

	pub fn stop(&mut self) {
		self.autostart = false;
		if let Some(driver) = self.driver.as_mut() {
			driver.stop();
		}
	}

	pub fn set_cloud_count(&mut self, count: usize) {
		self.config.cloud_count = count;
		if let Some(driver) = self.driver.as_mut() {
			driver.set_cloud_count(count);
		}
	}

	/// Records new speed bounds and applies them to a running driver.
	/// Non-finite bounds are ignored.
	pub fn set_speed(&mut self, min: f64, max: f64) -> bool {
		if !(min.is_finite() && max.is_finite()) {
			warn!("cloud-sky: ignoring non-finite speed range {}..{}", min, max);
			return false;
		}
		(self.config.min_speed, self.config.max_speed) = ordered(min, max);
		if let Some(driver) = self.driver.as_mut() {
			driver.set_speed_range(min, max);
		}
		true
	}

	/// Stops the loop for good; a driver installed later stays stopped.
	pub fn shutdown(&mut self) {
		self.stop();
	}
}

#[cfg(test)]
mod tests {
	use fastrand::Rng;

	use super::*;
	use crate::components::cloud_sky::driver::testing::{FakeScheduler, ready_sheet};
	use crate::components::cloud_sky::render::testing::RecordingSurface;

	type TestControls = SkyControls<RecordingSurface, FakeScheduler>;

	fn build(controls: &TestControls) -> AnimationDriver<RecordingSurface, FakeScheduler> {
		AnimationDriver::new(
			controls.config().clone(),
			ready_sheet(3),
			RecordingSurface::new(),
			FakeScheduler::default(),
			Rng::with_seed(11),
			800.0,
			600.0,
		)
	}

	fn install(controls: &mut TestControls) {
		let driver = build(controls);
		controls.install(driver);
	}

	#[test]
	fn starts_on_its_own_once_installed() {
		let mut controls = TestControls::new(SkyConfig::default());
		assert!(!controls.is_running());
		install(&mut controls);
		assert!(controls.is_running());
	}

	#[test]
	fn stop_before_loading_keeps_installed_driver_stopped() {
		let mut controls = TestControls::new(SkyConfig::default());
		controls.stop();
		install(&mut controls);
		assert!(!controls.is_running());
		let driver = controls.driver_mut().expect("installed");
		assert!(driver.scheduler().outstanding.is_empty());

		controls.start();
		assert!(controls.is_running());
	}

	#[test]
	fn reconfiguration_before_loading_reaches_the_driver() {
		let mut controls = TestControls::new(SkyConfig::default());
		controls.set_cloud_count(9);
		assert!(controls.set_speed(2.0, 1.0));
		install(&mut controls);

		let driver = controls.driver_mut().expect("installed");
		assert_eq!(driver.scene().cloud_count(), 9);
		assert_eq!((driver.config().min_speed, driver.config().max_speed), (1.0, 2.0));
		assert!(driver.scene().clouds.iter().all(|c| c.speed.abs() <= 2.0));
	}

	#[test]
	fn non_finite_speed_is_ignored_before_and_after_loading() {
		let mut controls = TestControls::new(SkyConfig::default());
		assert!(!controls.set_speed(f64::NAN, 1.0));
		assert_eq!((controls.config().min_speed, controls.config().max_speed), (0.05, 0.2));

		install(&mut controls);
		assert!(!controls.set_speed(0.1, f64::INFINITY));
		let driver = controls.driver_mut().expect("installed");
		assert_eq!((driver.config().min_speed, driver.config().max_speed), (0.05, 0.2));
		assert!(driver.scene().clouds.iter().all(|c| c.speed.is_finite()));
	}

	#[test]
	fn reconfiguration_after_loading_updates_live_driver() {
		let mut controls = TestControls::new(SkyConfig::default());
		install(&mut controls);
		controls.set_cloud_count(2);
		assert_eq!(controls.config().cloud_count, 2);
		assert_eq!(controls.driver_mut().map(|d| d.scene().cloud_count()), Some(2));
	}

	#[test]
	fn shutdown_cancels_pending_frame() {
		let mut controls = TestControls::new(SkyConfig::default());
		install(&mut controls);
		controls.shutdown();
		assert!(!controls.is_running());
		let driver = controls.driver_mut().expect("installed");
		assert!(driver.scheduler().outstanding.is_empty());
		assert_eq!(driver.scheduler().cancelled, vec![1]);
	}

	#[test]
	fn shutdown_before_loading_prevents_autostart() {
		let mut controls = TestControls::new(SkyConfig::default());
		controls.shutdown();
		install(&mut controls);
		assert!(!controls.is_running());
	}
}
