//! Browser wiring for the cloud sky.
//!
//! [`CloudBackground`] resolves a canvas by id, loads the cloud sprites,
//! then builds an [`AnimationDriver`] over the canvas' 2D context and a
//! `requestAnimationFrame` scheduler. The window `resize` listener keeps the
//! canvas sized to the viewport. [`CloudSkyCanvas`] is the Leptos component
//! that renders the canvas and attaches a background to it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fastrand::Rng;
use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, Window};

use super::config::SkyConfig;
use super::controls::SkyControls;
use super::driver::{AnimationDriver, FrameCallback, RafScheduler};
use super::sprites::{HtmlImageFetcher, SpriteSheet, load_sprites};

/// Canvas id used when none is given.
pub const DEFAULT_CANVAS_ID: &str = "cloud-sky";

/// State shared between the handle and the browser callbacks.
struct SkyContext {
	window: Window,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	controls: SkyControls<CanvasRenderingContext2d, RafScheduler>,
	frame_cb: FrameCallback,
	resize_cb: Option<Closure<dyn FnMut()>>,
}

/// A drifting-cloud background attached to one canvas.
///
/// Dropping the handle stops the animation and detaches the resize listener.
pub struct CloudBackground {
	context: Rc<RefCell<SkyContext>>,
}

impl CloudBackground {
	/// Attaches to the canvas with id `canvas_id` and starts loading sprites.
	/// The animation starts on its own once loading has settled.
	///
	/// Returns `None`, after logging, if there is no such canvas or it has
	/// no 2D context.
	pub fn attach(canvas_id: &str, config: SkyConfig) -> Option<Self> {
		let window = web_sys::window()?;
		let document = window.document()?;
		let Some(element) = document.get_element_by_id(canvas_id) else {
			error!("cloud-sky: canvas element with id '{}' not found", canvas_id);
			return None;
		};
		let Ok(canvas) = element.dyn_into::<HtmlCanvasElement>() else {
			error!("cloud-sky: element '{}' is not a canvas", canvas_id);
			return None;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("cloud-sky: canvas '{}' has no 2d context", canvas_id);
			return None;
		};

		let controls = SkyControls::new(config);
		let sources = controls.config().cloud_images.clone();
		let context = Rc::new(RefCell::new(SkyContext {
			window,
			canvas,
			ctx,
			controls,
			frame_cb: Rc::new(RefCell::new(None)),
			resize_cb: None,
		}));

		let weak = Rc::downgrade(&context);
		load_sprites(&HtmlImageFetcher, &sources, move |sheet| {
			on_sprites_loaded(&weak, sheet);
		});

		Some(Self { context })
	}

	/// Starts the animation. No-op while running.
	pub fn start(&self) {
		self.context.borrow_mut().controls.start();
	}

	/// Stops the animation. Safe to call at any time, any number of times.
	pub fn stop(&self) {
		self.context.borrow_mut().controls.stop();
	}

	/// `true` while frames are being scheduled.
	pub fn is_running(&self) -> bool {
		self.context.borrow().controls.is_running()
	}

	/// Replaces all clouds with `count` new ones.
	pub fn set_cloud_count(&self, count: usize) {
		self.context.borrow_mut().controls.set_cloud_count(count);
	}

	/// Sets new speed bounds and redraws every cloud's speed. Non-finite
	/// bounds are logged and ignored.
	pub fn set_speed(&self, min: f64, max: f64) {
		self.context.borrow_mut().controls.set_speed(min, max);
	}
}

impl Drop for CloudBackground {
	fn drop(&mut self) {
		let mut c = self.context.borrow_mut();
		c.controls.shutdown();
		if let Some(cb) = c.resize_cb.take() {
			let _ = c
				.window
				.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		c.frame_cb.borrow_mut().take();
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
	(dim(window.inner_width()), dim(window.inner_height()))
}

fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) -> (f64, f64) {
	let (w, h) = window_size(window);
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	(w, h)
}

fn on_sprites_loaded(context: &Weak<RefCell<SkyContext>>, sheet: SpriteSheet<HtmlImageElement>) {
	let Some(context) = context.upgrade() else {
		info!("cloud-sky: background dropped before sprites finished loading");
		return;
	};
	let mut c = context.borrow_mut();

	let weak = Rc::downgrade(&context);
	*c.frame_cb.borrow_mut() = Some(Closure::new(move || {
		if let Some(context) = weak.upgrade() {
			if let Some(driver) = context.borrow_mut().controls.driver_mut() {
				driver.on_frame();
			}
		}
	}));

	let (w, h) = fit_canvas(&c.window, &c.canvas);
	let scheduler = RafScheduler::new(c.window.clone(), c.frame_cb.clone());
	let rng = Rng::with_seed(js_sys::Math::random().to_bits());
	let driver = AnimationDriver::new(
		c.controls.config().clone(),
		sheet,
		c.ctx.clone(),
		scheduler,
		rng,
		w,
		h,
	);

	let weak = Rc::downgrade(&context);
	let resize_cb: Closure<dyn FnMut()> = Closure::new(move || {
		if let Some(context) = weak.upgrade() {
			let mut c = context.borrow_mut();
			let (nw, nh) = fit_canvas(&c.window, &c.canvas);
			if let Some(driver) = c.controls.driver_mut() {
				driver.resize(nw, nh);
			}
		}
	});
	let _ = c
		.window
		.add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
	c.resize_cb = Some(resize_cb);

	c.controls.install(driver);
}

/// Renders a viewport-filling canvas with a drifting-cloud sky.
///
/// The background is attached once the canvas is mounted and lives as long
/// as the component.
#[component]
pub fn CloudSkyCanvas(
	#[prop(into, default = DEFAULT_CANVAS_ID.to_string())] id: String,
	#[prop(default = SkyConfig::default())] config: SkyConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let background: Rc<RefCell<Option<CloudBackground>>> = Rc::new(RefCell::new(None));
	let canvas_id = id.clone();

	Effect::new(move |_| {
		if canvas_ref.get().is_none() || background.borrow().is_some() {
			return;
		}
		*background.borrow_mut() = CloudBackground::attach(&canvas_id, config.clone());
	});

	view! {
		<canvas
			node_ref=canvas_ref
			id=id
			class="cloud-sky-canvas"
			style="display: block;"
		/>
	}
}
