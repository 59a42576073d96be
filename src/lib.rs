//! cloud-sky: animated drifting-cloud background for web pages.
//!
//! This crate provides a WASM canvas component that paints a gradient sky and
//! drifts cloud sprites across it, for use as ambient page decoration.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::cloud_sky::{CloudBackground, CloudSkyCanvas, SkyConfig};

/// Id of the optional `<script type="application/json">` holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "cloud-config";

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("cloud-sky: logging initialized");
}

/// Load sky configuration from a script element with id="cloud-config".
/// Any subset of fields may be given, e.g. `{ "cloudCount": 8 }`.
fn load_sky_config() -> Option<SkyConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match SkyConfig::from_json(&json_text) {
		Ok(config) => {
			info!(
				"cloud-sky: loaded config with {} clouds, {} images",
				config.cloud_count,
				config.cloud_images.len()
			);
			Some(config)
		}
		Err(e) => {
			warn!("cloud-sky: failed to parse config, using defaults: {}", e);
			None
		}
	}
}

/// Main application component.
/// Reads overrides from the DOM and renders the sky behind the page.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_sky_config().unwrap_or_default();

	view! {
		<Title text="cloud-sky" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<CloudSkyCanvas config=config />
	}
}
