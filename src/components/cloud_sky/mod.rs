//! Drifting-cloud sky background.
//!
//! Paints a vertical gradient on an HTML canvas and drifts semi-transparent
//! cloud sprites across it:
//! - Sprites load concurrently; failed loads are logged and skipped
//! - Clouds enter just outside the left or right edge and drift across
//! - The loop runs on `requestAnimationFrame` and can be stopped at any time
//! - Window resizes keep the canvas filling the viewport
//!
//! # Example
//!
//! ```ignore
//! use cloud_sky::{CloudBackground, SkyConfig};
//!
//! let sky = CloudBackground::attach("pixie", SkyConfig::default());
//! if let Some(sky) = &sky {
//!     sky.set_cloud_count(8);
//!     sky.set_speed(0.1, 0.3);
//! }
//! ```

mod component;
pub mod config;
mod controls;
pub mod driver;
pub mod particles;
pub mod render;
pub mod sprites;
mod state;

pub use component::{CloudBackground, CloudSkyCanvas, DEFAULT_CANVAS_ID};
pub use config::{Color, SkyConfig};
pub use driver::{AnimationDriver, FrameScheduler, Phase};
pub use particles::{Cloud, CloudSimulator};
pub use render::SkySurface;
pub use sprites::{SpriteFetcher, SpriteSheet, SpriteState};
pub use state::Scene;
