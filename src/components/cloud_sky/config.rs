//! Sky configuration: cloud population, motion ranges, and gradient colors.
//!
//! Every field has a default, so a page can override any subset of them from
//! JSON (camelCase keys, e.g. `{"cloudCount": 8, "opacity": 0.4}`).

use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	/// Alpha in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses a CSS color string.
	/// Supports hex (`#RRGGBB`) and `rgb()`/`rgba()` functional notation.
	pub fn parse(color_str: &str) -> Option<Self> {
		let s = color_str.trim();
		if let Some(hex) = s.strip_prefix('#') {
			if hex.len() != 6 || !hex.is_ascii() {
				return None;
			}
			let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
			let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
			let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
			Some(Self::rgb(r, g, b))
		} else if s.starts_with("rgb") {
			let nums: Vec<&str> = s
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.map(str::trim)
				.collect();
			if nums.len() < 3 || nums.len() > 4 {
				return None;
			}
			let r = nums[0].parse().ok()?;
			let g = nums[1].parse().ok()?;
			let b = nums[2].parse().ok()?;
			let a = match nums.get(3) {
				Some(a) => a.parse::<f64>().ok()?.clamp(0.0, 1.0),
				None => 1.0,
			};
			Some(Self::rgba(r, g, b, a))
		} else {
			None
		}
	}

	/// Hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

impl TryFrom<String> for Color {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value).ok_or_else(|| format!("unsupported color `{value}`"))
	}
}

/// Default sprite sheet, relative to the page.
pub const DEFAULT_CLOUD_IMAGES: [&str; 6] = [
	"Images/cloud1.png",
	"Images/cloud2.png",
	"Images/cloud3.png",
	"Images/cloud4.png",
	"Images/cloud5.png",
	"Images/cloud6.png",
];

/// Complete sky configuration.
///
/// Opacity, gradient colors and image sources are read once at construction.
/// Cloud count and the speed range can be changed later through
/// [`CloudBackground`](super::CloudBackground).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkyConfig {
	/// Number of clouds on screen.
	pub cloud_count: usize,
	/// Slowest drift, in pixels per frame.
	pub min_speed: f64,
	/// Fastest drift, in pixels per frame.
	pub max_speed: f64,
	/// Smallest sprite scale factor.
	pub min_scale: f64,
	/// Largest sprite scale factor.
	pub max_scale: f64,
	/// Global alpha applied to every cloud sprite.
	pub opacity: f64,
	/// Sprite image sources.
	pub cloud_images: Vec<String>,
	/// Gradient stops, top then bottom.
	pub gradient_colors: [Color; 2],
}

impl Default for SkyConfig {
	fn default() -> Self {
		Self {
			cloud_count: 5,
			min_speed: 0.05,
			max_speed: 0.2,
			min_scale: 0.3,
			max_scale: 0.5,
			opacity: 0.25,
			cloud_images: DEFAULT_CLOUD_IMAGES.iter().map(|s| s.to_string()).collect(),
			gradient_colors: [Color::rgb(0x56, 0xcc, 0xf2), Color::rgb(0x2f, 0x80, 0xed)],
		}
	}
}

impl SkyConfig {
	/// Parse a (possibly partial) JSON override.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str::<Self>(json).map(Self::normalized)
	}

	/// Orders inverted ranges and clamps opacity into `[0, 1]`.
	pub fn normalized(mut self) -> Self {
		(self.min_speed, self.max_speed) = ordered(self.min_speed, self.max_speed);
		(self.min_scale, self.max_scale) = ordered(self.min_scale, self.max_scale);
		self.opacity = self.opacity.clamp(0.0, 1.0);
		self
	}

	/// Gradient stop at the top edge.
	pub fn top_color(&self) -> Color {
		self.gradient_colors[0]
	}

	/// Gradient stop at the bottom edge.
	pub fn bottom_color(&self) -> Color {
		self.gradient_colors[1]
	}
}

pub(crate) fn ordered(a: f64, b: f64) -> (f64, f64) {
	if a <= b { (a, b) } else { (b, a) }
}
