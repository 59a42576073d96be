//! Cloud sprite loading.
//!
//! Every source is fetched independently; each slot of the [`SpriteSheet`]
//! moves from `Pending` to either `Ready` or `Failed` as its load settles.
//! The completion callback fires once, after the last slot has settled, no
//! matter how many of them failed.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

/// Index of a sprite slot in its sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteId(pub usize);

/// A loaded image together with its natural dimensions.
#[derive(Clone, Debug)]
pub struct Sprite<I> {
	/// Host image handle.
	pub image: I,
	/// Natural width in pixels.
	pub width: f64,
	/// Natural height in pixels.
	pub height: f64,
}

/// Load state of one sprite slot.
#[derive(Clone, Debug)]
pub enum SpriteState<I> {
	/// Load still in flight.
	Pending,
	/// Load failed; the slot is never drawn.
	Failed,
	/// Loaded and drawable.
	Ready(Sprite<I>),
}

impl<I> SpriteState<I> {
	/// `true` until the slot settles.
	pub fn is_pending(&self) -> bool {
		matches!(self, SpriteState::Pending)
	}
}

/// Sprite slots keyed by source, plus the ready set in completion order.
#[derive(Clone, Debug)]
pub struct SpriteSheet<I> {
	sources: Vec<String>,
	slots: Vec<SpriteState<I>>,
	ready: Vec<SpriteId>,
}

impl<I> Default for SpriteSheet<I> {
	fn default() -> Self {
		Self {
			sources: Vec::new(),
			slots: Vec::new(),
			ready: Vec::new(),
		}
	}
}

impl<I> SpriteSheet<I> {
	/// A sheet with every source pending.
	pub fn new(sources: &[String]) -> Self {
		Self {
			sources: sources.to_vec(),
			slots: sources.iter().map(|_| SpriteState::Pending).collect(),
			ready: Vec::new(),
		}
	}

	/// Number of slots, settled or not.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Source the slot was created from.
	pub fn source(&self, id: SpriteId) -> Option<&str> {
		self.sources.get(id.0).map(String::as_str)
	}

	/// Load state of the slot, `None` for an unknown id.
	pub fn state(&self, id: SpriteId) -> Option<&SpriteState<I>> {
		self.slots.get(id.0)
	}

	/// The sprite behind `id`, if it finished loading.
	pub fn ready(&self, id: SpriteId) -> Option<&Sprite<I>> {
		match self.slots.get(id.0)? {
			SpriteState::Ready(sprite) => Some(sprite),
			_ => None,
		}
	}

	/// Ids of loaded sprites, in the order their loads completed.
	pub fn ready_ids(&self) -> &[SpriteId] {
		&self.ready
	}

	/// Slots whose load has not reported back yet.
	pub fn pending_count(&self) -> usize {
		self.slots.iter().filter(|s| s.is_pending()).count()
	}

	/// `true` once no slot is pending.
	pub fn is_settled(&self) -> bool {
		self.pending_count() == 0
	}

	/// Settles a pending slot. Returns `false` if the slot was unknown or
	/// already settled, in which case nothing changes.
	pub fn settle(&mut self, id: SpriteId, loaded: Option<Sprite<I>>) -> bool {
		let Some(slot) = self.slots.get_mut(id.0) else {
			return false;
		};
		if !slot.is_pending() {
			return false;
		}
		*slot = match loaded {
			Some(sprite) => {
				self.ready.push(id);
				SpriteState::Ready(sprite)
			}
			None => SpriteState::Failed,
		};
		true
	}
}

/// Callback handed to a fetcher; invoke with `None` on failure.
pub type FetchDone<I> = Box<dyn FnOnce(Option<Sprite<I>>)>;

/// Starts one image load and reports back through `done` exactly once.
pub trait SpriteFetcher {
	/// Host image handle produced by a successful load.
	type Image: 'static;

	/// Begins loading `source`.
	fn fetch(&self, source: &str, done: FetchDone<Self::Image>);
}

struct SpriteJoin<I> {
	sheet: SpriteSheet<I>,
	on_complete: Option<Box<dyn FnOnce(SpriteSheet<I>)>>,
}

impl<I: 'static> SpriteJoin<I> {
	/// Records one load result. Returns `false` for a slot that was unknown
	/// or already settled.
	fn settle(join: &Rc<RefCell<Self>>, id: SpriteId, loaded: Option<Sprite<I>>) -> bool {
		let (applied, finished) = {
			let mut j = join.borrow_mut();
			let source = j.sheet.source(id).unwrap_or_default().to_string();
			let ok = loaded.is_some();
			let applied = j.sheet.settle(id, loaded);
			if !applied {
				debug!("cloud-sky: ignoring repeated load result for slot {}", id.0);
			} else if ok {
				info!("cloud-sky: loaded {}", source);
			} else {
				error!("cloud-sky: failed to load {}", source);
			}
			(applied, Self::take_if_settled(&mut j))
		};
		if let Some((sheet, on_complete)) = finished {
			on_complete(sheet);
		}
		applied
	}

	#[allow(clippy::type_complexity)]
	fn take_if_settled(j: &mut Self) -> Option<(SpriteSheet<I>, Box<dyn FnOnce(SpriteSheet<I>)>)> {
		if !j.sheet.is_settled() {
			return None;
		}
		let on_complete = j.on_complete.take()?;
		let sheet = std::mem::take(&mut j.sheet);
		info!(
			"cloud-sky: total loaded images: {}/{}",
			sheet.ready_ids().len(),
			sheet.len()
		);
		Some((sheet, on_complete))
	}
}

/// Fans out one fetch per source and calls `on_complete` with the settled
/// sheet once every fetch has reported back.
pub fn load_sprites<F, C>(fetcher: &F, sources: &[String], on_complete: C)
where
	F: SpriteFetcher,
	C: FnOnce(SpriteSheet<F::Image>) + 'static,
{
	info!("cloud-sky: loading {} cloud images", sources.len());
	let join = Rc::new(RefCell::new(SpriteJoin {
		sheet: SpriteSheet::new(sources),
		on_complete: Some(Box::new(on_complete)),
	}));

	if sources.is_empty() {
		let finished = SpriteJoin::take_if_settled(&mut join.borrow_mut());
		if let Some((sheet, on_complete)) = finished {
			on_complete(sheet);
		}
		return;
	}

	for (idx, source) in sources.iter().enumerate() {
		let join = join.clone();
		fetcher.fetch(
			source,
			Box::new(move |loaded| {
				SpriteJoin::settle(&join, SpriteId(idx), loaded);
			}),
		);
	}
}

/// Loads sprites through `HtmlImageElement`.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlImageFetcher;

impl SpriteFetcher for HtmlImageFetcher {
	type Image = HtmlImageElement;

	fn fetch(&self, source: &str, done: FetchDone<HtmlImageElement>) {
		let Ok(img) = HtmlImageElement::new() else {
			done(None);
			return;
		};
		let done = Rc::new(RefCell::new(Some(done)));

		let (img_load, done_load) = (img.clone(), done.clone());
		let on_load = Closure::once_into_js(move || {
			clear_handlers(&img_load);
			if let Some(done) = done_load.borrow_mut().take() {
				let (width, height) = (
					img_load.natural_width() as f64,
					img_load.natural_height() as f64,
				);
				done(Some(Sprite {
					image: img_load,
					width,
					height,
				}));
			}
		});

		let (img_err, done_err) = (img.clone(), done);
		let on_error = Closure::once_into_js(move || {
			clear_handlers(&img_err);
			if let Some(done) = done_err.borrow_mut().take() {
				done(None);
			}
		});

		img.set_onload(Some(on_load.unchecked_ref()));
		img.set_onerror(Some(on_error.unchecked_ref()));
		img.set_src(source);
	}
}

fn clear_handlers(img: &HtmlImageElement) {
	img.set_onload(None);
	img.set_onerror(None);
}
