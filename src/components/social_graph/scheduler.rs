use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::error;
use wasm_bindgen::prelude::*;

use super::error::CanvasError;

/// A repeating per-frame callback that can be started and cancelled.
pub trait Scheduler {
	fn start(&mut self);
	fn stop(&mut self);
	fn is_running(&self) -> bool;
}

type Tick = Box<dyn FnMut(f64)>;

struct FrameLoop {
	tick: RefCell<Tick>,
	callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
	handle: Cell<Option<i32>>,
	running: Cell<bool>,
}

impl FrameLoop {
	fn request(&self) -> Result<(), CanvasError> {
		let window = web_sys::window().ok_or(CanvasError::NoWindow)?;
		let callback = self.callback.borrow();
		let Some(cb) = callback.as_ref() else {
			return Ok(());
		};
		let handle = window
			.request_animation_frame(cb.as_ref().unchecked_ref())
			.map_err(|err| CanvasError::Schedule(format!("{err:?}")))?;
		self.handle.set(Some(handle));
		Ok(())
	}

	fn fire(&self, timestamp: f64) {
		self.handle.set(None);
		if !self.running.get() {
			return;
		}
		(self.tick.borrow_mut())(timestamp);
		// The tick may have stopped the loop.
		if self.running.get() {
			if let Err(err) = self.request() {
				error!("animation loop stopped: {err}");
				self.running.set(false);
			}
		}
	}
}

/// `requestAnimationFrame`-driven loop. Stops itself when dropped.
pub struct AnimationFrameLoop {
	inner: Rc<FrameLoop>,
}

impl AnimationFrameLoop {
	pub fn new(tick: impl FnMut(f64) + 'static) -> Self {
		let inner = Rc::new(FrameLoop {
			tick: RefCell::new(Box::new(tick)),
			callback: RefCell::new(None),
			handle: Cell::new(None),
			running: Cell::new(false),
		});
		let weak: Weak<FrameLoop> = Rc::downgrade(&inner);
		*inner.callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			if let Some(inner) = weak.upgrade() {
				inner.fire(timestamp);
			}
		}));
		Self { inner }
	}
}

impl Scheduler for AnimationFrameLoop {
	fn start(&mut self) {
		if self.inner.running.replace(true) {
			return;
		}
		if let Err(err) = self.inner.request() {
			error!("failed to start animation loop: {err}");
			self.inner.running.set(false);
		}
	}

	fn stop(&mut self) {
		self.inner.running.set(false);
		if let Some(handle) = self.inner.handle.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(handle);
			}
		}
	}

	fn is_running(&self) -> bool {
		self.inner.running.get()
	}
}

impl Drop for AnimationFrameLoop {
	fn drop(&mut self) {
		self.stop();
	}
}

/// The physics and render loops, scheduled independently.
pub struct FrameLoops<S: Scheduler> {
	pub physics: S,
	pub render: S,
}

impl<S: Scheduler> FrameLoops<S> {
	pub fn new(physics: S, render: S) -> Self {
		Self { physics, render }
	}

	/// Run both loops while the canvas has a usable size, stop them otherwise.
	pub fn sync(&mut self, active: bool) {
		for scheduler in [&mut self.physics, &mut self.render] {
			match (active, scheduler.is_running()) {
				(true, false) => scheduler.start(),
				(false, true) => scheduler.stop(),
				_ => {}
			}
		}
	}

	pub fn teardown(&mut self) {
		self.physics.stop();
		self.render.stop();
	}
}
