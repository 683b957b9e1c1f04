use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Size};
use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, PointerEvent, WheelEvent, Window};

use super::error::CanvasError;
use super::interaction::{Cursor, HostCallbacks};
use super::layout::LayoutConfig;
use super::render;
use super::scheduler::{AnimationFrameLoop, FrameLoops};
use super::state::GraphEngine;
use super::types::{NodeId, Scene};

/// Forwards engine notifications to the Leptos callbacks the host passed in.
struct CallbackHost {
	click: Option<Callback<NodeId>>,
	drag: Option<Callback<(NodeId, f64, f64)>>,
}

impl HostCallbacks for CallbackHost {
	fn on_node_click(&self, id: &str) {
		if let Some(cb) = &self.click {
			cb.run(id.to_owned());
		}
	}

	fn on_node_drag(&self, id: &str, x: f64, y: f64) {
		if let Some(cb) = &self.drag {
			cb.run((id.to_owned(), x, y));
		}
	}
}

#[derive(Clone, Copy)]
struct SizeSource {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
}

impl SizeSource {
	fn measure(self, window: &Window, canvas: &HtmlCanvasElement) -> Size {
		if self.fullscreen {
			let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
			return Size::new(dim(window.inner_width()), dim(window.inner_height()));
		}
		let parent = canvas.parent_element();
		Size::new(
			self.width.unwrap_or_else(|| {
				parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(800.0)
			}),
			self.height.unwrap_or_else(|| {
				parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(600.0)
			}),
		)
	}
}

/// Shared handles the event listeners and frame loops hold on to.
#[derive(Clone, Default)]
struct CanvasHandles {
	engine: Rc<RefCell<Option<GraphEngine>>>,
	loops: Rc<RefCell<Option<FrameLoops<AnimationFrameLoop>>>>,
	resize: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl CanvasHandles {
	fn with_engine(&self, f: impl FnOnce(&mut GraphEngine)) {
		if let Some(engine) = self.engine.borrow_mut().as_mut() {
			f(engine);
		}
	}

	fn sync_loops(&self) {
		let active = self.engine.borrow().as_ref().is_some_and(GraphEngine::is_active);
		if let Some(loops) = self.loops.borrow_mut().as_mut() {
			loops.sync(active);
		}
	}

	fn teardown(&self) {
		if let Some(mut loops) = self.loops.borrow_mut().take() {
			loops.teardown();
		}
		if let Some(cb) = self.resize.borrow_mut().take() {
			if let Some(window) = web_sys::window() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		info!("graph canvas torn down");
	}
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, CanvasError> {
	canvas
		.get_context("2d")
		.map_err(|err| CanvasError::Context(format!("{err:?}")))?
		.ok_or_else(|| CanvasError::Context("browser returned no context".into()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| CanvasError::Context("unexpected context type".into()))
}

fn apply_size(canvas: &HtmlCanvasElement, size: Size) {
	canvas.set_width(size.width.max(0.0) as u32);
	canvas.set_height(size.height.max(0.0) as u32);
}

fn mount(
	canvas: HtmlCanvasElement,
	sizing: SizeSource,
	scene: &Scene,
	config: LayoutConfig,
	host: CallbackHost,
	handles: &CanvasHandles,
) -> Result<(), CanvasError> {
	let window = web_sys::window().ok_or(CanvasError::NoWindow)?;
	let size = sizing.measure(&window, &canvas);
	apply_size(&canvas, size);
	let ctx = context_2d(&canvas)?;

	let seed = js_sys::Date::now() as u64;
	*handles.engine.borrow_mut() = Some(GraphEngine::new(scene, size, config, Box::new(host), seed));

	let physics = {
		let engine = handles.engine.clone();
		AnimationFrameLoop::new(move |_| {
			if let Some(engine) = engine.borrow_mut().as_mut() {
				engine.physics_tick();
			}
		})
	};
	let render = {
		let engine = handles.engine.clone();
		AnimationFrameLoop::new(move |_| {
			if let Some(engine) = engine.borrow().as_ref() {
				render::render(engine.state(), &ctx);
			}
		})
	};
	*handles.loops.borrow_mut() = Some(FrameLoops::new(physics, render));
	handles.sync_loops();

	let on_resize = {
		let handles = handles.clone();
		Closure::<dyn FnMut()>::new(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			let size = sizing.measure(&window, &canvas);
			apply_size(&canvas, size);
			handles.with_engine(|engine| engine.resize(size.width, size.height));
			handles.sync_loops();
		})
	};
	window
		.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
		.map_err(|err| CanvasError::Listener {
			event: "resize",
			reason: format!("{err:?}"),
		})?;
	*handles.resize.borrow_mut() = Some(on_resize);

	info!(
		"graph canvas mounted at {}x{} with {} nodes",
		size.width,
		size.height,
		scene.nodes.len()
	);
	Ok(())
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn SocialGraphCanvas(
	#[prop(into)] scene: Signal<Scene>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] config: LayoutConfig,
	#[prop(optional, into)] on_node_click: Option<Callback<NodeId>>,
	#[prop(optional, into)] on_node_drag: Option<Callback<(NodeId, f64, f64)>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let handles = CanvasHandles::default();
	let cursor = RwSignal::new(Cursor::Default);
	let sizing = SizeSource {
		fullscreen,
		width,
		height,
	};

	let handles_init = handles.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if handles_init.engine.borrow().is_some() {
			return;
		}
		let host = CallbackHost {
			click: on_node_click,
			drag: on_node_drag,
		};
		let scene = scene.get_untracked();
		if let Err(err) = mount(canvas, sizing, &scene, config, host, &handles_init) {
			error!("graph canvas setup failed: {err}");
		}
	});

	let handles_scene = handles.clone();
	Effect::new(move |_| {
		let scene = scene.get();
		handles_scene.with_engine(|engine| engine.set_scene(&scene));
	});

	let teardown = StoredValue::new_local(handles.clone());
	on_cleanup(move || {
		teardown.try_with_value(CanvasHandles::teardown);
	});

	let handles_down = handles.clone();
	let on_pointerdown = move |ev: PointerEvent| {
		let Some(screen) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		handles_down.with_engine(|engine| {
			engine.pointer_down(screen);
			cursor.set(engine.cursor());
		});
	};

	let handles_move = handles.clone();
	let on_pointermove = move |ev: PointerEvent| {
		let Some(screen) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		handles_move.with_engine(|engine| {
			engine.pointer_move(screen);
			cursor.set(engine.cursor());
		});
	};

	let handles_up = handles.clone();
	let on_pointerup = move |_: PointerEvent| {
		handles_up.with_engine(|engine| {
			engine.pointer_up();
			cursor.set(engine.cursor());
		});
	};

	let handles_leave = handles.clone();
	let on_pointerleave = move |_: PointerEvent| {
		handles_leave.with_engine(|engine| {
			engine.pointer_leave();
			cursor.set(engine.cursor());
		});
	};

	let handles_wheel = handles;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(screen) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		handles_wheel.with_engine(|engine| engine.wheel(screen, ev.delta_y()));
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="social-graph-canvas"
			on:pointerdown=on_pointerdown
			on:pointermove=on_pointermove
			on:pointerup=on_pointerup
			on:pointerleave=on_pointerleave
			on:wheel=on_wheel
			style=move || format!("display: block; touch-action: none; cursor: {};", cursor.get().as_css())
		/>
	}
}
