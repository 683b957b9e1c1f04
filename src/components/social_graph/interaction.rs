use kurbo::{Point, Rect, Vec2};
use log::debug;

use super::state::EngineState;
use super::types::NodeId;

/// Pointer travel, in screen pixels, under which a press still counts as a tap.
pub const CLICK_SLOP: f64 = 3.0;

/// Screen-space bounds of the physics toggle drawn over the canvas.
pub const TOGGLE_RECT: Rect = Rect::new(12.0, 12.0, 148.0, 44.0);

/// Host notifications raised by the engine.
pub trait HostCallbacks {
	/// A node was pressed and released without being dragged.
	fn on_node_click(&self, id: &str);
	/// A node drag ended at world position `(x, y)`.
	fn on_node_drag(&self, id: &str, x: f64, y: f64);
}

impl HostCallbacks for () {
	fn on_node_click(&self, _id: &str) {}
	fn on_node_drag(&self, _id: &str, _x: f64, _y: f64) {}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionMode {
	#[default]
	Idle,
	Panning {
		last_screen: Point,
	},
	DraggingNode {
		node_id: NodeId,
		grab_offset: Vec2,
		/// World position of the node when it was grabbed.
		origin: Point,
		press_screen: Point,
		/// Pointer travelled further than [`CLICK_SLOP`] since the press.
		past_slop: bool,
	},
}

#[derive(Clone, Debug, Default)]
pub struct Interaction {
	pub mode: InteractionMode,
	/// Recomputed on every pointer move, whatever the mode.
	pub hovered: Option<NodeId>,
}

impl Interaction {
	pub fn dragged(&self) -> Option<&str> {
		match &self.mode {
			InteractionMode::DraggingNode { node_id, .. } => Some(node_id),
			_ => None,
		}
	}

	pub fn is_dragging(&self) -> bool {
		self.dragged().is_some()
	}
}

/// What a pointer event asks the engine to do next.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
	PhysicsToggled(bool),
	NodeClick { id: NodeId },
	NodeDrag { id: NodeId, position: Point },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
	#[default]
	Default,
	Grab,
	Grabbing,
	Move,
}

impl Cursor {
	pub fn as_css(self) -> &'static str {
		match self {
			Cursor::Default => "default",
			Cursor::Grab => "grab",
			Cursor::Grabbing => "grabbing",
			Cursor::Move => "move",
		}
	}
}

/// Top-most node whose disc contains the screen point.
pub fn hit_test(state: &EngineState, screen: Point) -> Option<usize> {
	let world = state.viewport.screen_to_world(screen);
	let radius = state.config.node_radius;
	state
		.scene
		.nodes()
		.iter()
		.rposition(|node| (node.position - world).hypot() <= radius)
}

pub fn pointer_down(state: &mut EngineState, screen: Point) -> Option<InteractionEvent> {
	if TOGGLE_RECT.contains(screen) {
		state.physics_enabled = !state.physics_enabled;
		state.interaction.mode = InteractionMode::Idle;
		return Some(InteractionEvent::PhysicsToggled(state.physics_enabled));
	}

	state.interaction.mode = match hit_test(state, screen) {
		Some(idx) => {
			let world = state.viewport.screen_to_world(screen);
			let node = &mut state.scene.nodes_mut()[idx];
			node.velocity = Vec2::ZERO;
			InteractionMode::DraggingNode {
				node_id: node.id.clone(),
				grab_offset: world - node.position,
				origin: node.position,
				press_screen: screen,
				past_slop: false,
			}
		}
		None => InteractionMode::Panning { last_screen: screen },
	};
	None
}

pub fn pointer_move(state: &mut EngineState, screen: Point) {
	let world = state.viewport.screen_to_world(screen);
	match &mut state.interaction.mode {
		InteractionMode::Idle => {}
		InteractionMode::Panning { last_screen } => {
			state.viewport.pan_by(screen - *last_screen);
			*last_screen = screen;
		}
		InteractionMode::DraggingNode {
			node_id,
			grab_offset,
			press_screen,
			past_slop,
			..
		} => {
			if (screen - *press_screen).hypot() > CLICK_SLOP {
				*past_slop = true;
			}
			match state.scene.node_mut(node_id) {
				Some(node) => {
					node.position = world - *grab_offset;
					node.velocity = Vec2::ZERO;
				}
				None => debug!("dragged node {node_id:?} left the scene"),
			}
		}
	}

	state.interaction.hovered = if TOGGLE_RECT.contains(screen) {
		None
	} else {
		hit_test(state, screen).map(|idx| state.scene.nodes()[idx].id.clone())
	};
}

pub fn pointer_up(state: &mut EngineState) -> Vec<InteractionEvent> {
	release(state, true)
}

pub fn pointer_leave(state: &mut EngineState) -> Vec<InteractionEvent> {
	state.interaction.hovered = None;
	release(state, false)
}

/// Ends a drag. Any displacement of the node is reported, and a press that
/// stayed within [`CLICK_SLOP`] also counts as a click.
fn release(state: &mut EngineState, allow_click: bool) -> Vec<InteractionEvent> {
	let InteractionMode::DraggingNode {
		node_id,
		origin,
		past_slop,
		..
	} = std::mem::take(&mut state.interaction.mode)
	else {
		return Vec::new();
	};
	let Some(node) = state.scene.node(&node_id) else {
		return Vec::new();
	};

	let mut events = Vec::with_capacity(2);
	if node.position != origin {
		events.push(InteractionEvent::NodeDrag {
			id: node_id.clone(),
			position: node.position,
		});
	}
	if allow_click && !past_slop {
		events.push(InteractionEvent::NodeClick { id: node_id });
	}
	events
}

pub fn wheel(state: &mut EngineState, screen: Point, delta_y: f64) {
	state.viewport.zoom_at(screen, delta_y);
}

pub fn cursor(state: &EngineState) -> Cursor {
	match state.interaction.mode {
		InteractionMode::DraggingNode { .. } => Cursor::Grabbing,
		InteractionMode::Panning { .. } => Cursor::Move,
		InteractionMode::Idle if state.interaction.hovered.is_some() => Cursor::Grab,
		InteractionMode::Idle => Cursor::Default,
	}
}
