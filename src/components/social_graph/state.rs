use kurbo::{Point, Size};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::interaction::{self, Cursor, HostCallbacks, Interaction, InteractionEvent};
use super::layout::{self, LayoutConfig};
use super::scene::SceneModel;
use super::types::Scene;
use super::viewport::Viewport;

/// Everything the layout, interaction and render passes share.
///
/// Owned by [`GraphEngine`]; the free functions in the sibling modules take it
/// by reference.
#[derive(Clone, Debug)]
pub struct EngineState {
	pub scene: SceneModel,
	pub viewport: Viewport,
	pub interaction: Interaction,
	pub config: LayoutConfig,
	/// Canvas size in pixels, which is also the world-space simulation area.
	pub size: Size,
	pub physics_enabled: bool,
}

impl EngineState {
	pub fn new(scene: &Scene, size: Size, config: LayoutConfig) -> Self {
		Self {
			scene: SceneModel::from_scene(scene),
			viewport: Viewport::default(),
			interaction: Interaction::default(),
			config,
			size,
			physics_enabled: true,
		}
	}

	pub fn has_valid_size(&self) -> bool {
		self.size.width > 0.0 && self.size.height > 0.0
	}

	pub fn hovered_index(&self) -> Option<usize> {
		self.interaction
			.hovered
			.as_deref()
			.and_then(|id| self.scene.index_of(id))
	}

	pub fn dragged_index(&self) -> Option<usize> {
		self.interaction
			.dragged()
			.and_then(|id| self.scene.index_of(id))
	}
}

/// Single owner of the engine state and the host callbacks.
pub struct GraphEngine {
	state: EngineState,
	host: Box<dyn HostCallbacks>,
	rng: SmallRng,
	calm_frames: u32,
	settled: bool,
}

impl GraphEngine {
	pub fn new(
		scene: &Scene,
		size: Size,
		config: LayoutConfig,
		host: Box<dyn HostCallbacks>,
		seed: u64,
	) -> Self {
		let mut engine = Self {
			state: EngineState::new(scene, size, config),
			host,
			rng: SmallRng::seed_from_u64(seed),
			calm_frames: 0,
			settled: false,
		};
		engine.place_new_nodes();
		engine
	}

	pub fn state(&self) -> &EngineState {
		&self.state
	}

	#[cfg(test)]
	pub fn is_settled(&self) -> bool {
		self.settled
	}

	pub fn set_scene(&mut self, scene: &Scene) {
		if self.state.scene.sync(scene) {
			self.place_new_nodes();
		}
		self.wake();
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		let size = Size::new(width, height);
		if size == self.state.size {
			return;
		}
		self.state.size = size;
		self.place_new_nodes();
		self.wake();
	}

	/// Whether per-frame work should run at all.
	pub fn is_active(&self) -> bool {
		self.state.has_valid_size()
	}

	/// Run one physics step if the simulation is live. Returns whether it stepped.
	pub fn physics_tick(&mut self) -> bool {
		let state = &mut self.state;
		if self.settled
			|| !state.physics_enabled
			|| !state.has_valid_size()
			|| state.scene.is_empty()
			|| (state.config.freeze_on_drag && state.interaction.is_dragging())
		{
			return false;
		}

		let pinned = state.dragged_index();
		let speed = layout::step(&mut state.scene, &state.config, state.size, pinned);
		if speed < state.config.rest_speed {
			self.calm_frames += 1;
			if self.calm_frames >= state.config.settle_frames {
				self.settled = true;
				debug!("layout settled");
			}
		} else {
			self.calm_frames = 0;
		}
		true
	}

	pub fn pointer_down(&mut self, screen: Point) {
		let event = interaction::pointer_down(&mut self.state, screen);
		self.wake_for_live_drag();
		self.dispatch(event);
	}

	pub fn pointer_move(&mut self, screen: Point) {
		interaction::pointer_move(&mut self.state, screen);
		self.wake_for_live_drag();
	}

	pub fn pointer_up(&mut self) {
		let was_dragging = self.state.interaction.is_dragging();
		let event = interaction::pointer_up(&mut self.state);
		if was_dragging {
			self.wake();
		}
		self.dispatch(event);
	}

	pub fn pointer_leave(&mut self) {
		let was_dragging = self.state.interaction.is_dragging();
		let event = interaction::pointer_leave(&mut self.state);
		if was_dragging {
			self.wake();
		}
		self.dispatch(event);
	}

	pub fn wheel(&mut self, screen: Point, delta_y: f64) {
		interaction::wheel(&mut self.state, screen, delta_y);
	}

	pub fn cursor(&self) -> Cursor {
		interaction::cursor(&self.state)
	}

	fn dispatch(&mut self, events: impl IntoIterator<Item = InteractionEvent>) {
		for event in events {
			match event {
				InteractionEvent::PhysicsToggled(enabled) => {
					info!("physics {}", if enabled { "enabled" } else { "disabled" });
					self.wake();
				}
				InteractionEvent::NodeClick { id } => self.host.on_node_click(&id),
				InteractionEvent::NodeDrag { id, position } => {
					self.host.on_node_drag(&id, position.x, position.y)
				}
			}
		}
	}

	/// With physics left running during drags, the other nodes must keep
	/// reacting to the held node even after the layout had settled.
	fn wake_for_live_drag(&mut self) {
		if !self.state.config.freeze_on_drag && self.state.interaction.is_dragging() {
			self.wake();
		}
	}

	fn place_new_nodes(&mut self) {
		let state = &mut self.state;
		let placed = layout::initialize(&mut state.scene, &state.config, state.size, &mut self.rng);
		if placed > 0 {
			debug!("placed {placed} new node(s)");
		}
	}

	fn wake(&mut self) {
		if self.settled {
			debug!("layout woken");
		}
		self.settled = false;
		self.calm_frames = 0;
	}
}
