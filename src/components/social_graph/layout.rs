use kurbo::{Point, Size, Vec2};
use rand::Rng;

use super::scene::SceneModel;

/// Physics and geometry constants for the layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Uniform node radius in world units.
	pub node_radius: f64,
	/// Inset applied to the canvas before the initial grid is laid out.
	pub padding: f64,
	/// Nodes closer than this push each other apart.
	pub min_distance: f64,
	/// Neighbors further apart than this are pulled back in.
	pub max_distance: f64,
	pub repulsion_strength: f64,
	pub gravity: f64,
	/// Weak pull between neighbors inside `max_distance`.
	pub attraction: f64,
	/// Pull per unit of distance beyond `max_distance`.
	pub constraint_stiffness: f64,
	pub damping: f64,
	/// Applied after the velocity clamp so the system loses energy each tick.
	pub cooling: f64,
	pub max_velocity: f64,
	/// Fraction of velocity kept (and inverted) when a node hits the canvas edge.
	pub bounce: f64,
	/// Speed under which a step counts as calm.
	pub rest_speed: f64,
	/// Consecutive calm steps before the layout is considered settled.
	pub settle_frames: u32,
	/// Pause the whole simulation while a node is dragged. When off, only the
	/// dragged node is held in place.
	pub freeze_on_drag: bool,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_radius: 22.0,
			padding: 50.0,
			min_distance: 120.0,
			max_distance: 240.0,
			repulsion_strength: 40.0,
			gravity: 0.0008,
			attraction: 0.002,
			constraint_stiffness: 0.05,
			damping: 0.85,
			cooling: 0.95,
			max_velocity: 12.0,
			bounce: 0.5,
			rest_speed: 0.02,
			settle_frames: 30,
			freeze_on_drag: true,
		}
	}
}

/// Columns and rows of the initial placement grid for `count` nodes.
///
/// A square `count * aspect` gets one extra column, and a grid never has more
/// columns than nodes.
pub fn grid_dims(count: usize, aspect: f64) -> (usize, usize) {
	if count == 0 {
		return (0, 0);
	}
	let ideal = (count as f64 * aspect).sqrt().floor() as usize + 1;
	let cols = ideal.clamp(1, count);
	(cols, count.div_ceil(cols))
}

/// Place every node that has no position yet on a jittered grid.
///
/// Returns the number of nodes placed. When nothing needed a position the
/// scene is left untouched.
pub fn initialize<R: Rng + ?Sized>(
	scene: &mut SceneModel,
	config: &LayoutConfig,
	size: Size,
	rng: &mut R,
) -> usize {
	if size.width <= 0.0 || size.height <= 0.0 {
		return 0;
	}
	let pending: Vec<usize> = scene
		.nodes()
		.iter()
		.enumerate()
		.filter(|(_, node)| !node.is_positioned())
		.map(|(idx, _)| idx)
		.collect();
	if pending.is_empty() {
		return 0;
	}

	let (cols, rows) = grid_dims(pending.len(), size.width / size.height);
	let padding = if size.width > 2.0 * config.padding && size.height > 2.0 * config.padding {
		config.padding
	} else {
		0.0
	};
	let (inner_w, inner_h) = (size.width - 2.0 * padding, size.height - 2.0 * padding);
	let (cell_w, cell_h) = (inner_w / cols as f64, inner_h / rows as f64);
	let jitter = pending.len() > 1;

	let nodes = scene.nodes_mut();
	for (slot, &idx) in pending.iter().enumerate() {
		let (col, row) = (slot % cols, slot / cols);
		let mut position = Point::new(
			padding + (col as f64 + 0.5) * cell_w,
			padding + (row as f64 + 0.5) * cell_h,
		);
		if jitter {
			position.x += rng.gen_range(-0.2..=0.2) * cell_w;
			position.y += rng.gen_range(-0.2..=0.2) * cell_h;
		}
		nodes[idx].position = position;
	}
	for node in nodes.iter_mut() {
		node.velocity = Vec2::ZERO;
	}
	pending.len()
}

/// Advance the simulation by one tick.
///
/// The node at `pinned` still pushes the others but is not moved itself.
/// Returns the largest speed left after the step.
pub fn step(scene: &mut SceneModel, config: &LayoutConfig, size: Size, pinned: Option<usize>) -> f64 {
	if scene.is_empty() || size.width <= 0.0 || size.height <= 0.0 {
		return 0.0;
	}
	let center = Point::new(size.width / 2.0, size.height / 2.0);
	let forces: Vec<Vec2> = (0..scene.len())
		.map(|idx| {
			if pinned == Some(idx) {
				Vec2::ZERO
			} else {
				node_force(scene, config, center, idx)
			}
		})
		.collect();

	let margin = Vec2::new(
		config.node_radius.min(size.width / 2.0),
		config.node_radius.min(size.height / 2.0),
	);
	let (low, high) = (margin.to_point(), Point::new(size.width - margin.x, size.height - margin.y));

	let mut max_speed: f64 = 0.0;
	for (idx, (node, force)) in scene.nodes_mut().iter_mut().zip(forces).enumerate() {
		if pinned == Some(idx) {
			continue;
		}
		let mut velocity = node.velocity * config.damping + force;
		let speed = velocity.hypot();
		if speed > config.max_velocity {
			velocity *= config.max_velocity / speed;
		}
		velocity *= config.cooling;

		let mut position = node.position + velocity;
		if position.x < low.x || position.x > high.x {
			position.x = position.x.clamp(low.x, high.x);
			velocity.x = -velocity.x * config.bounce;
		}
		if position.y < low.y || position.y > high.y {
			position.y = position.y.clamp(low.y, high.y);
			velocity.y = -velocity.y * config.bounce;
		}

		node.position = position;
		node.velocity = velocity;
		max_speed = max_speed.max(velocity.hypot());
	}
	max_speed
}

fn node_force(scene: &SceneModel, config: &LayoutConfig, center: Point, idx: usize) -> Vec2 {
	let nodes = scene.nodes();
	let here = nodes[idx].position;
	let mut force = (center - here) * config.gravity;

	for (other, node) in nodes.iter().enumerate() {
		if other == idx {
			continue;
		}
		let delta = here - node.position;
		let raw = delta.hypot();
		if raw >= config.min_distance {
			continue;
		}
		let (direction, distance) = if raw == 0.0 {
			// Exact overlap: split along x by arena order.
			let sign = if idx < other { -1.0 } else { 1.0 };
			(Vec2::new(sign, 0.0), 1.0)
		} else {
			(delta / raw, raw)
		};
		let falloff = 1.0 - distance / config.min_distance;
		force += direction * (falloff * falloff * config.repulsion_strength);
	}

	for &other in scene.neighbors(idx) {
		let delta = nodes[other].position - here;
		let distance = delta.hypot();
		if distance == 0.0 {
			continue;
		}
		if distance > config.max_distance {
			force += delta / distance * ((distance - config.max_distance) * config.constraint_stiffness);
		} else {
			force += delta * config.attraction;
		}
	}
	force
}

#[cfg(test)]
mod tests {
	use approx::assert_abs_diff_eq;
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::social_graph::scene::tests::{edge, node};
	use crate::components::social_graph::types::Scene;

	const CANVAS: Size = Size::new(800.0, 600.0);

	fn unplaced(count: usize) -> SceneModel {
		SceneModel::from_scene(&Scene {
			nodes: (0..count).map(|i| node(&i.to_string(), 0.0, 0.0)).collect(),
			edges: vec![],
		})
	}

	fn separation(scene: &SceneModel) -> f64 {
		(scene.nodes()[1].position - scene.nodes()[0].position).hypot()
	}

	fn min_pair_distance(scene: &SceneModel) -> f64 {
		let nodes = scene.nodes();
		let mut min = f64::INFINITY;
		for i in 0..nodes.len() {
			for j in i + 1..nodes.len() {
				min = min.min((nodes[i].position - nodes[j].position).hypot());
			}
		}
		min
	}

	#[test]
	fn grid_for_twelve_nodes_on_four_by_three() {
		assert_eq!(grid_dims(12, 800.0 / 600.0), (5, 3));
	}

	#[test]
	fn grid_edge_cases() {
		assert_eq!(grid_dims(0, 1.0), (0, 0));
		assert_eq!(grid_dims(1, 800.0 / 600.0), (1, 1));
		assert_eq!(grid_dims(3, 1.0), (2, 2));
		assert_eq!(grid_dims(10, 2.0), (5, 2));
	}

	#[test]
	fn single_node_starts_at_canvas_center() {
		let mut scene = unplaced(1);
		let placed = initialize(&mut scene, &LayoutConfig::default(), CANVAS, &mut SmallRng::seed_from_u64(1));
		assert_eq!(placed, 1);
		let p = scene.nodes()[0].position;
		assert_abs_diff_eq!(p.x, 400.0, epsilon = 1e-9);
		assert_abs_diff_eq!(p.y, 300.0, epsilon = 1e-9);
	}

	#[test]
	fn jittered_grid_stays_inside_cells() {
		let mut scene = unplaced(12);
		initialize(&mut scene, &LayoutConfig::default(), CANVAS, &mut SmallRng::seed_from_u64(9));
		let (cell_w, cell_h) = (700.0 / 5.0, 500.0 / 3.0);
		for (slot, node) in scene.nodes().iter().enumerate() {
			let (col, row) = ((slot % 5) as f64, (slot / 5) as f64);
			let center = Point::new(50.0 + (col + 0.5) * cell_w, 50.0 + (row + 0.5) * cell_h);
			assert!((node.position.x - center.x).abs() <= 0.2 * cell_w + 1e-9);
			assert!((node.position.y - center.y).abs() <= 0.2 * cell_h + 1e-9);
		}
	}

	#[test]
	fn initialization_is_idempotent() {
		let mut scene = unplaced(7);
		let mut rng = SmallRng::seed_from_u64(3);
		initialize(&mut scene, &LayoutConfig::default(), CANVAS, &mut rng);
		scene.nodes_mut()[2].velocity = Vec2::new(2.0, 2.0);
		let before: Vec<Point> = scene.nodes().iter().map(|n| n.position).collect();

		assert_eq!(initialize(&mut scene, &LayoutConfig::default(), CANVAS, &mut rng), 0);
		let after: Vec<Point> = scene.nodes().iter().map(|n| n.position).collect();
		assert_eq!(before, after);
		assert_eq!(scene.nodes()[2].velocity, Vec2::new(2.0, 2.0));
	}

	#[test]
	fn initialization_only_places_new_nodes() {
		let mut scene = SceneModel::from_scene(&Scene {
			nodes: vec![node("kept", 123.0, 45.0), node("new", 0.0, 0.0)],
			edges: vec![],
		});
		scene.nodes_mut()[0].velocity = Vec2::new(4.0, 0.0);
		assert_eq!(initialize(&mut scene, &LayoutConfig::default(), CANVAS, &mut SmallRng::seed_from_u64(5)), 1);
		assert_eq!(scene.nodes()[0].position, Point::new(123.0, 45.0));
		assert_eq!(scene.nodes()[0].velocity, Vec2::ZERO);
		assert!(scene.nodes()[1].is_positioned());
	}

	#[test]
	fn invalid_canvas_short_circuits() {
		let mut scene = unplaced(3);
		let mut rng = SmallRng::seed_from_u64(0);
		assert_eq!(initialize(&mut scene, &LayoutConfig::default(), Size::new(0.0, 600.0), &mut rng), 0);
		assert_eq!(step(&mut scene, &LayoutConfig::default(), Size::new(800.0, -1.0), None), 0.0);
		assert!(scene.nodes().iter().all(|n| n.position == Point::ZERO));

		let mut empty = SceneModel::default();
		assert_eq!(step(&mut empty, &LayoutConfig::default(), CANVAS, None), 0.0);
	}

	#[test]
	fn unconnected_nodes_settle_apart() {
		let config = LayoutConfig::default();
		for seed in 0..3 {
			let mut scene = unplaced(12);
			initialize(&mut scene, &LayoutConfig::default(), CANVAS, &mut SmallRng::seed_from_u64(seed));
			let mut speed = f64::INFINITY;
			for _ in 0..1500 {
				speed = step(&mut scene, &config, CANVAS, None);
			}
			assert!(speed < config.rest_speed, "still moving at {speed}");
			let closest = min_pair_distance(&scene);
			assert!(
				closest >= config.min_distance * 0.88,
				"seed {seed}: closest pair {closest}"
			);
		}
	}

	#[test]
	fn larger_graphs_settle_apart() {
		// Gravity packs bigger clusters a little tighter.
		let config = LayoutConfig::default();
		let canvas = Size::new(1600.0, 1200.0);
		for seed in 0..2 {
			let mut scene = unplaced(30);
			initialize(&mut scene, &config, canvas, &mut SmallRng::seed_from_u64(seed));
			let mut speed = f64::INFINITY;
			for _ in 0..2000 {
				speed = step(&mut scene, &config, canvas, None);
			}
			assert!(speed < config.rest_speed, "still moving at {speed}");
			let closest = min_pair_distance(&scene);
			assert!(
				closest >= config.min_distance * 0.86,
				"seed {seed}: closest pair {closest}"
			);
		}
	}

	#[test]
	fn stretched_neighbors_are_pulled_together() {
		let config = LayoutConfig::default();
		let half = (config.max_distance + 50.0) / 2.0;
		let mut scene = SceneModel::from_scene(&Scene {
			nodes: vec![node("a", 400.0 - half, 300.0), node("b", 400.0 + half, 300.0)],
			edges: vec![edge("a", "b")],
		});
		let before = separation(&scene);
		step(&mut scene, &config, CANVAS, None);
		assert!(separation(&scene) < before);
	}

	#[test]
	fn crowded_neighbors_are_pushed_apart() {
		let config = LayoutConfig::default();
		let half = config.min_distance / 4.0;
		let mut scene = SceneModel::from_scene(&Scene {
			nodes: vec![node("a", 400.0 - half, 300.0), node("b", 400.0 + half, 300.0)],
			edges: vec![edge("a", "b")],
		});
		let before = separation(&scene);
		step(&mut scene, &config, CANVAS, None);
		assert!(separation(&scene) > before);
	}

	#[test]
	fn overlapping_nodes_separate() {
		let config = LayoutConfig::default();
		let mut scene = SceneModel::from_scene(&Scene {
			nodes: vec![node("a", 300.0, 300.0), node("b", 300.0, 300.0)],
			edges: vec![],
		});
		step(&mut scene, &config, CANVAS, None);
		let (a, b) = (scene.nodes()[0].position, scene.nodes()[1].position);
		assert!(a.x.is_finite() && b.x.is_finite());
		assert!(b.x > a.x);
	}

	#[test]
	fn pinned_node_does_not_move() {
		let config = LayoutConfig::default();
		let mut scene = SceneModel::from_scene(&Scene {
			nodes: vec![node("a", 390.0, 300.0), node("b", 410.0, 300.0)],
			edges: vec![],
		});
		step(&mut scene, &config, CANVAS, Some(0));
		assert_eq!(scene.nodes()[0].position, Point::new(390.0, 300.0));
		assert_eq!(scene.nodes()[0].velocity, Vec2::ZERO);
		assert!(scene.nodes()[1].position.x > 410.0);
	}

	#[test]
	fn wall_hit_bounces_inward() {
		let config = LayoutConfig::default();
		let mut scene = SceneModel::from_scene(&Scene {
			nodes: vec![node("a", 25.0, 300.0)],
			edges: vec![],
		});
		scene.nodes_mut()[0].velocity = Vec2::new(-10.0, 0.0);
		step(&mut scene, &config, CANVAS, None);
		let n = &scene.nodes()[0];
		assert_eq!(n.position.x, config.node_radius);
		assert!(n.velocity.x > 0.0);
	}

	#[test]
	fn large_graphs_stay_bounded() {
		let config = LayoutConfig::default();
		let size = Size::new(2400.0, 1800.0);
		let mut scene = SceneModel::from_scene(&Scene {
			nodes: (0..150).map(|i| node(&i.to_string(), 0.0, 0.0)).collect(),
			edges: (1..150)
				.map(|i| edge(&i.to_string(), &((i - 1) / 3).to_string()))
				.collect(),
		});
		initialize(&mut scene, &config, size, &mut SmallRng::seed_from_u64(11));
		for _ in 0..200 {
			let speed = step(&mut scene, &config, size, None);
			assert!(speed <= config.max_velocity);
		}
		for n in scene.nodes() {
			assert!(n.position.x >= config.node_radius && n.position.x <= size.width - config.node_radius);
			assert!(n.position.y >= config.node_radius && n.position.y <= size.height - config.node_radius);
		}
	}
}
