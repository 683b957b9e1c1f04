use std::collections::{HashMap, HashSet};

use kurbo::{Point, Vec2};
use log::debug;

use super::types::{NodeId, Scene};

#[derive(Clone, Debug)]
pub struct NodeState {
	pub id: NodeId,
	pub label: String,
	pub full_name: String,
	pub fill_color: String,
	pub position: Point,
	pub velocity: Vec2,
}

impl NodeState {
	pub fn is_positioned(&self) -> bool {
		self.position != Point::ZERO
	}
}

/// An edge whose endpoints have been resolved to arena indices.
#[derive(Clone, Debug)]
pub struct EdgeState {
	pub source: usize,
	pub target: usize,
	pub color: String,
	pub width: f64,
}

/// Arena of node kinematics plus the resolved edge list.
///
/// Nodes keep the host's snapshot order, which is also the draw order, so
/// the last node is the top-most one for hit-testing.
#[derive(Clone, Debug, Default)]
pub struct SceneModel {
	nodes: Vec<NodeState>,
	edges: Vec<EdgeState>,
	index: HashMap<NodeId, usize>,
	neighbors: Vec<Vec<usize>>,
}

impl SceneModel {
	pub fn from_scene(scene: &Scene) -> Self {
		let mut model = Self::default();
		model.sync(scene);
		model
	}

	/// Replace the contents with a new host snapshot.
	///
	/// Nodes the model already knows keep their position and velocity. Returns
	/// `true` when the set of node ids changed.
	pub fn sync(&mut self, scene: &Scene) -> bool {
		let mut previous: HashMap<NodeId, NodeState> = self
			.nodes
			.drain(..)
			.map(|node| (node.id.clone(), node))
			.collect();
		let previous_count = previous.len();
		let mut retained = 0;

		self.index.clear();
		for node in &scene.nodes {
			if self.index.contains_key(&node.id) {
				debug!("duplicate node id {:?} in scene, skipping", node.id);
				continue;
			}
			let (position, velocity) = match previous.remove(&node.id) {
				Some(known) => {
					retained += 1;
					(known.position, known.velocity)
				}
				None => (node.position, Vec2::ZERO),
			};
			self.index.insert(node.id.clone(), self.nodes.len());
			self.nodes.push(NodeState {
				id: node.id.clone(),
				label: node.label.clone(),
				full_name: node.full_name.clone(),
				fill_color: node.fill_color.clone(),
				position,
				velocity,
			});
		}

		self.edges.clear();
		self.neighbors = vec![Vec::new(); self.nodes.len()];
		let mut skipped = 0;
		let mut seen_edges = HashSet::new();
		for edge in &scene.edges {
			if !seen_edges.insert(edge.id.as_str()) {
				debug!("duplicate edge id {:?} in scene, skipping", edge.id);
				continue;
			}
			let (Some(&source), Some(&target)) =
				(self.index.get(&edge.source), self.index.get(&edge.target))
			else {
				skipped += 1;
				continue;
			};
			if source == target {
				skipped += 1;
				continue;
			}
			self.neighbors[source].push(target);
			self.neighbors[target].push(source);
			self.edges.push(EdgeState {
				source,
				target,
				color: edge.color.clone(),
				width: edge.width,
			});
		}
		for list in &mut self.neighbors {
			list.sort_unstable();
			list.dedup();
		}

		if skipped > 0 {
			debug!("skipped {skipped} edge(s) with missing or identical endpoints");
		}
		let changed = retained != previous_count || retained != self.nodes.len();
		debug!(
			"scene synced: {} nodes ({} retained), {} edges",
			self.nodes.len(),
			retained,
			self.edges.len()
		);
		changed
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn nodes(&self) -> &[NodeState] {
		&self.nodes
	}

	pub fn nodes_mut(&mut self) -> &mut [NodeState] {
		&mut self.nodes
	}

	pub fn edges(&self) -> &[EdgeState] {
		&self.edges
	}

	/// Deduplicated direct neighbors of the node at `idx`.
	pub fn neighbors(&self, idx: usize) -> &[usize] {
		&self.neighbors[idx]
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&NodeState> {
		self.index_of(id).map(|idx| &self.nodes[idx])
	}

	pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeState> {
		self.index_of(id).map(|idx| &mut self.nodes[idx])
	}
}
