use kurbo::Point;

/// Opaque identifier the host assigns to nodes and edges.
pub type NodeId = String;

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub id: NodeId,
	/// Short label drawn inside the node, e.g. "Ada L.".
	pub label: String,
	/// Shown below the node while it is hovered or dragged.
	pub full_name: String,
	pub fill_color: String,
	/// World-space position. `Point::ZERO` means the layout should place it.
	pub position: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	pub id: String,
	pub source: NodeId,
	pub target: NodeId,
	pub color: String,
	pub width: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub nodes: Vec<SceneNode>,
	pub edges: Vec<SceneEdge>,
}
