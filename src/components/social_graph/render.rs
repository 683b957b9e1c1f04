use std::f64::consts::PI;

use kurbo::Point;
use web_sys::CanvasRenderingContext2d;

use super::interaction::TOGGLE_RECT;
use super::scene::EdgeState;
use super::state::EngineState;
use super::viewport::Viewport;

const BACKGROUND: &str = "#1a1a2e";
const HIGHLIGHT: &str = "#ffd166";
const NODE_BORDER: &str = "rgba(255, 255, 255, 0.85)";
const LABEL_COLOR: &str = "#ffffff";
const DETAIL_BACKGROUND: &str = "rgba(12, 12, 24, 0.92)";
const DETAIL_COLOR: &str = "#f5f5f5";
const TOGGLE_ON: &str = "rgba(44, 160, 44, 0.85)";
const TOGGLE_OFF: &str = "rgba(255, 255, 255, 0.15)";

const LABEL_FONT: &str = "bold 11px sans-serif";
const DETAIL_FONT: &str = "12px sans-serif";
const TOGGLE_FONT: &str = "13px sans-serif";
const DETAIL_PADDING: f64 = 4.0;
const DETAIL_HEIGHT: f64 = 18.0;
const DETAIL_GAP: f64 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle<'a> {
	pub color: &'a str,
	pub width: f64,
}

/// Edges touching the hovered node are redrawn brighter and one unit wider.
pub fn edge_style(edge: &EdgeState, hovered: Option<usize>) -> EdgeStyle<'_> {
	let touches_hover = hovered.is_some_and(|idx| edge.source == idx || edge.target == idx);
	if touches_hover {
		EdgeStyle {
			color: HIGHLIGHT,
			width: edge.width + 1.0,
		}
	} else {
		EdgeStyle {
			color: &edge.color,
			width: edge.width,
		}
	}
}

/// Nodes that get a full-name label: the hovered one and the dragged one.
pub fn detail_targets(hovered: Option<usize>, dragged: Option<usize>) -> impl Iterator<Item = usize> {
	let dragged = dragged.filter(|&idx| Some(idx) != hovered);
	hovered.into_iter().chain(dragged)
}

/// Screen point at the top center of a node's full-name label. The label is
/// drawn unscaled so it stays readable at any zoom.
pub fn detail_anchor(viewport: &Viewport, position: Point, radius: f64) -> Point {
	let center = viewport.world_to_screen(position);
	Point::new(center.x, center.y + radius * viewport.scale() + DETAIL_GAP)
}

pub fn toggle_caption(enabled: bool) -> &'static str {
	if enabled { "Physics: on" } else { "Physics: off" }
}

pub fn render(state: &EngineState, ctx: &CanvasRenderingContext2d) {
	if !state.has_valid_size() {
		return;
	}
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.size.width, state.size.height);

	let (hovered, dragged) = (state.hovered_index(), state.dragged_index());
	let [a, b, c, d, e, f] = state.viewport.affine().as_coeffs();
	ctx.save();
	let _ = ctx.transform(a, b, c, d, e, f);
	draw_edges(state, ctx, hovered);
	draw_nodes(state, ctx, hovered, dragged);
	ctx.restore();

	for idx in detail_targets(hovered, dragged) {
		let node = &state.scene.nodes()[idx];
		let anchor = detail_anchor(&state.viewport, node.position, state.config.node_radius);
		draw_detail_label(&node.full_name, anchor, ctx);
	}

	draw_toggle(state.physics_enabled, ctx);
}

fn draw_edges(state: &EngineState, ctx: &CanvasRenderingContext2d, hovered: Option<usize>) {
	let nodes = state.scene.nodes();
	for edge in state.scene.edges() {
		let (Some(a), Some(b)) = (nodes.get(edge.source), nodes.get(edge.target)) else {
			continue;
		};
		let style = edge_style(edge, hovered);
		ctx.set_stroke_style_str(style.color);
		ctx.set_line_width(style.width);
		ctx.begin_path();
		ctx.move_to(a.position.x, a.position.y);
		ctx.line_to(b.position.x, b.position.y);
		ctx.stroke();
	}
}

fn draw_nodes(
	state: &EngineState,
	ctx: &CanvasRenderingContext2d,
	hovered: Option<usize>,
	dragged: Option<usize>,
) {
	let radius = state.config.node_radius;
	ctx.set_font(LABEL_FONT);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for (idx, node) in state.scene.nodes().iter().enumerate() {
		let (x, y) = (node.position.x, node.position.y);
		let active = hovered == Some(idx) || dragged == Some(idx);

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.fill_color);
		ctx.fill();
		ctx.set_stroke_style_str(if active { HIGHLIGHT } else { NODE_BORDER });
		ctx.set_line_width(if active { 3.0 } else { 2.0 });
		ctx.stroke();

		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(&node.label, x, y);
	}
}

// Screen space, like the toggle.
fn draw_detail_label(text: &str, anchor: Point, ctx: &CanvasRenderingContext2d) {
	ctx.set_font(DETAIL_FONT);
	let text_width = ctx
		.measure_text(text)
		.map(|m| m.width())
		.unwrap_or(text.len() as f64 * 7.0);
	let width = text_width + 2.0 * DETAIL_PADDING;

	ctx.set_fill_style_str(DETAIL_BACKGROUND);
	ctx.fill_rect(anchor.x - width / 2.0, anchor.y, width, DETAIL_HEIGHT);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(DETAIL_COLOR);
	let _ = ctx.fill_text(text, anchor.x, anchor.y + DETAIL_HEIGHT / 2.0);
}

// Drawn in screen space after the world transform is restored.
fn draw_toggle(enabled: bool, ctx: &CanvasRenderingContext2d) {
	let r = TOGGLE_RECT;
	ctx.set_fill_style_str(if enabled { TOGGLE_ON } else { TOGGLE_OFF });
	ctx.fill_rect(r.x0, r.y0, r.width(), r.height());
	ctx.set_stroke_style_str(NODE_BORDER);
	ctx.set_line_width(1.0);
	ctx.stroke_rect(r.x0, r.y0, r.width(), r.height());

	ctx.set_font(TOGGLE_FONT);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(LABEL_COLOR);
	let center = r.center();
	let _ = ctx.fill_text(toggle_caption(enabled), center.x, center.y);
}
