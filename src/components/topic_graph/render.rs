use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::geometry::{AGENT_RADIUS, Footprint, arrowhead, edge_anchor};
use super::label::label_anchor;
use super::state::TopicGraphState;
use super::types::NodeKind;

const BACKGROUND: &str = "#ffffff";
const EDGE_COLOR: &str = "#666666";
const TOPIC_FILL: &str = "#9ecae1";
const AGENT_FILL: &str = "#fdae6b";
const OUTLINE: &str = "#333333";
const LABEL_COLOR: &str = "#222222";

/// Redraws the whole frame: edges first, then nodes and labels on top.
pub fn render(state: &TopicGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.viewport.width, state.viewport.height);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
}

fn draw_edges(state: &TopicGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_fill_style_str(EDGE_COLOR);
	ctx.set_line_width(1.5);

	for edge in state.graph.edges() {
		let from = state.position(edge.source);
		let to = state.position(edge.target);
		if from.distance(to) < 0.001 {
			continue;
		}
		let tip = edge_anchor(from, to, state.node(edge.target).kind);

		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.line_to(tip.x, tip.y);
		ctx.stroke();

		let [tip, left, right] = arrowhead(tip, from);
		ctx.begin_path();
		ctx.move_to(tip.x, tip.y);
		ctx.line_to(left.x, left.y);
		ctx.line_to(right.x, right.y);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(state: &TopicGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(OUTLINE);
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("center");

	for (idx, node) in state.graph.nodes().iter().enumerate() {
		let p = state.position(idx);
		ctx.begin_path();
		match node.kind {
			NodeKind::Topic => {
				let fp = Footprint::TOPIC;
				ctx.rect(p.x - fp.width / 2.0, p.y - fp.height / 2.0, fp.width, fp.height);
				ctx.set_fill_style_str(TOPIC_FILL);
			}
			NodeKind::Agent => {
				let _ = ctx.arc(p.x, p.y, AGENT_RADIUS, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(AGENT_FILL);
			}
		}
		ctx.fill();
		ctx.set_line_width(if state.pinned(idx).is_some() { 2.5 } else { 1.0 });
		ctx.stroke();

		let at = label_anchor(node.kind, p);
		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(&state.label(idx), at.x, at.y);
	}
}
