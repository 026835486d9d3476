//! Vector snapshot of the current frame.

use svg::Document;
use svg::node::element::{Circle, Definitions, Group, Line, Marker, Path, Rectangle, Text};

use super::geometry::{AGENT_RADIUS, ARROW_LENGTH, Axis, Footprint, edge_anchor_offset};
use super::label::label_anchor;
use super::state::TopicGraphState;
use super::types::NodeKind;

const ARROW_MARKER_ID: &str = "arrow-end";

fn arrow_marker() -> Definitions {
	// Half width of a head whose sides sit 30 degrees off the shaft.
	let half = ARROW_LENGTH * (30f64).to_radians().tan();
	let marker = Marker::new()
		.set("id", ARROW_MARKER_ID)
		.set("viewBox", format!("0 {} {} {}", -half, ARROW_LENGTH, 2.0 * half))
		.set("refX", ARROW_LENGTH)
		.set("refY", 0)
		.set("markerWidth", ARROW_LENGTH)
		.set("markerHeight", 2.0 * half)
		.set("markerUnits", "userSpaceOnUse")
		.set("orient", "auto")
		.add(
			Path::new()
				.set("d", format!("M0,{}L{},0L0,{}Z", -half, ARROW_LENGTH, half))
				.set("fill", "#666666"),
		);
	Definitions::new().add(marker)
}

/// Renders edges, nodes and labels into a standalone SVG document.
pub fn render_document(state: &TopicGraphState) -> Document {
	let (w, h) = (state.viewport.width, state.viewport.height);
	let mut links = Group::new().set("class", "links");
	for edge in state.graph.edges() {
		let from = state.position(edge.source);
		let to = state.position(edge.target);
		let kind = state.node(edge.target).kind;
		links = links.add(
			Line::new()
				.set("class", "link")
				.set("x1", from.x)
				.set("y1", from.y)
				.set("x2", edge_anchor_offset(from, to, kind, Axis::X))
				.set("y2", edge_anchor_offset(from, to, kind, Axis::Y))
				.set("stroke", "#666666")
				.set("stroke-width", 1.5)
				.set("marker-end", format!("url(#{ARROW_MARKER_ID})")),
		);
	}

	let mut nodes = Group::new().set("class", "nodes");
	for (idx, node) in state.graph.nodes().iter().enumerate() {
		let p = state.position(idx);
		let mut group = Group::new()
			.set("class", format!("node {}", node.kind.to_string().to_lowercase()))
			.set("data-id", node.id.as_str());
		group = match node.kind {
			NodeKind::Topic => {
				let fp = Footprint::TOPIC;
				group.add(
					Rectangle::new()
						.set("x", p.x - fp.width / 2.0)
						.set("y", p.y - fp.height / 2.0)
						.set("width", fp.width)
						.set("height", fp.height)
						.set("fill", "#9ecae1")
						.set("stroke", "#333333"),
				)
			}
			NodeKind::Agent => group.add(
				Circle::new()
					.set("cx", p.x)
					.set("cy", p.y)
					.set("r", AGENT_RADIUS)
					.set("fill", "#fdae6b")
					.set("stroke", "#333333"),
			),
		};
		let at = label_anchor(node.kind, p);
		group = group.add(
			Text::new(state.label(idx))
				.set("x", at.x)
				.set("y", at.y)
				.set("text-anchor", "middle")
				.set("font-family", "sans-serif")
				.set("font-size", 12),
		);
		nodes = nodes.add(group);
	}

	Document::new()
		.set("viewBox", format!("0 0 {w} {h}"))
		.set("width", w)
		.set("height", h)
		.add(arrow_marker())
		.add(links)
		.add(nodes)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topic_graph::simulation::ForceParameters;
	use crate::components::topic_graph::state::LayoutStrategy;
	use crate::components::topic_graph::types::{Graph, Viewport};

	fn scenario() -> TopicGraphState {
		let graph = Graph::from_json(
			r#"[{"id":0,"name":"A","type":"Agent","edges":[1]},
			    {"id":1,"name":"T","type":"Topic","edges":[]}]"#,
		)
		.unwrap();
		TopicGraphState::new(
			graph,
			Viewport::new(400.0, 400.0),
			LayoutStrategy::Circular,
			ForceParameters::default(),
		)
	}

	#[test]
	fn edge_terminates_at_topic_anchor_not_center() {
		let doc = render_document(&scenario()).to_string();
		assert!(doc.contains(r#"x1="380""#), "{doc}");
		assert!(doc.contains(r#"x2="35""#), "{doc}");
		assert!(!doc.contains(r#"x2="20""#), "{doc}");
		assert!(doc.contains("marker-end=\"url(#arrow-end)\""));
	}

	#[test]
	fn one_shape_group_per_node() {
		let doc = render_document(&scenario()).to_string();
		assert_eq!(doc.matches("<circle").count(), 1);
		assert_eq!(doc.matches("<rect").count(), 1);
		assert_eq!(doc.matches("<line").count(), 1);
		assert_eq!(doc.matches("<marker").count(), 1);
	}

	#[test]
	fn labels_reflect_values() {
		let mut state = scenario();
		state.set_value(1, "42".into());
		let doc = render_document(&state).to_string();
		assert!(doc.contains("T: 42"), "{doc}");
	}
}
