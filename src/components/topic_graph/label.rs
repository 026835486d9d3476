use super::geometry::Footprint;
use super::types::{NodeKind, Point};

const LABEL_GAP: f64 = 6.0;
/// Baseline drop for text placed under a shape.
const LABEL_ASCENT: f64 = 10.0;

/// Text shown next to a node. Only topics display their latest value.
pub fn label_text(name: &str, kind: NodeKind, value: Option<&str>) -> String {
	match (kind, value) {
		(NodeKind::Topic, Some(v)) => format!("{name}: {v}"),
		(NodeKind::Topic, None) | (NodeKind::Agent, _) => name.to_owned(),
	}
}

/// Baseline point for horizontally centered label text: below topics, above agents.
pub fn label_anchor(kind: NodeKind, center: Point) -> Point {
	let half = Footprint::for_kind(kind).height / 2.0;
	match kind {
		NodeKind::Topic => Point::new(center.x, center.y + half + LABEL_GAP + LABEL_ASCENT),
		NodeKind::Agent => Point::new(center.x, center.y - half - LABEL_GAP),
	}
}
