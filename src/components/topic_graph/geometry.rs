use std::f64::consts::PI;

use super::types::{NodeKind, Point};

/// Gap kept between the circular layout and the viewport edge.
pub const CIRCLE_MARGIN: f64 = 20.0;
pub const AGENT_RADIUS: f64 = 15.0;
pub const ARROW_LENGTH: f64 = 10.0;
const ARROW_SPREAD: f64 = PI / 6.0;

/// Rendered size of a node shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
	pub width: f64,
	pub height: f64,
}

impl Footprint {
	pub const TOPIC: Footprint = Footprint {
		width: 80.0,
		height: 30.0,
	};
	pub const AGENT: Footprint = Footprint {
		width: 2.0 * AGENT_RADIUS,
		height: 2.0 * AGENT_RADIUS,
	};

	pub fn for_kind(kind: NodeKind) -> Self {
		match kind {
			NodeKind::Topic => Self::TOPIC,
			NodeKind::Agent => Self::AGENT,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
}

/// `n` points evenly spaced on a circle centered in the viewport, starting at angle 0.
pub fn circular_layout(n: usize, width: f64, height: f64) -> Vec<Point> {
	if n == 0 {
		return Vec::new();
	}
	let (cx, cy) = (width / 2.0, height / 2.0);
	let radius = (width.min(height) / 2.0 - CIRCLE_MARGIN).max(0.0);
	let step = 2.0 * PI / n as f64;
	(0..n)
		.map(|i| {
			let angle = i as f64 * step;
			Point::new(cx + radius * angle.cos(), cy + radius * angle.sin())
		})
		.collect()
}

/// Distance from a node center to where an incoming edge stops.
pub fn anchor_radius(kind: NodeKind) -> f64 {
	match kind {
		NodeKind::Topic => Footprint::TOPIC.height / 2.0,
		NodeKind::Agent => AGENT_RADIUS,
	}
}

/// Terminal point of an edge running from `from` into a `kind` node centered at `to`.
pub fn edge_anchor(from: Point, to: Point, kind: NodeKind) -> Point {
	let (dx, dy) = (to.x - from.x, to.y - from.y);
	let dist = dx.hypot(dy);
	if dist < 1e-9 {
		return to;
	}
	let r = anchor_radius(kind).min(dist);
	Point::new(to.x - dx / dist * r, to.y - dy / dist * r)
}

pub fn edge_anchor_offset(from: Point, to: Point, kind: NodeKind, axis: Axis) -> f64 {
	let anchor = edge_anchor(from, to, kind);
	match axis {
		Axis::X => anchor.x,
		Axis::Y => anchor.y,
	}
}

/// Arrowhead triangle `[tip, left, right]` for an edge arriving at `tip` from `from`.
pub fn arrowhead(tip: Point, from: Point) -> [Point; 3] {
	let back = (from.y - tip.y).atan2(from.x - tip.x);
	let side = |a: f64| {
		Point::new(
			tip.x + ARROW_LENGTH * a.cos(),
			tip.y + ARROW_LENGTH * a.sin(),
		)
	};
	[tip, side(back - ARROW_SPREAD), side(back + ARROW_SPREAD)]
}

/// Whether `p` falls inside the shape of a `kind` node centered at `center`.
pub fn shape_contains(kind: NodeKind, center: Point, p: Point) -> bool {
	match kind {
		NodeKind::Topic => {
			let fp = Footprint::TOPIC;
			(p.x - center.x).abs() <= fp.width / 2.0 && (p.y - center.y).abs() <= fp.height / 2.0
		}
		NodeKind::Agent => center.distance(p) <= AGENT_RADIUS,
	}
}

#[cfg(test)]
mod tests {
	use float_cmp::assert_approx_eq;
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn circular_layout_matches_two_node_scenario() {
		let points = circular_layout(2, 400.0, 400.0);
		assert_eq!(points.len(), 2);
		assert_approx_eq!(f64, points[0].x, 380.0, epsilon = 1e-9);
		assert_approx_eq!(f64, points[0].y, 200.0, epsilon = 1e-9);
		assert_approx_eq!(f64, points[1].x, 20.0, epsilon = 1e-9);
		assert_approx_eq!(f64, points[1].y, 200.0, epsilon = 1e-9);
	}

	#[test]
	fn circular_layout_is_deterministic() {
		assert_eq!(
			circular_layout(7, 640.0, 480.0),
			circular_layout(7, 640.0, 480.0)
		);
		assert!(circular_layout(0, 640.0, 480.0).is_empty());
	}

	proptest! {
		#[test]
		fn circular_layout_points_lie_on_circle(
			n in 1usize..64,
			w in 60.0f64..2000.0,
			h in 60.0f64..2000.0,
		) {
			let points = circular_layout(n, w, h);
			prop_assert_eq!(points.len(), n);

			let center = Point::new(w / 2.0, h / 2.0);
			let radius = w.min(h) / 2.0 - CIRCLE_MARGIN;
			let step = 2.0 * PI / n as f64;
			for (i, p) in points.iter().enumerate() {
				prop_assert!((center.distance(*p) - radius).abs() < 1e-6);
				let angle = (p.y - center.y).atan2(p.x - center.x).rem_euclid(2.0 * PI);
				let expected = (i as f64 * step).rem_euclid(2.0 * PI);
				let diff = (angle - expected).abs();
				prop_assert!(diff < 1e-6 || (2.0 * PI - diff) < 1e-6);
			}
		}
	}

	#[test]
	fn edge_stops_at_topic_boundary() {
		let from = Point::new(380.0, 200.0);
		let to = Point::new(20.0, 200.0);
		let anchor = edge_anchor(from, to, NodeKind::Topic);
		assert_approx_eq!(f64, anchor.x, 35.0, epsilon = 1e-9);
		assert_approx_eq!(f64, anchor.y, 200.0, epsilon = 1e-9);
		assert_approx_eq!(
			f64,
			edge_anchor_offset(from, to, NodeKind::Topic, Axis::X),
			35.0,
			epsilon = 1e-9
		);
	}

	#[test]
	fn edge_stops_at_agent_radius_along_diagonal() {
		let anchor = edge_anchor(Point::new(0.0, 0.0), Point::new(30.0, 40.0), NodeKind::Agent);
		assert_approx_eq!(f64, anchor.x, 21.0, epsilon = 1e-9);
		assert_approx_eq!(f64, anchor.y, 28.0, epsilon = 1e-9);
		assert_approx_eq!(
			f64,
			edge_anchor_offset(
				Point::new(0.0, 0.0),
				Point::new(30.0, 40.0),
				NodeKind::Agent,
				Axis::Y
			),
			28.0,
			epsilon = 1e-9
		);
	}

	#[test]
	fn coincident_nodes_anchor_at_center() {
		let p = Point::new(5.0, 5.0);
		assert_eq!(edge_anchor(p, p, NodeKind::Agent), p);
	}

	#[test]
	fn arrowhead_sides_are_thirty_degrees_off_reverse_direction() {
		let [tip, left, right] = arrowhead(Point::new(100.0, 0.0), Point::new(0.0, 0.0));
		assert_eq!(tip, Point::new(100.0, 0.0));
		let dx = ARROW_LENGTH * ARROW_SPREAD.cos();
		let dy = ARROW_LENGTH * ARROW_SPREAD.sin();
		for side in [left, right] {
			assert_approx_eq!(f64, side.x, 100.0 - dx, epsilon = 1e-9);
			assert_approx_eq!(f64, side.y.abs(), dy, epsilon = 1e-9);
			assert_approx_eq!(f64, tip.distance(side), ARROW_LENGTH, epsilon = 1e-9);
		}
		assert!(left.y * right.y < 0.0);
	}

	#[test]
	fn hit_shapes_follow_kind() {
		let c = Point::new(0.0, 0.0);
		assert!(shape_contains(NodeKind::Topic, c, Point::new(39.0, 14.0)));
		assert!(!shape_contains(NodeKind::Topic, c, Point::new(0.0, 16.0)));
		assert!(shape_contains(NodeKind::Agent, c, Point::new(10.0, 10.0)));
		assert!(!shape_contains(NodeKind::Agent, c, Point::new(12.0, 12.0)));
	}
}
