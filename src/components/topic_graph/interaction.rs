use super::message::ValueUpdate;
use super::state::TopicGraphState;
use super::types::Point;

/// Pointer drag in progress. A node is pinned exactly while `node` is set.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node: Option<usize>,
	grab_dx: f64,
	grab_dy: f64,
}

impl DragState {
	pub fn active(&self) -> bool {
		self.node.is_some()
	}
}

/// Grabs the node under `p`, if any, and pins it where it stands.
///
/// A drag already in progress is ended first, so at most one node is pinned.
pub fn drag_start(state: &mut TopicGraphState, p: Point) -> Option<usize> {
	drag_end(state);
	let idx = state.node_at(p)?;
	let at = state.position(idx);
	state.drag = DragState {
		node: Some(idx),
		grab_dx: at.x - p.x,
		grab_dy: at.y - p.y,
	};
	state.pin(idx, at);
	state.heat();
	log::debug!("drag start on node `{}`", state.node(idx).id);
	Some(idx)
}

pub fn drag_move(state: &mut TopicGraphState, p: Point) {
	let Some(idx) = state.drag.node else {
		return;
	};
	let at = Point::new(p.x + state.drag.grab_dx, p.y + state.drag.grab_dy);
	state.pin(idx, at);
}

pub fn drag_end(state: &mut TopicGraphState) {
	let Some(idx) = state.drag.node.take() else {
		return;
	};
	state.unpin(idx);
	state.cool();
	log::debug!("drag end on node `{}`", state.node(idx).id);
}

/// Applies inbound values; returns indices of nodes whose value changed.
pub fn apply_values(state: &mut TopicGraphState, update: &ValueUpdate) -> Vec<usize> {
	let mut changed = Vec::new();
	for (id, value) in update {
		let Some(idx) = state.graph.index_of(id) else {
			log::debug!("value for unknown node `{id}` ignored");
			continue;
		};
		if state.set_value(idx, value.clone()) {
			changed.push(idx);
		}
	}
	changed
}
