use super::geometry::{circular_layout, shape_contains};
use super::interaction::DragState;
use super::label::label_text;
use super::simulation::{ForceParameters, Simulation};
use super::types::{Graph, GraphNode, Point, Viewport};

/// How node positions are produced. The two never run together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutStrategy {
	#[default]
	Force,
	Circular,
}

pub struct TopicGraphState {
	pub graph: Graph,
	pub strategy: LayoutStrategy,
	pub viewport: Viewport,
	pub drag: DragState,
	values: Vec<Option<String>>,
	sim: Simulation,
}

impl TopicGraphState {
	pub fn new(
		graph: Graph,
		viewport: Viewport,
		strategy: LayoutStrategy,
		params: ForceParameters,
	) -> Self {
		let center = viewport.center();
		let sim = match strategy {
			LayoutStrategy::Force => Simulation::new(graph.len(), graph.edges(), center, params),
			LayoutStrategy::Circular => {
				let positions = circular_layout(graph.len(), viewport.width, viewport.height);
				Simulation::from_positions(&positions, graph.edges(), center, params)
			}
		};
		log::info!(
			"graph loaded: {} nodes, {} edges, {:?} layout in {}x{}",
			graph.len(),
			graph.edges().len(),
			strategy,
			viewport.width,
			viewport.height
		);
		if graph.has_cycles() {
			log::warn!("graph contains a cycle");
		}

		Self {
			values: vec![None; graph.len()],
			graph,
			strategy,
			viewport,
			drag: DragState::default(),
			sim,
		}
	}

	pub fn node(&self, idx: usize) -> &GraphNode {
		&self.graph.nodes()[idx]
	}

	pub fn position(&self, idx: usize) -> Point {
		self.sim.position(idx)
	}

	#[cfg(test)]
	pub fn positions(&self) -> Vec<Point> {
		self.sim.positions().collect()
	}

	/// Advances the layout one step; returns whether anything but pins could have moved.
	pub fn tick(&mut self) -> bool {
		match self.strategy {
			LayoutStrategy::Force => self.sim.tick(),
			LayoutStrategy::Circular => {
				self.sim.hold_pins();
				false
			}
		}
	}

	pub fn is_animating(&self) -> bool {
		self.strategy == LayoutStrategy::Force && self.sim.is_running()
	}

	/// Recomputes the circular placement, or reheats the force layout.
	pub fn relayout(&mut self) {
		match self.strategy {
			LayoutStrategy::Force => self.sim.reheat(),
			LayoutStrategy::Circular => {
				let Viewport { width, height } = self.viewport;
				let positions = circular_layout(self.graph.len(), width, height);
				self.sim.set_positions(&positions);
			}
		}
	}

	pub fn pin(&mut self, idx: usize, at: Point) {
		self.sim.set_pin(idx, Some(at));
	}

	pub fn unpin(&mut self, idx: usize) {
		self.sim.set_pin(idx, None);
	}

	pub fn pinned(&self, idx: usize) -> Option<Point> {
		self.sim.pin(idx)
	}

	/// Wakes the force layout while the user drags.
	pub fn heat(&mut self) {
		if self.strategy == LayoutStrategy::Force {
			let target = self.sim.params().drag_alpha_target;
			self.sim.set_alpha_target(target);
			self.sim.restart();
		}
	}

	/// Lets the force layout cool back down.
	pub fn cool(&mut self) {
		if self.strategy == LayoutStrategy::Force {
			self.sim.set_alpha_target(0.0);
		}
	}

	#[cfg(test)]
	pub fn alpha_target(&self) -> f64 {
		self.sim.alpha_target()
	}

	/// Topmost node whose shape contains `p`.
	pub fn node_at(&self, p: Point) -> Option<usize> {
		self.graph
			.nodes()
			.iter()
			.enumerate()
			.rev()
			.find(|(i, node)| shape_contains(node.kind, self.sim.position(*i), p))
			.map(|(i, _)| i)
	}

	pub fn value(&self, idx: usize) -> Option<&str> {
		self.values[idx].as_deref()
	}

	/// Stores a value, returning whether it differs from the previous one.
	pub fn set_value(&mut self, idx: usize, value: String) -> bool {
		let slot = &mut self.values[idx];
		if slot.as_deref() == Some(value.as_str()) {
			return false;
		}
		*slot = Some(value);
		true
	}

	pub fn label(&self, idx: usize) -> String {
		let node = self.node(idx);
		label_text(&node.name, node.kind, self.value(idx))
	}
}
