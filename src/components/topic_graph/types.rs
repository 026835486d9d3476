use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

use super::error::GraphError;

/// Node kind as published by the host page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Topic,
	Agent,
}

impl NodeKind {
	fn parse(id: &str, raw: &str) -> Result<Self, GraphError> {
		match raw {
			"Topic" => Ok(NodeKind::Topic),
			"Agent" => Ok(NodeKind::Agent),
			other => Err(GraphError::UnknownNodeType {
				id: id.to_owned(),
				kind: other.to_owned(),
			}),
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeKind::Topic => f.write_str("Topic"),
			NodeKind::Agent => f.write_str("Agent"),
		}
	}
}

/// One entry of the embedded graph description.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeDescriptor {
	#[serde(deserialize_with = "id_from_any")]
	pub id: String,
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default, deserialize_with = "ids_from_any")]
	pub edges: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Text(String),
	Int(i64),
}

impl From<RawId> for String {
	fn from(raw: RawId) -> Self {
		match raw {
			RawId::Text(s) => s,
			RawId::Int(n) => n.to_string(),
		}
	}
}

fn id_from_any<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
	RawId::deserialize(de).map(String::from)
}

fn ids_from_any<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<String>, D::Error> {
	Vec::<RawId>::deserialize(de).map(|ids| ids.into_iter().map(String::from).collect())
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}
}

/// Drawing area measured once at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width: width.max(1.0),
			height: height.max(1.0),
		}
	}

	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub kind: NodeKind,
}

/// Directed edge between node indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphEdge {
	pub source: usize,
	pub target: usize,
}

/// Validated graph. Structure is fixed after construction.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	index: HashMap<String, usize>,
}

impl Graph {
	/// Parses the JSON array embedded by the host page.
	///
	/// Trailing commas before `]` or `}` are tolerated; the host writer emits one
	/// after the last node.
	pub fn from_json(json: &str) -> Result<Self, GraphError> {
		let descriptors: Vec<NodeDescriptor> = serde_json::from_str(&strip_trailing_commas(json))?;
		Self::from_descriptors(&descriptors)
	}

	/// Builds a graph, rejecting unknown kinds, duplicate ids and dangling edges.
	pub fn from_descriptors(descriptors: &[NodeDescriptor]) -> Result<Self, GraphError> {
		let mut nodes = Vec::with_capacity(descriptors.len());
		let mut index = HashMap::with_capacity(descriptors.len());

		for (i, d) in descriptors.iter().enumerate() {
			let kind = NodeKind::parse(&d.id, &d.kind)?;
			if index.insert(d.id.clone(), i).is_some() {
				return Err(GraphError::DuplicateNodeId(d.id.clone()));
			}
			nodes.push(GraphNode {
				id: d.id.clone(),
				name: d.name.clone(),
				kind,
			});
		}

		let mut edges = Vec::new();
		for (source, d) in descriptors.iter().enumerate() {
			for target_id in &d.edges {
				let Some(&target) = index.get(target_id) else {
					return Err(GraphError::DanglingEdge {
						from: d.id.clone(),
						to: target_id.clone(),
					});
				};
				edges.push(GraphEdge { source, target });
			}
		}

		Ok(Self {
			nodes,
			edges,
			index,
		})
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// True when some directed path leads back to its start.
	pub fn has_cycles(&self) -> bool {
		let mut adjacency = vec![Vec::new(); self.nodes.len()];
		for edge in &self.edges {
			adjacency[edge.source].push(edge.target);
		}

		let mut mark = vec![Mark::Unseen; self.nodes.len()];
		// (node, next child to visit)
		let mut stack: Vec<(usize, usize)> = Vec::new();
		for start in 0..self.nodes.len() {
			if mark[start] != Mark::Unseen {
				continue;
			}
			mark[start] = Mark::OnPath;
			stack.push((start, 0));
			while let Some(top) = stack.last_mut() {
				let (node, child) = *top;
				let Some(&next) = adjacency[node].get(child) else {
					mark[node] = Mark::Done;
					stack.pop();
					continue;
				};
				top.1 += 1;
				match mark[next] {
					Mark::OnPath => return true,
					Mark::Done => {}
					Mark::Unseen => {
						mark[next] = Mark::OnPath;
						stack.push((next, 0));
					}
				}
			}
		}
		false
	}
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
	Unseen,
	OnPath,
	Done,
}

/// Drops commas that directly precede a closing `]` or `}` outside string literals.
fn strip_trailing_commas(json: &str) -> Cow<'_, str> {
	if !json.contains(',') {
		return Cow::Borrowed(json);
	}
	let mut out = String::with_capacity(json.len());
	let mut in_string = false;
	let mut escaped = false;
	let mut chars = json.char_indices().peekable();
	while let Some((i, c)) = chars.next() {
		if in_string {
			match c {
				_ if escaped => escaped = false,
				'\\' => escaped = true,
				'"' => in_string = false,
				_ => {}
			}
			out.push(c);
			continue;
		}
		match c {
			'"' => in_string = true,
			',' => {
				let rest = json[i + 1..].trim_start();
				if rest.starts_with(']') || rest.starts_with('}') {
					continue;
				}
			}
			_ => {}
		}
		out.push(c);
	}
	Cow::Owned(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn descriptor(id: &str, name: &str, kind: &str, edges: &[&str]) -> NodeDescriptor {
		NodeDescriptor {
			id: id.into(),
			name: name.into(),
			kind: kind.into(),
			edges: edges.iter().map(|e| e.to_string()).collect(),
		}
	}

	#[test]
	fn parses_embedded_json_with_numeric_ids() {
		let graph = Graph::from_json(
			r#"[{"id":0,"name":"A","type":"Agent","edges":[1]},
			    {"id":"1","name":"T","type":"Topic","edges":[]}]"#,
		)
		.unwrap();

		assert_eq!(graph.len(), 2);
		assert_eq!(graph.nodes()[0].kind, NodeKind::Agent);
		assert_eq!(graph.nodes()[1].kind, NodeKind::Topic);
		assert_eq!(graph.edges(), &[GraphEdge { source: 0, target: 1 }]);
		assert_eq!(graph.index_of("1"), Some(1));
	}

	#[test]
	fn keeps_parallel_edges() {
		let graph = Graph::from_descriptors(&[
			descriptor("a", "A", "Agent", &["t", "t"]),
			descriptor("t", "T", "Topic", &[]),
		])
		.unwrap();
		assert_eq!(graph.edges().len(), 2);
	}

	#[test]
	fn rejects_dangling_edge() {
		let err = Graph::from_descriptors(&[descriptor("a", "A", "Agent", &["missing"])])
			.unwrap_err();
		assert!(matches!(
			err,
			GraphError::DanglingEdge { ref from, ref to } if from == "a" && to == "missing"
		));
	}

	#[test]
	fn rejects_unknown_kind() {
		let err = Graph::from_descriptors(&[descriptor("x", "X", "Widget", &[])]).unwrap_err();
		assert!(matches!(err, GraphError::UnknownNodeType { ref kind, .. } if kind == "Widget"));
	}

	#[test]
	fn rejects_duplicate_ids() {
		let err = Graph::from_descriptors(&[
			descriptor("a", "A", "Agent", &[]),
			descriptor("a", "B", "Topic", &[]),
		])
		.unwrap_err();
		assert!(matches!(err, GraphError::DuplicateNodeId(ref id) if id == "a"));
	}

	#[test]
	fn rejects_malformed_json() {
		assert!(matches!(
			Graph::from_json("{not json"),
			Err(GraphError::Parse(_))
		));
	}

	#[test]
	fn accepts_host_writer_trailing_comma() {
		let json = "[{\"id\":\"1b6d3586\",\n\"type\":\"Topic\",\n\"name\":\"A, b]\",\n\"edges\":[\"4554617c\"]},\n\
			{\"id\":\"4554617c\",\n\"type\":\"Agent\",\n\"name\":\"inc\",\n\"edges\":[]},\n]";
		let graph = Graph::from_json(json).unwrap();
		assert_eq!(graph.len(), 2);
		assert_eq!(graph.nodes()[0].name, "A, b]");
		assert_eq!(graph.nodes()[1].kind, NodeKind::Agent);
		assert_eq!(graph.edges(), &[GraphEdge { source: 0, target: 1 }]);
	}

	#[test]
	fn commas_inside_strings_survive() {
		assert_eq!(strip_trailing_commas(r#"["a,]", "b\",}",]"#), r#"["a,]", "b\",}"]"#);
		assert!(matches!(strip_trailing_commas("[1]"), Cow::Borrowed(_)));
	}

	#[test]
	fn long_chain_cycle_check_does_not_recurse() {
		let ids: Vec<String> = (0..200_000).map(|i| i.to_string()).collect();
		let chain: Vec<NodeDescriptor> = ids
			.iter()
			.enumerate()
			.map(|(i, id)| {
				let next: Vec<&str> = ids.get(i + 1).map(|n| n.as_str()).into_iter().collect();
				descriptor(id, id, "Topic", &next)
			})
			.collect();
		let graph = Graph::from_descriptors(&chain).unwrap();
		assert!(!graph.has_cycles());

		let mut looped = chain;
		looped.last_mut().unwrap().edges.push("0".into());
		assert!(Graph::from_descriptors(&looped).unwrap().has_cycles());
	}

	#[test]
	fn detects_cycles() {
		let acyclic = Graph::from_descriptors(&[
			descriptor("t1", "in", "Topic", &["a"]),
			descriptor("a", "inc", "Agent", &["t2"]),
			descriptor("t2", "out", "Topic", &[]),
		])
		.unwrap();
		assert!(!acyclic.has_cycles());

		let cyclic = Graph::from_descriptors(&[
			descriptor("t1", "in", "Topic", &["a"]),
			descriptor("a", "inc", "Agent", &["t1"]),
		])
		.unwrap();
		assert!(cyclic.has_cycles());
	}
}
