//! Cross-window value updates.
//!
//! The parent page posts `{ type: "updateValues", values: { <node id>: <value> } }`
//! into the graph frame. Anything else is ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
	Text(String),
	Number(f64),
	Flag(bool),
}

impl WireValue {
	/// Numbers use two decimals, matching the topic value table.
	pub fn display(&self) -> String {
		match self {
			WireValue::Text(s) => s.clone(),
			WireValue::Number(n) => format!("{n:.2}"),
			WireValue::Flag(b) => b.to_string(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
	#[serde(rename = "updateValues")]
	UpdateValues { values: BTreeMap<String, WireValue> },
}

/// Node id to display value, in id order.
pub type ValueUpdate = BTreeMap<String, String>;

impl InboundMessage {
	pub fn into_update(self) -> ValueUpdate {
		match self {
			InboundMessage::UpdateValues { values } => values
				.into_iter()
				.map(|(id, v)| (id, v.display()))
				.collect(),
		}
	}
}

/// Which senders may update the graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum OriginPolicy {
	/// Only the frame's own origin.
	#[default]
	SameOrigin,
	AllowList(Vec<String>),
	/// Any sender, including cross-origin ones.
	Any,
}

impl OriginPolicy {
	/// Reads a host page setting: absent means same-origin, `*` means any,
	/// otherwise a comma separated origin list.
	pub fn from_setting(setting: Option<&str>) -> Self {
		match setting.map(str::trim) {
			None | Some("") => OriginPolicy::SameOrigin,
			Some("*") => OriginPolicy::Any,
			Some(list) => OriginPolicy::AllowList(
				list.split(',')
					.map(str::trim)
					.filter(|s| !s.is_empty())
					.map(String::from)
					.collect(),
			),
		}
	}

	pub fn accepts(&self, origin: &str, own_origin: &str) -> bool {
		match self {
			OriginPolicy::SameOrigin => origin == own_origin,
			OriginPolicy::AllowList(allowed) => allowed.iter().any(|a| a == origin),
			OriginPolicy::Any => true,
		}
	}
}
