use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::topic_graph::{
	Graph, GraphError, LayoutStrategy, OriginPolicy, TopicGraphCanvas,
};

/// Element the host page fills with the graph description.
const GRAPH_DATA_ID: &str = "graph-data";

/// Reads the embedded graph description and the sender allow-list next to it.
fn load_graph() -> Result<(Graph, OriginPolicy), GraphError> {
	let element = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|d| d.get_element_by_id(GRAPH_DATA_ID))
		.ok_or_else(|| GraphError::MissingData(GRAPH_DATA_ID.into()))?;
	let json = element.text_content().unwrap_or_default();
	let allowed = element.get_attribute("data-allowed-origins");
	let policy = OriginPolicy::from_setting(allowed.as_deref());
	Ok((Graph::from_json(&json)?, policy))
}

/// Graph page shown inside the host frame
#[component]
pub fn Home() -> impl IntoView {
	let query = use_query_map();
	let strategy = match query.with_untracked(|q| q.get("layout")).as_deref() {
		Some("circular") => LayoutStrategy::Circular,
		_ => LayoutStrategy::Force,
	};

	let loaded = load_graph();
	if let Err(err) = &loaded {
		log::error!("failed to load graph: {err}");
	}
	let content = loaded.map(|(graph, origin_policy)| {
		if graph.is_empty() {
			log::warn!("graph description has no nodes");
		}
		let graph_data = Signal::derive(move || graph.clone());
		view! {
			<div class="graph-frame">
				<TopicGraphCanvas data=graph_data strategy=strategy origin_policy=origin_policy />
			</div>
		}
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{content}
		</ErrorBoundary>
	}
}
