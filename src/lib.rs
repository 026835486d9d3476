//! Topic/agent graph viewer rendered inside the host page's frame.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

mod components;
mod pages;

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize console logging and the panic hook for the WASM target.
///
/// Debug builds log at `Debug`, release builds at `Info`.
pub fn init_logging() {
	let level = if cfg!(debug_assertions) {
		Level::Debug
	} else {
		Level::Info
	};
	let _ = console_log::init_with_level(level);
	console_error_panic_hook::set_once();
	info!("topic graph starting (log level {level})");
}

/// Router serving the graph view at `/` and `/graph`.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Topic Graph" />
		<Meta charset="UTF-8" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/graph") view=Home />
			</Routes>
		</Router>
	}
}
