//! Social graph viewer: a Leptos client-side app that lays people and their
//! relationships out as a live, draggable force-directed diagram.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod pages;

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

const LOG_LEVEL: Level = if cfg!(debug_assertions) {
	Level::Debug
} else {
	Level::Info
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(LOG_LEVEL);
	console_error_panic_hook::set_once();
	info!("Logging initialized at {LOG_LEVEL}");
}

/// Router for the graph page, with a 404 fallback.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Social Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
