use leptos::prelude::*;
use leptos_router::hooks::use_location;

/// Fallback for routes this app does not serve, including detail pages
/// reached by double-clicking a vertex.
#[component]
pub fn NotFound() -> impl IntoView {
	let location = use_location();
	view! {
		<h1>"Nothing here yet"</h1>
		<p>"No page is mounted at " <code>{move || location.pathname.get()}</code></p>
		<a href="/">"Back to the graph"</a>
	}
}
