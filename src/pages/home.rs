use leptos::prelude::*;

use crate::components::force_graph::ForceGraphCanvas;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
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

			<div class="fullscreen-graph">
				<ForceGraphCanvas fullscreen=true />
				<div class="graph-overlay">
					<h1>"Lineage"</h1>
					<p class="subtitle">
						"Click a file, project or context to fold its neighbours into it. Double-click to open details. Scroll to zoom, drag the background to pan."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
