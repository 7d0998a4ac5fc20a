use leptos::prelude::*;

use crate::components::knowledge_graph::KnowledgeGraph;

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
				<KnowledgeGraph fullscreen=true />
				<div class="graph-overlay">
					<h1>"Knowledge Graph"</h1>
					<p class="subtitle">
						"Click a node to fan out its connections. Scroll to zoom. Drag the background to pan."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
