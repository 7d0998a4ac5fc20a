use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Nothing here"</h1>
			<p>"The page you asked for does not exist."</p>
			<a href="/">"Back to the graph"</a>
		</div>
	}
}
