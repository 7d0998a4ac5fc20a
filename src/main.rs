// The binary only mounts the app; every other dependency belongs to the library.
#![allow(unused_crate_dependencies)]

use knowledge_graph_canvas::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App);
}
