// the library target owns every dependency
#![allow(unused_crate_dependencies)]

use collab_graph_canvas::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App);
}
