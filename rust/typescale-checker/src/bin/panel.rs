//! WASM entry point for the extension panel.
//!
//! Compiled to WebAssembly via Trunk and mounted to the document body. It
//! renders the report for the active tab.

use leptos::prelude::*;
use typescale_checker::components::ReportApp;

fn main() {
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        console_error_panic_hook::set_once();
        typescale_checker::web::init_logging();
    }

    mount_to_body(ReportApp);
}
