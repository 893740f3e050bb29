//! Content script entry point for the type scale checker extension.
//!
//! This binary is compiled to WASM and injected into every page by the
//! extension. It mounts a [`typescale_checker::Checker`] on the page, which
//! toggles with Ctrl+T, and answers the panel's messages.
//!
//! # Message format
//!
//! Incoming: `{ __typeChecker: true, payload: "<JSON Message>" }`
//! Response: `{ payload: "<JSON Message>" }`

fn main() {
    // Content scripts don't render a UI of their own until toggled.
    // On wasm32 we mount the checker; on other targets this is a no-op.
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        console_error_panic_hook::set_once();
        typescale_checker::web::init_logging();
        if let Err(error) = start() {
            tracing::error!(%error, "Type scale checker failed to start");
        }
    }
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn start() -> Result<(), typescale_checker::TypeScaleError> {
    use typescale_checker::{CheckerConfig, web};

    let checker = web::start(CheckerConfig::default())?;
    // The checker lives as long as the page, with or without the panel.
    std::mem::forget(checker);
    Ok(())
}
