//! Hangar Viewer - Interactive model viewer
//!
//! Runs natively through the `hangar` binary, or in the browser through the
//! WASM entry point below. Both build the same Bevy app from a
//! [`hangar_core::ViewerConfig`].

pub mod app;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build(),
    );

    let mut config = hangar_core::ViewerConfig::default();
    config.window.canvas = Some("#hangar-canvas".to_string());
    app::run(config);
}
