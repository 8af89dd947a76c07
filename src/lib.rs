pub mod types;
pub mod error;
pub mod config;
pub mod annotations;
pub mod dsp;
pub mod canvas;
pub mod modes;
pub mod manager;
pub mod state;
pub mod components;

use leptos::prelude::*;
use components::app::App;

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    mount_to_body(App);
}
