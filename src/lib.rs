pub mod config;
pub mod deck;
pub mod gesture;
pub mod session;
pub mod source;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
pub mod images;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_app() {
    use std::rc::Rc;

    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    wasm_bindgen_futures::spawn_local(async {
        let config = config::load_config().await;
        log::info!(
            "Booting with batch size {} and commit threshold {}px",
            config.batch_size,
            config.commit_threshold
        );
        yew::Renderer::<app::App>::with_props(app::AppProps {
            config: Rc::new(config),
        })
        .render();
    });
}
