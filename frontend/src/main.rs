use leptos::prelude::*;
use shopdesk_frontend::App;
use shopdesk_frontend::config::AppConfig;
use shopdesk_frontend::logging;

// lol_alloc keeps the wasm binary small
#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

pub fn main() {
    console_error_panic_hook::set_once();

    let config = AppConfig::from_env();
    logging::init(config.log_level);
    log::info!("[App] Starting, api base {:?}", config.api_base_url);

    mount_to_body(move || view! { <App config=config /> });
}
