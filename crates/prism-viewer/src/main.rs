mod app;
mod config;

use std::path::PathBuf;

use anyhow::Result;

use prism_engine::device::GpuInit;
use prism_engine::input::{self, HostBridge, SliderPanel};
use prism_engine::logging::init_logging;
use prism_engine::texture::TextureVault;
use prism_engine::window::Runtime;

use app::ViewerApp;
use config::ViewerConfig;

fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => ViewerConfig::load(&path)?,
        None => ViewerConfig::default(),
    };

    init_logging(config.logging());
    log::info!("starting {} ({}x{})", config.title, config.width, config.height);

    let (sender, events) = input::channel();
    let bridge = HostBridge::new(sender, SliderPanel::new());
    let vault = TextureVault::from_config(&config.vault());
    let app = ViewerApp::new(bridge, events, vault, config.texture.clone());

    let result = Runtime::run(config.runtime(), GpuInit::default(), app);
    if let Err(e) = &result {
        log::error!("viewer stopped: {e:#}");
    }
    result
}
