use std::rc::Rc;

use anyhow::{Context, Result};
use log::{error, info};
use simple_logger::SimpleLogger;

use trichrome::{AppConfig, FunctionLoader, GlWindowContext, TriangleEngine};

fn run(config: &AppConfig) -> Result<()> {
    let mut context = GlWindowContext::create(&config.window, &config.rendering)
        .context("Failed to create window")?;

    let device = FunctionLoader::initialize(|symbol| context.proc_address(symbol))
        .context("Failed to initialize GL function loader")?;
    let device = Rc::new(device);

    let engine = TriangleEngine::new(Rc::clone(&device), &config.rendering)
        .context("Failed to set up triangle scene")?;
    let summary = engine.run(&mut context)?;

    info!("Shutting down after {} frames", summary.frames);
    Ok(())
}

fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    SimpleLogger::new()
        .with_level(config.log_level_filter()?)
        .init()?;
    info!("Initializing application...");

    if let Err(e) = run(&config) {
        error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
