mod app;
mod cli;
mod config;
mod editor;
mod error;
mod logging;
mod plate;
mod render;

use clap::Parser;
use eframe::egui;

use crate::app::PlateLayoutApp;
use crate::config::{AppConfig, Cli};
use crate::error::Result;
use crate::plate::PlateStore;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        tracing::error!("{err}");
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::from(cli);
    match &cli.command {
        Some(command) => cli::run(command, &config),
        None => run_gui(config),
    }
}

fn run_gui(config: AppConfig) -> Result<()> {
    // unreadable or corrupt plate files stop startup
    let store = PlateStore::open(&config.data_dir)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 400.0])
            .with_title("Plate Layout"),
        ..Default::default()
    };

    eframe::run_native(
        "Plate Layout",
        options,
        Box::new(move |cc| Ok(Box::new(PlateLayoutApp::new(cc, config, store)))),
    )?;
    Ok(())
}
