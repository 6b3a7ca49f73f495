//! Command line and session configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::render::{ExportSettings, LegendOrdering};

#[derive(Debug, Parser)]
#[command(name = "plate-layout", version, about = "Annotate and plot 96-well plate layouts")]
pub struct Cli {
    /// Directory holding the <Label>_plate.json files
    #[arg(long, default_value = ".", global = true)]
    pub data_dir: PathBuf,

    /// Legend ordering for plots
    #[arg(long, value_enum, default_value_t = LegendOrdering::FirstWell, global = true)]
    pub legend_order: LegendOrdering,

    /// Composite image path; relative paths resolve against the data directory
    #[arg(long, default_value = "plot.jpg", global = true)]
    pub output: PathBuf,

    /// Composite resolution in dots per inch
    #[arg(long, default_value_t = 300, global = true)]
    pub dpi: u16,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plot every label and write the composite image
    Export,
    /// Write a value into one well
    Set {
        label: String,
        /// Well in plate notation, e.g. B7
        well: String,
        value: String,
    },
    /// Clear one well
    Clear { label: String, well: String },
    /// Print a label's plate and legend
    Show { label: String },
    /// Clear every label and save
    Reset,
}

/// Settings shared by the GUI and the headless commands.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub legend_order: LegendOrdering,
    pub export: ExportSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            legend_order: LegendOrdering::default(),
            export: ExportSettings::default(),
        }
    }
}

impl From<&Cli> for AppConfig {
    fn from(cli: &Cli) -> Self {
        let path = if cli.output.is_absolute() {
            cli.output.clone()
        } else {
            cli.data_dir.join(&cli.output)
        };
        Self {
            data_dir: cli.data_dir.clone(),
            legend_order: cli.legend_order,
            export: ExportSettings {
                path,
                dpi: cli.dpi,
                ..ExportSettings::default()
            },
        }
    }
}
