//! Headless commands

use std::fmt::Write as _;

use tracing::info;

use crate::config::{AppConfig, Command};
use crate::error::Result;
use crate::plate::{COLS, Label, PlateGrid, PlateStore, Well, row_letter};
use crate::render::{DiagramRegistry, PlateDiagram};

pub fn run(command: &Command, config: &AppConfig) -> Result<()> {
    let mut store = PlateStore::open(&config.data_dir)?;
    match command {
        Command::Export => {
            let registry = plot_all(&store, config);
            registry.export(&config.export)?;
            println!("Wrote {}", config.export.path.display());
        }
        Command::Set { label, well, value } => {
            let label: Label = label.parse()?;
            let well: Well = well.parse()?;
            store.set_cell(label, well, value.as_str())?;
            info!(%label, %well, value = %value, "well set");
        }
        Command::Clear { label, well } => {
            let label: Label = label.parse()?;
            let well: Well = well.parse()?;
            store.set_cell(label, well, "")?;
            info!(%label, %well, "well cleared");
        }
        Command::Show { label } => {
            let label: Label = label.parse()?;
            let grid = store.grid(label);
            let diagram = PlateDiagram::build(label, grid, config.legend_order);
            if grid.is_empty() {
                println!("{label}: empty plate");
                return Ok(());
            }
            println!("{label}");
            print!("{}", format_plate(grid));
            for entry in &diagram.legend {
                let c = entry.color;
                println!("  #{:02x}{:02x}{:02x}  {}", c.r(), c.g(), c.b(), entry.value);
            }
        }
        Command::Reset => {
            store.reset_all();
            store.save_all()?;
        }
    }
    Ok(())
}

/// Render and register every label, in label order.
pub fn plot_all(store: &PlateStore, config: &AppConfig) -> DiagramRegistry {
    let mut registry = DiagramRegistry::default();
    for label in Label::ALL {
        registry.register(PlateDiagram::build(label, store.grid(label), config.legend_order));
    }
    registry
}

/// Plate as an aligned text table, `.` for empty wells.
pub fn format_plate(grid: &PlateGrid) -> String {
    let width = grid
        .iter()
        .map(|(_, v)| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(2);

    let mut out = String::from(" ");
    for col in 1..=COLS {
        let _ = write!(out, " {col:>width$}");
    }
    out.push('\n');
    for (row, cells) in grid.rows().iter().enumerate() {
        out.push(row_letter(row));
        for value in cells {
            let shown = if value.is_empty() { "." } else { value.as_str() };
            let _ = write!(out, " {shown:>width$}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ExportSettings;

    fn config_for(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            data_dir: dir.to_path_buf(),
            export: ExportSettings {
                path: dir.join("plot.png"),
                width_in: 4.0,
                height_in: 2.0,
                dpi: 40,
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_format_plate() {
        let mut grid = PlateGrid::empty();
        grid.set(Well::new(1, 0).unwrap(), "abc");
        let text = format_plate(&grid);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].ends_with(" 12"));
        assert!(lines[1].starts_with("A   ."));
        assert!(lines[2].starts_with("B abc"));
    }

    #[test]
    fn test_set_clear_reset_commands() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let set = Command::Set {
            label: "donor".into(),
            well: "C4".into(),
            value: "D9".into(),
        };
        run(&set, &config).unwrap();
        let well = Well::new(2, 3).unwrap();
        assert_eq!(PlateStore::open(dir.path()).unwrap().grid(Label::Donor).get(well), "D9");

        let clear = Command::Clear {
            label: "Donor".into(),
            well: "C4".into(),
        };
        run(&clear, &config).unwrap();
        assert!(PlateStore::open(dir.path()).unwrap().grid(Label::Donor).is_empty());

        run(&set, &config).unwrap();
        run(&Command::Reset, &config).unwrap();
        assert!(PlateStore::open(dir.path()).unwrap().grid(Label::Donor).is_empty());
    }

    #[test]
    fn test_bad_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let bad_well = Command::Set {
            label: "Donor".into(),
            well: "Z99".into(),
            value: "x".into(),
        };
        assert!(run(&bad_well, &config).is_err());
        let bad_label = Command::Show {
            label: "Volume".into(),
        };
        assert!(run(&bad_label, &config).is_err());
    }

    #[test]
    fn test_export_command() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        run(&Command::Export, &config).unwrap();
        assert!(config.export.path.exists());

        let store = PlateStore::open(dir.path()).unwrap();
        let registry = plot_all(&store, &config);
        assert_eq!(registry.len(), Label::ALL.len());
    }
}
