//! Per-label plate persistence
//!
//! Every label's grid lives in `<data_dir>/<Label>_plate.json` as a nested
//! array of strings. Each mutation rewrites the whole file.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::grid::{Label, PlateGrid, Well};
use crate::error::{Error, Result};

/// Result of toggling a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Filled,
    Cleared,
}

/// Owns one grid per label for the lifetime of the session.
pub struct PlateStore {
    data_dir: PathBuf,
    plates: BTreeMap<Label, PlateGrid>,
}

impl PlateStore {
    /// Load every label from `data_dir`, falling back to empty grids for
    /// labels that were never saved.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let mut plates = BTreeMap::new();
        for label in Label::ALL {
            plates.insert(label, load(&data_dir, label)?);
        }
        info!(data_dir = %data_dir.display(), "plate store opened");
        Ok(Self { data_dir, plates })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn grid(&self, label: Label) -> &PlateGrid {
        &self.plates[&label]
    }

    pub fn set_cell(&mut self, label: Label, well: Well, value: impl Into<String>) -> Result<()> {
        let grid = self.grid_mut(label);
        grid.set(well, value);
        self.persist(label)
    }

    /// Fill an empty well with `pending`, or clear a filled one, then save.
    pub fn toggle(&mut self, label: Label, well: Well, pending: &str) -> Result<ToggleOutcome> {
        let grid = self.grid_mut(label);
        let outcome = if grid.is_filled(well) {
            grid.clear(well);
            ToggleOutcome::Cleared
        } else {
            grid.set(well, pending);
            ToggleOutcome::Filled
        };
        debug!(%label, %well, ?outcome, "well toggled");
        self.persist(label)?;
        Ok(outcome)
    }

    /// Clear every grid in memory. Nothing is written until the next save.
    pub fn reset_all(&mut self) {
        for grid in self.plates.values_mut() {
            *grid = PlateGrid::empty();
        }
        info!("all plates reset");
    }

    pub fn save_all(&self) -> Result<()> {
        for label in Label::ALL {
            self.persist(label)?;
        }
        Ok(())
    }

    fn grid_mut(&mut self, label: Label) -> &mut PlateGrid {
        self.plates.entry(label).or_default()
    }

    fn persist(&self, label: Label) -> Result<()> {
        save(&self.data_dir, label, self.grid(label))
    }
}

pub fn plate_path(data_dir: &Path, label: Label) -> PathBuf {
    data_dir.join(label.file_name())
}

/// Read a label's persisted grid. A missing file yields an empty grid; any
/// other failure is returned.
pub fn load(data_dir: &Path, label: Label) -> Result<PlateGrid> {
    let path = plate_path(data_dir, label);
    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no saved plate, starting empty");
            return Ok(PlateGrid::empty());
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    let rows: Vec<Vec<Option<String>>> =
        serde_json::from_str(&json).map_err(|source| Error::Json {
            path: path.clone(),
            source,
        })?;
    let grid = PlateGrid::try_from(rows).map_err(|detail| Error::Shape {
        path: path.clone(),
        detail,
    })?;
    debug!(path = %path.display(), "plate loaded");
    Ok(grid)
}

/// Overwrite a label's persisted grid. The file is written next to the
/// target and renamed over it, so readers never see a partial grid.
pub fn save(data_dir: &Path, label: Label, grid: &PlateGrid) -> Result<()> {
    std::fs::create_dir_all(data_dir).map_err(|e| Error::io(data_dir, e))?;
    let path = plate_path(data_dir, label);
    let tmp = path.with_extension("json.tmp");

    let json = serde_json::to_string(grid).map_err(|source| Error::Json {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&tmp, json).map_err(|e| Error::io(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| Error::io(&path, e))?;
    debug!(path = %path.display(), "plate saved");
    Ok(())
}
