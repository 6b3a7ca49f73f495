//! Plate annotation state and persistence

pub mod grid;
pub mod store;

pub use grid::{COLS, Label, PlateGrid, ROWS, Well, row_letter};
pub use store::{PlateStore, ToggleOutcome};
