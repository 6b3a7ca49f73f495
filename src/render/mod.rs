//! Plate diagrams: color assignment, legend, raster snapshots and the
//! composite export

pub mod composite;
pub mod diagram;
pub mod palette;
pub mod raster;

pub use composite::{DiagramRegistry, ExportSettings};
pub use diagram::{LegendOrdering, PlateDiagram};
