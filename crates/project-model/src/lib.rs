//! Shortsmith Project Model
//!
//! Defines the data contracts shared by the layout engine and renderer:
//! - **Geometry:** pixel sizes, points, and crop rectangles with one set of
//!   rounding rules
//! - **Metadata:** title and broadcaster supplied with a clip
//! - **Plan:** layers and the two composition shapes
//! - **Config:** the immutable pipeline configuration value
//!
//! Coordinates are in pixels: source-frame pixels for crops, output pixels
//! for layer positions.

pub mod config;
pub mod geometry;
pub mod metadata;
pub mod plan;
pub mod text;

pub use config::*;
pub use geometry::*;
pub use metadata::*;
pub use plan::*;
pub use text::*;
