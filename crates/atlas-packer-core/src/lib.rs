//! Core library for packing images into square texture atlases.
//!
//! - Free space: MaxRects (overlapping, default) or Guillotine (disjoint, optional merge)
//! - Heuristics: six placement scores (BAF/BSSF/BLSF and their worst-fit twins), six guillotine splits
//! - Pipeline: `pack_images` premultiplies/trims, sorts, packs into as many bins as needed,
//!   shrinks each bin to its used power of two and composites the pages
//! - Exporters: little-endian binary, JSON and XML atlas descriptions
//!
//! Quick example:
//! ```ignore
//! use image::ImageReader;
//! use atlas_packer_core::{InputImage, PackerConfig, pack_images};
//! # fn main() -> anyhow::Result<()> {
//! let img1 = ImageReader::open("a.png")?.decode()?;
//! let img2 = ImageReader::open("b.png")?.decode()?;
//! let inputs = vec![
//!   InputImage { key: "a".into(), image: img1 },
//!   InputImage { key: "b".into(), image: img2 },
//! ];
//! let cfg = PackerConfig { max_width: 1024, max_height: 1024, ..Default::default() };
//! let out = pack_images(inputs, cfg)?;
//! println!("pages: {}", out.pages.len());
//! # Ok(()) }
//! ```

pub mod atlas_bin;
pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod preprocess;

pub use atlas_bin::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use preprocess::{InputImage, PreparedImage};

/// Convenience prelude for common types and functions.
/// Importing `atlas_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        PackerConfig, PackerConfigBuilder, PartitionStrategy, PlacementHeuristic, PlacementOrder,
        SortOrder, SplitHeuristic,
    };
    pub use crate::export::{read_binary, to_binary, to_json, to_xml, write_binary};
    pub use crate::model::{Atlas, AtlasImage, LayoutItem, PackStats, Rect};
    pub use crate::{
        InputImage, OutputPage, PackOutput, pack_images, pack_layout, pack_layout_items,
    };
}
