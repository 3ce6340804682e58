//! Packing configuration and the algorithm selectors it refers to.
//! Key notes:
//!   - `strategy` picks the free-space partition (MaxRects overlapping or Guillotine disjoint)
//!   - `heuristic` ranks candidate free rectangles, `split` only matters for Guillotine
//!   - `order` switches between one-at-a-time insertion and a global best-fit search per bin

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Free-space partition strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PartitionStrategy {
    /// Overlapping maximal free rectangles, pruned by containment. Denser, more bookkeeping.
    MaxRects,
    /// Disjoint free rectangles carved by guillotine cuts. Lighter, optional merge.
    Guillotine,
}

impl FromStr for PartitionStrategy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maxrects" => Ok(Self::MaxRects),
            "guillotine" => Ok(Self::Guillotine),
            _ => Err(()),
        }
    }
}

/// Free-rectangle choice heuristics. Lower score wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlacementHeuristic {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    WorstAreaFit,
    WorstShortSideFit,
    WorstLongSideFit,
}

impl FromStr for PlacementHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "waf" | "worstareafit" => Ok(Self::WorstAreaFit),
            "wssf" | "worstshortsidefit" => Ok(Self::WorstShortSideFit),
            "wlsf" | "worstlongsidefit" => Ok(Self::WorstLongSideFit),
            _ => Err(()),
        }
    }
}

/// Guillotine split axis heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SplitHeuristic {
    SplitShorterLeftoverAxis,
    SplitLongerLeftoverAxis,
    /// Favor one big and one small leftover.
    SplitMinimizeArea,
    /// Favor evenly sized leftovers.
    SplitMaximizeArea,
    SplitShorterAxis,
    SplitLongerAxis,
}

impl FromStr for SplitHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slas" | "splitshorterleftoveraxis" => Ok(Self::SplitShorterLeftoverAxis),
            "llas" | "splitlongerleftoveraxis" => Ok(Self::SplitLongerLeftoverAxis),
            "minas" | "splitminimizearea" => Ok(Self::SplitMinimizeArea),
            "maxas" | "splitmaximizearea" => Ok(Self::SplitMaximizeArea),
            "sas" | "splitshorteraxis" => Ok(Self::SplitShorterAxis),
            "las" | "splitlongeraxis" => Ok(Self::SplitLongerAxis),
            _ => Err(()),
        }
    }
}

/// How items are fed into a bin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlacementOrder {
    /// Insert items one by one, largest first; the bin closes at the first item that does not fit.
    Sequential,
    /// Each round places the best (free rect, item, orientation) triple over all pending items.
    GlobalBestFit,
}

impl FromStr for PlacementOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "global" | "global_best_fit" => Ok(Self::GlobalBestFit),
            _ => Err(()),
        }
    }
}

/// Sorting orders applied before packing. Sorting is stable: ties keep input order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    AreaDesc,
    MaxSideDesc,
    HeightDesc,
    WidthDesc,
    NameAsc,
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "area_desc" => Ok(Self::AreaDesc),
            "max_side_desc" => Ok(Self::MaxSideDesc),
            "height_desc" => Ok(Self::HeightDesc),
            "width_desc" => Ok(Self::WidthDesc),
            "name_asc" => Ok(Self::NameAsc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Base name for atlas records; atlas `i` is called `{name}{i}.png`.
    #[serde(default = "default_name")]
    pub name: String,
    /// Maximum (and initial) atlas width in pixels.
    pub max_width: u32,
    /// Maximum (and initial) atlas height in pixels.
    pub max_height: u32,
    /// Pixels reserved to the right of and below every image.
    pub padding: u32,
    /// Allow 90° clockwise rotation when it helps placement.
    pub allow_rotation: bool,
    /// Store identical images once; later copies alias the first placement.
    pub unique: bool,
    /// Trim transparent borders (alpha <= trim_threshold).
    pub trim: bool,
    #[serde(default)]
    pub trim_threshold: u8,
    /// Premultiply color channels by alpha before packing.
    pub premultiply: bool,
    /// Keep the full max_width/max_height instead of shrinking to the used power of two.
    #[serde(default)]
    pub force_max_dimensions: bool,

    #[serde(default = "default_strategy")]
    pub strategy: PartitionStrategy,
    #[serde(default = "default_heuristic")]
    pub heuristic: PlacementHeuristic,
    #[serde(default = "default_split")]
    pub split: SplitHeuristic,
    /// Merge adjacent Guillotine free rectangles after each insertion.
    #[serde(default = "default_merge")]
    pub merge: bool,
    #[serde(default = "default_order")]
    pub order: PlacementOrder,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,

    /// Preprocess images in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_width: 4096,
            max_height: 4096,
            padding: 1,
            allow_rotation: false,
            unique: false,
            trim: false,
            trim_threshold: 0,
            premultiply: false,
            force_max_dimensions: false,
            strategy: default_strategy(),
            heuristic: default_heuristic(),
            split: default_split(),
            merge: default_merge(),
            order: default_order(),
            sort_order: default_sort_order(),
            parallel: false,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if the atlas dimensions are zero or the padding alone
    /// would fill the atlas.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasPackerError;

        if self.max_width == 0 || self.max_height == 0 {
            return Err(AtlasPackerError::InvalidDimensions {
                width: self.max_width,
                height: self.max_height,
            });
        }

        if self.padding >= self.max_width || self.padding >= self.max_height {
            return Err(AtlasPackerError::InvalidConfig(format!(
                "padding ({}) leaves no room in a {}x{} atlas",
                self.padding, self.max_width, self.max_height
            )));
        }

        Ok(())
    }
}

fn default_name() -> String {
    "atlas".into()
}
fn default_strategy() -> PartitionStrategy {
    PartitionStrategy::MaxRects
}
fn default_heuristic() -> PlacementHeuristic {
    PlacementHeuristic::BestShortSideFit
}
fn default_split() -> SplitHeuristic {
    SplitHeuristic::SplitShorterLeftoverAxis
}
fn default_merge() -> bool {
    true
}
fn default_order() -> PlacementOrder {
    PlacementOrder::Sequential
}
fn default_sort_order() -> SortOrder {
    SortOrder::AreaDesc
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.cfg.name = v.into();
        self
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }
    pub fn unique(mut self, v: bool) -> Self {
        self.cfg.unique = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.cfg.trim = v;
        self
    }
    pub fn trim_threshold(mut self, v: u8) -> Self {
        self.cfg.trim_threshold = v;
        self
    }
    pub fn premultiply(mut self, v: bool) -> Self {
        self.cfg.premultiply = v;
        self
    }
    pub fn force_max_dimensions(mut self, v: bool) -> Self {
        self.cfg.force_max_dimensions = v;
        self
    }
    pub fn strategy(mut self, v: PartitionStrategy) -> Self {
        self.cfg.strategy = v;
        self
    }
    pub fn heuristic(mut self, v: PlacementHeuristic) -> Self {
        self.cfg.heuristic = v;
        self
    }
    pub fn split(mut self, v: SplitHeuristic) -> Self {
        self.cfg.split = v;
        self
    }
    pub fn merge(mut self, v: bool) -> Self {
        self.cfg.merge = v;
        self
    }
    pub fn order(mut self, v: PlacementOrder) -> Self {
        self.cfg.order = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
