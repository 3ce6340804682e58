use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right_ex(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom_ex(&self) -> u32 {
        self.y + self.h
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    /// Returns true if `r` is fully inside `self` (shared edges count as inside).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x
            && r.y >= self.y
            && r.right_ex() <= self.right_ex()
            && r.bottom_ex() <= self.bottom_ex()
    }
    /// Returns true if the interiors of `self` and `r` overlap.
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.right_ex()
            || r.x >= self.right_ex()
            || self.y >= r.bottom_ex()
            || r.y >= self.bottom_ex())
    }
}

/// An unplaced size request. `key` identifies the request's source so results
/// can be matched back after the pending set has been reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeRequest<K> {
    pub w: u32,
    pub h: u32,
    pub key: K,
}

impl<K> SizeRequest<K> {
    pub fn new(key: K, w: u32, h: u32) -> Self {
        Self { w, h, key }
    }
}

/// Pixel-less item for layout-only packing.
///
/// `frame_*` are carried through to the resulting [`AtlasImage`] untouched;
/// [`LayoutItem::new`] fills them for an untrimmed `w x h` item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutItem {
    pub name: String,
    pub w: u32,
    pub h: u32,
    pub frame_x: i32,
    pub frame_y: i32,
    pub frame_w: u32,
    pub frame_h: u32,
}

impl LayoutItem {
    pub fn new(name: impl Into<String>, w: u32, h: u32) -> Self {
        Self {
            name: name.into(),
            w,
            h,
            frame_x: 0,
            frame_y: 0,
            frame_w: w,
            frame_h: h,
        }
    }

    /// Same item, but trimmed out of a `frame_w x frame_h` frame at `(offset_x, offset_y)`.
    pub fn with_frame(mut self, offset_x: u32, offset_y: u32, frame_w: u32, frame_h: u32) -> Self {
        self.frame_x = -(offset_x as i32);
        self.frame_y = -(offset_y as i32);
        self.frame_w = frame_w;
        self.frame_h = frame_h;
        self
    }
}

/// Where an accepted item ended up inside its bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Reserved slot, padding included, in placed orientation.
    pub rect: Rect,
    /// True if the item was turned 90° clockwise.
    pub rotated: bool,
    /// Index of the bin entry whose pixels this entry reuses.
    pub duplicate_of: Option<usize>,
}

/// One packed image inside an atlas.
///
/// `width`/`height` are the (trimmed) source dimensions, not the rotated
/// footprint. `frame_*` describe how to rebuild the untrimmed frame: draw the
/// image at `(-frame_x, -frame_y)` inside a `frame_w x frame_h` canvas.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AtlasImage {
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub frame_x: i32,
    pub frame_y: i32,
    pub frame_w: u32,
    pub frame_h: u32,
    #[serde(skip)]
    pub rotated: bool,
    #[serde(skip)]
    pub duplicate_of: Option<usize>,
}

/// Description of one atlas bitmap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Atlas {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub images: Vec<AtlasImage>,
    pub is_rotated: bool,
    pub is_trimmed: bool,
    pub is_premultiplied: bool,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PackStats {
    /// Number of atlases produced.
    pub num_atlases: usize,
    /// Number of image records, duplicates included.
    pub num_images: usize,
    /// Records that reuse another record's pixels.
    pub num_duplicates: usize,
    /// Sum of width * height over all atlases (after shrinking).
    pub total_atlas_area: u64,
    /// Area covered by distinct images.
    pub used_image_area: u64,
    /// used_image_area / total_atlas_area (0.0 to 1.0).
    pub occupancy: f64,
    pub max_atlas_width: u32,
    pub max_atlas_height: u32,
    pub num_rotated: usize,
}

impl PackStats {
    /// Computes statistics over a set of atlases.
    pub fn from_atlases(atlases: &[Atlas]) -> Self {
        let mut stats = PackStats {
            num_atlases: atlases.len(),
            ..Default::default()
        };
        for atlas in atlases {
            stats.total_atlas_area += atlas.width as u64 * atlas.height as u64;
            stats.max_atlas_width = stats.max_atlas_width.max(atlas.width);
            stats.max_atlas_height = stats.max_atlas_height.max(atlas.height);
            for img in &atlas.images {
                stats.num_images += 1;
                if img.duplicate_of.is_some() {
                    stats.num_duplicates += 1;
                    continue;
                }
                stats.used_image_area += img.width as u64 * img.height as u64;
                if img.rotated {
                    stats.num_rotated += 1;
                }
            }
        }
        stats.occupancy = if stats.total_atlas_area > 0 {
            stats.used_image_area as f64 / stats.total_atlas_area as f64
        } else {
            0.0
        };
        stats
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Atlases: {}, Images: {} ({} duplicates), Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px², Rotated: {}",
            self.num_atlases,
            self.num_images,
            self.num_duplicates,
            self.occupancy * 100.0,
            self.total_atlas_area,
            self.used_image_area,
            self.num_rotated,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_atlas_area.saturating_sub(self.used_image_area)
    }
}
