use crate::compositing::blit_rgba;
use crate::config::PackerConfig;
use crate::model::{Atlas, AtlasImage, LayoutItem, Placement, Rect, SizeRequest};
use crate::packer::BinPacker;
use crate::preprocess::PreparedImage;
use image::RgbaImage;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Something an [`AtlasBin`] can place: a sized, named item with trim frame data.
pub trait BinItem {
    fn name(&self) -> &str;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// `(frame_x, frame_y, frame_w, frame_h)`.
    fn frame(&self) -> (i32, i32, u32, u32);
    /// Content hash used to find duplicate candidates.
    fn fingerprint(&self) -> u64;
    /// Full comparison run on fingerprint hits.
    fn same_content(&self, other: &Self) -> bool;
}

impl BinItem for PreparedImage {
    fn name(&self) -> &str {
        &self.name
    }
    fn width(&self) -> u32 {
        self.rgba.width()
    }
    fn height(&self) -> u32 {
        self.rgba.height()
    }
    fn frame(&self) -> (i32, i32, u32, u32) {
        (self.frame_x, self.frame_y, self.frame_w, self.frame_h)
    }
    fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
    fn same_content(&self, other: &Self) -> bool {
        PreparedImage::same_content(self, other)
    }
}

impl BinItem for LayoutItem {
    fn name(&self) -> &str {
        &self.name
    }
    fn width(&self) -> u32 {
        self.w
    }
    fn height(&self) -> u32 {
        self.h
    }
    fn frame(&self) -> (i32, i32, u32, u32) {
        (self.frame_x, self.frame_y, self.frame_w, self.frame_h)
    }
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
    fn same_content(&self, other: &Self) -> bool {
        self == other
    }
}

/// An accepted item and where it went.
#[derive(Debug, Clone)]
pub struct BinEntry<T> {
    pub item: T,
    pub placement: Placement,
}

/// One bin of the atlas run.
///
/// Wraps a [`BinPacker`] with padding, rotation detection, per-bin duplicate
/// lookup, used-extent tracking and power-of-two auto-shrink. Pending items
/// are passed as a stack: the last element is packed first.
pub struct AtlasBin<T> {
    width: u32,
    height: u32,
    padding: u32,
    allow_rotation: bool,
    unique: bool,
    force_max_dimensions: bool,
    packer: BinPacker,
    entries: Vec<BinEntry<T>>,
    dup_lookup: HashMap<u64, Vec<usize>>,
    used_w: u32,
    used_h: u32,
}

impl<T: BinItem> AtlasBin<T> {
    /// Opens an empty bin of `cfg.max_width x cfg.max_height`.
    pub fn new(cfg: &PackerConfig) -> Self {
        Self {
            width: cfg.max_width,
            height: cfg.max_height,
            padding: cfg.padding,
            allow_rotation: cfg.allow_rotation,
            unique: cfg.unique,
            force_max_dimensions: cfg.force_max_dimensions,
            packer: BinPacker::from_config(cfg, cfg.max_width, cfg.max_height),
            entries: Vec::new(),
            dup_lookup: HashMap::new(),
            used_w: 0,
            used_h: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Extent covered by placements, padding included.
    pub fn used_extent(&self) -> (u32, u32) {
        (self.used_w, self.used_h)
    }

    pub fn entries(&self) -> &[BinEntry<T>] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Used area / bin area of the underlying partition (before shrinking).
    pub fn occupancy(&self) -> f64 {
        self.packer.occupancy()
    }

    /// Pops items off `pending` and places them one at a time until one does
    /// not fit; that item is pushed back. Returns the number of accepted items.
    pub fn pack(&mut self, pending: &mut Vec<T>) -> usize {
        let before = self.entries.len();
        while let Some(item) = pending.pop() {
            if let Some(original) = self.find_duplicate(&item) {
                self.push_duplicate(item, original);
                continue;
            }
            let (w, h) = (item.width() + self.padding, item.height() + self.padding);
            match self.packer.insert(w, h) {
                Some(c) => {
                    let rotated = self.allow_rotation && c.rect.w != w;
                    self.push_placed(item, c.rect, rotated);
                }
                None => {
                    pending.push(item);
                    break;
                }
            }
        }
        self.entries.len() - before
    }

    /// Places items from `pending` with a global best-fit search over all of
    /// them at once. Duplicates of placed items are recorded as such; whatever
    /// does not fit is left in `pending`, largest on top.
    pub fn pack_global(&mut self, pending: &mut Vec<T>) -> usize {
        let before = self.entries.len();
        // largest first
        let items: Vec<T> = pending.drain(..).rev().collect();

        // representative index for duplicates within this batch
        let mut rep_of: Vec<Option<usize>> = vec![None; items.len()];
        let mut existing: Vec<Option<usize>> = vec![None; items.len()];
        let mut seen: HashMap<u64, Vec<usize>> = HashMap::new();
        let mut requests = Vec::new();
        for (i, item) in items.iter().enumerate() {
            if let Some(e) = self.find_duplicate(item) {
                existing[i] = Some(e);
                continue;
            }
            if self.unique {
                let bucket = seen.entry(item.fingerprint()).or_default();
                if let Some(&r) = bucket.iter().find(|&&r| items[r].same_content(item)) {
                    rep_of[i] = Some(r);
                    continue;
                }
                bucket.push(i);
            }
            requests.push(SizeRequest::new(
                i,
                item.width() + self.padding,
                item.height() + self.padding,
            ));
        }

        let mut placement_of = vec![None; items.len()];
        for placed in self.packer.insert_many(&mut requests) {
            placement_of[placed.key] = Some(placed.rect);
        }

        let mut entry_of: Vec<Option<usize>> = vec![None; items.len()];
        let mut leftover = Vec::new();
        for (i, item) in items.into_iter().enumerate() {
            if let Some(e) = existing[i] {
                self.push_duplicate(item, e);
            } else if let Some(r) = rep_of[i] {
                match entry_of[r] {
                    Some(e) => self.push_duplicate(item, e),
                    None => leftover.push(item),
                }
            } else if let Some(rect) = placement_of[i] {
                let rotated = self.allow_rotation && rect.w != item.width() + self.padding;
                entry_of[i] = Some(self.entries.len());
                self.push_placed(item, rect, rotated);
            } else {
                leftover.push(item);
            }
        }
        pending.extend(leftover.into_iter().rev());
        self.entries.len() - before
    }

    fn find_duplicate(&self, item: &T) -> Option<usize> {
        if !self.unique {
            return None;
        }
        self.dup_lookup
            .get(&item.fingerprint())?
            .iter()
            .copied()
            .find(|&i| self.entries[i].item.same_content(item))
    }

    fn push_duplicate(&mut self, item: T, original: usize) {
        let orig = self.entries[original].placement;
        self.entries.push(BinEntry {
            item,
            placement: Placement {
                rect: orig.rect,
                rotated: orig.rotated,
                duplicate_of: Some(original),
            },
        });
    }

    fn push_placed(&mut self, item: T, rect: Rect, rotated: bool) {
        self.used_w = self.used_w.max(rect.right_ex());
        self.used_h = self.used_h.max(rect.bottom_ex());
        if self.unique {
            self.dup_lookup
                .entry(item.fingerprint())
                .or_default()
                .push(self.entries.len());
        }
        self.entries.push(BinEntry {
            item,
            placement: Placement {
                rect,
                rotated,
                duplicate_of: None,
            },
        });
    }

    /// Halves each dimension while the used extent still fits in the half.
    /// No-op with `force_max_dimensions`.
    pub fn shrink(&mut self) {
        if self.force_max_dimensions {
            return;
        }
        while self.width > 1 && self.width / 2 >= self.used_w {
            self.width /= 2;
        }
        while self.height > 1 && self.height / 2 >= self.used_h {
            self.height /= 2;
        }
    }

    /// Atlas record for this bin. Image sizes are the unpadded, unrotated item sizes.
    pub fn to_atlas(&self, name: String, cfg: &PackerConfig) -> Atlas {
        let images = self
            .entries
            .iter()
            .map(|e| {
                let (frame_x, frame_y, frame_w, frame_h) = e.item.frame();
                AtlasImage {
                    name: e.item.name().to_string(),
                    x: e.placement.rect.x,
                    y: e.placement.rect.y,
                    width: e.item.width(),
                    height: e.item.height(),
                    frame_x,
                    frame_y,
                    frame_w,
                    frame_h,
                    rotated: e.placement.rotated,
                    duplicate_of: e.placement.duplicate_of,
                }
            })
            .collect();
        Atlas {
            name,
            width: self.width,
            height: self.height,
            images,
            is_rotated: cfg.allow_rotation,
            is_trimmed: cfg.trim,
            is_premultiplied: cfg.premultiply,
        }
    }
}

impl AtlasBin<PreparedImage> {
    /// Draws every non-duplicate image into a fresh `width x height` canvas.
    pub fn composite(&self) -> RgbaImage {
        let mut canvas = RgbaImage::new(self.width, self.height);
        for e in self.entries.iter().filter(|e| e.placement.duplicate_of.is_none()) {
            blit_rgba(
                &e.item.rgba,
                &mut canvas,
                e.placement.rect.x,
                e.placement.rect.y,
                e.placement.rotated,
            );
        }
        canvas
    }
}
