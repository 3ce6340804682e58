use crate::config::{PackerConfig, SortOrder};
use crate::error::{AtlasPackerError, Result};
use crate::model::Rect;
use image::{DynamicImage, RgbaImage, imageops};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::warn;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// In-memory image to pack (key + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

impl InputImage {
    pub fn new(key: impl Into<String>, image: impl Into<DynamicImage>) -> Self {
        Self {
            key: key.into(),
            image: image.into(),
        }
    }
}

/// An image after premultiply and trim, ready for packing.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub name: String,
    /// Trimmed pixels; the packed size is `rgba.dimensions()`.
    pub rgba: RgbaImage,
    /// Negated offset of the trimmed region inside the original frame.
    pub frame_x: i32,
    pub frame_y: i32,
    /// Original (untrimmed) size.
    pub frame_w: u32,
    pub frame_h: u32,
    pub fingerprint: u64,
}

impl PreparedImage {
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// True when the pixels, size, name and frame all match.
    pub fn same_content(&self, other: &PreparedImage) -> bool {
        self.fingerprint == other.fingerprint
            && self.name == other.name
            && self.frame_x == other.frame_x
            && self.frame_y == other.frame_y
            && self.frame_w == other.frame_w
            && self.frame_h == other.frame_h
            && self.rgba.dimensions() == other.rgba.dimensions()
            && self.rgba.as_raw() == other.rgba.as_raw()
    }
}

/// Multiplies every color channel by alpha in place (`c * a / 255`).
pub fn premultiply(rgba: &mut RgbaImage) {
    for px in rgba.pixels_mut() {
        let a = px[3] as u32;
        for c in 0..3 {
            px[c] = (px[c] as u32 * a / 255) as u8;
        }
    }
}

/// Bounding box of pixels whose alpha is above `threshold`.
/// Returns `None` when no pixel qualifies.
pub fn compute_trim_rect(rgba: &RgbaImage, threshold: u8) -> Option<Rect> {
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let column_empty =
        |x: u32, y1: u32, y2: u32| (y1..=y2).all(|y| rgba.get_pixel(x, y)[3] <= threshold);
    let row_empty =
        |y: u32, x1: u32, x2: u32| (x1..=x2).all(|x| rgba.get_pixel(x, y)[3] <= threshold);

    let mut x1 = 0;
    while x1 < w && column_empty(x1, 0, h - 1) {
        x1 += 1;
    }
    if x1 >= w {
        return None;
    }
    let mut x2 = w - 1;
    while x2 > x1 && column_empty(x2, 0, h - 1) {
        x2 -= 1;
    }
    let mut y1 = 0;
    while y1 < h && row_empty(y1, x1, x2) {
        y1 += 1;
    }
    let mut y2 = h - 1;
    while y2 > y1 && row_empty(y2, x1, x2) {
        y2 -= 1;
    }
    Some(Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1))
}

/// 64-bit content hash over pixels, dimensions, name and frame.
pub fn fingerprint(name: &str, rgba: &RgbaImage, frame: (i32, i32, u32, u32)) -> u64 {
    let mut hasher = DefaultHasher::new();
    rgba.dimensions().hash(&mut hasher);
    rgba.as_raw().hash(&mut hasher);
    name.hash(&mut hasher);
    frame.hash(&mut hasher);
    hasher.finish()
}

/// Premultiplies and trims one image according to `cfg`.
pub fn prepare_image(input: InputImage, cfg: &PackerConfig) -> Result<PreparedImage> {
    let mut rgba = input.image.into_rgba8();
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return Err(AtlasPackerError::InvalidInput(format!(
            "image '{}' has zero size ({w}x{h})",
            input.key
        )));
    }

    if cfg.premultiply {
        premultiply(&mut rgba);
    }

    let (mut frame_x, mut frame_y) = (0i32, 0i32);
    if cfg.trim {
        match compute_trim_rect(&rgba, cfg.trim_threshold) {
            Some(r) => {
                if r.w != w || r.h != h {
                    rgba = imageops::crop_imm(&rgba, r.x, r.y, r.w, r.h).to_image();
                }
                frame_x = -(r.x as i32);
                frame_y = -(r.y as i32);
            }
            None => warn!(image = %input.key, "image is fully transparent, keeping the full frame"),
        }
    }

    let fingerprint = fingerprint(&input.key, &rgba, (frame_x, frame_y, w, h));
    Ok(PreparedImage {
        name: input.key,
        rgba,
        frame_x,
        frame_y,
        frame_w: w,
        frame_h: h,
        fingerprint,
    })
}

/// Prepares every input, in parallel when the `parallel` feature is on and
/// `cfg.parallel` is set. Output order matches input order.
pub fn prepare_inputs(inputs: Vec<InputImage>, cfg: &PackerConfig) -> Result<Vec<PreparedImage>> {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return inputs
                .into_par_iter()
                .map(|inp| prepare_image(inp, cfg))
                .collect();
        }
    }
    inputs
        .into_iter()
        .map(|inp| prepare_image(inp, cfg))
        .collect()
}

/// Stable sort by `order`; equal keys keep their input order.
pub fn sort_by_order<T>(
    items: &mut [T],
    order: SortOrder,
    size: impl Fn(&T) -> (u32, u32),
    name: impl Fn(&T) -> &str,
) {
    let area = |t: &T| {
        let (w, h) = size(t);
        w as u64 * h as u64
    };
    match order {
        SortOrder::None => {}
        SortOrder::AreaDesc => items.sort_by(|a, b| area(b).cmp(&area(a))),
        SortOrder::MaxSideDesc => {
            items.sort_by(|a, b| {
                let (aw, ah) = size(a);
                let (bw, bh) = size(b);
                bw.max(bh).cmp(&aw.max(ah))
            });
        }
        SortOrder::HeightDesc => items.sort_by(|a, b| size(b).1.cmp(&size(a).1)),
        SortOrder::WidthDesc => items.sort_by(|a, b| size(b).0.cmp(&size(a).0)),
        SortOrder::NameAsc => items.sort_by(|a, b| name(a).cmp(&name(b))),
    }
}
