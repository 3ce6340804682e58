use crate::atlas_bin::{AtlasBin, BinItem};
use crate::config::{PackerConfig, PlacementOrder};
use crate::error::{AtlasPackerError, Result};
use crate::model::{Atlas, LayoutItem, PackStats};
use crate::preprocess::{InputImage, prepare_inputs, sort_by_order};
use image::RgbaImage;
use tracing::{debug, instrument};

/// Output RGBA page and its atlas record.
pub struct OutputPage {
    pub atlas: Atlas,
    pub rgba: RgbaImage,
}

/// Output of a packing run, one page per bin.
pub struct PackOutput {
    pub pages: Vec<OutputPage>,
}

impl PackOutput {
    /// Atlas records in page order.
    pub fn atlases(&self) -> Vec<Atlas> {
        self.pages.iter().map(|p| p.atlas.clone()).collect()
    }

    pub fn stats(&self) -> PackStats {
        PackStats::from_atlases(&self.atlases())
    }
}

/// Packs `inputs` into atlas pages using configuration `cfg` and returns metadata and RGBA pages.
///
/// Notes:
/// - Images are premultiplied/trimmed first, then stably sorted per `cfg.sort_order`.
/// - Bins are filled one after another; leftovers of a bin open the next one.
/// - Fails with `ImageTooLarge` if a fresh bin cannot take the next image.
#[instrument(skip_all, fields(inputs = inputs.len()))]
pub fn pack_images(inputs: Vec<InputImage>, cfg: PackerConfig) -> Result<PackOutput> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(AtlasPackerError::Empty);
    }

    let prepared = prepare_inputs(inputs, &cfg)?;
    let bins = pack_bins(prepared, &cfg)?;

    let pages = bins
        .iter()
        .enumerate()
        .map(|(i, bin)| OutputPage {
            atlas: bin.to_atlas(atlas_name(&cfg, i), &cfg),
            rgba: bin.composite(),
        })
        .collect();
    Ok(PackOutput { pages })
}

/// Packs sizes into atlases without pixel data.
/// Inputs are (key, width, height).
pub fn pack_layout<K: Into<String>>(
    inputs: Vec<(K, u32, u32)>,
    cfg: PackerConfig,
) -> Result<Vec<Atlas>> {
    let items = inputs
        .into_iter()
        .map(|(k, w, h)| LayoutItem::new(k, w, h))
        .collect();
    pack_layout_items(items, cfg)
}

/// Packs layout-only items, carrying their frame data through.
#[instrument(skip_all, fields(inputs = items.len()))]
pub fn pack_layout_items(items: Vec<LayoutItem>, cfg: PackerConfig) -> Result<Vec<Atlas>> {
    cfg.validate()?;
    if items.is_empty() {
        return Err(AtlasPackerError::Empty);
    }
    if let Some(bad) = items.iter().find(|it| it.w == 0 || it.h == 0) {
        return Err(AtlasPackerError::InvalidInput(format!(
            "item '{}' has zero size ({}x{})",
            bad.name, bad.w, bad.h
        )));
    }

    let bins = pack_bins(items, &cfg)?;
    Ok(bins
        .iter()
        .enumerate()
        .map(|(i, bin)| bin.to_atlas(atlas_name(&cfg, i), &cfg))
        .collect())
}

fn atlas_name(cfg: &PackerConfig, index: usize) -> String {
    format!("{}{}.png", cfg.name, index)
}

/// Sorts `items` and fills bins until nothing is pending.
fn pack_bins<T: BinItem>(mut items: Vec<T>, cfg: &PackerConfig) -> Result<Vec<AtlasBin<T>>> {
    sort_by_order(
        &mut items,
        cfg.sort_order,
        |t| (t.width(), t.height()),
        |t| t.name(),
    );
    // stack: next item on top
    items.reverse();

    let mut bins = Vec::new();
    while !items.is_empty() {
        let mut bin = AtlasBin::new(cfg);
        let accepted = match cfg.order {
            PlacementOrder::Sequential => bin.pack(&mut items),
            PlacementOrder::GlobalBestFit => bin.pack_global(&mut items),
        };
        if accepted == 0 {
            // a fresh bin rejected the largest pending item
            return Err(match items.last() {
                Some(next) => AtlasPackerError::ImageTooLarge {
                    name: next.name().to_string(),
                    width: next.width(),
                    height: next.height(),
                    max_width: cfg.max_width,
                    max_height: cfg.max_height,
                },
                None => AtlasPackerError::Empty,
            });
        }
        bin.shrink();
        debug!(
            bin = bins.len(),
            accepted,
            pending = items.len(),
            width = bin.width(),
            height = bin.height(),
            occupancy = bin.occupancy(),
            "bin closed"
        );
        bins.push(bin);
    }
    Ok(bins)
}
