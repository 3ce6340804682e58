use crate::config::{PackerConfig, PartitionStrategy, PlacementHeuristic};
use crate::model::{Rect, SizeRequest};

pub mod guillotine;
mod heuristics;
pub mod maxrects;

use guillotine::GuillotineSpace;
use maxrects::MaxRectsSpace;

/// The free area of one bin.
///
/// Implementations own the free and used rectangle lists. `commit` must leave
/// the free list consistent with the strategy's invariant (disjoint for
/// Guillotine, containment-free for MaxRects) and never overlapping a used rect.
pub trait FreeSpace {
    /// Clears the bin to a single free rectangle of `width x height`.
    fn reset(&mut self, width: u32, height: u32);
    fn bin_size(&self) -> (u32, u32);
    fn free_rects(&self) -> &[Rect];
    fn used_rects(&self) -> &[Rect];
    /// Records `placed`, which was chosen inside `free_rects()[free_index]`.
    fn commit(&mut self, free_index: usize, placed: Rect);

    /// Used area / bin area. Computed on every call.
    fn occupancy(&self) -> f64 {
        let (w, h) = self.bin_size();
        let bin_area = w as u64 * h as u64;
        if bin_area == 0 {
            return 0.0;
        }
        let used: u64 = self.used_rects().iter().map(Rect::area).sum();
        used as f64 / bin_area as f64
    }
}

/// Builds the free-space partition selected by `cfg.strategy`.
pub fn new_free_space(cfg: &PackerConfig, width: u32, height: u32) -> Box<dyn FreeSpace> {
    match cfg.strategy {
        PartitionStrategy::MaxRects => Box::new(MaxRectsSpace::new(width, height)),
        PartitionStrategy::Guillotine => {
            Box::new(GuillotineSpace::new(width, height, cfg.split, cfg.merge))
        }
    }
}

/// A candidate position for a request inside a free rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub free_index: usize,
    /// Placed rectangle in placed orientation.
    pub rect: Rect,
    pub rotated: bool,
    /// `i64::MIN` for exact fits.
    pub score: i64,
}

/// Outcome of testing one request against one free rectangle.
enum Fit {
    Exact { rotated: bool },
    Scored { rotated: bool, score: i64 },
    None,
}

fn fit(fr: &Rect, w: u32, h: u32, heuristic: PlacementHeuristic, allow_rotation: bool) -> Fit {
    if fr.w == w && fr.h == h {
        Fit::Exact { rotated: false }
    } else if allow_rotation && fr.w == h && fr.h == w {
        Fit::Exact { rotated: true }
    } else if w <= fr.w && h <= fr.h {
        Fit::Scored {
            rotated: false,
            score: heuristic.score(fr, w, h),
        }
    } else if allow_rotation && h <= fr.w && w <= fr.h {
        Fit::Scored {
            rotated: true,
            score: heuristic.score(fr, h, w),
        }
    } else {
        Fit::None
    }
}

fn candidate(free_index: usize, fr: &Rect, w: u32, h: u32, rotated: bool, score: i64) -> Candidate {
    let (pw, ph) = if rotated { (h, w) } else { (w, h) };
    Candidate {
        free_index,
        rect: Rect::new(fr.x, fr.y, pw, ph),
        rotated,
        score,
    }
}

/// Scans `free` for the best spot for a `w x h` request.
///
/// Per free rectangle the cases are tried in order: exact upright fit, exact
/// rotated fit (either ends the scan), upright fit, rotated fit. The lowest
/// score wins; ties keep the earliest free rectangle.
pub fn find_best(
    free: &[Rect],
    w: u32,
    h: u32,
    heuristic: PlacementHeuristic,
    allow_rotation: bool,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for (i, fr) in free.iter().enumerate() {
        match fit(fr, w, h, heuristic, allow_rotation) {
            Fit::Exact { rotated } => return Some(candidate(i, fr, w, h, rotated, i64::MIN)),
            Fit::Scored { rotated, score } => {
                if best.is_none_or(|b| score < b.score) {
                    best = Some(candidate(i, fr, w, h, rotated, score));
                }
            }
            Fit::None => {}
        }
    }
    best
}

/// A request that `BinPacker::insert_many` managed to place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedRequest<K> {
    pub key: K,
    pub rect: Rect,
    pub rotated: bool,
}

/// Drives one bin: picks positions with a placement heuristic and commits them
/// into the underlying free-space partition.
pub struct BinPacker {
    space: Box<dyn FreeSpace>,
    heuristic: PlacementHeuristic,
    allow_rotation: bool,
}

impl BinPacker {
    pub fn new(space: Box<dyn FreeSpace>, heuristic: PlacementHeuristic, allow_rotation: bool) -> Self {
        Self {
            space,
            heuristic,
            allow_rotation,
        }
    }

    /// A packer for an empty `width x height` bin using the strategy and heuristic from `cfg`.
    pub fn from_config(cfg: &PackerConfig, width: u32, height: u32) -> Self {
        Self::new(
            new_free_space(cfg, width, height),
            cfg.heuristic,
            cfg.allow_rotation,
        )
    }

    /// Places a single `w x h` request. Returns `None` when nothing fits.
    pub fn insert(&mut self, w: u32, h: u32) -> Option<Candidate> {
        let best = find_best(
            self.space.free_rects(),
            w,
            h,
            self.heuristic,
            self.allow_rotation,
        )?;
        self.space.commit(best.free_index, best.rect);
        Some(best)
    }

    /// Places as many of `requests` as fit, always committing the best
    /// (free rect, request, orientation) triple over the whole pending set.
    ///
    /// Placed requests are removed from `requests` (order of the rest is not
    /// preserved); what is left did not fit.
    pub fn insert_many<K>(&mut self, requests: &mut Vec<SizeRequest<K>>) -> Vec<PlacedRequest<K>> {
        let mut placed = Vec::new();
        while !requests.is_empty() {
            let mut best: Option<(usize, Candidate)> = None;
            'search: for (i, fr) in self.space.free_rects().iter().enumerate() {
                for (j, req) in requests.iter().enumerate() {
                    match fit(fr, req.w, req.h, self.heuristic, self.allow_rotation) {
                        Fit::Exact { rotated } => {
                            best = Some((j, candidate(i, fr, req.w, req.h, rotated, i64::MIN)));
                            break 'search;
                        }
                        Fit::Scored { rotated, score } => {
                            if best.is_none_or(|(_, b)| score < b.score) {
                                best = Some((j, candidate(i, fr, req.w, req.h, rotated, score)));
                            }
                        }
                        Fit::None => {}
                    }
                }
            }
            let Some((req_index, cand)) = best else {
                break;
            };
            self.space.commit(cand.free_index, cand.rect);
            let req = requests.swap_remove(req_index);
            placed.push(PlacedRequest {
                key: req.key,
                rect: cand.rect,
                rotated: cand.rotated,
            });
        }
        placed
    }

    pub fn occupancy(&self) -> f64 {
        self.space.occupancy()
    }

    pub fn free_rects(&self) -> &[Rect] {
        self.space.free_rects()
    }

    pub fn used_rects(&self) -> &[Rect] {
        self.space.used_rects()
    }

    pub fn bin_size(&self) -> (u32, u32) {
        self.space.bin_size()
    }
}
