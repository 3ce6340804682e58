use super::{Candidate, FreeSpace, find_best};
use crate::config::{PlacementHeuristic, SplitHeuristic};
use crate::model::Rect;

/// Disjoint free-space partition. Every placement removes one free rectangle
/// and cuts the L-shaped leftover into at most two new ones, so free
/// rectangles never overlap and free + used always tile the bin.
pub struct GuillotineSpace {
    width: u32,
    height: u32,
    free: Vec<Rect>,
    used: Vec<Rect>,
    split: SplitHeuristic,
    merge: bool,
}

impl GuillotineSpace {
    pub fn new(width: u32, height: u32, split: SplitHeuristic, merge: bool) -> Self {
        Self {
            width,
            height,
            free: vec![Rect::new(0, 0, width, height)],
            used: Vec::new(),
            split,
            merge,
        }
    }

    /// Best free rectangle for a `w x h` request, see [`find_best`].
    pub fn find_best(
        &self,
        w: u32,
        h: u32,
        heuristic: PlacementHeuristic,
        allow_rotation: bool,
    ) -> Option<Candidate> {
        find_best(&self.free, w, h, heuristic, allow_rotation)
    }

    /// Removes `free[idx]` and re-adds the two guillotine pieces left around `placed`.
    pub fn consume(&mut self, idx: usize, placed: &Rect) {
        let fr = self.free.remove(idx);
        let (bottom, right) = self.split_free_rect(&fr, placed);
        if let Some(r) = bottom {
            self.free.push(r);
        }
        if let Some(r) = right {
            self.free.push(r);
        }
    }

    fn split_free_rect(&self, fr: &Rect, placed: &Rect) -> (Option<Rect>, Option<Rect>) {
        let split_horizontal = self.split.split_horizontal(fr, placed);

        let mut bottom = Rect::new(fr.x, fr.y + placed.h, 0, fr.h - placed.h);
        let mut right = Rect::new(fr.x + placed.w, fr.y, fr.w - placed.w, 0);
        if split_horizontal {
            bottom.w = fr.w;
            right.h = placed.h;
        } else {
            bottom.w = placed.w;
            right.h = fr.h;
        }
        let bottom = (!bottom.is_empty()).then_some(bottom);
        let right = (!right.is_empty()).then_some(right);
        (bottom, right)
    }

    /// One O(n²) pass joining free rectangles that share a full edge.
    /// Chains of three or more may need another call.
    pub fn merge_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut j = i + 1;
            while j < self.free.len() {
                let a = self.free[i];
                let b = self.free[j];
                let merged = if a.w == b.w && a.x == b.x {
                    if a.y == b.bottom_ex() {
                        Some(Rect::new(a.x, b.y, a.w, a.h + b.h))
                    } else if a.bottom_ex() == b.y {
                        Some(Rect::new(a.x, a.y, a.w, a.h + b.h))
                    } else {
                        None
                    }
                } else if a.h == b.h && a.y == b.y {
                    if a.x == b.right_ex() {
                        Some(Rect::new(b.x, a.y, a.w + b.w, a.h))
                    } else if a.right_ex() == b.x {
                        Some(Rect::new(a.x, a.y, a.w + b.w, a.h))
                    } else {
                        None
                    }
                } else {
                    None
                };
                match merged {
                    Some(r) => {
                        self.free[i] = r;
                        // j now holds the next candidate
                        self.free.remove(j);
                    }
                    None => j += 1,
                }
            }
            i += 1;
        }
    }
}

impl FreeSpace for GuillotineSpace {
    fn reset(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.free.clear();
        self.free.push(Rect::new(0, 0, width, height));
        self.used.clear();
    }

    fn bin_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    fn used_rects(&self) -> &[Rect] {
        &self.used
    }

    fn commit(&mut self, free_index: usize, placed: Rect) {
        self.consume(free_index, &placed);
        if self.merge {
            self.merge_free_list();
        }
        self.used.push(placed);
    }
}
