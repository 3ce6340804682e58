use super::FreeSpace;
use crate::model::Rect;

/// Overlapping free-space partition (maximal free rectangles).
///
/// Free rectangles may overlap but none is contained in another, and every
/// free pixel of the bin is covered by at least one of them.
pub struct MaxRectsSpace {
    width: u32,
    height: u32,
    free: Vec<Rect>,
    used: Vec<Rect>,
}

impl MaxRectsSpace {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            free: vec![Rect::new(0, 0, width, height)],
            used: Vec::new(),
        }
    }

    /// Carves `node` out of every free rectangle it touches, then prunes.
    pub fn place_rect(&mut self, node: &Rect) {
        let mut new_free: Vec<Rect> = Vec::new();
        let mut i = 0usize;
        while i < self.free.len() {
            let fr = self.free[i];
            if fr.intersects(node) {
                self.free.swap_remove(i);
                split_free_node(fr, node, &mut new_free);
            } else {
                i += 1;
            }
        }
        self.free.extend(new_free);
        self.prune_free_list();
        self.used.push(*node);
    }

    /// Removes every free rectangle contained in another one.
    pub fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut j = i + 1;
            let mut remove_i = false;
            while j < self.free.len() {
                if self.free[j].contains(&self.free[i]) {
                    remove_i = true;
                    break;
                }
                if self.free[i].contains(&self.free[j]) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if remove_i {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn free_list_len(&self) -> usize {
        self.free.len()
    }
}

/// Pushes the up to four maximal pieces of `fr` that lie left, right, above
/// and below `node`. Degenerate pieces are skipped.
fn split_free_node(fr: Rect, node: &Rect, out: &mut Vec<Rect>) {
    let fr_x2 = fr.right_ex();
    let fr_y2 = fr.bottom_ex();
    let n_x2 = node.right_ex();
    let n_y2 = node.bottom_ex();

    // left
    if node.x > fr.x && node.x < fr_x2 {
        out.push(Rect::new(fr.x, fr.y, node.x - fr.x, fr.h));
    }
    // right
    if n_x2 > fr.x && n_x2 < fr_x2 {
        out.push(Rect::new(n_x2, fr.y, fr_x2 - n_x2, fr.h));
    }
    // top
    if node.y > fr.y && node.y < fr_y2 {
        out.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
    }
    // bottom
    if n_y2 > fr.y && n_y2 < fr_y2 {
        out.push(Rect::new(fr.x, n_y2, fr.w, fr_y2 - n_y2));
    }
}

impl FreeSpace for MaxRectsSpace {
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

    fn commit(&mut self, _free_index: usize, placed: Rect) {
        self.place_rect(&placed);
    }
}
