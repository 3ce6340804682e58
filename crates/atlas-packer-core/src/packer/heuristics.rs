use crate::config::{PlacementHeuristic, SplitHeuristic};
use crate::model::Rect;

impl PlacementHeuristic {
    /// Penalty for putting a `w x h` request into `fr`; smaller is better.
    /// Assumes the request fits.
    pub fn score(&self, fr: &Rect, w: u32, h: u32) -> i64 {
        let area_fit = fr.area() as i64 - (w as i64 * h as i64);
        let leftover_h = (fr.w as i64 - w as i64).abs();
        let leftover_v = (fr.h as i64 - h as i64).abs();
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        match self {
            PlacementHeuristic::BestAreaFit => area_fit,
            PlacementHeuristic::BestShortSideFit => short_fit,
            PlacementHeuristic::BestLongSideFit => long_fit,
            PlacementHeuristic::WorstAreaFit => -area_fit,
            PlacementHeuristic::WorstShortSideFit => -short_fit,
            PlacementHeuristic::WorstLongSideFit => -long_fit,
        }
    }
}

impl SplitHeuristic {
    /// Decides whether the L-shaped leftover of `placed` inside `fr` is cut
    /// horizontally (bottom piece spans the full free width).
    pub fn split_horizontal(&self, fr: &Rect, placed: &Rect) -> bool {
        let w = fr.w as i64 - placed.w as i64;
        let h = fr.h as i64 - placed.h as i64;
        let (pw, ph) = (placed.w as i64, placed.h as i64);
        match self {
            SplitHeuristic::SplitShorterLeftoverAxis => w <= h,
            SplitHeuristic::SplitLongerLeftoverAxis => w > h,
            SplitHeuristic::SplitMinimizeArea => pw * h > w * ph,
            SplitHeuristic::SplitMaximizeArea => pw * h <= w * ph,
            SplitHeuristic::SplitShorterAxis => fr.w <= fr.h,
            SplitHeuristic::SplitLongerAxis => fr.w > fr.h,
        }
    }
}
