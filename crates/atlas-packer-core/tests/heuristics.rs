use atlas_packer_core::config::{PlacementHeuristic, SplitHeuristic};
use atlas_packer_core::model::Rect;
use atlas_packer_core::packer::find_best;

#[test]
fn placement_scores_for_40x90_in_100x100() {
    let fr = Rect::new(0, 0, 100, 100);
    assert_eq!(PlacementHeuristic::BestShortSideFit.score(&fr, 40, 90), 10);
    assert_eq!(PlacementHeuristic::BestAreaFit.score(&fr, 40, 90), 6400);
    assert_eq!(PlacementHeuristic::BestLongSideFit.score(&fr, 40, 90), 60);
    assert_eq!(PlacementHeuristic::WorstShortSideFit.score(&fr, 40, 90), -10);
    assert_eq!(PlacementHeuristic::WorstAreaFit.score(&fr, 40, 90), -6400);
    assert_eq!(PlacementHeuristic::WorstLongSideFit.score(&fr, 40, 90), -60);
}

#[test]
fn split_axis_rules() {
    // leftover w = 60, h = 10
    let fr = Rect::new(0, 0, 100, 100);
    let placed = Rect::new(0, 0, 40, 90);
    assert!(!SplitHeuristic::SplitShorterLeftoverAxis.split_horizontal(&fr, &placed));
    assert!(SplitHeuristic::SplitLongerLeftoverAxis.split_horizontal(&fr, &placed));
    // 40 * 10 vs 60 * 90
    assert!(!SplitHeuristic::SplitMinimizeArea.split_horizontal(&fr, &placed));
    assert!(SplitHeuristic::SplitMaximizeArea.split_horizontal(&fr, &placed));
    assert!(SplitHeuristic::SplitShorterAxis.split_horizontal(&fr, &placed));
    assert!(!SplitHeuristic::SplitLongerAxis.split_horizontal(&fr, &placed));

    let wide = Rect::new(0, 0, 200, 50);
    assert!(!SplitHeuristic::SplitShorterAxis.split_horizontal(&wide, &placed));
    assert!(SplitHeuristic::SplitLongerAxis.split_horizontal(&wide, &placed));
}

#[test]
fn exact_fit_wins_immediately() {
    let free = [Rect::new(0, 0, 50, 100), Rect::new(100, 0, 40, 90), Rect::new(200, 0, 41, 90)];
    let c = find_best(&free, 40, 90, PlacementHeuristic::BestShortSideFit, false).unwrap();
    assert_eq!(c.free_index, 1);
    assert_eq!(c.score, i64::MIN);
    assert_eq!(c.rect, Rect::new(100, 0, 40, 90));
    assert!(!c.rotated);
}

#[test]
fn exact_rotated_fit_is_reported_rotated() {
    let free = [Rect::new(0, 0, 100, 100), Rect::new(0, 100, 90, 40)];
    let c = find_best(&free, 40, 90, PlacementHeuristic::BestAreaFit, true).unwrap();
    assert_eq!(c.free_index, 1);
    assert!(c.rotated);
    assert_eq!(c.rect, Rect::new(0, 100, 90, 40));
}

#[test]
fn rotated_fit_only_when_upright_does_not_fit() {
    let free = [Rect::new(0, 0, 100, 40)];
    assert!(find_best(&free, 40, 90, PlacementHeuristic::BestShortSideFit, false).is_none());
    let c = find_best(&free, 40, 90, PlacementHeuristic::BestShortSideFit, true).unwrap();
    assert!(c.rotated);
    assert_eq!((c.rect.w, c.rect.h), (90, 40));
    // scored with swapped dimensions: min(100 - 90, 40 - 40)
    assert_eq!(c.score, 0);

    // upright fits, so rotation is not tried in the same rect
    let square = [Rect::new(0, 0, 100, 100)];
    let c = find_best(&square, 40, 90, PlacementHeuristic::BestShortSideFit, true).unwrap();
    assert!(!c.rotated);
}

#[test]
fn ties_keep_the_first_free_rect() {
    let free = [Rect::new(0, 0, 60, 60), Rect::new(100, 0, 60, 60)];
    let c = find_best(&free, 10, 10, PlacementHeuristic::BestAreaFit, false).unwrap();
    assert_eq!(c.free_index, 0);
}

#[test]
fn worst_fit_prefers_the_roomiest_rect() {
    let free = [Rect::new(0, 0, 20, 20), Rect::new(0, 20, 80, 80)];
    let best = find_best(&free, 10, 10, PlacementHeuristic::BestAreaFit, false).unwrap();
    let worst = find_best(&free, 10, 10, PlacementHeuristic::WorstAreaFit, false).unwrap();
    assert_eq!(best.free_index, 0);
    assert_eq!(worst.free_index, 1);
}
