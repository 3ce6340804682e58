use atlas_packer_core::config::PlacementHeuristic;
use atlas_packer_core::model::Rect;
use atlas_packer_core::packer::maxrects::MaxRectsSpace;
use atlas_packer_core::packer::{FreeSpace, find_best};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HEURISTICS: [PlacementHeuristic; 6] = [
    PlacementHeuristic::BestAreaFit,
    PlacementHeuristic::BestShortSideFit,
    PlacementHeuristic::BestLongSideFit,
    PlacementHeuristic::WorstAreaFit,
    PlacementHeuristic::WorstShortSideFit,
    PlacementHeuristic::WorstLongSideFit,
];

fn assert_invariants(space: &MaxRectsSpace) {
    let (w, h) = space.bin_size();
    let free = space.free_rects();
    let used = space.used_rects();

    for (i, a) in free.iter().enumerate() {
        for (j, b) in free.iter().enumerate() {
            if i != j {
                assert!(!b.contains(a), "free {a:?} is inside free {b:?}");
            }
        }
        for u in used {
            assert!(!a.intersects(u), "free {a:?} overlaps used {u:?}");
        }
    }
    for (i, a) in used.iter().enumerate() {
        assert!(Rect::new(0, 0, w, h).contains(a));
        for b in &used[i + 1..] {
            assert!(!a.intersects(b), "used {a:?} overlaps used {b:?}");
        }
    }
    // every cell not covered by a placement is covered by some free rect
    for y in 0..h {
        for x in 0..w {
            let cell = Rect::new(x, y, 1, 1);
            if used.iter().any(|u| u.contains(&cell)) {
                continue;
            }
            assert!(
                free.iter().any(|f| f.contains(&cell)),
                "free cell ({x},{y}) is not covered"
            );
        }
    }
}

#[test]
fn random_fills_keep_maximal_free_list() {
    for (seed, heuristic) in HEURISTICS.into_iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(seed as u64 + 7);
        let mut space = MaxRectsSpace::new(64, 64);
        for _ in 0..40 {
            let w = rng.gen_range(1..=16);
            let h = rng.gen_range(1..=16);
            let Some(c) = find_best(space.free_rects(), w, h, heuristic, seed % 2 == 0) else {
                continue;
            };
            assert!(space.free_rects()[c.free_index].contains(&c.rect));
            space.commit(c.free_index, c.rect);
            assert_invariants(&space);
        }
    }
}

#[test]
fn first_placement_leaves_two_maximal_rects() {
    let mut space = MaxRectsSpace::new(100, 100);
    space.place_rect(&Rect::new(0, 0, 40, 90));
    let mut free = space.free_rects().to_vec();
    free.sort_by_key(|r| (r.x, r.y));
    assert_eq!(free, vec![Rect::new(0, 90, 100, 10), Rect::new(40, 0, 60, 100)]);
}

#[test]
fn centre_placement_splits_into_four_sides() {
    let mut space = MaxRectsSpace::new(30, 30);
    space.place_rect(&Rect::new(10, 10, 10, 10));
    assert_eq!(space.free_list_len(), 4);
    assert_invariants(&space);
}

#[test]
fn full_bin_has_no_free_space() {
    let mut space = MaxRectsSpace::new(16, 16);
    space.place_rect(&Rect::new(0, 0, 16, 8));
    space.place_rect(&Rect::new(0, 8, 16, 8));
    assert!(space.free_rects().is_empty());
    assert!((space.occupancy() - 1.0).abs() < f64::EPSILON);
}
