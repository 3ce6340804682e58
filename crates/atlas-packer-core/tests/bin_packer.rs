use atlas_packer_core::config::{PackerConfig, PartitionStrategy, PlacementHeuristic};
use atlas_packer_core::model::{Rect, SizeRequest};
use atlas_packer_core::packer::BinPacker;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn cfg(strategy: PartitionStrategy) -> PackerConfig {
    PackerConfig::builder()
        .strategy(strategy)
        .heuristic(PlacementHeuristic::BestAreaFit)
        .allow_rotation(true)
        .build()
}

fn disjoint(rects: &[Rect]) -> bool {
    rects
        .iter()
        .enumerate()
        .all(|(i, a)| rects[i + 1..].iter().all(|b| !a.intersects(b)))
}

#[test]
fn insert_until_full() {
    let mut p = BinPacker::from_config(&cfg(PartitionStrategy::Guillotine), 64, 64);
    let c = p.insert(32, 32).unwrap();
    assert_eq!(c.rect, Rect::new(0, 0, 32, 32));
    assert!((p.occupancy() - 0.25).abs() < 1e-9);
    assert!(p.insert(64, 64).is_none());
    for _ in 0..3 {
        assert!(p.insert(32, 32).is_some());
    }
    assert!(p.insert(1, 1).is_none());
    assert!((p.occupancy() - 1.0).abs() < 1e-9);
}

#[test]
fn insert_many_takes_exact_fit_first() {
    for strategy in [PartitionStrategy::MaxRects, PartitionStrategy::Guillotine] {
        let mut p = BinPacker::from_config(&cfg(strategy), 100, 100);
        let mut requests = vec![SizeRequest::new("small", 30, 30), SizeRequest::new("full", 100, 100)];
        let placed = p.insert_many(&mut requests);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].key, "full");
        assert_eq!(placed[0].rect, Rect::new(0, 0, 100, 100));
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].key, "small");
    }
}

#[test]
fn insert_many_places_everything_that_fits_without_overlap() {
    for strategy in [PartitionStrategy::MaxRects, PartitionStrategy::Guillotine] {
        let mut rng = StdRng::seed_from_u64(42);
        let mut requests: Vec<SizeRequest<usize>> = (0..60)
            .map(|i| SizeRequest::new(i, rng.gen_range(4..=40), rng.gen_range(4..=40)))
            .collect();
        let total = requests.len();
        let mut p = BinPacker::from_config(&cfg(strategy), 256, 256);
        let placed = p.insert_many(&mut requests);

        assert_eq!(placed.len() + requests.len(), total);
        let rects: Vec<Rect> = placed.iter().map(|pr| pr.rect).collect();
        assert!(disjoint(&rects));
        for r in &rects {
            assert!(Rect::new(0, 0, 256, 256).contains(r));
        }
        let mut keys: Vec<usize> = placed.iter().map(|pr| pr.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), placed.len());
        // leftovers really do not fit anywhere
        for req in &requests {
            assert!(
                p.free_rects()
                    .iter()
                    .all(|f| !(req.w <= f.w && req.h <= f.h) && !(req.h <= f.w && req.w <= f.h))
            );
        }
    }
}

#[test]
fn rotated_requests_report_swapped_dims() {
    let mut p = BinPacker::from_config(&cfg(PartitionStrategy::MaxRects), 100, 40);
    let mut requests = vec![SizeRequest::new(0u8, 40, 100)];
    let placed = p.insert_many(&mut requests);
    assert_eq!(placed.len(), 1);
    assert!(placed[0].rotated);
    assert_eq!(placed[0].rect, Rect::new(0, 0, 100, 40));
}
