use plotline::core::{CartesianCoordinateSystem, LogicalPoint, PlotExtent};
use plotline::curve::{FillAnchor, build_fill};
use proptest::prelude::*;

fn anchor_strategy() -> impl Strategy<Value = FillAnchor> {
    prop_oneof![
        Just(FillAnchor::Above),
        Just(FillAnchor::Below),
        Just(FillAnchor::ZeroBaseline),
        Just(FillAnchor::Left),
        Just(FillAnchor::Right),
    ]
}

proptest! {
    #[test]
    fn fill_regions_are_always_closed(
        ys in prop::collection::vec(0.01f64..99.99, 2..40),
        anchor in anchor_strategy(),
        split in any::<bool>(),
    ) {
        let extent = PlotExtent::new(0.0, ys.len() as f64, 0.0, 100.0).expect("valid extent");
        let cs = CartesianCoordinateSystem::identity(extent).expect("valid coordinate system");
        let points: Vec<LogicalPoint> = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| LogicalPoint::new(i as f64, y))
            .collect();
        let connected = vec![true; points.len()];

        let polygons = build_fill(&points, &connected, &[], &cs, anchor, split);
        prop_assert!(!polygons.is_empty());
        for polygon in &polygons {
            prop_assert!(polygon.is_closed());
            prop_assert!(polygon.vertices.len() >= 3);
        }
    }

    #[test]
    fn gap_patterns_never_leave_open_regions(
        ys in prop::collection::vec(0.01f64..99.99, 3..30),
        gaps in prop::collection::vec(any::<bool>(), 3..30),
        anchor in anchor_strategy(),
    ) {
        let extent = PlotExtent::new(0.0, ys.len() as f64, 0.0, 100.0).expect("valid extent");
        let cs = CartesianCoordinateSystem::identity(extent).expect("valid coordinate system");
        let points: Vec<LogicalPoint> = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| LogicalPoint::new(i as f64, y))
            .collect();
        let connected: Vec<bool> = points
            .iter()
            .enumerate()
            .map(|(i, _)| gaps.get(i).copied().unwrap_or(true))
            .collect();

        for split in [false, true] {
            let polygons = build_fill(&points, &connected, &[], &cs, anchor, split);
            for polygon in &polygons {
                prop_assert!(polygon.is_closed());
            }
        }
    }

    #[test]
    fn mapping_round_trips_inside_the_extent(
        x in 0.0f64..100.0,
        y in 0.0f64..100.0,
    ) {
        let extent = PlotExtent::new(0.0, 100.0, 0.0, 100.0).expect("valid extent");
        let cs = CartesianCoordinateSystem::linear(extent, 640.0, 480.0)
            .expect("valid coordinate system");
        let point = LogicalPoint::new(x, y);

        let scene = cs.map_point(point).expect("point inside the extent maps");
        let recovered = cs.inverse_map_point(scene).expect("scene point maps back");
        prop_assert!((recovered.x - x).abs() <= 1e-7);
        prop_assert!((recovered.y - y).abs() <= 1e-7);
    }
}
