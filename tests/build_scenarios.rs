#![allow(clippy::unwrap_used)]

use approx::{assert_abs_diff_eq, assert_relative_eq};
use subsplit::{BspBuilder, BspConfig, BspNode, Diagnostic, LineId, MapLine, Subsector};

const UNIT_SQUARE: [(f64, f64); 4] = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];

const L_ROOM: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.0, 2.0),
    (1.0, 2.0),
    (1.0, 1.0),
    (2.0, 1.0),
    (2.0, 0.0),
];

fn build(lines: &[MapLine]) -> Option<BspNode> {
    let mut builder = BspBuilder::new(lines, BspConfig::default()).unwrap();
    builder.build().unwrap();
    builder.into_tree()
}

fn assert_clockwise_and_closed(subsector: &Subsector) {
    let edges = subsector.edges();
    assert!(edges.len() >= 3);
    for (edge, next) in edges.iter().zip(edges.iter().cycle().skip(1)) {
        assert_eq!(edge.end, next.start);
    }
    let points = subsector.vertices();
    let n = points.len();
    let twice_area: f64 = (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            points[i].x * points[j].y - points[j].x * points[i].y
        })
        .sum();
    assert!(twice_area < 0.0, "subsector is not clockwise");
}

#[test]
fn unit_square_builds_one_leaf() {
    let tree = build(&MapLine::closed_loop(&UNIT_SQUARE)).unwrap();
    let BspNode::Leaf(subsector) = &tree else {
        panic!("expected a single leaf, got {tree:?}");
    };
    assert_eq!(subsector.edges().len(), 4);
    assert_relative_eq!(subsector.area(), 1.0);
    assert_clockwise_and_closed(subsector);
    let lines: Vec<_> = subsector.edges().iter().map(|e| e.line).collect();
    assert_eq!(
        lines,
        vec![Some(LineId(0)), Some(LineId(1)), Some(LineId(2)), Some(LineId(3))]
    );
}

#[test]
fn counter_clockwise_square_still_yields_clockwise_leaf() {
    let ccw: Vec<_> = UNIT_SQUARE.iter().rev().copied().collect();
    let tree = build(&MapLine::closed_loop(&ccw)).unwrap();
    let BspNode::Leaf(subsector) = &tree else {
        panic!("expected a single leaf");
    };
    assert_clockwise_and_closed(subsector);
    assert!(subsector.edges().iter().all(|e| !e.is_front));
}

#[test]
fn collinear_loop_has_no_tree() {
    let lines = MapLine::closed_loop(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
    assert!(build(&lines).is_none());
}

#[test]
fn open_collinear_chain_is_pruned_away() {
    let lines = vec![
        MapLine::one_sided((0.0, 0.0), (1.0, 0.0)),
        MapLine::one_sided((1.0, 0.0), (2.0, 0.0)),
        MapLine::one_sided((2.0, 0.0), (3.0, 0.0)),
    ];
    let mut builder = BspBuilder::new(&lines, BspConfig::default()).unwrap();
    assert!(builder.build().unwrap().is_none());
    assert!(builder
        .diagnostics()
        .entries()
        .contains(&Diagnostic::PrunedDanglingSegments { count: 3 }));
}

#[test]
fn l_room_splits_into_two_leaves() {
    let tree = build(&MapLine::closed_loop(&L_ROOM)).unwrap();
    assert_eq!(tree.split_count(), 1);
    assert_eq!(tree.subsector_count(), 2);
    assert_eq!(tree.total_node_count(), 3);

    let BspNode::Split {
        splitter,
        left,
        right,
    } = &tree
    else {
        panic!("expected a split root");
    };
    // The inner vertical wall cuts only the bottom wall.
    assert_eq!(splitter.line, Some(LineId(2)));
    assert_relative_eq!(splitter.start.x, 1.0);
    assert_relative_eq!(splitter.end.x, 1.0);

    let (BspNode::Leaf(left), BspNode::Leaf(right)) = (left.as_ref(), right.as_ref()) else {
        panic!("expected two leaves");
    };
    assert_relative_eq!(left.area(), 1.0);
    assert_relative_eq!(right.area(), 2.0);
    assert_eq!(left.edges().len(), 4);
    assert_eq!(right.edges().len(), 5);
    assert_clockwise_and_closed(left);
    assert_clockwise_and_closed(right);

    // Both sides share the one miniseg closing the gap under the inner wall.
    for leaf in [left, right] {
        let minisegs: Vec<_> = leaf.edges().iter().filter(|e| e.is_miniseg()).collect();
        assert_eq!(minisegs.len(), 1);
        assert_relative_eq!(minisegs[0].start.x, 1.0);
        assert_relative_eq!(minisegs[0].end.x, 1.0);
    }
}

#[test]
fn two_sided_divider_splits_without_minisegs() {
    let mut lines = MapLine::closed_loop(&[
        (0.0, 0.0),
        (0.0, 2.0),
        (1.0, 2.0),
        (2.0, 2.0),
        (2.0, 0.0),
        (1.0, 0.0),
    ]);
    lines.push(MapLine::two_sided((1.0, 0.0), (1.0, 2.0)));

    let mut builder = BspBuilder::new(&lines, BspConfig::default()).unwrap();
    builder.build().unwrap();
    assert!(builder.diagnostics().is_empty());

    let tree = builder.tree().unwrap();
    let BspNode::Split { splitter, .. } = tree else {
        panic!("expected a split root");
    };
    assert_eq!(splitter.line, Some(LineId(6)));

    let subsectors = tree.subsectors();
    assert_eq!(subsectors.len(), 2);
    for subsector in subsectors {
        assert_relative_eq!(subsector.area(), 2.0);
        assert_clockwise_and_closed(subsector);
        assert!(subsector.edges().iter().all(|e| !e.is_miniseg()));
        // The divider bounds both halves.
        assert!(subsector.edges().iter().any(|e| e.line == Some(LineId(6))));
    }
}

#[test]
fn split_point_welded_off_the_splitter_still_converges() {
    // The cut along x = 1 welds onto (1.002, 0), a hair off the splitter.
    let lines = MapLine::closed_loop(&[
        (0.0, 0.0),
        (0.0, 2.0),
        (1.0, 2.0),
        (1.0, 1.0),
        (2.0, 1.0),
        (2.0, 0.003),
        (3.0, 0.003),
        (3.0, -1.0),
        (1.002, -1.0),
        (1.002, 0.0),
    ]);
    let tree = build(&lines).unwrap();
    assert_eq!(tree.subsector_count(), 3);

    let subsectors = tree.subsectors();
    for subsector in &subsectors {
        assert_clockwise_and_closed(subsector);
    }
    let total: f64 = subsectors.iter().map(|s| s.area()).sum();
    assert_abs_diff_eq!(total, 5.001, epsilon = 1e-3);

    let mut stepped = BspBuilder::new(&lines, BspConfig::default()).unwrap();
    while !stepped.done() {
        stepped.execute().unwrap();
    }
    assert_eq!(stepped.tree(), Some(&tree));
}

#[test]
fn dangling_spur_is_pruned_before_building() {
    let mut lines = MapLine::closed_loop(&UNIT_SQUARE);
    lines.push(MapLine::two_sided((1.0, 1.0), (2.0, 2.0)));
    lines.push(MapLine::two_sided((2.0, 2.0), (3.0, 2.0)));

    let mut builder = BspBuilder::new(&lines, BspConfig::default()).unwrap();
    assert!(builder.build().unwrap().unwrap().is_leaf());
    assert_eq!(
        builder.diagnostics().entries(),
        &[Diagnostic::PrunedDanglingSegments { count: 2 }]
    );
}

#[test]
fn unclosed_boundary_is_reported_not_fatal() {
    // Square with its last wall missing, kept alive by disabling pruning.
    let mut lines = MapLine::closed_loop(&UNIT_SQUARE);
    lines.pop();
    let config = BspConfig {
        prune_dangling_chains: false,
        ..BspConfig::default()
    };
    let builder = BspBuilder::new(&lines, config).unwrap();
    let mismatches = builder
        .diagnostics()
        .entries()
        .iter()
        .filter(|d| matches!(d, Diagnostic::JunctionCountMismatch { .. }))
        .count();
    assert_eq!(mismatches, 2);
}

#[test]
fn empty_map_has_no_tree() {
    assert!(build(&[]).is_none());
}
