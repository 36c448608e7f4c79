#![allow(clippy::unwrap_used)]

use subsplit::{BranchOrder, BspBuilder, BspConfig, BuilderState, MapLine};

const L_ROOM: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.0, 2.0),
    (1.0, 2.0),
    (1.0, 1.0),
    (2.0, 1.0),
    (2.0, 0.0),
];

fn l_room(config: BspConfig) -> BspBuilder {
    BspBuilder::new(&MapLine::closed_loop(&L_ROOM), config).unwrap()
}

#[test]
fn single_steps_match_full_build() {
    let mut stepped = l_room(BspConfig::default());
    let mut steps = 0;
    while !stepped.done() {
        stepped.execute().unwrap();
        steps += 1;
    }
    assert!(steps > 10);

    let mut built = l_room(BspConfig::default());
    built.build().unwrap();
    assert_eq!(stepped.tree(), built.tree());
    assert!(stepped.tree().is_some());
}

#[test]
fn mixed_step_granularities_match_full_build() {
    let mut mixed = l_room(BspConfig::default());
    mixed.execute().unwrap();
    mixed.execute_major_step().unwrap();
    mixed.execute_full_cycle_step().unwrap();
    mixed.execute().unwrap();
    mixed.build().unwrap();

    let mut built = l_room(BspConfig::default());
    built.build().unwrap();
    assert_eq!(mixed.into_tree(), built.into_tree());
}

#[test]
fn run_until_branch_ignores_case() {
    let mut builder = l_room(BspConfig::default());
    assert!(builder.execute_until_branch("r").unwrap());
    let item = builder.current_work_item().unwrap();
    assert_eq!(item.branch_path, "R");
    // The left leaf is already built by now.
    assert_eq!(builder.work_item_count(), 3);
    assert!(!builder.done());

    assert!(builder.build().unwrap().is_some());
}

#[test]
fn run_until_missing_branch_completes() {
    let mut builder = l_room(BspConfig::default());
    assert!(!builder.execute_until_branch("LLR").unwrap());
    assert!(builder.done());
    assert_eq!(builder.state(), BuilderState::Complete);
    assert_eq!(builder.tree().unwrap().subsector_count(), 2);
}

#[test]
fn right_first_visits_right_branch_first() {
    let config = BspConfig {
        branch_order: BranchOrder::RightFirst,
        ..BspConfig::default()
    };
    let mut builder = l_room(config);
    let mut paths = Vec::new();
    while !builder.done() {
        builder.execute_full_cycle_step().unwrap();
        if let Some(item) = builder.current_work_item() {
            paths.push(item.branch_path.clone());
        }
    }
    assert_eq!(paths, vec!["", "R", "L"]);

    // Leaves create no geometry, so the order does not change the tree.
    let mut left_first = l_room(BspConfig::default());
    left_first.build().unwrap();
    assert_eq!(builder.tree(), left_first.tree());
}

#[test]
fn stepping_after_completion_is_a_no_op() {
    let mut builder = l_room(BspConfig::default());
    builder.build().unwrap();
    let tree = builder.tree().cloned();
    builder.execute().unwrap();
    builder.execute_major_step().unwrap();
    builder.execute_full_cycle_step().unwrap();
    assert_eq!(builder.tree().cloned(), tree);
}
