//! Subsplit debug driver: steps a BSP build and prints every major state.
//!
//! Usage:
//! ```text
//! cargo run --example debug                  # L-shaped room
//! cargo run --example debug -- square        # unit square
//! cargo run --example debug -- rooms LR      # two rooms, stop at branch LR
//! RUST_LOG=subsplit=trace cargo run --example debug
//! ```

use subsplit::{BspBuilder, BspConfig, BspError, BspNode, MapLine};

fn map(name: &str) -> Vec<MapLine> {
    match name {
        "square" => MapLine::closed_loop(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]),
        "rooms" => {
            // Two rooms joined by a doorway of two-sided lines.
            let mut lines = MapLine::closed_loop(&[
                (0.0, 0.0),
                (0.0, 4.0),
                (4.0, 4.0),
                (4.0, 3.0),
                (6.0, 3.0),
                (6.0, 5.0),
                (10.0, 5.0),
                (10.0, 0.0),
                (6.0, 0.0),
                (6.0, 1.0),
                (4.0, 1.0),
                (4.0, 0.0),
            ]);
            lines.push(MapLine::two_sided((4.0, 1.0), (4.0, 3.0)));
            lines.push(MapLine::two_sided((6.0, 3.0), (6.0, 1.0)));
            lines
        }
        _ => MapLine::closed_loop(&[
            (0.0, 0.0),
            (0.0, 2.0),
            (1.0, 2.0),
            (1.0, 1.0),
            (2.0, 1.0),
            (2.0, 0.0),
        ]),
    }
}

fn print_tree(root: &BspNode) {
    let mut stack = vec![(root, String::new())];
    while let Some((node, path)) = stack.pop() {
        match node {
            BspNode::Split {
                splitter,
                left,
                right,
            } => {
                println!(
                    "{:>6} split ({:.3}, {:.3}) -> ({:.3}, {:.3})",
                    path, splitter.start.x, splitter.start.y, splitter.end.x, splitter.end.y
                );
                stack.push((right, format!("{path}R")));
                stack.push((left, format!("{path}L")));
            }
            BspNode::Leaf(subsector) => {
                let minisegs = subsector.edges().iter().filter(|e| e.is_miniseg()).count();
                println!(
                    "{:>6} leaf  {} edges ({} minisegs), area {:.3}",
                    path,
                    subsector.edges().len(),
                    minisegs,
                    subsector.area()
                );
            }
        }
    }
}

fn main() -> Result<(), BspError> {
    // Default: WARN for everything, INFO for subsplit.
    // Override with RUST_LOG env var (e.g. RUST_LOG=subsplit=trace).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("debug=info".parse().unwrap_or_default())
        .add_directive("subsplit=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_default();
    let branch = args.next();

    let lines = map(&name);
    let mut builder = BspBuilder::new(&lines, BspConfig::default())?;

    if let Some(branch) = branch {
        if builder.execute_until_branch(&branch)? {
            println!("reached branch {branch:?} in state {:?}", builder.state());
        } else {
            println!("branch {branch:?} never appeared");
        }
    }

    while !builder.done() {
        builder.execute_major_step()?;
        let path = builder
            .current_work_item()
            .map_or("-", |item| item.branch_path.as_str());
        println!("[{path:>6}] {:?}", builder.state());
    }

    for diagnostic in builder.diagnostics().entries() {
        println!("diagnostic: {diagnostic:?}");
    }

    match builder.tree() {
        Some(root) => {
            println!(
                "{} subsectors, {} splits",
                root.subsector_count(),
                root.split_count()
            );
            print_tree(root);
        }
        None => println!("map is fully degenerate, no tree"),
    }
    Ok(())
}
