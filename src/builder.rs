use slotmap::{SecondaryMap, SlotMap};

use crate::config::{BranchOrder, BspConfig};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{InvariantError, Result};
use crate::geometry::{Endpoint, GeometryStore, SegmentChainPruner, SegmentIndex};
use crate::line::{BspLine, LineId};
use crate::node::{BspNode, Splitter, Subsector, SubsectorEdge};
use crate::states::{
    ConvexChecker, ConvexState, JunctionClassifier, MinisegCreator, MinisegState,
    PartitionState, Partitioner, SplitCalculator, SplitState,
};

slotmap::new_key_type! {
    /// Identifier for a node while the tree is under construction.
    pub struct NodeId;
}

/// A node under construction.
#[derive(Debug, Clone)]
enum BuildNode {
    Pending,
    Degenerate,
    Leaf(Subsector),
    Split {
        splitter: Splitter,
        left: NodeId,
        right: NodeId,
    },
}

/// Top-level state of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    NotStarted,
    CheckingConvexity,
    CreatingLeafNode,
    FindingSplitter,
    PartitioningSegments,
    GeneratingMinisegs,
    FinishingSplit,
    Complete,
}

/// A pending subtree: the node to fill, its segments, and the path of
/// `L`/`R` turns from the root.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub node: NodeId,
    pub segments: Vec<SegmentIndex>,
    pub branch_path: String,
}

/// Builds a BSP tree one observable step at a time.
///
/// Pending subtrees live on an explicit stack rather than the call stack.
/// [`BspBuilder::execute`] performs one step of whichever phase is active;
/// the other `execute_*` methods and [`BspBuilder::build`] are loops over it,
/// so every way of driving the builder produces the same tree.
///
/// An error aborts the build: every later step returns an error too.
#[derive(Debug)]
pub struct BspBuilder {
    config: BspConfig,
    store: GeometryStore,
    junctions: JunctionClassifier,
    diagnostics: Diagnostics,
    convex: ConvexChecker,
    split: SplitCalculator,
    partition: Partitioner,
    miniseg: MinisegCreator,
    nodes: SlotMap<NodeId, BuildNode>,
    root: NodeId,
    work_items: Vec<WorkItem>,
    work_item_count: usize,
    state: BuilderState,
    transitions: usize,
    convexity_checks: usize,
    tree: Option<BspNode>,
    failed: bool,
}

impl BspBuilder {
    /// Ingests `lines` and prepares a build.
    ///
    /// Zero length and duplicate lines are skipped, dangling chains are
    /// pruned when configured, and the one-sided lines form the junctions
    /// used to tell the inside of the map from the void.
    ///
    /// # Errors
    ///
    /// Returns `BspError::Config` for an invalid configuration.
    pub fn new<L: BspLine>(lines: &[L], config: BspConfig) -> Result<Self> {
        config.validate()?;

        let mut store = GeometryStore::new(config.vertex_weld_epsilon);
        let mut diagnostics = Diagnostics::new();
        let mut segments = Vec::with_capacity(lines.len());

        for (i, line) in lines.iter().enumerate() {
            let id = LineId(i);
            let start = store.vertex_index_of(line.start());
            let end = store.vertex_index_of(line.end());
            if start == end {
                diagnostics.report(Diagnostic::ZeroLengthLine { line: id });
                continue;
            }
            if let Some(existing) = store.find_segment(start, end) {
                diagnostics.report(Diagnostic::DuplicateLine { line: id, existing });
                continue;
            }
            segments.push(store.segment_for(start, end, Some(id), line.one_sided())?);
        }

        if config.prune_dangling_chains {
            let mut pruner = SegmentChainPruner::new();
            segments = pruner.prune(segments.iter().map(|index| store.segment(*index)));
            if !pruner.pruned().is_empty() {
                diagnostics.report(Diagnostic::PrunedDanglingSegments {
                    count: pruner.pruned().len(),
                });
            }
        }

        let mut junctions = JunctionClassifier::new();
        junctions.add_one_sided_segments(segments.iter().map(|index| store.segment(*index)))?;
        junctions.finalize(&mut diagnostics)?;

        tracing::debug!(
            lines = lines.len(),
            segments = segments.len(),
            vertices = store.vertex_count(),
            "bsp builder loaded"
        );

        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(BuildNode::Pending);
        let work_items = vec![WorkItem {
            node: root,
            segments,
            branch_path: String::new(),
        }];

        Ok(Self {
            split: SplitCalculator::new(&config),
            partition: Partitioner::new(config.vertex_weld_epsilon),
            config,
            store,
            junctions,
            diagnostics,
            convex: ConvexChecker::new(),
            miniseg: MinisegCreator::new(),
            nodes,
            root,
            work_items,
            work_item_count: 1,
            state: BuilderState::NotStarted,
            transitions: 0,
            convexity_checks: 0,
            tree: None,
            failed: false,
        })
    }

    // --- Observability ---

    #[must_use]
    pub fn state(&self) -> BuilderState {
        self.state
    }

    #[must_use]
    pub fn done(&self) -> bool {
        self.state == BuilderState::Complete
    }

    /// The work item being processed, if any.
    #[must_use]
    pub fn current_work_item(&self) -> Option<&WorkItem> {
        self.work_items.last()
    }

    /// Total work items created so far, including the root.
    #[must_use]
    pub fn work_item_count(&self) -> usize {
        self.work_item_count
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    #[must_use]
    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    #[must_use]
    pub fn junctions(&self) -> &JunctionClassifier {
        &self.junctions
    }

    #[must_use]
    pub fn convex_checker(&self) -> &ConvexChecker {
        &self.convex
    }

    #[must_use]
    pub fn config(&self) -> &BspConfig {
        &self.config
    }

    /// The finished tree. `None` until complete, or when the whole map was
    /// degenerate.
    #[must_use]
    pub fn tree(&self) -> Option<&BspNode> {
        self.tree.as_ref()
    }

    #[must_use]
    pub fn into_tree(self) -> Option<BspNode> {
        self.tree
    }

    // --- Stepping ---

    /// Performs one indivisible step. Does nothing once complete.
    ///
    /// # Errors
    ///
    /// Returns an invariant error if the build cannot continue. After an
    /// error every call fails.
    pub fn execute(&mut self) -> Result<()> {
        if self.failed {
            return Err(InvariantError::InvalidState("bsp build already failed".to_owned()).into());
        }
        let result = self.step();
        if let Err(err) = &result {
            self.failed = true;
            tracing::error!(%err, "bsp build failed");
        }
        result
    }

    /// Runs until the top-level state changes.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`BspBuilder::execute`].
    pub fn execute_major_step(&mut self) -> Result<()> {
        let start = self.transitions;
        while !self.done() && self.transitions == start {
            self.execute()?;
        }
        Ok(())
    }

    /// Runs until the next convexity check begins, or the build completes.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`BspBuilder::execute`].
    pub fn execute_full_cycle_step(&mut self) -> Result<()> {
        let start = self.convexity_checks;
        while !self.done() && self.convexity_checks == start {
            self.execute()?;
        }
        Ok(())
    }

    /// Runs until the current work item's branch path matches `branch`,
    /// ignoring case. Returns false if the build completed first.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`BspBuilder::execute`].
    pub fn execute_until_branch(&mut self, branch: &str) -> Result<bool> {
        loop {
            if self
                .current_work_item()
                .is_some_and(|item| item.branch_path.eq_ignore_ascii_case(branch))
            {
                return Ok(true);
            }
            if self.done() {
                return Ok(false);
            }
            self.execute()?;
        }
    }

    /// Runs the build to completion and returns the tree, or `None` if the
    /// map was entirely degenerate.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`BspBuilder::execute`].
    pub fn build(&mut self) -> Result<Option<&BspNode>> {
        while !self.done() {
            self.execute()?;
        }
        Ok(self.tree.as_ref())
    }

    fn set_state(&mut self, state: BuilderState) {
        tracing::trace!(from = ?self.state, to = ?state, "bsp builder transition");
        self.state = state;
        self.transitions += 1;
    }

    fn step(&mut self) -> Result<()> {
        match self.state {
            BuilderState::NotStarted => self.load_next_work_item(),
            BuilderState::CheckingConvexity => self.check_convexity(),
            BuilderState::CreatingLeafNode => self.create_leaf_node(),
            BuilderState::FindingSplitter => self.find_splitter(),
            BuilderState::PartitioningSegments => self.partition_segments(),
            BuilderState::GeneratingMinisegs => self.generate_minisegs(),
            BuilderState::FinishingSplit => self.finish_split(),
            BuilderState::Complete => Ok(()),
        }
    }

    fn load_next_work_item(&mut self) -> Result<()> {
        let Some(item) = self.work_items.last() else {
            self.tree = self.assemble_tree()?;
            tracing::debug!(
                work_items = self.work_item_count,
                subsectors = self.tree.as_ref().map_or(0, BspNode::subsector_count),
                "bsp build complete"
            );
            self.set_state(BuilderState::Complete);
            return Ok(());
        };

        tracing::trace!(branch = %item.branch_path, segments = item.segments.len(), "checking convexity");
        self.convex.load(&self.store, &item.segments);
        self.convexity_checks += 1;
        self.set_state(BuilderState::CheckingConvexity);
        Ok(())
    }

    fn check_convexity(&mut self) -> Result<()> {
        if !self.convex.state().is_finished() {
            self.convex.execute(&self.store)?;
        }
        match self.convex.state() {
            ConvexState::Loaded | ConvexState::Traversing => Ok(()),
            ConvexState::FinishedIsConvex => {
                self.set_state(BuilderState::CreatingLeafNode);
                Ok(())
            }
            ConvexState::FinishedIsSplittable => {
                let item = top(&self.work_items)?;
                self.split.load(&self.store, &item.segments);
                self.set_state(BuilderState::FindingSplitter);
                Ok(())
            }
            ConvexState::FinishedIsDegenerate => {
                let item = pop(&mut self.work_items)?;
                tracing::trace!(branch = %item.branch_path, "degenerate node");
                self.set_node(item.node, BuildNode::Degenerate)?;
                self.load_next_work_item()
            }
        }
    }

    fn create_leaf_node(&mut self) -> Result<()> {
        let edges = self
            .convex
            .clockwise_traversal()
            .into_iter()
            .map(|step| {
                let segment = self.store.segment(step.segment);
                SubsectorEdge {
                    start: segment.endpoint(step.endpoint),
                    end: segment.endpoint(step.endpoint.opposite()),
                    segment: step.segment,
                    line: segment.line,
                    is_front: step.endpoint == Endpoint::Start,
                }
            })
            .collect();
        let subsector = Subsector::new(edges)?;

        let item = pop(&mut self.work_items)?;
        tracing::trace!(branch = %item.branch_path, edges = subsector.edges().len(), "created subsector");
        self.set_node(item.node, BuildNode::Leaf(subsector))?;
        self.load_next_work_item()
    }

    fn find_splitter(&mut self) -> Result<()> {
        if self.split.state() != SplitState::Finished {
            self.split.execute(&self.store)?;
        }
        if self.split.state() != SplitState::Finished {
            return Ok(());
        }

        let splitter = self
            .split
            .best_splitter()
            .ok_or_else(|| InvariantError::InvalidState("no splitter candidates".to_owned()))?;
        tracing::trace!(?splitter, score = ?self.split.best_score(), "chose splitter");
        let item = top(&self.work_items)?;
        self.partition.load(&self.store, splitter, &item.segments);
        self.set_state(BuilderState::PartitioningSegments);
        Ok(())
    }

    fn partition_segments(&mut self) -> Result<()> {
        if self.partition.state() != PartitionState::Finished {
            self.partition
                .execute(&mut self.store, &mut self.junctions, &mut self.diagnostics)?;
        }
        if self.partition.state() != PartitionState::Finished {
            return Ok(());
        }

        let splitter = self
            .partition
            .splitter()
            .ok_or_else(|| InvariantError::InvalidState("partitioner lost its splitter".to_owned()))?;
        self.miniseg
            .load(&self.store, splitter, self.partition.collinear_vertices())?;
        self.set_state(BuilderState::GeneratingMinisegs);
        Ok(())
    }

    fn generate_minisegs(&mut self) -> Result<()> {
        if self.miniseg.state() != MinisegState::Finished {
            self.miniseg.execute(&mut self.store, &self.junctions)?;
        }
        if self.miniseg.state() == MinisegState::Finished {
            self.set_state(BuilderState::FinishingSplit);
        }
        Ok(())
    }

    fn finish_split(&mut self) -> Result<()> {
        let item = pop(&mut self.work_items)?;
        let splitter_index = self
            .partition
            .splitter()
            .ok_or_else(|| InvariantError::InvalidState("partitioner lost its splitter".to_owned()))?;
        let segment = self.store.segment(splitter_index);
        let splitter = Splitter {
            segment: splitter_index,
            start: segment.start,
            end: segment.end,
            line: segment.line,
        };

        let (mut left_segments, mut right_segments) = self.partition.take_sides();
        left_segments.extend_from_slice(self.miniseg.minisegs());
        right_segments.extend_from_slice(self.miniseg.minisegs());
        tracing::trace!(
            branch = %item.branch_path,
            left = left_segments.len(),
            right = right_segments.len(),
            minisegs = self.miniseg.minisegs().len(),
            "split node"
        );

        let left = self.nodes.insert(BuildNode::Pending);
        let right = self.nodes.insert(BuildNode::Pending);
        self.set_node(
            item.node,
            BuildNode::Split {
                splitter,
                left,
                right,
            },
        )?;

        self.work_item_count += 2;
        if self.work_item_count > self.config.max_work_items {
            return Err(InvariantError::WorkItemCeilingExceeded {
                limit: self.config.max_work_items,
            }
            .into());
        }

        let left_item = WorkItem {
            node: left,
            segments: left_segments,
            branch_path: format!("{}L", item.branch_path),
        };
        let right_item = WorkItem {
            node: right,
            segments: right_segments,
            branch_path: format!("{}R", item.branch_path),
        };
        // The item pushed last is built first.
        match self.config.branch_order {
            BranchOrder::LeftFirst => {
                self.work_items.push(right_item);
                self.work_items.push(left_item);
            }
            BranchOrder::RightFirst => {
                self.work_items.push(left_item);
                self.work_items.push(right_item);
            }
        }

        self.load_next_work_item()
    }

    fn set_node(&mut self, id: NodeId, node: BuildNode) -> Result<()> {
        let slot = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| InvariantError::InvalidState(format!("unknown node {id:?}")))?;
        *slot = node;
        Ok(())
    }

    /// Converts the arena into an owned tree, post-order and without
    /// recursion. Degenerate subtrees disappear, and a split left with one
    /// live child is replaced by that child.
    fn assemble_tree(&mut self) -> Result<Option<BspNode>> {
        enum Visit {
            Enter(NodeId),
            Exit {
                id: NodeId,
                splitter: Splitter,
                left: NodeId,
                right: NodeId,
            },
        }

        let mut nodes = std::mem::take(&mut self.nodes);
        let mut built: SecondaryMap<NodeId, Option<BspNode>> = SecondaryMap::new();
        let mut stack = vec![Visit::Enter(self.root)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id) => match nodes.remove(id) {
                    Some(BuildNode::Leaf(subsector)) => {
                        built.insert(id, Some(BspNode::Leaf(subsector)));
                    }
                    Some(BuildNode::Degenerate) => {
                        built.insert(id, None);
                    }
                    Some(BuildNode::Split {
                        splitter,
                        left,
                        right,
                    }) => {
                        stack.push(Visit::Exit {
                            id,
                            splitter,
                            left,
                            right,
                        });
                        stack.push(Visit::Enter(right));
                        stack.push(Visit::Enter(left));
                    }
                    Some(BuildNode::Pending) | None => {
                        return Err(InvariantError::InvalidState(format!(
                            "node {id:?} was never built"
                        ))
                        .into());
                    }
                },
                Visit::Exit {
                    id,
                    splitter,
                    left,
                    right,
                } => {
                    let left = built.remove(left).flatten();
                    let right = built.remove(right).flatten();
                    let node = match (left, right) {
                        (Some(left), Some(right)) => Some(BspNode::Split {
                            splitter,
                            left: Box::new(left),
                            right: Box::new(right),
                        }),
                        (Some(child), None) | (None, Some(child)) => Some(child),
                        (None, None) => None,
                    };
                    built.insert(id, node);
                }
            }
        }

        Ok(built.remove(self.root).flatten())
    }
}

fn top(work_items: &[WorkItem]) -> Result<&WorkItem> {
    work_items
        .last()
        .ok_or_else(|| InvariantError::InvalidState("work item stack is empty".to_owned()).into())
}

fn pop(work_items: &mut Vec<WorkItem>) -> Result<WorkItem> {
    work_items
        .pop()
        .ok_or_else(|| InvariantError::InvalidState("work item stack is empty".to_owned()).into())
}
