//! Single-lambda pseudoflow minimum cut engine
//!
//! Phase 1 of Hochbaum's pseudoflow algorithm on a realized (non-parametric)
//! instance. The engine maintains a forest of normalized trees: every
//! non-root node has exactly one parent arc, all excess sits at roots, and
//! roots with strictly positive excess ("strong roots") wait in per-label
//! FIFO buckets. The main loop repeatedly takes the highest-labeled strong
//! root, merges its tree into a weak neighbor one label below, and pushes
//! the excess along the new path, relabeling and detecting label gaps along
//! the way. On termination the nodes labeled `n` form the minimal source
//! side of a minimum s-t cut.
//!
//! Everything is index-based: nodes and arcs live in flat `Vec`s and link
//! to each other through `u32` slots, with [`NONE`] as the null link. The
//! caller provides arcs whose slot 0 endpoint is the artificial source and
//! slot 1 the artificial sink (swapped for reverse runs).

use crate::solver::SolveStats;

/// Null link for the intrusive node and arc indices
const NONE: u32 = u32::MAX;

/// An arc as seen by the engine: realized capacity plus flow state
#[derive(Debug, Clone, Copy)]
pub(crate) struct EngineArc {
    /// Tail slot in the engine node list
    pub from: u32,
    /// Head slot in the engine node list
    pub to: u32,
    /// Realized capacity (constant + multiplier * lambda, clamped)
    pub capacity: f64,
    /// Current flow in [0, capacity]
    pub flow: f64,
    /// True while the arc's orientation matches the child-to-parent
    /// direction of the tree edge it realizes; flipped on merges
    pub direction: bool,
}

impl EngineArc {
    /// A fresh arc with no flow
    pub fn new(from: u32, to: u32, capacity: f64) -> Self {
        Self { from, to, capacity, flow: 0.0, direction: true }
    }
}

/// Per-node state: label, excess and the intrusive tree/bucket links
#[derive(Debug, Clone)]
struct EngineNode {
    label: usize,
    excess: f64,
    /// Tree parent, NONE at roots
    parent: u32,
    /// Head of the child chain, linked through `next`
    child_list: u32,
    /// Traversal cursor into the child chain
    next_scan: u32,
    /// Sibling link inside a child chain, or bucket link while queued
    next: u32,
    /// Arc realizing the edge to `parent`
    arc_to_parent: u32,
    /// Adjacent arcs not currently in any tree
    out_of_tree: Vec<u32>,
    /// Scan cursor into `out_of_tree`
    next_arc: usize,
}

impl EngineNode {
    fn new() -> Self {
        Self {
            label: 0,
            excess: 0.0,
            parent: NONE,
            child_list: NONE,
            next_scan: NONE,
            next: NONE,
            arc_to_parent: NONE,
            out_of_tree: Vec::new(),
            next_arc: 0,
        }
    }
}

/// FIFO bucket of strong roots sharing a label
#[derive(Debug, Clone, Copy)]
struct Bucket {
    start: u32,
    end: u32,
}

impl Bucket {
    fn empty() -> Self {
        Self { start: NONE, end: NONE }
    }
}

/// The phase-1 solver for one realized cut instance
pub(crate) struct PseudoflowEngine {
    nodes: Vec<EngineNode>,
    arcs: Vec<EngineArc>,
    strong_roots: Vec<Bucket>,
    label_count: Vec<usize>,
    highest_strong_label: usize,
    num_nodes: usize,
    source: u32,
    sink: u32,
}

impl PseudoflowEngine {
    /// Build the engine over `num_nodes` slots and the given arcs.
    ///
    /// `source` and `sink` are engine slots (0 and 1, or 1 and 0 for a
    /// reverse run). Arcs touching the terminals land in the terminal's
    /// out-of-tree list so initialization can saturate them; an arc running
    /// directly from source to sink is saturated here and never enters any
    /// list. Arcs into the source or out of the sink cannot carry cut flow
    /// and are skipped.
    pub fn new(num_nodes: usize, arcs: Vec<EngineArc>, source: u32, sink: u32) -> Self {
        let mut engine = Self {
            nodes: vec![EngineNode::new(); num_nodes],
            arcs,
            // labels live in [0, num_nodes]; a relabel can land one past
            strong_roots: vec![Bucket::empty(); num_nodes + 2],
            label_count: vec![0; num_nodes + 2],
            highest_strong_label: 1,
            num_nodes,
            source,
            sink,
        };

        let mut num_adjacent = vec![0usize; num_nodes];
        for arc in &engine.arcs {
            num_adjacent[arc.from as usize] += 1;
            num_adjacent[arc.to as usize] += 1;
        }
        for (node, &deg) in engine.nodes.iter_mut().zip(num_adjacent.iter()) {
            node.out_of_tree.reserve(deg);
        }

        for i in 0..engine.arcs.len() {
            let (from, to) = (engine.arcs[i].from, engine.arcs[i].to);
            if to == source || from == sink || from == to {
                continue;
            }
            if from == source && to == sink {
                engine.arcs[i].flow = engine.arcs[i].capacity;
            } else if to == sink {
                engine.nodes[to as usize].out_of_tree.push(i as u32);
            } else {
                engine.nodes[from as usize].out_of_tree.push(i as u32);
            }
        }

        engine
    }

    /// Run phase 1 to completion
    pub fn run(&mut self, stats: &mut SolveStats) {
        self.simple_initialization();
        while let Some(root) = self.get_highest_strong_root(stats) {
            self.process_root(root, stats);
        }
    }

    /// True once phase 1 leaves `slot` on the source side of the cut
    pub fn is_source_side(&self, slot: usize) -> bool {
        self.nodes[slot].label >= self.num_nodes
    }

    /// Saturate all terminal-adjacent arcs and queue the resulting strong
    /// roots at label 1.
    fn simple_initialization(&mut self) {
        let source = self.source as usize;
        let sink = self.sink as usize;

        for i in 0..self.nodes[source].out_of_tree.len() {
            let arc = self.nodes[source].out_of_tree[i] as usize;
            self.arcs[arc].flow = self.arcs[arc].capacity;
            let to = self.arcs[arc].to as usize;
            self.nodes[to].excess += self.arcs[arc].capacity;
        }

        for i in 0..self.nodes[sink].out_of_tree.len() {
            let arc = self.nodes[sink].out_of_tree[i] as usize;
            self.arcs[arc].flow = self.arcs[arc].capacity;
            let from = self.arcs[arc].from as usize;
            self.nodes[from].excess -= self.arcs[arc].capacity;
        }

        self.nodes[source].excess = 0.0;
        self.nodes[sink].excess = 0.0;

        for i in 0..self.num_nodes {
            if self.nodes[i].excess > 0.0 {
                self.nodes[i].label = 1;
                self.label_count[1] += 1;
                self.add_to_bucket(i as u32, 1);
            }
        }

        self.nodes[source].label = self.num_nodes;
        self.nodes[sink].label = 0;
        self.label_count[0] = (self.num_nodes - 2) - self.label_count[1];
    }

    /// Pop the next strong root, highest label first.
    ///
    /// A non-empty bucket at label `l` with `label_count[l-1] == 0` means a
    /// gap: no augmenting structure below can ever reach those roots, so
    /// their whole trees are lifted to label `n`. When only label-0 roots
    /// remain they are promoted to label 1 and processing continues there.
    fn get_highest_strong_root(&mut self, stats: &mut SolveStats) -> Option<u32> {
        let start = self.highest_strong_label.min(self.num_nodes + 1);
        for i in (1..=start).rev() {
            if self.strong_roots[i].start != NONE {
                self.highest_strong_label = i;
                if self.label_count[i - 1] > 0 {
                    let root = self.pop_bucket(i);
                    self.nodes[root as usize].next = NONE;
                    return Some(root);
                }
                while self.strong_roots[i].start != NONE {
                    stats.gaps += 1;
                    let root = self.pop_bucket(i);
                    self.lift_all(root);
                }
            }
        }

        if self.strong_roots[0].start == NONE {
            return None;
        }

        while self.strong_roots[0].start != NONE {
            let root = self.pop_bucket(0);
            self.nodes[root as usize].label = 1;
            self.label_count[0] -= 1;
            self.label_count[1] += 1;
            stats.relabels += 1;
            self.add_to_bucket(root, 1);
        }

        self.highest_strong_label = 1;
        let root = self.pop_bucket(1);
        self.nodes[root as usize].next = NONE;
        Some(root)
    }

    /// Try to merge the tree under `strong_root` into a weak neighbor,
    /// scanning the root first and then its subtree; relabel nodes whose
    /// children all sit above their own label. An unmergeable root is
    /// requeued at its raised label.
    fn process_root(&mut self, strong_root: u32, stats: &mut SolveStats) {
        let mut strong_node = strong_root;

        self.nodes[strong_root as usize].next_scan = self.nodes[strong_root as usize].child_list;
        if let Some((arc, weak)) = self.find_weak_node(strong_root, stats) {
            self.merge(weak, strong_node, arc, stats);
            self.push_excess(strong_root, stats);
            return;
        }

        self.check_children(strong_root, stats);

        loop {
            while self.nodes[strong_node as usize].next_scan != NONE {
                let temp = self.nodes[strong_node as usize].next_scan;
                self.nodes[strong_node as usize].next_scan = self.nodes[temp as usize].next;
                strong_node = temp;
                self.nodes[strong_node as usize].next_scan =
                    self.nodes[strong_node as usize].child_list;

                if let Some((arc, weak)) = self.find_weak_node(strong_node, stats) {
                    self.merge(weak, strong_node, arc, stats);
                    self.push_excess(strong_root, stats);
                    return;
                }

                self.check_children(strong_node, stats);
            }

            let parent = self.nodes[strong_node as usize].parent;
            if parent == NONE {
                break;
            }
            strong_node = parent;
            self.check_children(strong_node, stats);
        }

        let label = self.nodes[strong_root as usize].label;
        self.add_to_bucket(strong_root, label);
        self.highest_strong_label += 1;
    }

    /// Scan `node`'s out-of-tree arcs for an endpoint exactly one label
    /// below the current strong label. The matched arc leaves the
    /// out-of-tree list (swap-removal keeps the cursor valid).
    fn find_weak_node(&mut self, node: u32, stats: &mut SolveStats) -> Option<(u32, u32)> {
        let target = self.highest_strong_label - 1;
        let n = node as usize;

        let mut i = self.nodes[n].next_arc;
        while i < self.nodes[n].out_of_tree.len() {
            stats.arc_scans += 1;
            let arc = self.nodes[n].out_of_tree[i] as usize;
            if self.nodes[self.arcs[arc].to as usize].label == target {
                self.nodes[n].next_arc = i;
                let out = self.nodes[n].out_of_tree.swap_remove(i);
                return Some((out, self.arcs[out as usize].to));
            } else if self.nodes[self.arcs[arc].from as usize].label == target {
                self.nodes[n].next_arc = i;
                let out = self.nodes[n].out_of_tree.swap_remove(i);
                return Some((out, self.arcs[out as usize].from));
            }
            i += 1;
        }

        self.nodes[n].next_arc = self.nodes[n].out_of_tree.len();
        None
    }

    /// Advance `cur`'s child scan; relabel it once no child shares its label
    fn check_children(&mut self, cur: u32, stats: &mut SolveStats) {
        let c = cur as usize;
        while self.nodes[c].next_scan != NONE {
            let scan = self.nodes[c].next_scan as usize;
            if self.nodes[scan].label == self.nodes[c].label {
                return;
            }
            self.nodes[c].next_scan = self.nodes[scan].next;
        }

        self.label_count[self.nodes[c].label] -= 1;
        self.nodes[c].label += 1;
        self.label_count[self.nodes[c].label] += 1;
        stats.relabels += 1;
        self.nodes[c].next_arc = 0;
    }

    /// Rotate `child`'s ancestral chain so its old root hangs below it,
    /// then attach the chain under `parent` through `new_arc`. Each
    /// rotated arc has its direction bit flipped.
    fn merge(&mut self, parent: u32, child: u32, new_arc: u32, stats: &mut SolveStats) {
        stats.mergers += 1;

        let mut current = child;
        let mut new_parent = parent;
        let mut new_arc = new_arc;

        while self.nodes[current as usize].parent != NONE {
            let old_arc = self.nodes[current as usize].arc_to_parent;
            self.nodes[current as usize].arc_to_parent = new_arc;
            let old_parent = self.nodes[current as usize].parent;
            self.break_relationship(old_parent, current);
            self.add_relationship(new_parent, current);
            new_parent = current;
            current = old_parent;
            new_arc = old_arc;
            let a = new_arc as usize;
            self.arcs[a].direction = !self.arcs[a].direction;
        }

        self.nodes[current as usize].arc_to_parent = new_arc;
        self.add_relationship(new_parent, current);
    }

    /// Push all excess from `strong_root` up toward its new root. A
    /// saturating push breaks the tree edge and requeues the detached
    /// child; otherwise the whole excess moves to the parent.
    fn push_excess(&mut self, strong_root: u32, stats: &mut SolveStats) {
        let mut current = strong_root;
        let mut prev_excess = 1.0f64;

        while self.nodes[current as usize].excess != 0.0
            && self.nodes[current as usize].parent != NONE
        {
            let parent = self.nodes[current as usize].parent;
            prev_excess = self.nodes[parent as usize].excess;

            let arc = self.nodes[current as usize].arc_to_parent;
            if self.arcs[arc as usize].direction {
                let res_cap = self.arcs[arc as usize].capacity - self.arcs[arc as usize].flow;
                self.push_upward(arc, current, parent, res_cap, stats);
            } else {
                let flow = self.arcs[arc as usize].flow;
                self.push_downward(arc, current, parent, flow, stats);
            }

            current = parent;
        }

        if self.nodes[current as usize].excess > 0.0 && prev_excess <= 0.0 {
            let label = self.nodes[current as usize].label;
            self.add_to_bucket(current, label);
        }
    }

    /// Push along an arc oriented child-to-parent; `res_cap` is its
    /// remaining forward capacity.
    fn push_upward(&mut self, arc: u32, child: u32, parent: u32, res_cap: f64, stats: &mut SolveStats) {
        stats.pushes += 1;
        let a = arc as usize;
        let excess = self.nodes[child as usize].excess;

        if res_cap >= excess {
            self.nodes[parent as usize].excess += excess;
            self.arcs[a].flow += excess;
            self.nodes[child as usize].excess = 0.0;
            return;
        }

        self.arcs[a].direction = false;
        self.nodes[parent as usize].excess += res_cap;
        self.nodes[child as usize].excess -= res_cap;
        self.arcs[a].flow = self.arcs[a].capacity;
        self.nodes[parent as usize].out_of_tree.push(arc);
        self.break_relationship(parent, child);

        let label = self.nodes[child as usize].label;
        self.add_to_bucket(child, label);
    }

    /// Push along an arc oriented parent-to-child; pushing drains its flow.
    fn push_downward(&mut self, arc: u32, child: u32, parent: u32, flow: f64, stats: &mut SolveStats) {
        stats.pushes += 1;
        let a = arc as usize;
        let excess = self.nodes[child as usize].excess;

        if flow >= excess {
            self.nodes[parent as usize].excess += excess;
            self.arcs[a].flow -= excess;
            self.nodes[child as usize].excess = 0.0;
            return;
        }

        self.arcs[a].direction = true;
        self.nodes[child as usize].excess -= flow;
        self.nodes[parent as usize].excess += flow;
        self.arcs[a].flow = 0.0;
        self.nodes[parent as usize].out_of_tree.push(arc);
        self.break_relationship(parent, child);

        let label = self.nodes[child as usize].label;
        self.add_to_bucket(child, label);
    }

    /// Lift every node of `root`'s tree to label `n`, removing the tree
    /// from circulation after a gap.
    fn lift_all(&mut self, root: u32) {
        let mut current = root as usize;

        self.nodes[current].next_scan = self.nodes[current].child_list;
        self.label_count[self.nodes[current].label] -= 1;
        self.nodes[current].label = self.num_nodes;

        loop {
            while self.nodes[current].next_scan != NONE {
                let temp = self.nodes[current].next_scan as usize;
                self.nodes[current].next_scan = self.nodes[temp].next;
                current = temp;
                self.nodes[current].next_scan = self.nodes[current].child_list;

                self.label_count[self.nodes[current].label] -= 1;
                self.nodes[current].label = self.num_nodes;
            }

            match self.nodes[current].parent {
                NONE => break,
                p => current = p as usize,
            }
        }
    }

    /// Append a root to the FIFO bucket for `label`
    fn add_to_bucket(&mut self, root: u32, label: usize) {
        let bucket = &mut self.strong_roots[label];
        if bucket.start != NONE {
            let end = bucket.end as usize;
            self.nodes[end].next = root;
            bucket.end = root;
        } else {
            bucket.start = root;
            bucket.end = root;
        }
        self.nodes[root as usize].next = NONE;
    }

    /// Pop the bucket head for `label`; the bucket must be non-empty
    fn pop_bucket(&mut self, label: usize) -> u32 {
        let root = self.strong_roots[label].start;
        self.strong_roots[label].start = self.nodes[root as usize].next;
        root
    }

    /// Attach `child` under `new_parent` at the head of its child chain
    fn add_relationship(&mut self, new_parent: u32, child: u32) {
        self.nodes[child as usize].parent = new_parent;
        self.nodes[child as usize].next = self.nodes[new_parent as usize].child_list;
        self.nodes[new_parent as usize].child_list = child;
    }

    /// Detach `child` from `old_parent`'s child chain
    fn break_relationship(&mut self, old_parent: u32, child: u32) {
        self.nodes[child as usize].parent = NONE;

        if self.nodes[old_parent as usize].child_list == child {
            self.nodes[old_parent as usize].child_list = self.nodes[child as usize].next;
            self.nodes[child as usize].next = NONE;
            return;
        }

        let mut current = self.nodes[old_parent as usize].child_list as usize;
        while self.nodes[current].next != child {
            current = self.nodes[current].next as usize;
        }
        self.nodes[current].next = self.nodes[child as usize].next;
        self.nodes[child as usize].next = NONE;
    }
}
