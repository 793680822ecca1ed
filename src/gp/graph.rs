//! Arena-backed GP graph.
//!
//! Nodes live in one `Vec` and refer to their children by [`NodeId`]. A node
//! may be the child of several parents, so the graph is a DAG and every walk
//! carries a visited set. Structural edits leave unreachable slots behind;
//! [`GpGraph::compact`] drops them.

use super::node::{GpNode, NodeId, NodeKind, ValueType};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A GP program rooted at a [`NodeKind::Result`] node.
pub struct GpGraph<ST, PT> {
    pub(crate) nodes: Vec<GpNode<ST, PT>>,
    pub(crate) root: NodeId,
    pub(crate) interrupt: Arc<AtomicBool>,
}

/// Copies share no state: the copy gets its own interrupt flag.
impl<ST, PT> Clone for GpGraph<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            interrupt: Arc::new(AtomicBool::new(self.is_interrupted())),
        }
    }
}

impl<ST, PT> Default for GpGraph<ST, PT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ST, PT> fmt::Debug for GpGraph<ST, PT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpGraph")
            .field("root", &self.root)
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<ST, PT> GpGraph<ST, PT> {
    /// A bare root without children.
    pub fn new() -> Self {
        Self {
            nodes: vec![GpNode::new(NodeKind::Result)],
            root: NodeId(0),
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &GpNode<ST, PT> {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut GpNode<ST, PT> {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(GpNode::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    pub fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Whether the node has exactly the slots its kind requires, each filled
    /// with a child of the required type.
    pub fn is_node_valid(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.0];
        let required = node.kind.child_types();
        node.children.len() == required.len()
            && node
                .children
                .iter()
                .zip(&required)
                .all(|(child, ty)| self.kind(*child).produces() == *ty)
    }

    // ---- Traversal ----

    /// Nodes reachable from the root in depth-first discovery order, root
    /// first, each node once.
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        self.discover(self.root, &mut seen, &mut order);
        order
    }

    fn discover(&self, id: NodeId, seen: &mut [bool], order: &mut Vec<NodeId>) {
        if seen[id.0] {
            return;
        }
        seen[id.0] = true;
        order.push(id);
        for &child in &self.nodes[id.0].children {
            self.discover(child, seen, order);
        }
    }

    /// Reachable nodes except the root.
    pub fn discovered(&self) -> Vec<NodeId> {
        self.reachable()
            .into_iter()
            .filter(|id| *id != self.root)
            .collect()
    }

    /// Non-root reachable nodes grouped by produced type.
    pub fn nodes_by_type(&self) -> BTreeMap<ValueType, Vec<NodeId>> {
        let mut map: BTreeMap<ValueType, Vec<NodeId>> = BTreeMap::new();
        for id in self.discovered() {
            map.entry(self.kind(id).produces()).or_default().push(id);
        }
        map
    }

    /// Reachable nodes, every child listed before its parents.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        self.post(self.root, &mut seen, &mut order);
        order
    }

    fn post(&self, id: NodeId, seen: &mut [bool], order: &mut Vec<NodeId>) {
        if seen[id.0] {
            return;
        }
        seen[id.0] = true;
        for &child in &self.nodes[id.0].children {
            self.post(child, seen, order);
        }
        order.push(id);
    }

    /// Whether `target` is reachable from `from` (a node reaches itself).
    pub fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if std::mem::replace(&mut seen[id.0], true) {
                continue;
            }
            stack.extend(self.nodes[id.0].children.iter().copied());
        }
        false
    }

    /// Whether any path from the root revisits a node on the same path.
    pub fn has_cycle(&self) -> bool {
        // 0 = unvisited, 1 = on the current path, 2 = done
        let mut state = vec![0u8; self.nodes.len()];
        self.cycle_from(self.root, &mut state)
    }

    fn cycle_from(&self, id: NodeId, state: &mut [u8]) -> bool {
        match state[id.0] {
            1 => return true,
            2 => return false,
            _ => {}
        }
        state[id.0] = 1;
        for &child in &self.nodes[id.0].children {
            if self.cycle_from(child, state) {
                return true;
            }
        }
        state[id.0] = 2;
        false
    }

    /// Depth of the deepest discovered node. The root's children sit at
    /// depth 0; a node is counted at the depth it is first discovered.
    pub fn depth(&self) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        seen[self.root.0] = true;
        let mut deepest = 0;
        for &child in &self.nodes[self.root.0].children {
            self.deepest_from(child, 0, &mut seen, &mut deepest);
        }
        deepest
    }

    fn deepest_from(&self, id: NodeId, depth: usize, seen: &mut [bool], deepest: &mut usize) {
        if std::mem::replace(&mut seen[id.0], true) {
            return;
        }
        *deepest = (*deepest).max(depth);
        for &child in &self.nodes[id.0].children {
            self.deepest_from(child, depth + 1, seen, deepest);
        }
    }

    // ---- Structural edits ----

    /// Rewrites every reference to `old` in reachable child lists to `new`.
    /// Returns the number of rewritten slots.
    pub fn replace_child_references(&mut self, old: NodeId, new: NodeId) -> usize {
        let mut rewritten = 0;
        for id in self.reachable() {
            for child in &mut self.nodes[id.0].children {
                if *child == old {
                    *child = new;
                    rewritten += 1;
                }
            }
        }
        rewritten
    }

    /// Removes every reference to `target` from reachable child lists.
    /// Returns the number of removed slots.
    pub fn remove_child_references(&mut self, target: NodeId) -> usize {
        let mut removed = 0;
        for id in self.reachable() {
            let children = &mut self.nodes[id.0].children;
            let before = children.len();
            children.retain(|c| *c != target);
            removed += before - children.len();
        }
        removed
    }

    /// Copies the subgraph of `other` rooted at `node` into this arena,
    /// preserving sharing inside it. Memoized values are not copied.
    /// Returns the id of the copied `node`.
    pub fn import_subgraph(&mut self, other: &GpGraph<ST, PT>, node: NodeId) -> NodeId {
        let mut mapping: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        self.import_node(other, node, &mut mapping)
    }

    fn import_node(
        &mut self,
        other: &GpGraph<ST, PT>,
        id: NodeId,
        mapping: &mut BTreeMap<NodeId, NodeId>,
    ) -> NodeId {
        if let Some(&copied) = mapping.get(&id) {
            return copied;
        }
        let source = other.node(id);
        let copied = self.add_node(source.kind.clone());
        self.nodes[copied.0].cached = source.cached;
        mapping.insert(id, copied);
        let children: Vec<NodeId> = source
            .children
            .iter()
            .map(|&c| self.import_node(other, c, mapping))
            .collect();
        self.nodes[copied.0].children = children;
        copied
    }

    /// Drops unreachable arena slots and renumbers the rest in discovery
    /// order. Ids obtained before the call are invalidated.
    pub fn compact(&mut self) {
        let order = self.reachable();
        if order.len() == self.nodes.len() {
            return;
        }
        let mut remap = vec![None; self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.0] = Some(NodeId(new));
        }
        let mut slots: Vec<Option<GpNode<ST, PT>>> = self.nodes.drain(..).map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for old in &order {
            if let Some(mut node) = slots[old.0].take() {
                node.children = node
                    .children
                    .iter()
                    .filter_map(|c| remap[c.0])
                    .collect();
                nodes.push(node);
            }
        }
        self.nodes = nodes;
        self.root = NodeId(0);
    }

    // ---- Execution state ----

    /// Drops every memoized value.
    pub fn reset_caches(&mut self) {
        for node in &mut self.nodes {
            node.memo = None;
        }
    }

    /// Sets the cooperative interrupt flag polled by loop nodes.
    pub fn interrupt(&self, value: bool) {
        self.interrupt.store(value, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Shared handle to the interrupt flag, for a watchdog on another thread.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }
}
