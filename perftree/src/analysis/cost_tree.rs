//! Arena-backed cost tree shared by all three attribution views.
//!
//! Nodes live in one `Vec` and reference each other by index: children as
//! owned id lists, the parent as a non-owning back-index assigned at
//! insertion. Index 0 is the synthetic root; its identity labels stay
//! empty and its `inclusive_cost` carries the total sample count in the
//! bottom-up view.
//!
//! Within one parent no two children share the full
//! `(symbol, binary, location, address)` identity key.

/// Index of a node within its tree's arena.
pub type NodeId = usize;

/// One node of a cost tree.
#[derive(Debug, Clone, Default)]
pub struct CostNode {
    pub symbol: String,
    pub binary: String,
    pub location: String,
    pub address: String,
    pub inclusive_cost: u64,
    pub self_cost: u64,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Borrowed identity key used for child lookup and insertion.
#[derive(Debug, Clone, Copy)]
pub struct FrameKey<'a> {
    pub symbol: &'a str,
    pub binary: &'a str,
    pub location: &'a str,
    pub address: &'a str,
}

impl<'a> FrameKey<'a> {
    #[must_use]
    pub fn of(node: &'a CostNode) -> Self {
        Self {
            symbol: &node.symbol,
            binary: &node.binary,
            location: &node.location,
            address: &node.address,
        }
    }

    fn matches(&self, node: &CostNode) -> bool {
        node.symbol == self.symbol
            && node.binary == self.binary
            && node.location == self.location
            && node.address == self.address
    }
}

#[derive(Debug, Clone)]
pub struct CostTree {
    nodes: Vec<CostNode>,
}

impl Default for CostTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CostTree {
    pub const ROOT: NodeId = 0;

    #[must_use]
    pub fn new() -> Self {
        Self { nodes: vec![CostNode::default()] }
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &CostNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut CostNode {
        &mut self.nodes[id]
    }

    #[must_use]
    pub fn root(&self) -> &CostNode {
        self.node(Self::ROOT)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Total node count, synthetic root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Linear scan of `parent`'s children for a full identity-key match.
    #[must_use]
    pub fn find_child(&self, parent: NodeId, key: &FrameKey<'_>) -> Option<NodeId> {
        self.nodes[parent].children.iter().copied().find(|&c| key.matches(&self.nodes[c]))
    }

    /// Reuse the matching child of `parent` or append a fresh zero-cost one.
    pub fn find_or_insert(&mut self, parent: NodeId, key: &FrameKey<'_>) -> NodeId {
        if let Some(existing) = self.find_child(parent, key) {
            return existing;
        }
        let id = self.push_node(parent, key);
        self.nodes[parent].children.push(id);
        id
    }

    /// Insert a fresh child of `parent` at `index` in its child list.
    /// Used by the caller-callee view, which keeps that list sorted.
    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, key: &FrameKey<'_>) -> NodeId {
        let id = self.push_node(parent, key);
        self.nodes[parent].children.insert(index, id);
        id
    }

    fn push_node(&mut self, parent: NodeId, key: &FrameKey<'_>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(CostNode {
            symbol: key.symbol.to_string(),
            binary: key.binary.to_string(),
            location: key.location.to_string(),
            address: key.address.to_string(),
            inclusive_cost: 0,
            self_cost: 0,
            children: Vec::new(),
            parent: Some(parent),
        });
        id
    }

    /// Ids of all childless nodes below the root, in depth-first preorder.
    #[must_use]
    pub fn leaf_ids(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack: Vec<NodeId> = self.children(Self::ROOT).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let children = self.children(id);
            if children.is_empty() {
                leaves.push(id);
            } else {
                stack.extend(children.iter().rev().copied());
            }
        }
        leaves
    }
}
