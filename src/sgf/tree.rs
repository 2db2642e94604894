use crate::sgf::properties::Properties;

/// Index of a node inside the [`GameTree`] arena. Stable for the lifetime of
/// the tree; detached nodes keep their slot.
pub type NodeIndex = usize;

/// Position of a node in the tree: its depth (number of ancestors) and its
/// index among its parent's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub depth: usize,
    pub variation: usize,
}

pub struct MoveNode {
    pub properties: Properties,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
    pub id: NodeId,
}

/// Arena storage for the move tree. The root always lives at index 0.
///
/// The arena is shared between [`MoveTree`](crate::sgf::MoveTree) cursors;
/// it is never traversed directly by callers outside this module tree.
pub struct GameTree {
    pub(crate) nodes: Vec<MoveNode>,
}

pub const ROOT: NodeIndex = 0;

impl GameTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![MoveNode {
                properties: Properties::new(),
                parent: None,
                children: Vec::new(),
                id: NodeId::default(),
            }],
        }
    }

    pub fn node(&self, idx: NodeIndex) -> &MoveNode {
        &self.nodes[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut MoveNode {
        &mut self.nodes[idx]
    }

    /// Append an empty child to `parent` and return its index.
    pub fn add_child(&mut self, parent: NodeIndex) -> NodeIndex {
        let idx = self.nodes.len();
        let parent_node = &self.nodes[parent];
        let id = NodeId {
            depth: parent_node.id.depth + 1,
            variation: parent_node.children.len(),
        };
        self.nodes.push(MoveNode {
            properties: Properties::new(),
            parent: Some(parent),
            children: Vec::new(),
            id,
        });
        self.nodes[parent].children.push(idx);
        idx
    }

    /// Unlink `idx` from its parent. The subtree stays in the arena but is
    /// no longer reachable. Returns the parent, or `None` for the root.
    pub fn detach(&mut self, idx: NodeIndex) -> Option<NodeIndex> {
        let parent = self.nodes[idx].parent?;
        self.nodes[parent].children.retain(|&c| c != idx);
        self.nodes[idx].parent = None;
        Some(parent)
    }

    /// Reassign `NodeId`s below `start`, keeping `start`'s own id.
    pub fn renumber(&mut self, start: NodeIndex) {
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            let depth = self.nodes[idx].id.depth;
            let children = self.nodes[idx].children.clone();
            for (variation, &child) in children.iter().enumerate() {
                self.nodes[child].id = NodeId { depth: depth + 1, variation };
                stack.push(child);
            }
        }
    }
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}
