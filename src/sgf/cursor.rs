use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

use tracing::warn;

use crate::{
    error::Result,
    rules::Treepath,
    sgf::{
        parser::parse,
        point::{Color, Point},
        properties::{Move, Properties, PropKey},
        tree::{GameTree, NodeId, NodeIndex, ROOT},
    },
};

pub const DEFAULT_INTERSECTIONS: usize = 19;

/// A cursor over a shared move tree.
///
/// Cloning a cursor (or calling [`MoveTree::new_tree_ref`]) yields another
/// view of the same arena: structural edits and property changes made
/// through one cursor are visible through every other.
#[derive(Clone)]
pub struct MoveTree {
    tree: Rc<RefCell<GameTree>>,
    root: NodeIndex,
    current: NodeIndex,
}

impl MoveTree {
    /// An empty tree. When `intersections` is given the root gets an `SZ`.
    pub fn new(intersections: Option<usize>) -> Self {
        let mt = Self {
            tree: Rc::new(RefCell::new(GameTree::new())),
            root: ROOT,
            current: ROOT,
        };
        if let Some(n) = intersections {
            mt.set_intersections(n);
        }
        mt
    }

    /// Parse `sgf` and descend along `treepath`. Blank input yields an empty
    /// 19x19 tree.
    pub fn from_sgf(sgf: &str, treepath: &Treepath) -> Result<Self> {
        let mut mt = if sgf.trim().is_empty() {
            Self::new(Some(DEFAULT_INTERSECTIONS))
        } else {
            parse(sgf)?
        };
        for &variation in treepath.iter() {
            if !mt.move_down(variation) {
                break;
            }
        }
        Ok(mt)
    }

    /// Another cursor on the same tree, at the same position.
    pub fn new_tree_ref(&self) -> Self {
        self.clone()
    }

    /// Another cursor on the same tree, positioned at this cursor's root.
    pub fn tree_from_root(&self) -> Self {
        Self {
            tree: Rc::clone(&self.tree),
            root: self.root,
            current: self.root,
        }
    }

    /// A cursor whose root is the current node.
    pub fn from_node(&self) -> Self {
        Self {
            tree: Rc::clone(&self.tree),
            root: self.current,
            current: self.current,
        }
    }

    /// Whether both cursors view the same arena.
    pub fn shares_tree(&self, other: &MoveTree) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }

    pub fn node_index(&self) -> NodeIndex {
        self.current
    }

    pub fn node_id(&self) -> NodeId {
        self.tree.borrow().node(self.current).id
    }

    pub fn depth(&self) -> usize {
        self.node_id().depth
    }

    pub fn num_children(&self) -> usize {
        self.tree.borrow().node(self.current).children.len()
    }

    pub fn has_parent(&self) -> bool {
        self.tree.borrow().node(self.current).parent.is_some()
    }

    pub fn properties(&self) -> Ref<'_, Properties> {
        Ref::map(self.tree.borrow(), |t| &t.node(self.current).properties)
    }

    pub fn properties_mut(&self) -> RefMut<'_, Properties> {
        RefMut::map(self.tree.borrow_mut(), |t| &mut t.node_mut(self.current).properties)
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Move to the given child. Returns `false`, leaving the cursor in
    /// place, if there is no such variation.
    pub fn move_down(&mut self, variation: usize) -> bool {
        let child = self.tree.borrow().node(self.current).children.get(variation).copied();
        match child {
            Some(child) => {
                self.current = child;
                true
            }
            None => false,
        }
    }

    /// Move to the parent. Returns `false` if already at the top.
    pub fn move_up(&mut self) -> bool {
        let parent = self.tree.borrow().node(self.current).parent;
        match parent {
            Some(parent) => {
                self.current = parent;
                true
            }
            None => false,
        }
    }

    pub fn move_to_root(&mut self) {
        self.current = self.root;
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Append an empty child to the current node. The cursor stays put.
    pub fn add_child(&mut self) -> &mut Self {
        self.tree.borrow_mut().add_child(self.current);
        self
    }

    /// Append an empty child and move to it.
    pub fn add_node(&mut self) -> &mut Self {
        self.current = self.tree.borrow_mut().add_child(self.current);
        self
    }

    /// Detach the current node and its subtree, moving to the parent. The
    /// root cannot be deleted.
    pub fn delete_current_node(&mut self) -> bool {
        let mut tree = self.tree.borrow_mut();
        match tree.detach(self.current) {
            Some(parent) => {
                tree.renumber(parent);
                self.current = parent;
                true
            }
            None => false,
        }
    }

    /// Recompute the `NodeId`s below the current node.
    pub fn renumber(&mut self) -> &mut Self {
        self.tree.borrow_mut().renumber(self.current);
        self
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    /// The variation whose move is `color` at `point`. Passes never match.
    pub fn find_next_move(&self, point: Point, color: Color) -> Option<usize> {
        let tree = self.tree.borrow();
        tree.node(self.current).children.iter().find_map(|&child| {
            let node = tree.node(child);
            match node.properties.get_move() {
                Some(Move { color: c, point: Some(pt) }) if c == color && pt == point => {
                    Some(node.id.variation)
                }
                _ => None,
            }
        })
    }

    /// The move on the current node.
    pub fn last_move(&self) -> Option<Move> {
        self.properties().get_move()
    }

    /// Moves of the child nodes, in variation order. Children without a move
    /// are left out.
    pub fn next_moves(&self) -> Vec<Move> {
        let tree = self.tree.borrow();
        tree.node(self.current)
            .children
            .iter()
            .filter_map(|&child| tree.node(child).properties.get_move())
            .collect()
    }

    /// Whose turn it is: the opposite of the current node's move, or Black
    /// when the node has no move.
    pub fn current_player(&self) -> Color {
        match self.last_move() {
            Some(Move { color: Color::Black, .. }) => Color::White,
            _ => Color::Black,
        }
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// Visit the current node and everything below it, depth first.
    pub fn recurse(&self, mut f: impl FnMut(&MoveTree)) {
        let mut mt = self.new_tree_ref();
        mt.root = self.current;
        recurse_inner(&mut mt, &mut f);
    }

    // -----------------------------------------------------------------------
    // Root data
    // -----------------------------------------------------------------------

    /// Board size from the root `SZ`, defaulting to 19.
    pub fn intersections(&self) -> usize {
        let tree = self.tree.borrow();
        let Some(value) = tree.node(ROOT).properties.one_value(PropKey::SZ, 0) else {
            return DEFAULT_INTERSECTIONS;
        };
        // Rectangular boards are written `cols:rows`.
        let cols = value.split(':').next().unwrap_or_default().trim();
        match cols.parse() {
            Ok(n) => n,
            Err(_) => {
                warn!(value, "unparsable SZ, using {}", DEFAULT_INTERSECTIONS);
                DEFAULT_INTERSECTIONS
            }
        }
    }

    /// Set the root `SZ` unless one is already present.
    pub fn set_intersections(&self, intersections: usize) -> &Self {
        let mut tree = self.tree.borrow_mut();
        let root = &mut tree.node_mut(ROOT).properties;
        if !root.contains(PropKey::SZ) {
            root.add_prop(PropKey::SZ, [intersections.to_string()]);
        }
        self
    }
}

fn recurse_inner(mt: &mut MoveTree, f: &mut impl FnMut(&MoveTree)) {
    f(mt);
    for i in 0..mt.num_children() {
        mt.move_down(i);
        recurse_inner(mt, f);
        mt.move_up();
    }
}
