//! Arena tree that can be extended while it is being traversed.
//!
//! Traversal state lives in explicit cursors that only borrow the tree for the
//! duration of a single [`TraversalCursor::advance`] call. Between two calls the
//! caller is free to attach children anywhere, and both orders still reach the
//! new nodes in the right position.

use crate::error::CrawlError;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node<T> {
    payload: T,
    depth: usize,
    children: Vec<NodeId>,
}

/// A rooted tree whose nodes are only ever appended.
///
/// Every payload attached to the tree is recorded in a tree-wide seen set, so
/// one payload can never hang under two different parents.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    nodes: Vec<Node<T>>,
    seen: HashSet<T>,
}

impl<T: Eq + Hash + Clone> Tree<T> {
    pub fn new(root: T) -> Self {
        let mut seen = HashSet::new();
        seen.insert(root.clone());
        Self {
            nodes: vec![Node {
                payload: root,
                depth: 0,
                children: Vec::new(),
            }],
            seen,
        }
    }

    /// Appends `payload` as the last child of `parent`.
    ///
    /// Returns `None` without touching the tree when the payload is already
    /// attached somewhere.
    pub fn add_child(&mut self, parent: NodeId, payload: T) -> Option<NodeId> {
        if !self.seen.insert(payload.clone()) {
            return None;
        }
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(Node {
            payload,
            depth,
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Some(id)
    }

    pub fn contains(&self, payload: &T) -> bool {
        self.seen.contains(payload)
    }
}

impl<T> Tree<T> {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not handed out by this tree.
    pub fn payload(&self, id: NodeId) -> &T {
        &self.nodes[id.0].payload
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.nodes[id.0].depth
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cursor(&self, order: TraversalOrder) -> TraversalCursor {
        TraversalCursor::new(order, self.root())
    }

    /// Read-only iterator over the tree in the given order.
    pub fn walk(&self, order: TraversalOrder) -> Walk<'_, T> {
        Walk {
            tree: self,
            cursor: self.cursor(order),
        }
    }

    /// Indented pre-order listing, two spaces per level.
    pub fn outline<F>(&self, label: F) -> String
    where
        F: Fn(&T) -> String,
    {
        let mut out = String::new();
        for id in self.walk(TraversalOrder::DepthFirst) {
            out.push_str(&"  ".repeat(self.depth(id)));
            out.push_str(&label(self.payload(id)));
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalOrder {
    #[default]
    BreadthFirst,
    DepthFirst,
}

impl FromStr for TraversalOrder {
    type Err = CrawlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bf" | "breadth-first" => Ok(TraversalOrder::BreadthFirst),
            "df" | "depth-first" => Ok(TraversalOrder::DepthFirst),
            _ => Err(CrawlError::UnsupportedTraversalOrder(s.to_string())),
        }
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalOrder::BreadthFirst => write!(f, "BF"),
            TraversalOrder::DepthFirst => write!(f, "DF"),
        }
    }
}

/// Level-order cursor.
///
/// Re-walks the tree from the root once per depth level, which is what lets
/// children attached to an already visited node of depth `d` show up when
/// level `d + 1` is scanned.
#[derive(Debug, Clone)]
pub struct BreadthFirst {
    root: NodeId,
    stack: Vec<NodeId>,
    target_depth: usize,
    depth_satisfied: bool,
}

impl BreadthFirst {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            stack: vec![root],
            target_depth: 0,
            depth_satisfied: true,
        }
    }

    pub fn advance<T>(&mut self, tree: &Tree<T>) -> Option<NodeId> {
        loop {
            let Some(id) = self.stack.pop() else {
                if !self.depth_satisfied {
                    return None;
                }
                self.target_depth += 1;
                self.depth_satisfied = false;
                self.stack.push(self.root);
                continue;
            };

            if tree.depth(id) == self.target_depth {
                self.depth_satisfied = true;
                return Some(id);
            }
            // reversed, so that pops come out left to right
            self.stack.extend(tree.children(id).iter().rev().copied());
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    next_child: usize,
}

/// Pre-order cursor.
///
/// Each frame keeps an index into its node's child list and re-reads the list
/// length on every step, so children appended while the subtree is in
/// progress are still visited.
#[derive(Debug, Clone)]
pub struct DepthFirst {
    root: NodeId,
    frames: Vec<Frame>,
    started: bool,
}

impl DepthFirst {
    pub fn new(root: NodeId) -> Self {
        Self {
            root,
            frames: Vec::new(),
            started: false,
        }
    }

    pub fn advance<T>(&mut self, tree: &Tree<T>) -> Option<NodeId> {
        if !self.started {
            self.started = true;
            self.frames.push(Frame {
                node: self.root,
                next_child: 0,
            });
            return Some(self.root);
        }

        while let Some(frame) = self.frames.last_mut() {
            if let Some(&child) = tree.children(frame.node).get(frame.next_child) {
                frame.next_child += 1;
                self.frames.push(Frame {
                    node: child,
                    next_child: 0,
                });
                return Some(child);
            }
            self.frames.pop();
        }
        None
    }
}

#[derive(Debug, Clone)]
pub enum TraversalCursor {
    BreadthFirst(BreadthFirst),
    DepthFirst(DepthFirst),
}

impl TraversalCursor {
    pub fn new(order: TraversalOrder, root: NodeId) -> Self {
        match order {
            TraversalOrder::BreadthFirst => TraversalCursor::BreadthFirst(BreadthFirst::new(root)),
            TraversalOrder::DepthFirst => TraversalCursor::DepthFirst(DepthFirst::new(root)),
        }
    }

    /// Moves to the next node, or `None` once the tree is exhausted.
    ///
    /// Cursors are single-use and keep returning `None` after exhaustion.
    pub fn advance<T>(&mut self, tree: &Tree<T>) -> Option<NodeId> {
        match self {
            TraversalCursor::BreadthFirst(cursor) => cursor.advance(tree),
            TraversalCursor::DepthFirst(cursor) => cursor.advance(tree),
        }
    }
}

pub struct Walk<'a, T> {
    tree: &'a Tree<T>,
    cursor: TraversalCursor,
}

impl<T> Iterator for Walk<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.cursor.advance(self.tree)
    }
}
