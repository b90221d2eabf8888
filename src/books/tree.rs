//! AVL tree over book records
//!
//! Nodes live in a slab and link to each other by slot key, so the tree has
//! no self-referential pointers. A removed node's slot is released only
//! after no other node links to it.

use std::cmp::Ordering;

use slab::Slab;

use crate::model::Book;

/// Slot key of a node in the slab
type NodeId = usize;

#[derive(Debug)]
struct BookNode {
    book: Book,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Leaf height is 1; an empty subtree counts as 0
    height: u32,
}

impl BookNode {
    fn leaf(book: Book) -> Self {
        Self {
            book,
            left: None,
            right: None,
            height: 1,
        }
    }
}

/// Height-balanced search tree keyed by ISBN.
///
/// Insert, search and remove are O(log n). Iteration is in ascending ISBN
/// order.
#[derive(Debug, Default)]
pub struct BookIndex {
    nodes: Slab<BookNode>,
    root: Option<NodeId>,
    rotations: u64,
}

impl BookIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a book.
    ///
    /// If the ISBN is already present the index is left unchanged and the
    /// given book is dropped. Returns whether the book was inserted.
    pub fn insert(&mut self, book: Book) -> bool {
        let (root, inserted) = self.insert_at(self.root, book);
        self.root = Some(root);
        inserted
    }

    /// Look up a book by ISBN
    pub fn search(&self, isbn: &str) -> Option<&Book> {
        self.find(isbn).map(|id| &self.nodes[id].book)
    }

    /// Look up a book for in-place updates of its counts.
    ///
    /// The ISBN cannot change through this reference.
    pub fn search_mut(&mut self, isbn: &str) -> Option<&mut Book> {
        let id = self.find(isbn)?;
        Some(&mut self.nodes[id].book)
    }

    /// Whether a book with this ISBN exists
    pub fn contains(&self, isbn: &str) -> bool {
        self.find(isbn).is_some()
    }

    /// Remove a book by ISBN, returning it.
    ///
    /// A missing ISBN returns `None` and changes nothing.
    pub fn take(&mut self, isbn: &str) -> Option<Book> {
        let (root, removed) = self.remove_at(self.root, isbn);
        self.root = root;
        removed
    }

    /// Remove a book by ISBN. Returns false if it was not present.
    pub fn remove(&mut self, isbn: &str) -> bool {
        self.take(isbn).is_some()
    }

    /// All books in ascending ISBN order
    pub fn get_all_sorted(&self) -> Vec<&Book> {
        self.iter().collect()
    }

    /// In-order iterator over the books
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.nodes, self.root)
    }

    /// Number of books
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drop every book
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Height of the tree; 0 when empty
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// Total single rotations performed since creation
    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Check ordering, cached heights, balance factors and node count.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        let mut visited = 0;
        self.validate_at(self.root, None, None, &mut visited)?;
        if visited != self.nodes.len() {
            return Err(format!(
                "{} nodes reachable from root, {} allocated",
                visited,
                self.nodes.len()
            ));
        }
        Ok(())
    }

    fn validate_at(
        &self,
        node: Option<NodeId>,
        lower: Option<&str>,
        upper: Option<&str>,
        visited: &mut usize,
    ) -> Result<u32, String> {
        let Some(id) = node else {
            return Ok(0);
        };
        *visited += 1;

        let n = &self.nodes[id];
        let isbn = n.book.isbn();
        if lower.is_some_and(|l| isbn <= l) || upper.is_some_and(|u| isbn >= u) {
            return Err(format!("ISBN {} violates search order", isbn));
        }

        let left = self.validate_at(n.left, lower, Some(isbn), visited)?;
        let right = self.validate_at(n.right, Some(isbn), upper, visited)?;

        if n.height != 1 + left.max(right) {
            return Err(format!(
                "ISBN {} caches height {}, actual {}",
                isbn,
                n.height,
                1 + left.max(right)
            ));
        }
        let balance = i64::from(left) - i64::from(right);
        if balance.abs() > 1 {
            return Err(format!("ISBN {} has balance factor {}", isbn, balance));
        }
        Ok(n.height)
    }

    fn find(&self, isbn: &str) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            current = match isbn.cmp(node.book.isbn()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    fn insert_at(&mut self, node: Option<NodeId>, book: Book) -> (NodeId, bool) {
        let Some(id) = node else {
            return (self.nodes.insert(BookNode::leaf(book)), true);
        };

        match book.isbn().cmp(self.nodes[id].book.isbn()) {
            Ordering::Less => {
                let (child, inserted) = self.insert_at(self.nodes[id].left, book);
                self.nodes[id].left = Some(child);
                if !inserted {
                    return (id, false);
                }
            }
            Ordering::Greater => {
                let (child, inserted) = self.insert_at(self.nodes[id].right, book);
                self.nodes[id].right = Some(child);
                if !inserted {
                    return (id, false);
                }
            }
            Ordering::Equal => return (id, false),
        }

        (self.rebalance(id), true)
    }

    fn remove_at(&mut self, node: Option<NodeId>, isbn: &str) -> (Option<NodeId>, Option<Book>) {
        let Some(id) = node else {
            return (None, None);
        };

        let removed = match isbn.cmp(self.nodes[id].book.isbn()) {
            Ordering::Less => {
                let (child, removed) = self.remove_at(self.nodes[id].left, isbn);
                self.nodes[id].left = child;
                removed
            }
            Ordering::Greater => {
                let (child, removed) = self.remove_at(self.nodes[id].right, isbn);
                self.nodes[id].right = child;
                removed
            }
            Ordering::Equal => {
                let (left, right) = (self.nodes[id].left, self.nodes[id].right);
                match (left, right) {
                    (Some(_), Some(right)) => {
                        // The successor's record moves into this node; its
                        // old node is unlinked from the right subtree.
                        let (new_right, successor) = self.remove_min(right);
                        self.nodes[id].right = new_right;
                        Some(std::mem::replace(&mut self.nodes[id].book, successor))
                    }
                    (child, None) | (None, child) => {
                        let node = self.release(id);
                        return (child, Some(node.book));
                    }
                }
            }
        };

        if removed.is_none() {
            return (Some(id), None);
        }
        (Some(self.rebalance(id)), removed)
    }

    /// Detach the minimum node of a subtree, returning the new subtree root
    /// and the detached record.
    fn remove_min(&mut self, id: NodeId) -> (Option<NodeId>, Book) {
        match self.nodes[id].left {
            None => {
                let right = self.nodes[id].right;
                let node = self.release(id);
                (right, node.book)
            }
            Some(left) => {
                let (new_left, book) = self.remove_min(left);
                self.nodes[id].left = new_left;
                (Some(self.rebalance(id)), book)
            }
        }
    }

    /// Clear a node's child links and free its slot
    fn release(&mut self, id: NodeId) -> BookNode {
        let node = &mut self.nodes[id];
        node.left = None;
        node.right = None;
        self.nodes.remove(id)
    }

    fn height_of(&self, node: Option<NodeId>) -> u32 {
        node.map_or(0, |id| self.nodes[id].height)
    }

    fn balance_of(&self, node: Option<NodeId>) -> i64 {
        match node {
            Some(id) => {
                let n = &self.nodes[id];
                i64::from(self.height_of(n.left)) - i64::from(self.height_of(n.right))
            }
            None => 0,
        }
    }

    fn update_height(&mut self, id: NodeId) {
        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        self.nodes[id].height = 1 + self.height_of(left).max(self.height_of(right));
    }

    /// Restore the balance of `id` after one of its subtrees changed height
    /// by at most one. Returns the subtree's new root.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);
        let balance = self.balance_of(Some(id));

        if balance > 1 {
            let left = self.nodes[id].left;
            if self.balance_of(left) < 0 {
                // left-right
                if let Some(left) = left {
                    let new_left = self.rotate_left(left);
                    self.nodes[id].left = Some(new_left);
                }
            }
            // left-left
            return self.rotate_right(id);
        }

        if balance < -1 {
            let right = self.nodes[id].right;
            if self.balance_of(right) > 0 {
                // right-left
                if let Some(right) = right {
                    let new_right = self.rotate_right(right);
                    self.nodes[id].right = Some(new_right);
                }
            }
            // right-right
            return self.rotate_left(id);
        }

        id
    }

    /// ```text
    ///       y          x
    ///      / \        / \
    ///     x   C  ->  A   y
    ///    / \            / \
    ///   A   B          B   C
    /// ```
    fn rotate_right(&mut self, y: NodeId) -> NodeId {
        let Some(x) = self.nodes[y].left else {
            return y;
        };
        let b = self.nodes[x].right;

        self.nodes[x].right = Some(y);
        self.nodes[y].left = b;

        self.update_height(y);
        self.update_height(x);
        self.rotations += 1;
        x
    }

    /// ```text
    ///     x              y
    ///    / \            / \
    ///   A   y    ->    x   C
    ///      / \        / \
    ///     B   C      A   B
    /// ```
    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        let b = self.nodes[y].left;

        self.nodes[y].left = Some(x);
        self.nodes[x].right = b;

        self.update_height(x);
        self.update_height(y);
        self.rotations += 1;
        y
    }
}

impl<'a> IntoIterator for &'a BookIndex {
    type Item = &'a Book;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over a [`BookIndex`]
#[derive(Debug)]
pub struct Iter<'a> {
    nodes: &'a Slab<BookNode>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    fn new(nodes: &'a Slab<BookNode>, root: Option<NodeId>) -> Self {
        let mut iter = Self {
            nodes,
            stack: Vec::new(),
            remaining: nodes.len(),
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<NodeId>) {
        while let Some(id) = node {
            self.stack.push(id);
            node = self.nodes[id].left;
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Book;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[id];
        self.push_left_spine(node.right);
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.book)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
