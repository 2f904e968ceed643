use std::{borrow::Borrow, cmp::Ordering::*, marker::PhantomData, mem, ptr::NonNull};

use log::{debug, trace};

use super::{Balance, Color, Node, NodePtr, NodePtrExt, Tree};
use crate::balance::change_child;

enum Side {
    Left,
    Right,
}

impl<K, B: Balance> Tree<K, B> {
    pub const fn new() -> Self {
        Tree {
            root: None,
            len: 0,
            balance: PhantomData,
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Attach `key` to the tree. Returns false and leaves the tree
    /// untouched when the key is already present.
    pub fn insert(&mut self, key: K) -> bool
    where
        K: Ord,
    {
        let mut parent: NodePtr<K> = None;
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(candidate) = current {
            let candidate = unsafe { candidate.as_ref() };
            match key.cmp(candidate.key()) {
                Equal => {
                    trace!("insert: duplicate key, tree untouched");
                    return false;
                }
                Less => {
                    parent = current;
                    side = Side::Left;
                    current = candidate.left;
                }
                Greater => {
                    parent = current;
                    side = Side::Right;
                    current = candidate.right;
                }
            }
        }

        let mut node = Box::new(Node::new(key));
        node.set_parent_and_color(parent, Color::Red);
        let node = NonNull::new(Box::into_raw(node)).expect("cannot be null");
        match parent {
            None => self.root = Some(node),
            Some(mut p) => {
                let p = unsafe { p.as_mut() };
                match side {
                    Side::Left => p.left = Some(node),
                    Side::Right => p.right = Some(node),
                }
            }
        }
        self.len += 1;
        B::after_attach(&mut self.root, node);
        true
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut node = self.root;
        while let Some(candidate) = node {
            let candidate = unsafe { candidate.as_ref() };
            match key.cmp(candidate.key().borrow()) {
                Equal => return Some(candidate.key()),
                Less => node = candidate.left,
                Greater => node = candidate.right,
            }
        }
        None
    }

    /// Remove `key`. Returns false when the key was absent.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q> + Ord,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(candidate) = current {
            let candidate_ref = unsafe { candidate.as_ref() };
            match key.cmp(candidate_ref.key().borrow()) {
                Equal => break,
                Less => current = candidate_ref.left,
                Greater => current = candidate_ref.right,
            }
        }
        let Some(mut target) = current else {
            trace!("remove: key absent, tree untouched");
            return false;
        };

        // Two children: hand the in-order predecessor's key to the target
        // and splice out the predecessor, which has at most a left child.
        let (left, right) = {
            let t = unsafe { target.as_ref() };
            (t.left, t.right)
        };
        if let (Some(left), Some(_)) = (left, right) {
            let mut predecessor = Node::rightmost(left);
            mem::swap(
                unsafe { target.as_mut() }.key_mut(),
                unsafe { predecessor.as_mut() }.key_mut(),
            );
            target = predecessor;
        }

        // Splice: promote the lone child (or nothing) into target's slot.
        let (mut child, parent, removed) = {
            let t = unsafe { target.as_ref() };
            (t.left.or(t.right), t.parent(), t.color())
        };
        change_child(&mut self.root, Some(target), child, parent);
        child.set_parent(parent);
        drop(unsafe { Box::from_raw(target.as_ptr()) });
        self.len -= 1;
        B::after_splice(&mut self.root, child, parent, removed);
        true
    }

    /// Release every node. The walk is iterative and uses the parent links,
    /// so deep (unbalanced) trees cannot overflow the stack.
    pub fn clear(&mut self) {
        let mut freed = 0usize;
        let mut node = self.root;
        while let Some(current) = node {
            let current_ref = unsafe { current.as_ref() };
            if current_ref.left.is_some() {
                node = current_ref.left;
                continue;
            }
            if current_ref.right.is_some() {
                node = current_ref.right;
                continue;
            }
            // A leaf by now: unhook it and climb back.
            let parent = current_ref.parent();
            if let Some(mut p) = parent {
                let p = unsafe { p.as_mut() };
                if p.left == node {
                    p.left = None;
                } else {
                    p.right = None;
                }
            }
            drop(unsafe { Box::from_raw(current.as_ptr()) });
            freed += 1;
            node = parent;
        }
        debug!("clear: released {freed} nodes");
        self.root = None;
        self.len = 0;
    }

    /// Nodes on the longest root-to-leaf path: 0 for an empty tree, 1 for a
    /// lone root.
    pub fn height(&self) -> usize {
        fn below<K>(node: NodePtr<K>) -> usize {
            let Some(n) = node else { return 0 };
            let n = unsafe { n.as_ref() };
            1 + below(n.left).max(below(n.right))
        }
        below(self.root)
    }

    /// In-order read-only traversal: keys are visited in ascending order.
    pub fn in_order<F: FnMut(&K)>(&self, mut f: F) {
        fn walk<K, F: FnMut(&K)>(node: NodePtr<K>, f: &mut F) {
            let Some(n) = node else { return };
            let n = unsafe { n.as_ref() };
            walk(n.left, f);
            f(n.key());
            walk(n.right, f);
        }
        walk(self.root, &mut f);
    }
}

impl<K, B: Balance> Default for Tree<K, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, B: Balance> Drop for Tree<K, B> {
    fn drop(&mut self) {
        self.clear();
    }
}
