use std::{
    fmt::Debug,
    ptr::{self, NonNull},
};

use super::{Color, Node, NodePtr};

impl<K> Node<K> {
    /// A detached red node. Red is the attachment convention: a red leaf
    /// never changes the black count of any path.
    pub(crate) fn new(key: K) -> Self {
        Node {
            parent_color: ptr::null_mut(),
            right: None,
            left: None,
            key,
        }
    }

    #[inline(always)]
    pub fn color(&self) -> Color {
        Color::from(self.parent_color.addr() & 1)
    }

    #[inline(always)]
    pub fn is_black(&self) -> bool {
        self.color() == Color::Black
    }

    #[inline(always)]
    pub fn is_red(&self) -> bool {
        self.color() == Color::Red
    }

    #[inline(always)]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline(always)]
    pub(crate) fn key_mut(&mut self) -> &mut K {
        &mut self.key
    }

    #[inline(always)]
    pub fn parent(&self) -> NodePtr<K> {
        NonNull::new(self.parent_color.map_addr(|p| p & !1))
    }

    #[inline(always)]
    pub(crate) fn set_color(&mut self, color: Color) {
        self.parent_color = self.parent_color.map_addr(|p| (p & !1) | color as usize);
    }

    #[inline(always)]
    pub(crate) fn set_parent(&mut self, parent: NodePtr<K>) {
        self.set_parent_and_color(parent, self.color());
    }

    #[inline(always)]
    pub(crate) fn set_parent_and_color(&mut self, parent: NodePtr<K>, color: Color) {
        self.parent_color = parent
            .map_or(ptr::null_mut(), NonNull::as_ptr)
            .map_addr(|p| p | color as usize);
    }

    /// The rightmost node of the subtree under `node`; `node` itself when
    /// there is no right child. The in-order predecessor of a node with a
    /// left child is the rightmost node under that child.
    pub(crate) fn rightmost(mut node: NonNull<Node<K>>) -> NonNull<Node<K>> {
        // SAFETY: every pointer followed is an owning child link.
        while let Some(right) = unsafe { node.as_ref() }.right {
            node = right;
        }
        node
    }
}

impl<K> Debug for Node<K>
where
    K: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}::({:?})", self.color(), self.key))
    }
}
