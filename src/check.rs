use thiserror::Error;

use super::{NodePtr, NodePtrExt, RedBlack, Tree};

/// Why a tree failed [`Tree::check`]. Distinct reasons because the two
/// structural violations point at different fix-up bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Corruption {
    #[error("the root is red")]
    RedRoot,
    #[error("a red node has a red child")]
    RedRed,
    #[error("black heights diverge below a node")]
    BlackHeightMismatch,
}

impl<K> Tree<K, RedBlack> {
    /// Validate the red-black structure: black root, no red node with a red
    /// child, and the same number of black nodes on every path from a node
    /// down to each absent child. A test oracle; no mutation path calls it.
    pub fn check(&self) -> Result<(), Corruption> {
        if self.root.is_red() {
            return Err(Corruption::RedRoot);
        }
        black_height(self.root).map(|_| ())
    }
}

/// The number of black nodes from `node` (inclusive) down to any absent
/// child, with absent children counting as black leaves.
fn black_height<K>(node: NodePtr<K>) -> Result<usize, Corruption> {
    let Some(n) = node else { return Ok(1) };
    let n = unsafe { n.as_ref() };
    if n.is_red() && (n.left.is_red() || n.right.is_red()) {
        return Err(Corruption::RedRed);
    }
    let left = black_height(n.left)?;
    let right = black_height(n.right)?;
    if left != right {
        return Err(Corruption::BlackHeightMismatch);
    }
    Ok(left + n.is_black() as usize)
}
