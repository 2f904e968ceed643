use std::fmt;

use super::{Balance, Node, NodePtr, RedBlack, Tree, Unbalanced};

/// Bracketed in-order listing, `[ 1 2 3 ]`.
impl<K: fmt::Display, B: Balance> fmt::Display for Tree<K, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ")?;
        let mut result = Ok(());
        self.in_order(|key| {
            if result.is_ok() {
                result = write!(f, "{key} ");
            }
        });
        result?;
        write!(f, "]")
    }
}

/// Indented tree dump, one node per line, absent children printed as nil.
fn subtree<K>(
    f: &mut fmt::Formatter<'_>,
    node: NodePtr<K>,
    prefix: &str,
    is_left: bool,
    line: &mut dyn FnMut(&Node<K>, &mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    write!(f, "{prefix}{}", if is_left { "├──" } else { "└──" })?;
    match node {
        Some(n) => {
            let n = unsafe { n.as_ref() };
            line(n, f)?;
            writeln!(f)?;
            let deeper = format!("{prefix}{}", if is_left { "│   " } else { "    " });
            subtree(f, n.left, &deeper, true, line)?;
            subtree(f, n.right, &deeper, false, line)
        }
        None => writeln!(f, "nil"),
    }
}

impl<K: fmt::Debug> fmt::Debug for Tree<K, RedBlack> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        subtree(f, self.root, "", false, &mut |n, f| write!(f, "{n:?}"))
    }
}

impl<K: fmt::Debug> fmt::Debug for Tree<K, Unbalanced> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        subtree(f, self.root, "", false, &mut |n, f| {
            write!(f, "{:?}", n.key())
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{BinarySearchTree, RBTree};

    use pretty_assertions::assert_eq;

    #[test]
    fn debug_dump_marks_colors_and_absent_children() {
        let mut tree = RBTree::new();
        for k in [2, 1, 3] {
            tree.insert(k);
        }
        assert_eq!(
            "└──Black::(2)\n    \
             ├──Red::(1)\n    \
             │   ├──nil\n    \
             │   └──nil\n    \
             └──Red::(3)\n        \
             ├──nil\n        \
             └──nil\n",
            format!("{tree:?}")
        );
    }

    #[test]
    fn unbalanced_dump_has_no_colors() {
        let mut tree = BinarySearchTree::new();
        tree.insert(1);
        tree.insert(2);
        assert_eq!(
            "└──1\n    ├──nil\n    └──2\n        ├──nil\n        └──nil\n",
            format!("{tree:?}")
        );
    }

    #[test]
    fn empty_tree_prints_a_nil_root() {
        assert_eq!("└──nil\n", format!("{:?}", RBTree::<i32>::new()));
    }
}
