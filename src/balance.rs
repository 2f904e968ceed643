use std::ptr::NonNull;

use log::trace;

use super::{Balance, Color, Node, NodePtr, NodePtrExt, RedBlack, Unbalanced};

impl Balance for Unbalanced {
    fn after_attach<K>(_root: &mut NodePtr<K>, _node: NonNull<Node<K>>) {}

    fn after_splice<K>(
        _root: &mut NodePtr<K>,
        _child: NodePtr<K>,
        _parent: NodePtr<K>,
        _removed: Color,
    ) {
    }
}

impl Balance for RedBlack {
    fn after_attach<K>(root: &mut NodePtr<K>, node: NonNull<Node<K>>) {
        fix_insert(root, node);
    }

    fn after_splice<K>(
        root: &mut NodePtr<K>,
        child: NodePtr<K>,
        parent: NodePtr<K>,
        removed: Color,
    ) {
        // Splicing out a red node leaves every black count intact.
        if removed == Color::Black {
            fix_remove(root, child, parent);
        }
    }
}

/// Point `parent`'s link to `old` at `new` instead, or re-root the tree when
/// `old` hung off no parent.
pub(crate) fn change_child<K>(
    root: &mut NodePtr<K>,
    old: NodePtr<K>,
    new: NodePtr<K>,
    parent: NodePtr<K>,
) {
    if let Some(mut parent) = parent {
        let parent = unsafe { parent.as_mut() };
        if parent.left == old {
            parent.left = new;
        } else {
            parent.right = new;
        }
    } else {
        *root = new;
    }
}

/*
 *      parent               parent
 *        |                    |
 *        P                    V
 *      /   \    ------\     /   \
 *     F     V   ------/    P     X
 *         /   \          /   \
 *        R     X        F     R
 *
 * Pure pointer surgery: colors stay with their nodes, in-order order is
 * preserved. A pivot without the rising child means the rebalancing logic
 * itself is broken, and the tree can no longer be trusted.
 */
pub(crate) fn rotate_left<K>(root: &mut NodePtr<K>, pivot: NodePtr<K>) {
    if pivot.is_none() || pivot.right().is_none() {
        panic!("left rotation requires a pivot with a right child");
    }
    let mut pivot = pivot;
    let mut riser = pivot.right();
    let mut inner = riser.left();
    let parent = pivot.parent();

    pivot.set_right(inner);
    inner.set_parent(pivot);

    riser.set_parent(parent);
    change_child(root, pivot, riser, parent);
    riser.set_left(pivot);
    pivot.set_parent(riser);
}

/*
 *      parent               parent
 *        |                    |
 *        P                    F
 *      /   \    ------\     /   \
 *     F     V   ------/    D     P
 *   /   \                      /   \
 *  D     K                    K     V
 */
pub(crate) fn rotate_right<K>(root: &mut NodePtr<K>, pivot: NodePtr<K>) {
    if pivot.is_none() || pivot.left().is_none() {
        panic!("right rotation requires a pivot with a left child");
    }
    let mut pivot = pivot;
    let mut riser = pivot.left();
    let mut inner = riser.right();
    let parent = pivot.parent();

    pivot.set_left(inner);
    inner.set_parent(pivot);

    riser.set_parent(parent);
    change_child(root, pivot, riser, parent);
    riser.set_right(pivot);
    pivot.set_parent(riser);
}

/// Walk up from a freshly attached red `node` until no red node has a red
/// child and the root is black again.
pub(crate) fn fix_insert<K>(root: &mut NodePtr<K>, node: NonNull<Node<K>>) {
    let mut node: NodePtr<K> = Some(node);
    loop {
        /*
         * Loop invariant: node is red.
         */
        let mut parent = node.parent();
        if parent.is_none() {
            // node climbed to (or was attached as) the root.
            node.set_color(Color::Black);
            break;
        }
        if parent.is_black() {
            // A red node under a black parent violates nothing.
            break;
        }

        // The parent is red, hence not the root: a grandparent exists.
        let mut gparent = parent.parent();
        let parent_is_left = gparent.left() == parent;
        let mut uncle = if parent_is_left {
            gparent.right()
        } else {
            gparent.left()
        };

        if uncle.is_red() {
            /*
             * Red uncle: color flips only.
             *
             *       G            g
             *      / \          / \
             *     p   u  -->   P   U
             *    /            /
             *   n            n
             *
             * g's own parent may be red, so the violation can move
             * up two levels; continue from g.
             */
            trace!("insert fixup: red uncle, recoloring");
            parent.set_color(Color::Black);
            uncle.set_color(Color::Black);
            gparent.set_color(Color::Red);
            node = gparent;
            continue;
        }

        if (parent.left() == node) != parent_is_left {
            /*
             * Black uncle, node on the inner side (zig-zag): rotate
             * at the parent to straighten the line.
             *
             *      G             G
             *     / \           / \
             *    p   U  -->    n   U
             *     \           /
             *      n         p
             *
             * Still two reds in a row; the old parent now sits where a
             * straight-line node would, so loop with it as the node.
             */
            trace!("insert fixup: zig-zag, rotating at the parent");
            if parent_is_left {
                rotate_left(root, parent);
            } else {
                rotate_right(root, parent);
            }
            node = parent;
            continue;
        }

        /*
         * Black uncle, straight line: rotate at the grandparent.
         *
         *        G           P
         *       / \         / \
         *      p   U  -->  n   g
         *     /                 \
         *    n                   U
         *
         * P turns black, so the subtree root color and every black
         * count are restored; nothing further can be violated.
         */
        trace!("insert fixup: straight line, rotating at the grandparent");
        parent.set_color(Color::Black);
        gparent.set_color(Color::Red);
        if parent_is_left {
            rotate_right(root, gparent);
        } else {
            rotate_left(root, gparent);
        }
        break;
    }
}

/// Walk up from the splice point of a black node. `node` (possibly absent —
/// an empty slot counts as doubly black) sits under `parent` one black
/// short on every path through it.
pub(crate) fn fix_remove<K>(root: &mut NodePtr<K>, mut node: NodePtr<K>, mut parent: NodePtr<K>) {
    loop {
        /*
         * Loop invariants:
         * - all paths through node count one black fewer than the rest
         * - node is black or absent on every iteration but possibly the
         *   first; a red node absorbs the deficit by turning black
         */
        if node.is_red() {
            trace!("delete fixup: red replacement absorbs the missing black");
            node.set_color(Color::Black);
            break;
        }
        if parent.is_none() {
            // The deficit reached the root: every path shortened alike.
            break;
        }

        let mut sibling = parent.right();
        if node != sibling {
            /* deficit on the left; a deficit implies the sibling exists */
            if sibling.is_red() {
                /*
                 * Red sibling: rotate it above the parent.
                 *
                 *     P               S
                 *    / \             / \
                 *   N   s    -->    p   Sr
                 *      / \         / \
                 *     Sl  Sr      N   Sl
                 *
                 * N's new sibling Sl is black; retry from N.
                 */
                trace!("delete fixup: red sibling, rotating at the parent");
                sibling.set_color(Color::Black);
                parent.set_color(Color::Red);
                rotate_left(root, parent);
                continue;
            }
            let mut near = sibling.left();
            let mut far = sibling.right();
            if near.is_black() && far.is_black() {
                /*
                 * Black sibling, black nephews: drop one black from
                 * both sides of the parent and push the deficit up.
                 *
                 *    (p)           (p)
                 *    / \           / \
                 *   N   S    -->  N   s
                 *      / \           / \
                 *     Sl  Sr        Sl  Sr
                 */
                trace!("delete fixup: black sibling and nephews, climbing");
                sibling.set_color(Color::Red);
                node = parent;
                parent = node.parent();
                continue;
            }
            if far.is_black() {
                /*
                 * Near nephew red, far black: rotate at the sibling so
                 * the red ends up on the far side.
                 *
                 *   (p)           (p)
                 *   / \           / \
                 *  N   S    -->  N   Sl
                 *     / \             \
                 *    sl  Sr            s
                 *                       \
                 *                        Sr
                 */
                trace!("delete fixup: far nephew black, rotating at the sibling");
                near.set_color(Color::Black);
                sibling.set_color(Color::Red);
                rotate_right(root, sibling);
                continue;
            }
            /*
             * Far nephew red: the terminal rotation. S takes over p's
             * color and slot, N gains a black ancestor, the red far
             * nephew pays for the black S used to contribute.
             *
             *      (p)             (s)
             *      / \             / \
             *     N   S     -->   P   Sr
             *        / \         / \
             *      (sl) sr      N  (sl)
             */
            trace!("delete fixup: far nephew red, rotating at the parent");
            sibling.set_color(parent.color());
            parent.set_color(Color::Black);
            far.set_color(Color::Black);
            rotate_left(root, parent);
            break;
        } else {
            /* deficit on the right; mirror image */
            sibling = parent.left();
            if sibling.is_red() {
                trace!("delete fixup: red sibling, rotating at the parent");
                sibling.set_color(Color::Black);
                parent.set_color(Color::Red);
                rotate_right(root, parent);
                continue;
            }
            let mut near = sibling.right();
            let mut far = sibling.left();
            if near.is_black() && far.is_black() {
                trace!("delete fixup: black sibling and nephews, climbing");
                sibling.set_color(Color::Red);
                node = parent;
                parent = node.parent();
                continue;
            }
            if far.is_black() {
                trace!("delete fixup: far nephew black, rotating at the sibling");
                near.set_color(Color::Black);
                sibling.set_color(Color::Red);
                rotate_left(root, sibling);
                continue;
            }
            trace!("delete fixup: far nephew red, rotating at the parent");
            sibling.set_color(parent.color());
            parent.set_color(Color::Black);
            far.set_color(Color::Black);
            rotate_right(root, parent);
            break;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{RBTree, Tree};

    use pretty_assertions::assert_eq;

    /// Locate the node holding `key`; the tests need raw positions to aim
    /// rotations at.
    fn position<K: Ord>(tree: &RBTree<K>, key: &K) -> NodePtr<K> {
        let mut node = tree.root;
        while let Some(n) = node {
            let n = unsafe { n.as_ref() };
            node = match key.cmp(n.key()) {
                std::cmp::Ordering::Equal => break,
                std::cmp::Ordering::Less => n.left,
                std::cmp::Ordering::Greater => n.right,
            };
        }
        node
    }

    fn tree_of(keys: &[i32]) -> RBTree<i32> {
        let mut tree = Tree::new();
        for &k in keys {
            tree.insert(k);
        }
        tree
    }

    #[test]
    fn rotations_are_inverse() {
        let mut tree = tree_of(&[20, 10, 30, 25, 35]);
        let before = format!("{tree:?}");

        let pivot = position(&tree, &30);
        rotate_left(&mut tree.root, pivot);
        assert_ne!(before, format!("{tree:?}"));

        // 35 rose into 30's old slot; rotating right there undoes it.
        let pivot = position(&tree, &35);
        rotate_right(&mut tree.root, pivot);
        assert_eq!(before, format!("{tree:?}"));
    }

    #[test]
    fn rotation_at_the_root_rehangs_the_root() {
        let mut tree = tree_of(&[20, 10, 30]);
        let pivot = tree.root;
        rotate_left(&mut tree.root, pivot);
        let mut keys = Vec::new();
        tree.in_order(|k| keys.push(*k));
        assert_eq!(keys, [10, 20, 30]);
        assert_eq!(position(&tree, &30), tree.root);

        let pivot = tree.root;
        rotate_right(&mut tree.root, pivot);
        let mut keys = Vec::new();
        tree.in_order(|k| keys.push(*k));
        assert_eq!(keys, [10, 20, 30]);
        assert_eq!(position(&tree, &20), tree.root);
    }

    #[test]
    #[should_panic(expected = "left rotation requires a pivot with a right child")]
    fn left_rotation_without_right_child_is_fatal() {
        let mut tree = tree_of(&[20, 10]);
        let pivot = position(&tree, &10);
        rotate_left(&mut tree.root, pivot);
    }

    #[test]
    #[should_panic(expected = "right rotation requires a pivot with a left child")]
    fn right_rotation_without_left_child_is_fatal() {
        let mut tree = tree_of(&[20, 30]);
        let pivot = position(&tree, &30);
        rotate_right(&mut tree.root, pivot);
    }

    #[test]
    fn straight_line_insertions_rotate_at_the_grandparent() {
        // Ascending run: every second insert is the straight-line case.
        let tree = tree_of(&[10, 20, 30]);
        assert_eq!(
            format!("{tree:?}"),
            "└──Black::(20)\n    \
             ├──Red::(10)\n    \
             │   ├──nil\n    \
             │   └──nil\n    \
             └──Red::(30)\n        \
             ├──nil\n        \
             └──nil\n"
        );
    }

    #[test]
    fn zig_zag_insertions_straighten_first() {
        let tree = tree_of(&[10, 30, 20]);
        assert!(tree.check().is_ok());
        assert_eq!(tree.height(), 2);
        // Same shape as the straight-line case once fixed up.
        assert_eq!(format!("{tree:?}"), format!("{:?}", tree_of(&[10, 20, 30])));
    }

    #[test]
    fn red_uncle_recolors_without_rotation() {
        let mut tree = tree_of(&[20, 10, 30]);
        let before: Vec<i32> = {
            let mut v = Vec::new();
            tree.in_order(|k| v.push(*k));
            v
        };
        assert!(tree.insert(5));
        assert!(tree.check().is_ok());
        // 5 hangs exactly where plain BST insertion put it.
        assert_eq!(position(&tree, &10).left(), position(&tree, &5));
        let mut after = Vec::new();
        tree.in_order(|k| after.push(*k));
        assert_eq!(after.len(), before.len() + 1);
    }

    #[test]
    fn deletions_exercise_every_sibling_case() {
        // Grown large enough that removing from the ends hits the red
        // sibling, black nephews, and both rotation cases.
        let mut tree = tree_of(&(0..64).collect::<Vec<_>>());
        for k in (0..64).step_by(2) {
            assert!(tree.remove(&k));
            assert_eq!(tree.check(), Ok(()));
        }
        for k in (1..64).step_by(2).rev() {
            assert!(tree.remove(&k));
            assert_eq!(tree.check(), Ok(()));
        }
        assert!(tree.is_empty());
    }
}
