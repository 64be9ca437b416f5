//    This file is part of doctree.
//
//    doctree is free software: you can redistribute it and/or modify
//    it under the terms of the GNU General Public License as published by
//    the Free Software Foundation, either version 3 of the License, or
//    (at your option) any later version.
//
//    doctree is distributed in the hope that it will be useful,
//    but WITHOUT ANY WARRANTY; without even the implied warranty of
//    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//    GNU General Public License for more details.
//
//    You should have received a copy of the GNU General Public License
//    along with doctree.  If not, see <https://www.gnu.org/licenses/>.

//! Structural edits over a [`Tree`]: the only ways a parent/child
//! relationship is ever created or broken. The synchronizer is the main
//! caller — its three phases are almost entirely `extract` and `adopt`
//! calls driven off the ordered index.

use crate::error::StructuralError;
use crate::node::{NodeId, Tree};

/// Appends `child` as the last child of `parent`.
pub fn adopt(tree: &mut Tree, parent: NodeId, child: NodeId) -> Result<(), StructuralError> {
    if tree.get(parent).is_none() {
        return Err(StructuralError::StaleHandle);
    }
    if tree.get(child).is_none() {
        return Err(StructuralError::StaleHandle);
    }
    tree.get_mut(child).unwrap().parent = Some(parent);
    tree.get_mut(parent).unwrap().children.push(child);
    Ok(())
}

/// Inserts `child` as a new child of `parent`, immediately before `before`
/// in sibling order. `before` must currently be a child of `parent`.
pub fn insert_before(
    tree: &mut Tree,
    parent: NodeId,
    before: NodeId,
    child: NodeId,
) -> Result<(), StructuralError> {
    if tree.get(child).is_none() {
        return Err(StructuralError::StaleHandle);
    }
    let position = {
        let siblings = &tree
            .get(parent)
            .ok_or(StructuralError::StaleHandle)?
            .children;
        siblings
            .iter()
            .position(|&id| id == before)
            .ok_or(StructuralError::NotAChild)?
    };
    tree.get_mut(child).unwrap().parent = Some(parent);
    tree.get_mut(parent).unwrap().children.insert(position, child);
    Ok(())
}

/// Detaches `node` from its parent's child list, leaving `node` itself and
/// its own subtree intact (but parentless) in the arena. The caller decides
/// whether to re-`adopt` it elsewhere or drop it on the floor.
pub fn extract(tree: &mut Tree, node: NodeId) -> Result<(), StructuralError> {
    let parent = tree
        .get(node)
        .ok_or(StructuralError::StaleHandle)?
        .parent
        .ok_or(StructuralError::NoSuchAnchor)?;
    let siblings = &mut tree.get_mut(parent).ok_or(StructuralError::StaleHandle)?.children;
    let position = siblings
        .iter()
        .position(|&id| id == node)
        .ok_or(StructuralError::NotAChild)?;
    siblings.remove(position);
    tree.get_mut(node).unwrap().parent = None;
    Ok(())
}

/// Replaces `old` with `new` at the same position in `old`'s parent's child
/// list. `old` is left detached (parentless) afterward; its subtree is not
/// freed, matching `extract`'s contract.
pub fn replace(tree: &mut Tree, old: NodeId, new: NodeId) -> Result<(), StructuralError> {
    let parent = tree
        .get(old)
        .ok_or(StructuralError::StaleHandle)?
        .parent
        .ok_or(StructuralError::NoSuchAnchor)?;
    {
        let siblings = &mut tree.get_mut(parent).ok_or(StructuralError::StaleHandle)?.children;
        let position = siblings
            .iter()
            .position(|&id| id == old)
            .ok_or(StructuralError::NotAChild)?;
        siblings[position] = new;
    }
    tree.get_mut(old).unwrap().parent = None;
    tree.get_mut(new).unwrap().parent = Some(parent);
    Ok(())
}

/// Permanently removes `node` and its entire subtree from the arena.
/// `node` must already be detached (see `extract`) — dropping an attached
/// node would leave a dangling id in its former parent's child list.
pub fn delete_subtree(tree: &mut Tree, node: NodeId) -> Result<(), StructuralError> {
    if tree.get(node).ok_or(StructuralError::StaleHandle)?.parent.is_some() {
        return Err(StructuralError::NotAChild);
    }
    let children = tree.get(node).unwrap().children.clone();
    for child in children {
        tree.get_mut(child).unwrap().parent = None;
        delete_subtree(tree, child)?;
    }
    tree.free_slot(node);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::{Interval, NodeData};

    fn leaf(tree: &mut Tree) -> NodeId {
        tree.insert(
            NodeData::PlainText("x"),
            Interval::new(0, 1),
            None,
            0,
            Vec::new(),
        )
    }

    #[test]
    fn adopt_then_extract_roundtrips() {
        let mut tree = Tree::new();
        let root = tree.root();
        let child = leaf(&mut tree);
        adopt(&mut tree, root, child).unwrap();
        assert_eq!(tree.children_of(root), &[child]);
        assert_eq!(tree.parent_of(child), Some(root));

        extract(&mut tree, child).unwrap();
        assert_eq!(tree.children_of(root), &[]);
        assert_eq!(tree.parent_of(child), None);
    }

    #[test]
    fn insert_before_preserves_order() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = leaf(&mut tree);
        let b = leaf(&mut tree);
        let c = leaf(&mut tree);
        adopt(&mut tree, root, a).unwrap();
        adopt(&mut tree, root, c).unwrap();
        insert_before(&mut tree, root, c, b).unwrap();
        assert_eq!(tree.children_of(root), &[a, b, c]);
    }

    #[test]
    fn replace_swaps_in_place() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = leaf(&mut tree);
        let b = leaf(&mut tree);
        adopt(&mut tree, root, a).unwrap();
        replace(&mut tree, a, b).unwrap();
        assert_eq!(tree.children_of(root), &[b]);
        assert_eq!(tree.parent_of(a), None);
    }

    #[test]
    fn extract_on_root_fails() {
        let mut tree = Tree::new();
        let root = tree.root();
        assert_eq!(extract(&mut tree, root), Err(StructuralError::NoSuchAnchor));
    }

    #[test]
    fn delete_subtree_frees_the_handle() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = leaf(&mut tree);
        adopt(&mut tree, root, a).unwrap();
        extract(&mut tree, a).unwrap();
        delete_subtree(&mut tree, a).unwrap();
        assert!(tree.get(a).is_none());
    }
}
