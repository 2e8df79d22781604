//! Category hierarchy rules.
//!
//! Categories form a forest through a self-referencing `parent_id`. The
//! database only guarantees that a parent exists; everything about the shape
//! of the tree (no cycles, bounded depth, no deleting non-empty nodes) is
//! checked here before a write is issued.
//!
//! All functions operate on a flat list of [`CategoryLink`] projections so
//! they can be fed from a single `SELECT id, parent_id FROM categories`.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum nesting depth of the category tree (a root has depth 1).
pub const MAX_CATEGORY_DEPTH: usize = 4;

/// Separator between segments of a category path such as `Men > Shoes`.
pub const CATEGORY_PATH_SEPARATOR: char = '>';

/// Minimal projection of a category row used for tree checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryLink {
    pub id: DbId,
    pub parent_id: Option<DbId>,
}

fn parent_map(links: &[CategoryLink]) -> HashMap<DbId, Option<DbId>> {
    links.iter().map(|l| (l.id, l.parent_id)).collect()
}

fn children_map(links: &[CategoryLink]) -> HashMap<DbId, Vec<DbId>> {
    let mut children: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for link in links {
        if let Some(parent) = link.parent_id {
            children.entry(parent).or_default().push(link.id);
        }
    }
    children
}

/// Returns `true` if making `new_parent_id` the parent of `category_id`
/// would introduce a cycle.
///
/// Walks up the existing parent chain starting at `new_parent_id`. Reaching
/// `category_id` (including the trivial self-parent case) means the
/// category would become its own ancestor. A chain longer than the number
/// of known categories can only happen if the stored data already loops,
/// which is also reported as a cycle.
pub fn would_create_cycle(
    links: &[CategoryLink],
    category_id: DbId,
    new_parent_id: DbId,
) -> bool {
    let parents = parent_map(links);
    let mut current = Some(new_parent_id);
    let mut steps = 0usize;

    while let Some(id) = current {
        if id == category_id {
            return true;
        }
        steps += 1;
        if steps > links.len() {
            return true;
        }
        current = parents.get(&id).copied().flatten();
    }

    false
}

/// Depth of `id` in the tree, counting the node itself (roots are 1).
///
/// Unknown ids are treated as roots.
pub fn depth_of(links: &[CategoryLink], id: DbId) -> usize {
    let parents = parent_map(links);
    let mut depth = 1;
    let mut current = parents.get(&id).copied().flatten();

    while let Some(parent) = current {
        depth += 1;
        if depth > links.len() + 1 {
            break;
        }
        current = parents.get(&parent).copied().flatten();
    }

    depth
}

/// Height of the subtree rooted at `id` (a leaf is 1).
pub fn subtree_height(links: &[CategoryLink], id: DbId) -> usize {
    fn height(
        children: &HashMap<DbId, Vec<DbId>>,
        id: DbId,
        visited: &mut HashSet<DbId>,
    ) -> usize {
        if !visited.insert(id) {
            return 0;
        }
        let below = children
            .get(&id)
            .map(|kids| {
                kids.iter()
                    .map(|k| height(children, *k, visited))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);
        below + 1
    }

    let children = children_map(links);
    height(&children, id, &mut HashSet::new())
}

/// Validate placing a subtree of `height` levels under `new_parent`.
pub fn check_depth(
    links: &[CategoryLink],
    new_parent: Option<DbId>,
    height: usize,
) -> Result<(), CoreError> {
    let parent_depth = new_parent.map(|p| depth_of(links, p)).unwrap_or(0);
    if parent_depth + height > MAX_CATEGORY_DEPTH {
        return Err(CoreError::Validation(format!(
            "Category tree cannot be deeper than {MAX_CATEGORY_DEPTH} levels"
        )));
    }
    Ok(())
}

/// Validate moving `category_id` (and its subtree) under `new_parent`.
///
/// Rejects self-parenting, any assignment that would create a cycle, and
/// moves that would push the subtree past [`MAX_CATEGORY_DEPTH`].
pub fn check_reparent(
    links: &[CategoryLink],
    category_id: DbId,
    new_parent: Option<DbId>,
) -> Result<(), CoreError> {
    if let Some(parent) = new_parent {
        if parent == category_id {
            return Err(CoreError::Validation(
                "A category cannot be its own parent".into(),
            ));
        }
        if would_create_cycle(links, category_id, parent) {
            return Err(CoreError::Validation(
                "A category cannot be moved under one of its own descendants".into(),
            ));
        }
    }

    check_depth(links, new_parent, subtree_height(links, category_id))
}

/// `root` followed by every category below it, breadth-first.
pub fn descendant_ids(links: &[CategoryLink], root: DbId) -> Vec<DbId> {
    let children = children_map(links);
    let mut seen = HashSet::from([root]);
    let mut out = vec![root];
    let mut queue = VecDeque::from([root]);

    while let Some(id) = queue.pop_front() {
        for child in children.get(&id).into_iter().flatten() {
            if seen.insert(*child) {
                out.push(*child);
                queue.push_back(*child);
            }
        }
    }

    out
}

/// Reject deleting a category that still has subcategories or products.
pub fn ensure_deletable(child_count: i64, product_count: i64) -> Result<(), CoreError> {
    if child_count > 0 {
        return Err(CoreError::Conflict(format!(
            "Category has {child_count} subcategories; delete or move them first"
        )));
    }
    if product_count > 0 {
        return Err(CoreError::Conflict(format!(
            "Category has {product_count} products; reassign or delete them first"
        )));
    }
    Ok(())
}

/// Split a path such as `"Men > Shoes > Sneakers"` into trimmed segments.
///
/// Blank segments are dropped, so `"Men >> Shoes"` yields two segments.
pub fn parse_category_path(path: &str) -> Vec<String> {
    path.split(CATEGORY_PATH_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Nested tree construction
// ---------------------------------------------------------------------------

/// Row types that can be arranged into a [`TreeNode`] forest.
pub trait TreeItem {
    fn id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
    fn sort_order(&self) -> i32;
    fn name(&self) -> &str;
}

/// A category with its nested children.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<T> {
    #[serde(flatten)]
    pub item: T,
    pub children: Vec<TreeNode<T>>,
}

/// Arrange a flat list into a forest ordered by `(sort_order, name)`.
///
/// Items whose parent is missing from `items` become roots, so a filtered
/// list (e.g. active categories only) still renders.
pub fn build_tree<T: TreeItem>(mut items: Vec<T>) -> Vec<TreeNode<T>> {
    items.sort_by(|a, b| {
        a.sort_order()
            .cmp(&b.sort_order())
            .then_with(|| a.name().cmp(b.name()))
    });

    let known: HashSet<DbId> = items.iter().map(TreeItem::id).collect();
    let mut by_parent: HashMap<Option<DbId>, Vec<T>> = HashMap::new();
    for item in items {
        let key = item.parent_id().filter(|p| known.contains(p));
        by_parent.entry(key).or_default().push(item);
    }

    fn attach<T: TreeItem>(
        parent: Option<DbId>,
        by_parent: &mut HashMap<Option<DbId>, Vec<T>>,
    ) -> Vec<TreeNode<T>> {
        let Some(items) = by_parent.remove(&parent) else {
            return Vec::new();
        };
        items
            .into_iter()
            .map(|item| {
                let children = attach(Some(item.id()), by_parent);
                TreeNode { item, children }
            })
            .collect()
    }

    attach(None, &mut by_parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn link(id: DbId, parent_id: Option<DbId>) -> CategoryLink {
        CategoryLink { id, parent_id }
    }

    /// 1 -> 2 -> 3 -> 4, plus a sibling root 10 with child 11.
    fn sample() -> Vec<CategoryLink> {
        vec![
            link(1, None),
            link(2, Some(1)),
            link(3, Some(2)),
            link(4, Some(3)),
            link(10, None),
            link(11, Some(10)),
        ]
    }

    #[test]
    fn self_parent_is_a_cycle() {
        assert!(would_create_cycle(&sample(), 2, 2));
        assert_matches!(check_reparent(&sample(), 2, Some(2)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn moving_under_descendant_is_a_cycle() {
        let links = sample();
        assert!(would_create_cycle(&links, 1, 4));
        assert!(would_create_cycle(&links, 2, 3));
        assert_matches!(check_reparent(&links, 1, Some(3)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn moving_to_unrelated_branch_is_allowed() {
        let links = sample();
        assert!(!would_create_cycle(&links, 11, 1));
        assert!(check_reparent(&links, 11, Some(1)).is_ok());
        assert!(check_reparent(&links, 2, None).is_ok());
    }

    #[test]
    fn existing_loop_in_data_is_reported() {
        let links = vec![link(1, Some(2)), link(2, Some(1)), link(5, None)];
        assert!(would_create_cycle(&links, 5, 1));
    }

    #[test]
    fn depth_and_height() {
        let links = sample();
        assert_eq!(depth_of(&links, 1), 1);
        assert_eq!(depth_of(&links, 4), 4);
        assert_eq!(subtree_height(&links, 1), 4);
        assert_eq!(subtree_height(&links, 10), 2);
        assert_eq!(subtree_height(&links, 99), 1);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let links = sample();
        // A new child under 4 would be at depth 5.
        assert_matches!(check_depth(&links, Some(4), 1), Err(CoreError::Validation(_)));
        assert!(check_depth(&links, Some(3), 1).is_ok());
        // Moving the two-level subtree 10 under 3 would reach depth 5.
        assert_matches!(check_reparent(&links, 10, Some(3)), Err(CoreError::Validation(_)));
        assert!(check_reparent(&links, 10, Some(2)).is_ok());
    }

    #[test]
    fn descendants_include_root() {
        let links = sample();
        assert_eq!(descendant_ids(&links, 2), vec![2, 3, 4]);
        assert_eq!(descendant_ids(&links, 11), vec![11]);
    }

    #[test]
    fn non_empty_category_is_not_deletable() {
        assert_matches!(ensure_deletable(1, 0), Err(CoreError::Conflict(_)));
        assert_matches!(ensure_deletable(0, 3), Err(CoreError::Conflict(_)));
        assert!(ensure_deletable(0, 0).is_ok());
    }

    #[test]
    fn category_path_parsing() {
        assert_eq!(
            parse_category_path(" Men > Shoes >> Sneakers "),
            vec!["Men", "Shoes", "Sneakers"]
        );
        assert!(parse_category_path("  >  ").is_empty());
    }

    #[derive(Debug, Clone)]
    struct Row {
        id: DbId,
        parent: Option<DbId>,
        order: i32,
        name: &'static str,
    }

    impl TreeItem for Row {
        fn id(&self) -> DbId {
            self.id
        }
        fn parent_id(&self) -> Option<DbId> {
            self.parent
        }
        fn sort_order(&self) -> i32 {
            self.order
        }
        fn name(&self) -> &str {
            self.name
        }
    }

    #[test]
    fn build_tree_nests_and_orders() {
        let rows = vec![
            Row { id: 3, parent: Some(1), order: 0, name: "Shirts" },
            Row { id: 1, parent: None, order: 1, name: "Men" },
            Row { id: 2, parent: None, order: 0, name: "Women" },
            Row { id: 4, parent: Some(1), order: 0, name: "Pants" },
            Row { id: 5, parent: Some(99), order: 0, name: "Orphan" },
        ];

        let tree = build_tree(rows);
        let roots: Vec<_> = tree.iter().map(|n| n.item.name).collect();
        assert_eq!(roots, vec!["Orphan", "Women", "Men"]);

        let men = &tree[2];
        let kids: Vec<_> = men.children.iter().map(|n| n.item.name).collect();
        assert_eq!(kids, vec!["Pants", "Shirts"]);
    }
}
