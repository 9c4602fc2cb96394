//! Derives the flat caller-callee cost table from the finished bottom-up
//! tree.
//!
//! This view aggregates by function identity, `(symbol, binary)` only,
//! with call sites and addresses deliberately merged: one function gets
//! one row no matter how many places it was called from. The rows hang
//! off the table's root node, kept sorted by that key and located via
//! binary search since the list grows with every distinct function.
//!
//! Costs are counted per leaf walk with a recursion guard: a function
//! appearing several times in one chain is still one sample of that
//! function.

use std::collections::HashSet;

use super::cost_tree::{CostNode, CostTree, FrameKey, NodeId};

/// Build the caller-callee table. Runs once, after decoding completes.
#[must_use]
pub fn build_caller_callee(bottom_up: &CostTree) -> CostTree {
    let mut table = CostTree::new();

    for leaf in bottom_up.leaf_ids() {
        // functions already counted on this walk
        let mut recursion_guard: HashSet<(&str, &str)> = HashSet::new();

        let mut current = Some(leaf);
        while let Some(id) = current {
            if id == CostTree::ROOT {
                break;
            }
            let node = bottom_up.node(id);
            let needle = (node.symbol.as_str(), node.binary.as_str());
            let parent = bottom_up.parent(id);

            if recursion_guard.insert(needle) {
                let entry = find_or_insert_sorted(&mut table, node);
                table.node_mut(entry).inclusive_cost += 1;
                if parent == Some(CostTree::ROOT) {
                    // walk terminal: the sample's self symbol
                    table.node_mut(entry).self_cost += 1;
                }
            }

            current = parent;
        }
    }

    table
}

/// Locate the row for `node`'s function in the sorted child list of the
/// table root, inserting it at its sort position on first sight. The
/// first sighting also donates the row's location/address labels.
fn find_or_insert_sorted(table: &mut CostTree, node: &CostNode) -> NodeId {
    let needle = (node.symbol.as_str(), node.binary.as_str());
    let children = table.children(CostTree::ROOT);
    let found = children.binary_search_by(|&child| {
        let row = table.node(child);
        (row.symbol.as_str(), row.binary.as_str()).cmp(&needle)
    });
    match found {
        Ok(index) => table.children(CostTree::ROOT)[index],
        Err(index) => table.insert_child_at(CostTree::ROOT, index, &FrameKey::of(node)),
    }
}
