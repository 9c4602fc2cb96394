//! Derives the top-down (outermost-caller-rooted) tree from the finished
//! bottom-up tree.
//!
//! Every bottom-up leaf is, by construction, the outermost caller recorded
//! for some chain. Walking its parent back-references up to the synthetic
//! root therefore visits frames from outermost caller to the sample's
//! self symbol; mirroring that path under a fresh root yields the
//! top-down view.

use super::cost_tree::{CostTree, FrameKey};

/// Build the top-down tree. Runs once, after decoding completes.
#[must_use]
pub fn build_top_down(bottom_up: &CostTree) -> CostTree {
    let mut top_down = CostTree::new();

    for leaf in bottom_up.leaf_ids() {
        // Propagating the leaf's accumulated cost along the whole path
        // counts deep merged chains fully, exactly once, even when several
        // leaf walks share a prefix.
        let leaf_cost = bottom_up.node(leaf).inclusive_cost;

        let mut stack = CostTree::ROOT;
        let mut current = Some(leaf);
        while let Some(id) = current {
            if id == CostTree::ROOT {
                break;
            }
            let node = bottom_up.node(id);
            let frame = top_down.find_or_insert(stack, &FrameKey::of(node));
            top_down.node_mut(frame).inclusive_cost += leaf_cost;

            let parent = bottom_up.parent(id);
            if parent == Some(CostTree::ROOT) {
                // last node on the path: the sample's self symbol
                top_down.node_mut(frame).self_cost += 1;
            }

            stack = frame;
            current = parent;
        }
    }

    top_down
}
