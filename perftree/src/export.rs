//! JSON export of a results bundle.
//!
//! Caller-side convenience for offline inspection: the trees are written
//! as nested objects, the summary verbatim. The parse core itself never
//! persists anything.

use std::io::Write;

use serde::Serialize;

use crate::analysis::{CostTree, NodeId, ProfileResults, Summary};
use crate::domain::ExportError;

#[derive(Serialize)]
struct TreeNode<'a> {
    symbol: &'a str,
    binary: &'a str,
    location: &'a str,
    address: &'a str,
    inclusive_cost: u64,
    self_cost: u64,
    children: Vec<TreeNode<'a>>,
}

#[derive(Serialize)]
struct ResultsDocument<'a> {
    summary: &'a Summary,
    bottom_up: Vec<TreeNode<'a>>,
    top_down: Vec<TreeNode<'a>>,
    caller_callee: Vec<TreeNode<'a>>,
}

fn tree_nodes(tree: &CostTree, id: NodeId) -> Vec<TreeNode<'_>> {
    tree.children(id)
        .iter()
        .map(|&child| {
            let node = tree.node(child);
            TreeNode {
                symbol: &node.symbol,
                binary: &node.binary,
                location: &node.location,
                address: &node.address,
                inclusive_cost: node.inclusive_cost,
                self_cost: node.self_cost,
                children: tree_nodes(tree, child),
            }
        })
        .collect()
}

/// Write the whole results bundle as pretty-printed JSON.
pub fn export_results<W: Write>(results: &ProfileResults, mut writer: W) -> Result<(), ExportError> {
    let document = ResultsDocument {
        summary: &results.summary,
        bottom_up: tree_nodes(&results.bottom_up, CostTree::ROOT),
        top_down: tree_nodes(&results.top_down, CostTree::ROOT),
        caller_callee: tree_nodes(&results.caller_callee, CostTree::ROOT),
    };
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FrameKey;

    fn tiny_results() -> ProfileResults {
        let mut bottom_up = CostTree::new();
        let main = bottom_up.find_or_insert(
            CostTree::ROOT,
            &FrameKey { symbol: "main", binary: "app", location: "main.c:1", address: "400" },
        );
        bottom_up.node_mut(main).inclusive_cost = 1;
        bottom_up.node_mut(main).self_cost = 1;
        bottom_up.node_mut(CostTree::ROOT).inclusive_cost = 1;

        ProfileResults {
            top_down: crate::analysis::build_top_down(&bottom_up),
            caller_callee: crate::analysis::build_caller_callee(&bottom_up),
            bottom_up,
            summary: Summary { sample_count: 1, ..Summary::default() },
        }
    }

    #[test]
    fn test_export_produces_valid_json() {
        let mut buffer = Vec::new();
        export_results(&tiny_results(), &mut buffer).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed["summary"]["sample_count"], 1);
        assert_eq!(parsed["bottom_up"][0]["symbol"], "main");
        assert_eq!(parsed["bottom_up"][0]["inclusive_cost"], 1);
        assert_eq!(parsed["top_down"][0]["symbol"], "main");
        assert_eq!(parsed["caller_callee"][0]["self_cost"], 1);
        assert!(parsed["bottom_up"][0]["children"].as_array().unwrap().is_empty());
    }
}
