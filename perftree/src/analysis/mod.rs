//! Cost attribution built from the decoded event stream.
//!
//! While the stream is live, [`collector::ProfileCollector`] feeds the
//! interning tables and folds samples into the shared bottom-up tree.
//! After the stream ends it derives the top-down tree and the flat
//! caller-callee table from that tree, freezes the summary, and hands all
//! four results back as one immutable bundle.

pub mod caller_callee;
pub mod collector;
pub mod cost_tree;
pub mod summary;
pub mod tables;
pub mod top_down;

pub use caller_callee::build_caller_callee;
pub use collector::ProfileCollector;
pub use cost_tree::{CostNode, CostTree, FrameKey, NodeId};
pub use summary::{Summary, SummaryBuilder};
pub use top_down::build_top_down;

/// Everything a successful parse session publishes, exactly once.
#[derive(Debug)]
pub struct ProfileResults {
    /// Cost tree rooted at a synthetic node whose immediate children are
    /// the sampled self symbols; depth increases toward outer callers.
    pub bottom_up: CostTree,
    /// Cost tree rooted at the outermost callers; depth increases toward
    /// the sampled self symbols.
    pub top_down: CostTree,
    /// Flat per-function table keyed by `(symbol, binary)`, children of
    /// the root sorted by that key.
    pub caller_callee: CostTree,
    /// Run statistics collected alongside the bottom-up fold.
    pub summary: Summary,
}
