//! # perftree - Cost-tree aggregation for sampled perf profiles
//!
//! perftree drives an external exporter that converts a recorded perf
//! data file into a length-framed binary event stream, decodes that
//! stream incrementally, and folds the sampled call stacks into three
//! complementary cost-attribution views plus a run summary.
//!
//! ## Architecture Overview
//!
//! ```text
//! exporter process (stdout)
//!         │ raw bytes, as available
//!         ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │   Stream     │──▶│    Event     │──▶│  Profile Collector   │
//! │   Decoder    │   │    Codec     │   │  tables + bottom-up  │
//! └──────────────┘   └──────────────┘   └──────────┬───────────┘
//!                                                  │ on success
//!                                                  ▼
//!                              ┌──────────────────────────────────┐
//!                              │ top-down · caller-callee · summary│
//!                              └──────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`protocol`]: the wire layer: little-endian field reader, typed
//!   record codec with a closed tag space, and the resumable framing
//!   state machine that tolerates partial input.
//! - [`analysis`]: interning registries, the arena-backed cost tree, the
//!   streaming collector, and the derived top-down and caller-callee
//!   builders.
//! - [`session`]: one background tokio task per parse. It spawns the
//!   exporter, runs the read/feed/poll loop, and delivers exactly one
//!   outcome (results bundle or failure) over a oneshot channel.
//! - [`preflight`]: input-file checks and exporter binary discovery,
//!   reported before any process is started.
//! - [`export`]: caller-side JSON dump of a results bundle.
//! - [`cli`], [`domain`]: argument parsing and shared newtypes/errors.
//!
//! ## The Three Views
//!
//! - **Bottom-up**: synthetic root, immediate children are the sampled
//!   self symbols, depth grows toward outer callers.
//! - **Top-down**: rooted at the outermost callers, derived from the
//!   bottom-up leaves by walking their parent chains.
//! - **Caller-callee**: flat per-function table keyed by
//!   `(symbol, binary)` with recursion-safe counting.

pub mod analysis;
pub mod cli;
pub mod domain;
pub mod export;
pub mod preflight;
pub mod protocol;
pub mod session;
