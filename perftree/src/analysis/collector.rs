//! Routes decoded records into the registries, the bottom-up tree, and
//! the summary accumulator while the stream is live.
//!
//! This is the stateful heart of a parse session. Definition records feed
//! the interning tables; each `Sample` is folded into the shared
//! bottom-up cost tree immediately; everything else either updates the
//! summary or is intentionally ignored. Once the stream has ended the
//! collector is consumed by [`ProfileCollector::finalize`], which derives
//! the two remaining views and freezes all four results.

use crate::analysis::caller_callee::build_caller_callee;
use crate::analysis::cost_tree::{CostTree, FrameKey, NodeId};
use crate::analysis::summary::SummaryBuilder;
use crate::analysis::tables::{LocationTable, StringTable, SymbolTable};
use crate::analysis::top_down::build_top_down;
use crate::analysis::ProfileResults;
use crate::domain::{LocationId, ProtocolError};
use crate::protocol::records::{AttributesDefinition, EventRecord, Sample};

#[derive(Debug, Default)]
pub struct ProfileCollector {
    strings: StringTable,
    locations: LocationTable,
    symbols: SymbolTable,
    attributes: Vec<AttributesDefinition>,
    bottom_up: CostTree,
    summary: SummaryBuilder,
}

impl ProfileCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one decoded record into the collector state.
    pub fn handle_record(&mut self, record: EventRecord) -> Result<(), ProtocolError> {
        match record {
            EventRecord::Sample(sample) => self.add_sample(&sample),
            // Decoded but not folded in: reserved for filtering by
            // thread/process once that lands.
            // TODO: track Command records per tid for thread filtering
            EventRecord::ThreadStart(_) | EventRecord::ThreadEnd(_) | EventRecord::Command(_) => {}
            EventRecord::LocationDefinition(def) => {
                self.locations.insert(&def, &self.strings)?;
                // symbol slot is co-indexed and may be defined later
                self.symbols.push_placeholder();
            }
            EventRecord::SymbolDefinition(def) => self.symbols.define(&def, &self.strings)?,
            EventRecord::AttributesDefinition(def) => self.attributes.push(def),
            EventRecord::StringDefinition(def) => self.strings.insert(&def)?,
            EventRecord::LostDefinition(_) => self.summary.record_lost(),
            EventRecord::FeaturesDefinition(features) => self.summary.set_features(&features),
        }
        Ok(())
    }

    /// Freeze the collected state and derive the remaining views.
    #[must_use]
    pub fn finalize(self) -> ProfileResults {
        let top_down = build_top_down(&self.bottom_up);
        let caller_callee = build_caller_callee(&self.bottom_up);
        ProfileResults {
            bottom_up: self.bottom_up,
            top_down,
            caller_callee,
            summary: self.summary.finish(),
        }
    }

    /// The bottom-up tree as folded so far. Exposed for inspection; the
    /// published tree comes out of [`Self::finalize`].
    #[must_use]
    pub fn bottom_up(&self) -> &CostTree {
        &self.bottom_up
    }

    fn add_sample(&mut self, sample: &Sample) {
        // root inclusive cost doubles as the total sample count
        self.bottom_up.node_mut(CostTree::ROOT).inclusive_cost += 1;
        let mut parent = CostTree::ROOT;
        for &frame in &sample.frames {
            parent = self.add_stack_frame(parent, LocationId(frame));
        }
        self.summary.record_sample(sample);
    }

    /// Fold one frame-list entry's ancestor chain in under `parent`,
    /// returning the node the chain ended on so the sample's next entry
    /// continues from there (guessed-frame recovery lists several chain
    /// roots per sample).
    fn add_stack_frame(&mut self, mut parent: NodeId, mut id: LocationId) -> NodeId {
        let mut skip_next_frame = false;
        while id.is_present() {
            let location = self.locations.get(id);
            if skip_next_frame {
                // already folded into its child's frame below
                id = location.parent;
                skip_next_frame = false;
                continue;
            }

            let mut symbol = self.symbols.get(id);
            if !symbol.is_valid() {
                // Function entry points come through as address-only
                // frames. Merge them into the enclosing function instead
                // of growing a near-duplicate node per prologue address.
                symbol = self.symbols.get(location.parent);
                skip_next_frame = true;
            }

            let key = FrameKey {
                symbol: &symbol.name,
                binary: &symbol.binary,
                location: &location.label,
                address: &location.address,
            };
            let node = self.bottom_up.find_or_insert(parent, &key);

            let entry = self.bottom_up.node_mut(node);
            entry.inclusive_cost += 1;
            if parent == CostTree::ROOT {
                // only the innermost symbol of a chain is where the
                // sampled instruction pointer actually sat
                entry.self_cost += 1;
            }

            parent = node;
            id = location.parent;
        }
        parent
    }
}
