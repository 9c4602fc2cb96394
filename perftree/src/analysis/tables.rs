//! Interning registries fed by the definition records.
//!
//! All three tables are id-indexed and append-only. The producer assigns
//! dense, zero-based, monotonically increasing ids, so every insert must
//! land exactly at the current end of its table; anything else means the
//! stream is corrupt and the parse is aborted. Symbols are the exception:
//! a placeholder is reserved when the co-indexed location arrives and the
//! definition overwrites it in place, since the exporter interleaves the
//! two record kinds in no guaranteed order.

use log::warn;

use crate::domain::{LocationId, ProtocolError, StringId};
use crate::protocol::records::{LocationDefinition, StringDefinition, SymbolDefinition};

/// Ordered string table. Ids are dense and zero-based.
#[derive(Debug, Default)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn insert(&mut self, def: &StringDefinition) -> Result<(), ProtocolError> {
        let expected = self.strings.len();
        if def.id != expected as i32 {
            warn!("string definition id {} does not match table size {expected}", def.id);
            return Err(ProtocolError::NonMonotonicStringId { id: def.id, expected });
        }
        self.strings.push(String::from_utf8_lossy(&def.string).into_owned());
        Ok(())
    }

    /// Resolve an id to its string; absent or unknown ids resolve empty.
    #[must_use]
    pub fn get(&self, id: StringId) -> &str {
        usize::try_from(id.0).ok().and_then(|i| self.strings.get(i)).map_or("", String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// One resolved location: parent chain link plus the display labels the
/// cost trees store instead of raw ids.
#[derive(Debug, Clone)]
pub struct LocationEntry {
    pub parent: LocationId,
    pub label: String,
    pub address: String,
}

static EMPTY_LOCATION: LocationEntry =
    LocationEntry { parent: LocationId::NONE, label: String::new(), address: String::new() };

/// Ordered location table, same id-density contract as the string table.
#[derive(Debug, Default)]
pub struct LocationTable {
    entries: Vec<LocationEntry>,
}

impl LocationTable {
    /// Insert the next location, resolving its `file[:line]` label eagerly.
    pub fn insert(
        &mut self,
        def: &LocationDefinition,
        strings: &StringTable,
    ) -> Result<(), ProtocolError> {
        let expected = self.entries.len();
        if def.id != expected as i32 {
            warn!("location definition id {} does not match table size {expected}", def.id);
            return Err(ProtocolError::NonMonotonicLocationId { id: def.id, expected });
        }

        let mut label = String::new();
        if def.file.is_present() {
            label.push_str(strings.get(def.file));
            if def.line != -1 {
                label.push(':');
                label.push_str(&def.line.to_string());
            }
        }

        self.entries.push(LocationEntry {
            parent: LocationId(def.parent_location_id),
            label,
            address: format!("{:x}", def.address),
        });
        Ok(())
    }

    /// Unknown ids resolve to an empty entry with no parent, which
    /// terminates any ancestor walk.
    #[must_use]
    pub fn get(&self, id: LocationId) -> &LocationEntry {
        usize::try_from(id.0).ok().and_then(|i| self.entries.get(i)).unwrap_or(&EMPTY_LOCATION)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Symbol for one location id. Both labels empty means the exporter could
/// not attribute the address to a function (e.g. an entry trampoline).
#[derive(Debug, Clone, Default)]
pub struct SymbolEntry {
    pub name: String,
    pub binary: String,
    pub is_kernel: bool,
}

impl SymbolEntry {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() || !self.binary.is_empty()
    }
}

static EMPTY_SYMBOL: SymbolEntry =
    SymbolEntry { name: String::new(), binary: String::new(), is_kernel: false };

/// Symbol table, co-indexed 1:1 with the location table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
}

impl SymbolTable {
    /// Reserve the placeholder slot for a freshly inserted location.
    pub fn push_placeholder(&mut self) {
        self.entries.push(SymbolEntry::default());
    }

    /// Overwrite the placeholder for `def.id` with the real symbol.
    pub fn define(&mut self, def: &SymbolDefinition, strings: &StringTable) -> Result<(), ProtocolError> {
        let defined = self.entries.len();
        let slot = usize::try_from(def.id)
            .ok()
            .and_then(|i| self.entries.get_mut(i))
            .ok_or(ProtocolError::UnknownSymbolId { id: def.id, defined })?;
        *slot = SymbolEntry {
            name: strings.get(def.name).to_string(),
            binary: strings.get(def.binary).to_string(),
            is_kernel: def.is_kernel,
        };
        Ok(())
    }

    /// Unknown ids resolve to the empty (invalid) symbol.
    #[must_use]
    pub fn get(&self, id: LocationId) -> &SymbolEntry {
        usize::try_from(id.0).ok().and_then(|i| self.entries.get(i)).unwrap_or(&EMPTY_SYMBOL)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
