//! Newtype ids shared across the protocol and aggregation layers.

use std::fmt;

/// Process id as reported by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

/// Thread id as reported by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tid(pub u32);

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TID:{}", self.0)
    }
}

/// Index into the stream's string table. `-1` means "no string".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringId(pub i32);

impl StringId {
    pub const NONE: StringId = StringId(-1);

    #[must_use]
    pub fn is_present(self) -> bool {
        self.0 != -1
    }
}

impl fmt::Display for StringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "String:{}", self.0)
    }
}

/// Index into the stream's location table. `-1` terminates a parent chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationId(pub i32);

impl LocationId {
    pub const NONE: LocationId = LocationId(-1);

    #[must_use]
    pub fn is_present(self) -> bool {
        self.0 != -1
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_presence() {
        assert!(StringId(0).is_present());
        assert!(StringId(42).is_present());
        assert!(!StringId::NONE.is_present());
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(Pid(1234).to_string(), "PID:1234");
        assert_eq!(Tid(5).to_string(), "TID:5");
        assert_eq!(LocationId(7).to_string(), "Location:7");
    }
}
