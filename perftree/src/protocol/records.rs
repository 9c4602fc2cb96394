//! Typed event records and the per-frame codec.
//!
//! A frame payload is a single `i8` type tag followed by that record's
//! fixed field layout. The tag space is closed: the ten known kinds plus
//! an explicit `Invalid` variant for everything out of range, which is a
//! fatal protocol error. After decoding, the codec asserts the cursor sits
//! exactly at the end of the payload; leftover bytes mean the stream is
//! desynchronized and the parse is aborted.

use log::warn;

use super::wire::WireReader;
use crate::domain::{ProtocolError, StringId};

/// Stream format version read from the prologue. Carried as an opaque
/// selector; all known versions share the field layouts below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamVersion(pub i32);

/// Common `{pid, tid, time}` prefix of several record kinds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordHeader {
    pub pid: u32,
    pub tid: u32,
    pub time: u64,
}

impl RecordHeader {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { pid: r.read_u32()?, tid: r.read_u32()?, time: r.read_u64()? })
    }
}

/// One sampled call stack. `frames` lists innermost observed frames whose
/// ancestor chains live in the location table.
#[derive(Debug, Clone)]
pub struct Sample {
    pub header: RecordHeader,
    pub frames: Vec<i32>,
    pub guessed_frames: u8,
    pub attribute_id: i32,
}

impl Sample {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            header: RecordHeader::decode(r)?,
            frames: r.read_i32_list()?,
            guessed_frames: r.read_u8()?,
            attribute_id: r.read_i32()?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThreadStart {
    pub child_pid: u32,
    pub child_tid: u32,
    pub time: u64,
}

impl ThreadStart {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { child_pid: r.read_u32()?, child_tid: r.read_u32()?, time: r.read_u64()? })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ThreadEnd {
    pub child_pid: u32,
    pub child_tid: u32,
    pub time: u64,
}

impl ThreadEnd {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { child_pid: r.read_u32()?, child_tid: r.read_u32()?, time: r.read_u64()? })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub header: RecordHeader,
    pub comm: StringId,
}

impl Command {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { header: RecordHeader::decode(r)?, comm: StringId(r.read_i32()?) })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LocationDefinition {
    pub id: i32,
    pub address: u64,
    pub file: StringId,
    pub pid: u32,
    pub line: i32,
    pub column: i32,
    pub parent_location_id: i32,
}

impl LocationDefinition {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            id: r.read_i32()?,
            address: r.read_u64()?,
            file: StringId(r.read_i32()?),
            pid: r.read_u32()?,
            line: r.read_i32()?,
            column: r.read_i32()?,
            parent_location_id: r.read_i32()?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SymbolDefinition {
    pub id: i32,
    pub name: StringId,
    pub binary: StringId,
    pub is_kernel: bool,
}

impl SymbolDefinition {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            id: r.read_i32()?,
            name: StringId(r.read_i32()?),
            binary: StringId(r.read_i32()?),
            is_kernel: r.read_bool()?,
        })
    }
}

/// Perf event attribute (counter) definition. Retained for future
/// per-counter attribution; the current builders do not consult it.
#[derive(Debug, Clone, Copy)]
pub struct AttributesDefinition {
    pub id: i32,
    pub event_type: u32,
    pub config: u64,
    pub name: StringId,
}

impl AttributesDefinition {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            id: r.read_i32()?,
            event_type: r.read_u32()?,
            config: r.read_u64()?,
            name: StringId(r.read_i32()?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct StringDefinition {
    pub id: i32,
    pub string: Vec<u8>,
}

impl StringDefinition {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { id: r.read_i32()?, string: r.read_bytes()? })
    }
}

/// Marker for a chunk of events the kernel dropped.
#[derive(Debug, Clone, Copy)]
pub struct LostDefinition {
    pub header: RecordHeader,
}

impl LostDefinition {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { header: RecordHeader::decode(r)? })
    }
}

#[derive(Debug, Clone)]
pub struct BuildId {
    pub pid: u32,
    pub id: Vec<u8>,
    pub file_name: Vec<u8>,
}

impl BuildId {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { pid: r.read_u32()?, id: r.read_bytes()?, file_name: r.read_bytes()? })
    }
}

#[derive(Debug, Clone)]
pub struct NumaNode {
    pub node_id: u32,
    pub mem_total: u64,
    pub mem_free: u64,
    pub topology: Vec<u8>,
}

impl NumaNode {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            node_id: r.read_u32()?,
            mem_total: r.read_u64()?,
            mem_free: r.read_u64()?,
            topology: r.read_bytes()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Pmu {
    pub pmu_type: u32,
    pub name: Vec<u8>,
}

impl Pmu {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { pmu_type: r.read_u32()?, name: r.read_bytes()? })
    }
}

#[derive(Debug, Clone)]
pub struct GroupDesc {
    pub name: Vec<u8>,
    pub leader_index: u32,
    pub num_members: u32,
}

impl GroupDesc {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self { name: r.read_bytes()?, leader_index: r.read_u32()?, num_members: r.read_u32()? })
    }
}

/// Host and run metadata captured by the exporter. The field order is part
/// of the wire contract and must not be rearranged.
#[derive(Debug, Clone)]
pub struct FeaturesDefinition {
    pub host_name: Vec<u8>,
    pub os_release: Vec<u8>,
    pub version: Vec<u8>,
    pub arch: Vec<u8>,
    pub nr_cpus_online: u32,
    pub nr_cpus_available: u32,
    pub cpu_desc: Vec<u8>,
    pub cpu_id: Vec<u8>,
    /// In kilobytes.
    pub total_mem: u64,
    pub cmdline: Vec<Vec<u8>>,
    pub build_ids: Vec<BuildId>,
    pub sibling_cores: Vec<Vec<u8>>,
    pub sibling_threads: Vec<Vec<u8>>,
    pub numa_topology: Vec<NumaNode>,
    pub pmu_mappings: Vec<Pmu>,
    pub group_descs: Vec<GroupDesc>,
}

impl FeaturesDefinition {
    fn decode(r: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        Ok(Self {
            host_name: r.read_bytes()?,
            os_release: r.read_bytes()?,
            version: r.read_bytes()?,
            arch: r.read_bytes()?,
            nr_cpus_online: r.read_u32()?,
            nr_cpus_available: r.read_u32()?,
            cpu_desc: r.read_bytes()?,
            cpu_id: r.read_bytes()?,
            total_mem: r.read_u64()?,
            cmdline: r.read_list(WireReader::read_bytes)?,
            build_ids: r.read_list(BuildId::decode)?,
            sibling_cores: r.read_list(WireReader::read_bytes)?,
            sibling_threads: r.read_list(WireReader::read_bytes)?,
            numa_topology: r.read_list(NumaNode::decode)?,
            pmu_mappings: r.read_list(Pmu::decode)?,
            group_descs: r.read_list(GroupDesc::decode)?,
        })
    }
}

/// Closed set of record type tags. Everything outside `0..=9` maps to
/// `Invalid` and forces the error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    Sample,
    ThreadStart,
    ThreadEnd,
    Command,
    LocationDefinition,
    SymbolDefinition,
    AttributesDefinition,
    StringDefinition,
    LostDefinition,
    FeaturesDefinition,
    Invalid,
}

impl RecordType {
    #[must_use]
    pub fn from_tag(tag: i8) -> Self {
        match tag {
            0 => Self::Sample,
            1 => Self::ThreadStart,
            2 => Self::ThreadEnd,
            3 => Self::Command,
            4 => Self::LocationDefinition,
            5 => Self::SymbolDefinition,
            6 => Self::AttributesDefinition,
            7 => Self::StringDefinition,
            8 => Self::LostDefinition,
            9 => Self::FeaturesDefinition,
            _ => Self::Invalid,
        }
    }
}

/// One decoded event frame.
#[derive(Debug, Clone)]
pub enum EventRecord {
    Sample(Sample),
    ThreadStart(ThreadStart),
    ThreadEnd(ThreadEnd),
    Command(Command),
    LocationDefinition(LocationDefinition),
    SymbolDefinition(SymbolDefinition),
    AttributesDefinition(AttributesDefinition),
    StringDefinition(StringDefinition),
    LostDefinition(LostDefinition),
    FeaturesDefinition(Box<FeaturesDefinition>),
}

/// Decodes frame payloads into typed records for one stream version.
#[derive(Debug, Clone, Copy)]
pub struct EventCodec {
    version: StreamVersion,
}

impl EventCodec {
    #[must_use]
    pub fn new(version: StreamVersion) -> Self {
        Self { version }
    }

    #[must_use]
    pub fn version(&self) -> StreamVersion {
        self.version
    }

    /// Decode one frame payload. The whole payload must be consumed.
    pub fn decode(&self, payload: &[u8]) -> Result<EventRecord, ProtocolError> {
        let mut r = WireReader::new(payload);
        let tag = r.read_i8()?;

        let record = match RecordType::from_tag(tag) {
            RecordType::Sample => EventRecord::Sample(Sample::decode(&mut r)?),
            RecordType::ThreadStart => EventRecord::ThreadStart(ThreadStart::decode(&mut r)?),
            RecordType::ThreadEnd => EventRecord::ThreadEnd(ThreadEnd::decode(&mut r)?),
            RecordType::Command => EventRecord::Command(Command::decode(&mut r)?),
            RecordType::LocationDefinition => {
                EventRecord::LocationDefinition(LocationDefinition::decode(&mut r)?)
            }
            RecordType::SymbolDefinition => {
                EventRecord::SymbolDefinition(SymbolDefinition::decode(&mut r)?)
            }
            RecordType::AttributesDefinition => {
                EventRecord::AttributesDefinition(AttributesDefinition::decode(&mut r)?)
            }
            RecordType::StringDefinition => {
                EventRecord::StringDefinition(StringDefinition::decode(&mut r)?)
            }
            RecordType::LostDefinition => {
                EventRecord::LostDefinition(LostDefinition::decode(&mut r)?)
            }
            RecordType::FeaturesDefinition => {
                EventRecord::FeaturesDefinition(Box::new(FeaturesDefinition::decode(&mut r)?))
            }
            RecordType::Invalid => {
                warn!("invalid record type tag {tag}");
                return Err(ProtocolError::InvalidRecordType(tag));
            }
        };

        if !r.is_empty() {
            warn!("record type {tag} did not consume its whole frame, {} bytes left", r.remaining());
            return Err(ProtocolError::TrailingBytes { tag, leftover: r.remaining() });
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> EventCodec {
        EventCodec::new(StreamVersion(0))
    }

    fn sample_payload() -> Vec<u8> {
        let mut payload = vec![0i8 as u8]; // Sample tag
        payload.extend_from_slice(&1u32.to_le_bytes()); // pid
        payload.extend_from_slice(&2u32.to_le_bytes()); // tid
        payload.extend_from_slice(&100u64.to_le_bytes()); // time
        payload.extend_from_slice(&2u32.to_le_bytes()); // frame count
        payload.extend_from_slice(&7i32.to_le_bytes());
        payload.extend_from_slice(&9i32.to_le_bytes());
        payload.push(0); // guessed frames
        payload.extend_from_slice(&0i32.to_le_bytes()); // attribute id
        payload
    }

    #[test]
    fn test_decode_sample() {
        let record = codec().decode(&sample_payload()).unwrap();
        let EventRecord::Sample(sample) = record else {
            panic!("expected a sample record");
        };
        assert_eq!(sample.header.pid, 1);
        assert_eq!(sample.header.tid, 2);
        assert_eq!(sample.header.time, 100);
        assert_eq!(sample.frames, vec![7, 9]);
        assert_eq!(sample.attribute_id, 0);
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        let err = codec().decode(&[10]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidRecordType(10)));
        let err = codec().decode(&[0xff]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidRecordType(-1)));
    }

    #[test]
    fn test_trailing_bytes_are_fatal() {
        let mut payload = sample_payload();
        payload.push(0xaa);
        let err = codec().decode(&payload).unwrap_err();
        assert!(matches!(err, ProtocolError::TrailingBytes { tag: 0, leftover: 1 }));
    }

    #[test]
    fn test_short_payload_is_fatal() {
        let mut payload = sample_payload();
        payload.truncate(8);
        assert!(matches!(
            codec().decode(&payload),
            Err(ProtocolError::TruncatedRecord { .. })
        ));
    }

    #[test]
    fn test_decode_location_definition() {
        let mut payload = vec![4u8];
        payload.extend_from_slice(&0i32.to_le_bytes()); // id
        payload.extend_from_slice(&0x400u64.to_le_bytes()); // address
        payload.extend_from_slice(&(-1i32).to_le_bytes()); // file
        payload.extend_from_slice(&1u32.to_le_bytes()); // pid
        payload.extend_from_slice(&(-1i32).to_le_bytes()); // line
        payload.extend_from_slice(&(-1i32).to_le_bytes()); // column
        payload.extend_from_slice(&(-1i32).to_le_bytes()); // parent
        let record = codec().decode(&payload).unwrap();
        let EventRecord::LocationDefinition(def) = record else {
            panic!("expected a location definition");
        };
        assert_eq!(def.address, 0x400);
        assert!(!def.file.is_present());
        assert_eq!(def.parent_location_id, -1);
    }

    #[test]
    fn test_record_type_tag_space_is_closed() {
        for tag in 0..=9 {
            assert_ne!(RecordType::from_tag(tag), RecordType::Invalid);
        }
        assert_eq!(RecordType::from_tag(10), RecordType::Invalid);
        assert_eq!(RecordType::from_tag(-1), RecordType::Invalid);
    }
}
