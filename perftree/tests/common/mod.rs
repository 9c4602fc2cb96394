//! Synthetic stream encoder mirroring the exporter's wire format.

#![allow(dead_code)] // not every test binary uses every record kind

pub const STREAM_MAGIC: &[u8; 12] = b"QPERFSTREAM\0";

// Record type tags
pub const TAG_SAMPLE: u8 = 0;
pub const TAG_THREAD_START: u8 = 1;
pub const TAG_THREAD_END: u8 = 2;
pub const TAG_COMMAND: u8 = 3;
pub const TAG_LOCATION: u8 = 4;
pub const TAG_SYMBOL: u8 = 5;
pub const TAG_ATTRIBUTES: u8 = 6;
pub const TAG_STRING: u8 = 7;
pub const TAG_LOST: u8 = 8;
pub const TAG_FEATURES: u8 = 9;

/// Builds a complete stream: prologue plus length-framed records.
pub struct StreamWriter {
    buf: Vec<u8>,
}

impl StreamWriter {
    pub fn new(version: i32) -> Self {
        let mut buf = STREAM_MAGIC.to_vec();
        buf.extend_from_slice(&version.to_le_bytes());
        Self { buf }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Append one frame: length prefix plus raw payload.
    pub fn frame(&mut self, payload: &[u8]) {
        self.buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(payload);
    }

    /// Append a frame whose declared length exceeds the payload actually
    /// consumed by its record decoder.
    pub fn padded_frame(&mut self, payload: &[u8], padding: usize) {
        let mut padded = payload.to_vec();
        padded.resize(payload.len() + padding, 0);
        self.frame(&padded);
    }

    pub fn string_def(&mut self, id: i32, s: &str) {
        let mut p = vec![TAG_STRING];
        put_i32(&mut p, id);
        put_bytes(&mut p, s.as_bytes());
        self.frame(&p);
    }

    pub fn location_def(&mut self, id: i32, address: u64, file: i32, line: i32, parent: i32) {
        let mut p = vec![TAG_LOCATION];
        put_i32(&mut p, id);
        put_u64(&mut p, address);
        put_i32(&mut p, file);
        put_u32(&mut p, 1); // pid
        put_i32(&mut p, line);
        put_i32(&mut p, -1); // column
        put_i32(&mut p, parent);
        self.frame(&p);
    }

    pub fn symbol_def(&mut self, id: i32, name: i32, binary: i32) {
        let mut p = vec![TAG_SYMBOL];
        put_i32(&mut p, id);
        put_i32(&mut p, name);
        put_i32(&mut p, binary);
        p.push(0); // is_kernel
        self.frame(&p);
    }

    pub fn attributes_def(&mut self, id: i32, event_type: u32, config: u64, name: i32) {
        let mut p = vec![TAG_ATTRIBUTES];
        put_i32(&mut p, id);
        put_u32(&mut p, event_type);
        put_u64(&mut p, config);
        put_i32(&mut p, name);
        self.frame(&p);
    }

    pub fn sample(&mut self, pid: u32, tid: u32, time: u64, frames: &[i32]) {
        let mut p = vec![TAG_SAMPLE];
        put_header(&mut p, pid, tid, time);
        put_u32(&mut p, frames.len() as u32);
        for &f in frames {
            put_i32(&mut p, f);
        }
        p.push(0); // guessed frames
        put_i32(&mut p, 0); // attribute id
        self.frame(&p);
    }

    pub fn command(&mut self, pid: u32, tid: u32, time: u64, comm: i32) {
        let mut p = vec![TAG_COMMAND];
        put_header(&mut p, pid, tid, time);
        put_i32(&mut p, comm);
        self.frame(&p);
    }

    pub fn thread_start(&mut self, pid: u32, tid: u32, time: u64) {
        let mut p = vec![TAG_THREAD_START];
        put_header(&mut p, pid, tid, time);
        self.frame(&p);
    }

    pub fn thread_end(&mut self, pid: u32, tid: u32, time: u64) {
        let mut p = vec![TAG_THREAD_END];
        put_header(&mut p, pid, tid, time);
        self.frame(&p);
    }

    pub fn lost(&mut self, pid: u32, tid: u32, time: u64) {
        let mut p = vec![TAG_LOST];
        put_header(&mut p, pid, tid, time);
        self.frame(&p);
    }

    /// Features record with the given cmdline and everything else empty.
    pub fn features_with_cmdline(&mut self, args: &[&str]) {
        let mut p = vec![TAG_FEATURES];
        put_bytes(&mut p, b"testhost"); // host name
        put_bytes(&mut p, b"6.1.0"); // os release
        put_bytes(&mut p, b"1"); // version
        put_bytes(&mut p, b"x86_64"); // arch
        put_u32(&mut p, 8); // cpus online
        put_u32(&mut p, 8); // cpus available
        put_bytes(&mut p, b"test cpu"); // cpu desc
        put_bytes(&mut p, b"id"); // cpu id
        put_u64(&mut p, 16_000_000); // total mem (kb)
        put_u32(&mut p, args.len() as u32); // cmdline
        for arg in args {
            put_bytes(&mut p, arg.as_bytes());
        }
        for _ in 0..6 {
            put_u32(&mut p, 0); // build-ids, siblings x2, numa, pmu, groups
        }
        self.frame(&p);
    }
}

fn put_header(buf: &mut Vec<u8>, pid: u32, tid: u32, time: u64) {
    put_u32(buf, pid);
    put_u32(buf, tid);
    put_u64(buf, time);
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}
