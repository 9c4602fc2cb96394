//! Run summary accumulated while samples are folded into the bottom-up
//! tree and finalized once the stream has ended.

use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{Pid, Tid};
use crate::protocol::records::{FeaturesDefinition, Sample};

/// Final summary handed to the caller alongside the three trees.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub sample_count: u64,
    pub lost_chunks: u64,
    pub thread_count: usize,
    pub process_count: usize,
    pub application_start_time: u64,
    pub application_end_time: u64,
    pub application_running_time: u64,
    pub command: String,
}

/// Streaming accumulator behind [`Summary`].
#[derive(Debug, Default)]
pub struct SummaryBuilder {
    sample_count: u64,
    lost_chunks: u64,
    threads: HashSet<Tid>,
    processes: HashSet<Pid>,
    start_time: u64,
    end_time: u64,
    command: String,
}

impl SummaryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample's header into the running statistics.
    ///
    /// Start and end times are tracked as independent min/max so the
    /// summary stays correct even when sample timestamps arrive out of
    /// order.
    pub fn record_sample(&mut self, sample: &Sample) {
        let time = sample.header.time;
        if self.start_time == 0 || time < self.start_time {
            self.start_time = time;
        }
        if time > self.end_time {
            self.end_time = time;
        }
        self.threads.insert(Tid(sample.header.tid));
        self.processes.insert(Pid(sample.header.pid));
        self.sample_count += 1;
    }

    /// Count one dropped-events chunk.
    pub fn record_lost(&mut self) {
        self.lost_chunks += 1;
    }

    /// Reconstruct the command line from the exporter's feature dump. The
    /// first cmdline entry is the exporter binary's own path; only the
    /// bare tool name is shown in its place.
    pub fn set_features(&mut self, features: &FeaturesDefinition) {
        let args: Vec<String> = features
            .cmdline
            .iter()
            .skip(1)
            .map(|arg| String::from_utf8_lossy(arg).into_owned())
            .collect();
        self.command = format!("perf {}", args.join(" "));
    }

    /// Freeze the accumulators into the published record.
    #[must_use]
    pub fn finish(self) -> Summary {
        Summary {
            sample_count: self.sample_count,
            lost_chunks: self.lost_chunks,
            thread_count: self.threads.len(),
            process_count: self.processes.len(),
            application_start_time: self.start_time,
            application_end_time: self.end_time,
            application_running_time: self.end_time - self.start_time,
            command: self.command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::records::RecordHeader;

    fn sample(pid: u32, tid: u32, time: u64) -> Sample {
        Sample {
            header: RecordHeader { pid, tid, time },
            frames: Vec::new(),
            guessed_frames: 0,
            attribute_id: 0,
        }
    }

    fn features_with_cmdline(args: &[&str]) -> FeaturesDefinition {
        FeaturesDefinition {
            host_name: Vec::new(),
            os_release: Vec::new(),
            version: Vec::new(),
            arch: Vec::new(),
            nr_cpus_online: 0,
            nr_cpus_available: 0,
            cpu_desc: Vec::new(),
            cpu_id: Vec::new(),
            total_mem: 0,
            cmdline: args.iter().map(|a| a.as_bytes().to_vec()).collect(),
            build_ids: Vec::new(),
            sibling_cores: Vec::new(),
            sibling_threads: Vec::new(),
            numa_topology: Vec::new(),
            pmu_mappings: Vec::new(),
            group_descs: Vec::new(),
        }
    }

    #[test]
    fn test_counts_and_time_bounds() {
        let mut builder = SummaryBuilder::new();
        builder.record_sample(&sample(1, 10, 500));
        builder.record_sample(&sample(1, 11, 200));
        builder.record_sample(&sample(2, 10, 900));
        builder.record_lost();

        let summary = builder.finish();
        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.lost_chunks, 1);
        assert_eq!(summary.thread_count, 2);
        assert_eq!(summary.process_count, 2);
        assert_eq!(summary.application_start_time, 200);
        assert_eq!(summary.application_end_time, 900);
        assert_eq!(summary.application_running_time, 700);
    }

    #[test]
    fn test_out_of_order_timestamps() {
        // A decreasing timestamp must still push the start time down.
        let mut builder = SummaryBuilder::new();
        builder.record_sample(&sample(1, 1, 300));
        builder.record_sample(&sample(1, 1, 100));
        let summary = builder.finish();
        assert_eq!(summary.application_start_time, 100);
        assert_eq!(summary.application_end_time, 300);
    }

    #[test]
    fn test_single_sample_run_has_zero_duration() {
        let mut builder = SummaryBuilder::new();
        builder.record_sample(&sample(1, 1, 42));
        let summary = builder.finish();
        assert_eq!(summary.application_start_time, 42);
        assert_eq!(summary.application_end_time, 42);
        assert_eq!(summary.application_running_time, 0);
    }

    #[test]
    fn test_command_drops_the_exporter_path() {
        let mut builder = SummaryBuilder::new();
        builder.set_features(&features_with_cmdline(&[
            "/usr/bin/perf",
            "record",
            "-o",
            "-",
            "./app",
        ]));
        let summary = builder.finish();
        assert_eq!(summary.command, "perf record -o - ./app");
    }
}
