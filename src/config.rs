//! Centralized configuration for the table reader.
//!
//! Goals:
//! - Single place for open-time tunables (I/O mode, comparator check, compaction hints).
//! - Builder in the same fluent style as the rest of the crate.
//! - The library never reads the environment; the `rtreetable` tool maps env vars onto
//!   these options itself.
//!
//! Defaults:
//! - use_mmap_reads = true on 64-bit targets (whole-file mapping is cheap there),
//!   false on 32-bit targets where address space is scarce.
//! - verify_comparator = true (a table written with another comparator is a foreign file).
//! - advise_sequential_on_compaction = true.

use std::fmt;

/// Open-time options of a table reader (immutable + env options of the engine merged).
#[derive(Clone, Debug)]
pub struct TableOptions {
    /// Map the whole file once at open (zero-copy reads) instead of positioned reads.
    pub use_mmap_reads: bool,

    /// If the properties block names a comparator, it must match the reader's comparator.
    pub verify_comparator: bool,

    /// Let `setup_for_compaction()` advise the kernel about sequential access (mmap mode only).
    pub advise_sequential_on_compaction: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            use_mmap_reads: cfg!(target_pointer_width = "64"),
            verify_comparator: true,
            advise_sequential_on_compaction: true,
        }
    }
}

impl TableOptions {
    pub fn builder() -> TableOptionsBuilder {
        TableOptionsBuilder::default()
    }

    pub fn with_mmap_reads(mut self, on: bool) -> Self {
        self.use_mmap_reads = on;
        self
    }

    pub fn with_verify_comparator(mut self, on: bool) -> Self {
        self.verify_comparator = on;
        self
    }

    pub fn with_advise_sequential_on_compaction(mut self, on: bool) -> Self {
        self.advise_sequential_on_compaction = on;
        self
    }
}

impl fmt::Display for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TableOptions {{ \
             use_mmap_reads: {}, \
             verify_comparator: {}, \
             advise_sequential_on_compaction: {} \
             }}",
            self.use_mmap_reads, self.verify_comparator, self.advise_sequential_on_compaction,
        )
    }
}

/// Lightweight builder that produces TableOptions.
#[derive(Clone, Debug, Default)]
pub struct TableOptionsBuilder {
    opts: TableOptions,
}

impl TableOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mmap_reads(mut self, on: bool) -> Self {
        self.opts.use_mmap_reads = on;
        self
    }

    pub fn verify_comparator(mut self, on: bool) -> Self {
        self.opts.verify_comparator = on;
        self
    }

    pub fn advise_sequential_on_compaction(mut self, on: bool) -> Self {
        self.opts.advise_sequential_on_compaction = on;
        self
    }

    /// Finish the builder and obtain the options.
    pub fn build(self) -> TableOptions {
        self.opts
    }
}

/// Per-read options (iterators, lookups, overlap scans).
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    /// Bypass the spatial index: overlap scans walk the whole data region.
    pub skip_filters: bool,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip_filters(mut self, on: bool) -> Self {
        self.skip_filters = on;
        self
    }
}
