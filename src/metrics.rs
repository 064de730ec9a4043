//! Lightweight global metrics for the table reader.
//!
//! Потокобезопасные атомарные счётчики:
//! - open (успешные/неуспешные открытия, режим mmap)
//! - итераторы и декодированные записи
//! - байты, прочитанные позиционным чтением (buffered режим)
//! - corruption, наблюдённые при итерации/Get
//!
//! Счётчики процессные и служат только для наблюдаемости.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ----- Open -----
static TABLES_OPENED: AtomicU64 = AtomicU64::new(0);
static TABLES_OPENED_MMAP: AtomicU64 = AtomicU64::new(0);
static OPEN_FAILURES: AtomicU64 = AtomicU64::new(0);

// ----- Reads -----
static ITERATORS_CREATED: AtomicU64 = AtomicU64::new(0);
static RECORDS_DECODED: AtomicU64 = AtomicU64::new(0);
static BUFFERED_BYTES_READ: AtomicU64 = AtomicU64::new(0);
static GETS_ISSUED: AtomicU64 = AtomicU64::new(0);

// ----- Errors -----
static CORRUPTIONS_SEEN: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub tables_opened: u64,
    pub tables_opened_mmap: u64,
    pub open_failures: u64,

    pub iterators_created: u64,
    pub records_decoded: u64,
    pub buffered_bytes_read: u64,
    pub gets_issued: u64,

    pub corruptions_seen: u64,
}

impl MetricsSnapshot {
    /// Доля открытий в mmap режиме (0.0, если открытий не было).
    pub fn mmap_ratio(&self) -> f64 {
        if self.tables_opened == 0 {
            0.0
        } else {
            self.tables_opened_mmap as f64 / self.tables_opened as f64
        }
    }
}

#[inline]
pub(crate) fn record_table_opened(mmap: bool) {
    TABLES_OPENED.fetch_add(1, Ordering::Relaxed);
    if mmap {
        TABLES_OPENED_MMAP.fetch_add(1, Ordering::Relaxed);
    }
}

#[inline]
pub(crate) fn record_open_failure() {
    OPEN_FAILURES.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_iterator_created() {
    ITERATORS_CREATED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_record_decoded() {
    RECORDS_DECODED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_buffered_read(bytes: u64) {
    BUFFERED_BYTES_READ.fetch_add(bytes, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_get() {
    GETS_ISSUED.fetch_add(1, Ordering::Relaxed);
}

#[inline]
pub(crate) fn record_corruption() {
    CORRUPTIONS_SEEN.fetch_add(1, Ordering::Relaxed);
}

pub fn metrics_snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        tables_opened: TABLES_OPENED.load(Ordering::Relaxed),
        tables_opened_mmap: TABLES_OPENED_MMAP.load(Ordering::Relaxed),
        open_failures: OPEN_FAILURES.load(Ordering::Relaxed),
        iterators_created: ITERATORS_CREATED.load(Ordering::Relaxed),
        records_decoded: RECORDS_DECODED.load(Ordering::Relaxed),
        buffered_bytes_read: BUFFERED_BYTES_READ.load(Ordering::Relaxed),
        gets_issued: GETS_ISSUED.load(Ordering::Relaxed),
        corruptions_seen: CORRUPTIONS_SEEN.load(Ordering::Relaxed),
    }
}

pub fn metrics_reset() {
    TABLES_OPENED.store(0, Ordering::Relaxed);
    TABLES_OPENED_MMAP.store(0, Ordering::Relaxed);
    OPEN_FAILURES.store(0, Ordering::Relaxed);
    ITERATORS_CREATED.store(0, Ordering::Relaxed);
    RECORDS_DECODED.store(0, Ordering::Relaxed);
    BUFFERED_BYTES_READ.store(0, Ordering::Relaxed);
    GETS_ISSUED.store(0, Ordering::Relaxed);
    CORRUPTIONS_SEEN.store(0, Ordering::Relaxed);
}
