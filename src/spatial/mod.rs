//! spatial — overlap-запросы по bounding box ключам.
//!
//! SpatialIndex отдаёт кандидатные диапазоны data region (выровненные по записям,
//! по возрастанию, без перекрытий); OverlapIterator проходит их табличным итератором и
//! показывает только записи, чей Mbr пересекает запрос. Формат v1 индексного блока не хранит,
//! поэтому базовая реализация — FullScanIndex (весь data region).

use std::cmp::Ordering;
use std::ops::Range;

use crate::error::{Result, TableError};
use crate::iterator::InternalIterator;
use crate::key::{extract_user_key, Mbr};
use crate::table::TableIterator;

/// Источник кандидатных диапазонов для overlap-сканов.
///
/// Каждый диапазон `start..end` обязан начинаться ровно на границе записи (смещение,
/// которое отдаёт `TableIterator::offset`). Ридер проверяет только порядок и вхождение
/// в data region: диапазон с началом посреди записи декодируется как мусор, и Corruption
/// будет лишь тогда, когда этот мусор не разбирается как запись.
pub trait SpatialIndex: Send + Sync {
    fn find_candidate_ranges(&self, query: &Mbr) -> Result<Vec<Range<u64>>>;
}

/// Один диапазон на весь data region.
#[derive(Debug, Clone, Copy)]
pub struct FullScanIndex {
    data_start: u64,
    data_end: u64,
}

impl FullScanIndex {
    pub fn new(data_start: u64, data_end: u64) -> Self {
        Self { data_start, data_end }
    }
}

impl SpatialIndex for FullScanIndex {
    fn find_candidate_ranges(&self, _query: &Mbr) -> Result<Vec<Range<u64>>> {
        if self.data_start >= self.data_end {
            return Ok(Vec::new());
        }
        Ok(vec![self.data_start..self.data_end])
    }
}

/// Диапазоны внутри [data_start, data_end), непустые, по возрастанию и без перекрытий.
pub(crate) fn validate_ranges(ranges: &[Range<u64>], data_start: u64, data_end: u64) -> Result<()> {
    let mut prev_end = data_start;
    for r in ranges {
        if r.start >= r.end || r.start < prev_end || r.end > data_end {
            return Err(TableError::corruption(format!(
                "spatial index returned bad range {}..{} (data region {}..{})",
                r.start, r.end, data_start, data_end
            )));
        }
        prev_end = r.end;
    }
    Ok(())
}

pub struct OverlapIterator<'a> {
    inner: TableIterator<'a>,
    ranges: Vec<Range<u64>>,
    /// Индекс текущего диапазона; == ranges.len() — итератор исчерпан.
    range_idx: usize,
    query: Mbr,
    status: Result<()>,
}

impl<'a> OverlapIterator<'a> {
    pub(crate) fn new(inner: TableIterator<'a>, ranges: Vec<Range<u64>>, query: Mbr) -> Self {
        let range_idx = ranges.len();
        Self {
            inner,
            ranges,
            range_idx,
            query,
            status: Ok(()),
        }
    }

    #[inline]
    pub fn query(&self) -> &Mbr {
        &self.query
    }

    pub fn candidate_ranges(&self) -> &[Range<u64>] {
        &self.ranges
    }

    fn matches(&self) -> bool {
        Mbr::decode(extract_user_key(self.inner.key()))
            .map_or(false, |m| m.intersects(&self.query))
    }

    fn enter_range(&mut self, idx: usize) {
        self.range_idx = idx;
        if let Some(r) = self.ranges.get(idx) {
            self.inner.seek_to_offset(r.start);
        }
    }

    /// Довести итератор до ближайшей подходящей записи (включая текущую).
    fn settle(&mut self) {
        while self.range_idx < self.ranges.len() {
            if !self.inner.valid() {
                if self.inner.status().is_err() {
                    return;
                }
                self.enter_range(self.range_idx + 1);
                continue;
            }
            if self.inner.offset() >= self.ranges[self.range_idx].end {
                self.enter_range(self.range_idx + 1);
                continue;
            }
            if self.matches() {
                return;
            }
            self.inner.next();
        }
    }

    fn not_supported(&mut self, op: &str) {
        self.status = Err(TableError::not_supported(format!(
            "{} is not supported by the overlap iterator",
            op
        )));
        self.range_idx = self.ranges.len();
    }
}

impl<'a> InternalIterator for OverlapIterator<'a> {
    fn valid(&self) -> bool {
        self.status.is_ok()
            && self.range_idx < self.ranges.len()
            && self.inner.valid()
            && self.inner.offset() < self.ranges[self.range_idx].end
    }

    fn seek_to_first(&mut self) {
        self.status = Ok(());
        self.enter_range(0);
        self.settle();
    }

    fn seek_to_last(&mut self) {
        self.not_supported("SeekToLast");
    }

    fn seek(&mut self, target: &[u8]) {
        self.seek_to_first();
        let cmp = self.inner.table().comparator();
        while self.valid() && cmp.compare(self.inner.key(), target) == Ordering::Less {
            self.next();
        }
    }

    fn seek_for_prev(&mut self, _target: &[u8]) {
        self.not_supported("SeekForPrev");
    }

    fn next(&mut self) {
        self.inner.next();
        self.settle();
    }

    fn prev(&mut self) {
        self.not_supported("Prev");
    }

    fn key(&self) -> &[u8] {
        self.inner.key()
    }

    fn value(&self) -> &[u8] {
        self.inner.value()
    }

    fn status(&self) -> Result<()> {
        self.status.clone()?;
        self.inner.status()
    }
}
