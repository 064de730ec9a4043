//! table/iter — прямой итератор по data region.
//!
//! Состояния: до seek и в конце (offset = next_offset = data_end), на записи,
//! ошибка (то же + status != Ok). Валидным итератор становится только после seek;
//! next() на невалидном итераторе ничего не делает.
//! Ключ/значение заимствуют маппинг в mmap режиме и владеют буфером в buffered.

use log::{debug, warn};
use std::borrow::Cow;
use std::cmp::Ordering;

use crate::error::{Result, TableError};
use crate::iterator::InternalIterator;
use crate::metrics::{record_corruption, record_iterator_created};
use crate::record::decode_record;

use super::reader::TableReader;

pub struct TableIterator<'a> {
    table: &'a TableReader,
    /// Смещение текущей записи; == data_end, когда итератор невалиден.
    offset: u64,
    /// Смещение следующей записи (куда шагнёт next()).
    next_offset: u64,
    key: Cow<'a, [u8]>,
    value: Cow<'a, [u8]>,
    status: Result<()>,
}

impl<'a> TableIterator<'a> {
    pub(crate) fn new(table: &'a TableReader) -> Self {
        record_iterator_created();
        let end = table.data_end_offset();
        Self {
            table,
            offset: end,
            next_offset: end,
            key: Cow::Borrowed(&[]),
            value: Cow::Borrowed(&[]),
            status: Ok(()),
        }
    }

    /// Смещение текущей записи в файле.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub(crate) fn table(&self) -> &'a TableReader {
        self.table
    }

    /// Перезапустить декодирование с заданной границы записи (кандидатные диапазоны spatial).
    pub(crate) fn seek_to_offset(&mut self, offset: u64) {
        self.status = Ok(());
        self.next_offset = offset;
        self.step();
    }

    /// Декодировать запись по next_offset. Любая ошибка кодека отравляет итератор.
    fn step(&mut self) {
        let table = self.table;
        let end = table.data_end_offset();
        self.offset = self.next_offset;
        if self.offset >= end {
            self.invalidate();
            return;
        }
        match decode_record(&table.file, self.offset, end, table.key_layout()) {
            Ok(rec) => {
                self.next_offset = rec.next_offset;
                self.key = rec.key;
                self.value = rec.value;
            }
            Err(e) => {
                if e.is_corruption() {
                    record_corruption();
                }
                warn!("table iterator: decode failed at offset {}: {}", self.offset, e);
                self.status = Err(e);
                self.invalidate();
            }
        }
    }

    fn invalidate(&mut self) {
        let end = self.table.data_end_offset();
        self.offset = end;
        self.next_offset = end;
        self.key = Cow::Borrowed(&[]);
        self.value = Cow::Borrowed(&[]);
    }

    fn not_supported(&mut self, op: &str) {
        self.status = Err(TableError::not_supported(format!(
            "{} is not supported by the rtree table iterator",
            op
        )));
        self.invalidate();
    }
}

impl<'a> InternalIterator for TableIterator<'a> {
    #[inline]
    fn valid(&self) -> bool {
        self.offset < self.table.data_end_offset()
    }

    fn seek_to_first(&mut self) {
        self.status = Ok(());
        self.next_offset = self.table.data_start_offset();
        self.step();
    }

    fn seek_to_last(&mut self) {
        self.not_supported("SeekToLast");
    }

    fn seek(&mut self, target: &[u8]) {
        let table = self.table;
        let cmp = &table.comparator;
        // Продолжать с текущей позиции можно только если она строго до цели,
        // иначе более ранняя подходящая запись осталась бы позади.
        let resume = self.valid() && cmp.compare(&self.key, target) == Ordering::Less;
        if !resume {
            if self.valid() {
                debug!("table iterator: seek behind offset {}, restarting from data start", self.offset);
            }
            self.seek_to_first();
        }
        while self.valid() && cmp.compare(&self.key, target) == Ordering::Less {
            self.step();
        }
    }

    fn seek_for_prev(&mut self, _target: &[u8]) {
        self.not_supported("SeekForPrev");
    }

    fn next(&mut self) {
        self.step();
    }

    fn prev(&mut self) {
        self.not_supported("Prev");
    }

    fn key(&self) -> &[u8] {
        debug_assert!(self.valid(), "key() on invalid iterator");
        &self.key
    }

    fn value(&self) -> &[u8] {
        debug_assert!(self.valid(), "value() on invalid iterator");
        &self.value
    }

    fn status(&self) -> Result<()> {
        self.status.clone()
    }
}
