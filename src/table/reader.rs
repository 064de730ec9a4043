//! table/reader — TableReader: открытие файла, итераторы, точечный Get.
//!
//! Open: footer + properties → проверка компаратора → FileInfo (mmap при необходимости).
//! Любая ошибка на этих шагах возвращается вызывающему; полуоткрытый ридер не существует.
//! После open ридер неизменяем: итераторы и Get только заимствуют его, общих курсоров нет.

use log::{debug, warn};
use std::cmp::Ordering;
use std::fs::File;
use std::path::Path;

use crate::config::{ReadOptions, TableOptions};
use crate::consts::DATA_START_OFFSET;
use crate::error::{Result, TableError};
use crate::file::FileInfo;
use crate::format::{read_table_properties, Footer, TableProperties};
use crate::iterator::InternalIterator;
use crate::key::{parse_internal_key, InternalKeyComparator, Mbr};
use crate::metrics::{record_corruption, record_get, record_open_failure, record_table_opened};
use crate::record::{decode_record, KeyLayout};
use crate::spatial::{validate_ranges, FullScanIndex, OverlapIterator, SpatialIndex};

use super::get_context::ValueCollector;
use super::iter::TableIterator;

pub struct TableReader {
    pub(crate) options: TableOptions,
    pub(crate) comparator: InternalKeyComparator,
    pub(crate) file: FileInfo,
    footer: Footer,
    props: TableProperties,
    key_layout: KeyLayout,
    spatial_index: Option<Box<dyn SpatialIndex>>,
}

impl TableReader {
    /// Открыть таблицу поверх уже открытого файла размера `file_size`.
    pub fn open(
        options: TableOptions,
        comparator: InternalKeyComparator,
        file: File,
        file_size: u64,
    ) -> Result<Self> {
        match Self::open_inner(options, comparator, file, file_size) {
            Ok(t) => Ok(t),
            Err(e) => {
                record_open_failure();
                warn!("rtree table open failed (file_size={}): {}", file_size, e);
                Err(e)
            }
        }
    }

    /// Удобная обёртка: открыть файл по пути, размер берётся из метаданных.
    pub fn open_path<P: AsRef<Path>>(
        path: P,
        options: TableOptions,
        comparator: InternalKeyComparator,
    ) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        debug!("open_path: {} ({} bytes)", path.display(), file_size);
        Self::open(options, comparator, file, file_size)
    }

    fn open_inner(
        options: TableOptions,
        comparator: InternalKeyComparator,
        file: File,
        file_size: u64,
    ) -> Result<Self> {
        let (footer, props) = read_table_properties(&file, file_size)?;
        let key_layout = props.key_layout()?;

        if options.verify_comparator
            && !props.comparator_name.is_empty()
            && props.comparator_name != comparator.name()
        {
            return Err(TableError::invalid_format(format!(
                "table was written with comparator '{}', reader uses '{}'",
                props.comparator_name,
                comparator.name()
            )));
        }

        let mut info = FileInfo::new(file, file_size, props.data_size, options.use_mmap_reads);
        info.mmap_data_if_needed()?;

        record_table_opened(info.is_mmap_mode());
        debug!(
            "rtree table opened: file_size={}, data=[{}..{}), entries={}, layout={:?}, mmap={}",
            file_size,
            DATA_START_OFFSET,
            props.data_size,
            props.num_entries,
            key_layout,
            info.is_mmap_mode()
        );

        Ok(Self {
            options,
            comparator,
            file: info,
            footer,
            props,
            key_layout,
            spatial_index: None,
        })
    }

    /// Подключить spatial индекс для overlap-сканов.
    pub fn set_spatial_index(&mut self, index: Box<dyn SpatialIndex>) {
        self.spatial_index = Some(index);
    }

    // ---------------- accessors ----------------

    #[inline]
    pub fn properties(&self) -> &TableProperties {
        &self.props
    }

    #[inline]
    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    #[inline]
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    #[inline]
    pub fn file_size(&self) -> u64 {
        self.file.file_size()
    }

    #[inline]
    pub fn is_mmap_mode(&self) -> bool {
        self.file.is_mmap_mode()
    }

    #[inline]
    pub fn data_start_offset(&self) -> u64 {
        DATA_START_OFFSET
    }

    #[inline]
    pub fn data_end_offset(&self) -> u64 {
        self.file.data_end_offset()
    }

    #[inline]
    pub fn key_layout(&self) -> KeyLayout {
        self.key_layout
    }

    #[inline]
    pub fn comparator(&self) -> &InternalKeyComparator {
        &self.comparator
    }

    // ---------------- iterators ----------------

    /// Итератор в собственной аллокации; стоит перед первой записью, файл не трогает.
    pub fn new_iterator(&self, read_options: &ReadOptions) -> Box<dyn InternalIterator + '_> {
        let _ = read_options;
        Box::new(TableIterator::new(self))
    }

    /// Итератор в слоте вызывающего (переиспользуемая память); предыдущее содержимое слота
    /// заменяется.
    pub fn new_iterator_in<'a, 's>(
        &'a self,
        read_options: &ReadOptions,
        slot: &'s mut Option<TableIterator<'a>>,
    ) -> &'s mut TableIterator<'a> {
        let _ = read_options;
        slot.insert(TableIterator::new(self))
    }

    /// Итератор по записям, чей bounding box пересекает `query`.
    pub fn new_overlap_iterator(
        &self,
        read_options: &ReadOptions,
        query: Mbr,
    ) -> Result<OverlapIterator<'_>> {
        let ranges = match (&self.spatial_index, read_options.skip_filters) {
            (Some(index), false) => index.find_candidate_ranges(&query)?,
            _ => FullScanIndex::new(self.data_start_offset(), self.data_end_offset())
                .find_candidate_ranges(&query)?,
        };
        validate_ranges(&ranges, self.data_start_offset(), self.data_end_offset())?;
        Ok(OverlapIterator::new(TableIterator::new(self), ranges, query))
    }

    // ---------------- point lookup ----------------

    /// Линейный скан от начала data region: сборщик получает каждую запись с ключом ≥ target
    /// (по возрастанию), пока не вернёт false.
    pub fn get<C: ValueCollector + ?Sized>(
        &self,
        read_options: &ReadOptions,
        target: &[u8],
        collector: &mut C,
    ) -> Result<()> {
        let _ = read_options;
        record_get();
        let target = parse_internal_key(target).ok_or_else(|| {
            TableError::corruption(format!("malformed lookup key ({} bytes)", target.len()))
        })?;

        let end = self.data_end_offset();
        let mut offset = self.data_start_offset();
        while offset < end {
            let rec = match decode_record(&self.file, offset, end, self.key_layout) {
                Ok(r) => r,
                Err(e) => {
                    if e.is_corruption() {
                        record_corruption();
                    }
                    warn!("get: decode failed at offset {}: {}", offset, e);
                    return Err(e);
                }
            };
            offset = rec.next_offset;
            let key = rec.parsed_key();
            if self.comparator.compare_parsed(&key, &target) == Ordering::Less {
                continue;
            }
            if !collector.save_value(&key, &rec.value) {
                break;
            }
        }
        Ok(())
    }

    // ---------------- engine hooks ----------------

    /// Индекса смещений нет: оценка всегда «начало файла».
    pub fn approximate_offset_of(&self, key: &[u8]) -> u64 {
        let _ = key;
        0
    }

    /// Подготовка к последовательному чтению compaction. Можно вызывать сколько угодно раз.
    pub fn setup_for_compaction(&self) {
        if self.options.advise_sequential_on_compaction && self.file.is_mmap_mode() {
            debug!("setup_for_compaction: advising sequential access");
            self.file.advise_sequential();
        }
    }
}

impl std::fmt::Debug for TableReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableReader")
            .field("file_size", &self.file_size())
            .field("data_end_offset", &self.data_end_offset())
            .field("mmap", &self.is_mmap_mode())
            .field("comparator", &self.comparator)
            .field("entries", &self.props.num_entries)
            .finish()
    }
}
