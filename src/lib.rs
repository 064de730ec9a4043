#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod error;
pub mod config;
pub mod metrics;

// Формат: internal key, записи, footer/properties
pub mod key;    // src/key/{mod,comparator,mbr}.rs
pub mod record;
pub mod format; // src/format/{mod,footer,properties}.rs

// Доступ к файлу (mmap / buffered)
pub mod file;   // src/file/mod.rs

// Ридер и итераторы
pub mod iterator;
pub mod table;  // src/table/{mod,reader,iter,get_context}.rs

// Overlap-запросы по bounding box ключам
pub mod spatial; // src/spatial/mod.rs

// Удобные реэкспорты
pub use config::{ReadOptions, TableOptions, TableOptionsBuilder};
pub use error::{Result, TableError};
pub use iterator::InternalIterator;
pub use key::{
    parse_internal_key, BytewiseComparator, Comparator, InternalKey, InternalKeyComparator,
    LowxComparator, Mbr, ParsedInternalKey, ValueKind, VALUE_KIND_FOR_SEEK,
};
pub use format::{assemble_table, Footer, TableProperties};
pub use record::{decode_record, encode_record, KeyLayout, Record};
pub use table::{lookup_key, GetContext, GetState, TableIterator, TableReader, ValueCollector};
pub use spatial::{FullScanIndex, OverlapIterator, SpatialIndex};
pub use metrics::{metrics_reset, metrics_snapshot, MetricsSnapshot};
