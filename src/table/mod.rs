//! table — ридер R-tree таблицы.
//!
//! - reader.rs      — TableReader (open, итераторы, Get, хуки compaction).
//! - iter.rs        — TableIterator: прямой итератор по data region.
//! - get_context.rs — ValueCollector и стандартный GetContext.

pub mod get_context;
pub mod iter;
pub mod reader;

pub use get_context::{GetContext, GetState, ValueCollector};
pub use iter::TableIterator;
pub use reader::TableReader;

use crate::key::InternalKey;

/// Цель для Get: первая видимая версия `user_key` при снимке `snapshot_seq`.
pub fn lookup_key(user_key: &[u8], snapshot_seq: u64) -> InternalKey {
    InternalKey::lookup(user_key, snapshot_seq)
}
