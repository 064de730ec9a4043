//! key/comparator — полный порядок ключей таблицы.
//!
//! - Comparator            — user comparator (имя сохраняется в properties и сверяется при open).
//! - BytewiseComparator    — лексикографический порядок байтов.
//! - LowxComparator        — bounding box ключи по нижней координате x, затем байты.
//! - InternalKeyComparator — user_key ↑, затем (sequence, kind) ↓.

use byteorder::{ByteOrder, LittleEndian};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::consts::INTERNAL_KEY_TRAILER;

use super::ParsedInternalKey;

pub trait Comparator: Send + Sync {
    /// Стабильное имя; хранится в properties таблицы.
    fn name(&self) -> &str;

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BytewiseComparator;

impl Comparator for BytewiseComparator {
    fn name(&self) -> &str {
        "rtree.BytewiseComparator"
    }

    #[inline]
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// Порядок по нижней координате первого измерения (min x) bounding box ключа.
/// Ключи короче одного f64 сравниваются побайтно; NaN упорядочены через total_cmp.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowxComparator;

impl Comparator for LowxComparator {
    fn name(&self) -> &str {
        "rtree.LowxComparator"
    }

    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        if a.len() < 8 || b.len() < 8 {
            return a.cmp(b);
        }
        let ax = LittleEndian::read_f64(&a[0..8]);
        let bx = LittleEndian::read_f64(&b[0..8]);
        ax.total_cmp(&bx).then_with(|| a.cmp(b))
    }
}

#[derive(Clone)]
pub struct InternalKeyComparator {
    user: Arc<dyn Comparator>,
}

impl InternalKeyComparator {
    pub fn new(user: Arc<dyn Comparator>) -> Self {
        Self { user }
    }

    pub fn bytewise() -> Self {
        Self::new(Arc::new(BytewiseComparator))
    }

    /// Имя user comparator (именно оно записывается в properties).
    pub fn name(&self) -> &str {
        self.user.name()
    }

    #[inline]
    pub fn user_comparator(&self) -> &dyn Comparator {
        self.user.as_ref()
    }

    /// Сравнить два закодированных internal key.
    /// Ключи короче трейлера трактуются как user_key с нулевым трейлером (без паники).
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        let (ua, ta) = split_internal(a);
        let (ub, tb) = split_internal(b);
        match self.user.compare(ua, ub) {
            Ordering::Equal => tb.cmp(&ta),
            ord => ord,
        }
    }

    pub fn compare_parsed(&self, a: &ParsedInternalKey<'_>, b: &ParsedInternalKey<'_>) -> Ordering {
        match self.user.compare(a.user_key, b.user_key) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match b.sequence.cmp(&a.sequence) {
            Ordering::Equal => b.kind.to_u8().cmp(&a.kind.to_u8()),
            ord => ord,
        }
    }
}

impl fmt::Debug for InternalKeyComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternalKeyComparator({})", self.user.name())
    }
}

#[inline]
fn split_internal(k: &[u8]) -> (&[u8], u64) {
    if k.len() < INTERNAL_KEY_TRAILER {
        return (k, 0);
    }
    let n = k.len() - INTERNAL_KEY_TRAILER;
    (&k[..n], LittleEndian::read_u64(&k[n..]))
}
