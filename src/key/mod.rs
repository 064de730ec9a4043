//! key — internal key (user_key ‖ trailer), компараторы и bounding box ключи.
//!
//! Разделение по подмодулям:
//! - comparator.rs — трейт Comparator, Bytewise/Lowx, InternalKeyComparator.
//! - mbr.rs        — Mbr: кодирование прямоугольника в user key и проверка пересечения.
//!
//! Формат internal key (LE):
//!   [user_key][fixed64((sequence << 8) | kind)]
//!
//! Порядок: user_key по возрастанию (user comparator), затем (sequence, kind) по убыванию —
//! самая новая версия ключа идёт первой.

pub mod comparator;
pub mod mbr;

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

use crate::consts::{INTERNAL_KEY_TRAILER, MAX_SEQUENCE_NUMBER};

pub use comparator::{BytewiseComparator, Comparator, InternalKeyComparator, LowxComparator};
pub use mbr::Mbr;

/// Тип операции, закодированный в младшем байте трейлера.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Deletion = 0x0,
    Value = 0x1,
    Merge = 0x2,
    SingleDeletion = 0x7,
}

/// Наибольший код: при равном sequence цель поиска сортируется раньше всех реальных записей.
pub const VALUE_KIND_FOR_SEEK: ValueKind = ValueKind::SingleDeletion;

impl ValueKind {
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Разобрать код из трейлера. Неизвестные коды — None.
    #[inline]
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x0 => Some(ValueKind::Deletion),
            0x1 => Some(ValueKind::Value),
            0x2 => Some(ValueKind::Merge),
            0x7 => Some(ValueKind::SingleDeletion),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Deletion => write!(f, "del"),
            ValueKind::Value => write!(f, "put"),
            ValueKind::Merge => write!(f, "merge"),
            ValueKind::SingleDeletion => write!(f, "single-del"),
        }
    }
}

/// Разобранный internal key; user_key заимствует байты исходного ключа.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedInternalKey<'a> {
    pub user_key: &'a [u8],
    pub sequence: u64,
    pub kind: ValueKind,
}

impl<'a> ParsedInternalKey<'a> {
    pub fn new(user_key: &'a [u8], sequence: u64, kind: ValueKind) -> Self {
        Self { user_key, sequence, kind }
    }

    /// Закодированная длина (user_key + трейлер).
    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.user_key.len() + INTERNAL_KEY_TRAILER
    }

    pub fn to_owned_key(&self) -> InternalKey {
        InternalKey::new(self.user_key, self.sequence, self.kind)
    }
}

#[inline]
pub fn pack_sequence_and_kind(sequence: u64, kind: ValueKind) -> u64 {
    debug_assert!(sequence <= MAX_SEQUENCE_NUMBER);
    (sequence << 8) | kind.to_u8() as u64
}

/// Разобрать internal key. None при длине < 8 или неизвестном типе операции.
pub fn parse_internal_key(ikey: &[u8]) -> Option<ParsedInternalKey<'_>> {
    let n = ikey.len();
    if n < INTERNAL_KEY_TRAILER {
        return None;
    }
    let packed = LittleEndian::read_u64(&ikey[n - INTERNAL_KEY_TRAILER..]);
    let kind = ValueKind::from_u8((packed & 0xFF) as u8)?;
    Some(ParsedInternalKey {
        user_key: &ikey[..n - INTERNAL_KEY_TRAILER],
        sequence: packed >> 8,
        kind,
    })
}

/// Дописать internal key в буфер.
pub fn append_internal_key(out: &mut Vec<u8>, key: &ParsedInternalKey<'_>) {
    out.extend_from_slice(key.user_key);
    let mut trailer = [0u8; INTERNAL_KEY_TRAILER];
    LittleEndian::write_u64(&mut trailer, pack_sequence_and_kind(key.sequence, key.kind));
    out.extend_from_slice(&trailer);
}

/// user_key часть закодированного ключа (без проверки типа операции).
#[inline]
pub fn extract_user_key(ikey: &[u8]) -> &[u8] {
    &ikey[..ikey.len().saturating_sub(INTERNAL_KEY_TRAILER)]
}

/// Владеющий internal key (для целей поиска, фикстур, CLI).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InternalKey {
    rep: Vec<u8>,
}

impl InternalKey {
    pub fn new(user_key: &[u8], sequence: u64, kind: ValueKind) -> Self {
        let mut rep = Vec::with_capacity(user_key.len() + INTERNAL_KEY_TRAILER);
        append_internal_key(&mut rep, &ParsedInternalKey::new(user_key, sequence, kind));
        Self { rep }
    }

    /// Ключ для поиска: первая видимая версия user_key при снимке snapshot_seq.
    pub fn lookup(user_key: &[u8], snapshot_seq: u64) -> Self {
        Self::new(user_key, snapshot_seq, VALUE_KIND_FOR_SEEK)
    }

    #[inline]
    pub fn encoded(&self) -> &[u8] {
        &self.rep
    }

    #[inline]
    pub fn user_key(&self) -> &[u8] {
        extract_user_key(&self.rep)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.rep
    }
}

impl fmt::Debug for InternalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match parse_internal_key(&self.rep) {
            Some(p) => write!(f, "InternalKey({:02x?} @{} {})", p.user_key, p.sequence, p.kind),
            None => write!(f, "InternalKey(bad {:02x?})", self.rep),
        }
    }
}
