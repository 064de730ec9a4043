//! table/get_context — сборщик значений для точечного Get.
//!
//! Get вызывает save_value для каждой записи с ключом ≥ цели, пока сборщик не вернёт false.
//! GetContext — стандартный сборщик: смотрит только на версии искомого user key.

use std::cmp::Ordering;

use crate::key::{Comparator, ParsedInternalKey, ValueKind};

/// Получатель записей точечного поиска. `false` — остановить скан.
pub trait ValueCollector {
    fn save_value(&mut self, key: &ParsedInternalKey<'_>, value: &[u8]) -> bool;
}

impl<F> ValueCollector for F
where
    F: FnMut(&ParsedInternalKey<'_>, &[u8]) -> bool,
{
    #[inline]
    fn save_value(&mut self, key: &ParsedInternalKey<'_>, value: &[u8]) -> bool {
        self(key, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetState {
    NotFound,
    Found,
    Deleted,
    /// Есть merge-операнды, но нет базового значения.
    Merge,
}

pub struct GetContext<'a> {
    ucmp: &'a dyn Comparator,
    user_key: &'a [u8],
    state: GetState,
    value: Option<Vec<u8>>,
    /// От новых к старым.
    merge_operands: Vec<Vec<u8>>,
    records_seen: u64,
}

impl<'a> GetContext<'a> {
    pub fn new(ucmp: &'a dyn Comparator, user_key: &'a [u8]) -> Self {
        Self {
            ucmp,
            user_key,
            state: GetState::NotFound,
            value: None,
            merge_operands: Vec::new(),
            records_seen: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> &GetState {
        &self.state
    }

    /// Базовое значение (state == Found).
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    pub fn merge_operands(&self) -> &[Vec<u8>] {
        &self.merge_operands
    }

    /// Сколько записей получил сборщик (включая ту, на которой остановился).
    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    pub fn into_value(self) -> Option<Vec<u8>> {
        self.value
    }
}

impl<'a> ValueCollector for GetContext<'a> {
    fn save_value(&mut self, key: &ParsedInternalKey<'_>, value: &[u8]) -> bool {
        self.records_seen += 1;
        if self.ucmp.compare(key.user_key, self.user_key) != Ordering::Equal {
            return false;
        }
        match key.kind {
            ValueKind::Value => {
                self.value = Some(value.to_vec());
                self.state = GetState::Found;
                false
            }
            ValueKind::Deletion | ValueKind::SingleDeletion => {
                if self.merge_operands.is_empty() {
                    self.state = GetState::Deleted;
                }
                false
            }
            ValueKind::Merge => {
                self.merge_operands.push(value.to_vec());
                self.state = GetState::Merge;
                true
            }
        }
    }
}
