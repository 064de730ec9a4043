//! iterator — общий набор операций итератора по internal key.
//!
//! Ридеры разных форматов таблиц отдают итераторы через этот трейт, поэтому вышестоящий код
//! (merge, compaction) работает с ними одинаково. Табличный итератор только прямой:
//! seek_to_last/seek_for_prev/prev выставляют NotSupported и делают итератор невалидным.

use crate::error::Result;

pub trait InternalIterator {
    /// Итератор указывает на запись.
    fn valid(&self) -> bool;

    fn seek_to_first(&mut self);

    fn seek_to_last(&mut self);

    /// Встать на первую запись с ключом ≥ target (порядок internal comparator).
    fn seek(&mut self, target: &[u8]);

    /// Встать на последнюю запись с ключом ≤ target.
    fn seek_for_prev(&mut self, target: &[u8]);

    /// Шаг вперёд; на невалидном итераторе ничего не делает.
    fn next(&mut self);

    fn prev(&mut self);

    /// Закодированный internal key текущей записи. Требует valid().
    fn key(&self) -> &[u8];

    /// Требует valid().
    fn value(&self) -> &[u8];

    /// Последняя ошибка; Ok, пока ошибок не было.
    fn status(&self) -> Result<()>;
}
