//! record — кодек одной записи data region.
//!
//! Формат записи (LE):
//!   KeyLayout::Fixed(n):      [key n B][vlen u32][value]
//!   KeyLayout::LengthPrefixed: [klen u32][key][vlen u32][value]
//!
//! Декодирование — чистая функция над DataSource: ключ и значение заимствуют байты источника
//! (mmap/срез) или владеют буфером (buffered режим). Любой выход за `limit`
//! (data_end_offset) и неразбираемый internal key — Corruption.

use byteorder::{ByteOrder, LittleEndian};
use std::borrow::Cow;

use crate::consts::RECORD_LEN_PREFIX;
use crate::error::{Result, TableError};
use crate::file::DataSource;
use crate::key::{parse_internal_key, ParsedInternalKey, ValueKind};
use crate::metrics::record_record_decoded;

/// Как определяется длина ключа записи (из properties.fixed_key_len).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLayout {
    Fixed(u32),
    LengthPrefixed,
}

/// Декодированная запись.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub offset: u64,
    pub next_offset: u64,
    pub key: Cow<'a, [u8]>,
    pub value: Cow<'a, [u8]>,
    sequence: u64,
    kind: ValueKind,
}

impl<'a> Record<'a> {
    /// Разобранный internal key (ключ уже провалидирован при декодировании).
    #[inline]
    pub fn parsed_key(&self) -> ParsedInternalKey<'_> {
        ParsedInternalKey {
            user_key: crate::key::extract_user_key(&self.key),
            sequence: self.sequence,
            kind: self.kind,
        }
    }

    /// Полный размер записи на диске.
    #[inline]
    pub fn encoded_len(&self) -> u64 {
        self.next_offset - self.offset
    }
}

/// Прочитать `len` байт с позиции `*pos`, не выходя за `limit`; сдвинуть `*pos`.
fn take<'a, S: DataSource + ?Sized>(
    src: &'a S,
    pos: &mut u64,
    len: usize,
    limit: u64,
    what: &str,
) -> Result<Cow<'a, [u8]>> {
    let end = pos.checked_add(len as u64).filter(|&e| e <= limit).ok_or_else(|| {
        TableError::corruption(format!(
            "{} of {} bytes at offset {} overruns data region end {}",
            what, len, *pos, limit
        ))
    })?;
    let bytes = src.read_at(*pos, len)?;
    *pos = end;
    Ok(bytes)
}

fn take_u32<S: DataSource + ?Sized>(src: &S, pos: &mut u64, limit: u64, what: &str) -> Result<u32> {
    let b = take(src, pos, RECORD_LEN_PREFIX, limit, what)?;
    Ok(LittleEndian::read_u32(&b))
}

/// Декодировать запись по смещению `offset`; `limit` — data_end_offset.
pub fn decode_record<'a, S: DataSource + ?Sized>(
    src: &'a S,
    offset: u64,
    limit: u64,
    layout: KeyLayout,
) -> Result<Record<'a>> {
    let mut pos = offset;

    let key_len = match layout {
        KeyLayout::Fixed(n) => n as usize,
        KeyLayout::LengthPrefixed => take_u32(src, &mut pos, limit, "key length")? as usize,
    };
    let key = take(src, &mut pos, key_len, limit, "key")?;

    let value_len = take_u32(src, &mut pos, limit, "value length")? as usize;
    let value = take(src, &mut pos, value_len, limit, "value")?;

    let (sequence, kind) = match parse_internal_key(&key) {
        Some(p) => (p.sequence, p.kind),
        None => {
            return Err(TableError::corruption(format!(
                "malformed internal key ({} bytes) at offset {}",
                key.len(),
                offset
            )))
        }
    };

    record_record_decoded();
    Ok(Record {
        offset,
        next_offset: pos,
        key,
        value,
        sequence,
        kind,
    })
}

/// Закодировать запись в конец буфера (фикстуры и утилиты; ридер только читает).
pub fn encode_record(out: &mut Vec<u8>, key: &[u8], value: &[u8], layout: KeyLayout) -> Result<()> {
    match layout {
        KeyLayout::Fixed(n) => {
            if key.len() != n as usize {
                return Err(TableError::invalid_format(format!(
                    "key of {} bytes does not match fixed_key_len {}",
                    key.len(),
                    n
                )));
            }
        }
        KeyLayout::LengthPrefixed => {
            let klen = u32::try_from(key.len())
                .map_err(|_| TableError::invalid_format("key longer than u32::MAX"))?;
            out.extend_from_slice(&klen.to_le_bytes());
        }
    }
    out.extend_from_slice(key);
    let vlen = u32::try_from(value.len())
        .map_err(|_| TableError::invalid_format("value longer than u32::MAX"))?;
    out.extend_from_slice(&vlen.to_le_bytes());
    out.extend_from_slice(value);
    Ok(())
}
