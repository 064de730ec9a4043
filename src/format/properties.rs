//! format/properties — блок свойств таблицы (размеры, счётчики, имя компаратора).
//!
//! Формат (LE):
//!   [fixed_key_len u32]
//!   [data_size u64]
//!   [num_entries u64]
//!   [raw_key_size u64]
//!   [raw_value_size u64]
//!   [comparator_name_len u16][comparator_name]
//!   [crc32c u32]  -- по всем предыдущим байтам блока
//!
//! Ридер потребляет data_size (верхняя граница data region) и fixed_key_len (раскладка ключа);
//! остальные поля — информационные.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::consts::{
    INTERNAL_KEY_TRAILER, PROPS_CRC_SIZE, PROPS_FIXED_SIZE, PROPS_MAX_COMPARATOR_NAME,
};
use crate::error::{Result, TableError};
use crate::record::KeyLayout;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableProperties {
    /// 0 — ключи с u32 префиксом длины; иначе длина каждого ключа (включая трейлер).
    pub fixed_key_len: u32,
    pub data_size: u64,
    pub num_entries: u64,
    pub raw_key_size: u64,
    pub raw_value_size: u64,
    pub comparator_name: String,
}

impl TableProperties {
    pub fn encode(&self) -> Result<Vec<u8>> {
        let name = self.comparator_name.as_bytes();
        if name.len() > PROPS_MAX_COMPARATOR_NAME {
            return Err(TableError::invalid_format(format!(
                "comparator name too long: {} bytes",
                name.len()
            )));
        }
        let mut buf = vec![0u8; PROPS_FIXED_SIZE + name.len() + PROPS_CRC_SIZE];
        LittleEndian::write_u32(&mut buf[0..4], self.fixed_key_len);
        LittleEndian::write_u64(&mut buf[4..12], self.data_size);
        LittleEndian::write_u64(&mut buf[12..20], self.num_entries);
        LittleEndian::write_u64(&mut buf[20..28], self.raw_key_size);
        LittleEndian::write_u64(&mut buf[28..36], self.raw_value_size);
        LittleEndian::write_u16(&mut buf[36..38], name.len() as u16);
        buf[PROPS_FIXED_SIZE..PROPS_FIXED_SIZE + name.len()].copy_from_slice(name);

        let body_len = buf.len() - PROPS_CRC_SIZE;
        let crc = crc32c::crc32c(&buf[..body_len]);
        LittleEndian::write_u32(&mut buf[body_len..], crc);
        Ok(buf)
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < PROPS_FIXED_SIZE + PROPS_CRC_SIZE {
            return Err(TableError::corruption(format!(
                "properties block too short: {} bytes",
                buf.len()
            )));
        }
        let body_len = buf.len() - PROPS_CRC_SIZE;
        let stored = LittleEndian::read_u32(&buf[body_len..]);
        let calc = crc32c::crc32c(&buf[..body_len]);
        if stored != calc {
            return Err(TableError::corruption(format!(
                "properties checksum mismatch (stored={:#010x}, calc={:#010x})",
                stored, calc
            )));
        }

        let name_len = LittleEndian::read_u16(&buf[36..38]) as usize;
        if PROPS_FIXED_SIZE + name_len != body_len {
            return Err(TableError::corruption(format!(
                "properties comparator name length {} does not match block size {}",
                name_len,
                buf.len()
            )));
        }
        let comparator_name = std::str::from_utf8(&buf[PROPS_FIXED_SIZE..body_len])
            .map_err(|e| TableError::corruption(format!("comparator name is not UTF-8: {}", e)))?
            .to_string();

        Ok(Self {
            fixed_key_len: LittleEndian::read_u32(&buf[0..4]),
            data_size: LittleEndian::read_u64(&buf[4..12]),
            num_entries: LittleEndian::read_u64(&buf[12..20]),
            raw_key_size: LittleEndian::read_u64(&buf[20..28]),
            raw_value_size: LittleEndian::read_u64(&buf[28..36]),
            comparator_name,
        })
    }

    /// Раскладка ключей записей. Фиксированная длина < 8 не вмещает трейлер internal key.
    pub fn key_layout(&self) -> Result<KeyLayout> {
        match self.fixed_key_len {
            0 => Ok(KeyLayout::LengthPrefixed),
            n if (n as usize) < INTERNAL_KEY_TRAILER => Err(TableError::corruption(format!(
                "fixed_key_len {} cannot hold an internal key",
                n
            ))),
            n => Ok(KeyLayout::Fixed(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableProperties {
        TableProperties {
            fixed_key_len: 40,
            data_size: 4096,
            num_entries: 77,
            raw_key_size: 3080,
            raw_value_size: 500,
            comparator_name: "rtree.LowxComparator".into(),
        }
    }

    #[test]
    fn encode_decode_keeps_all_fields() {
        let p = sample();
        let d = TableProperties::decode(&p.encode().unwrap()).unwrap();
        assert_eq!(d, p);
        assert_eq!(d.key_layout().unwrap(), KeyLayout::Fixed(40));
    }

    #[test]
    fn flipped_bit_is_corruption() {
        let mut buf = sample().encode().unwrap();
        buf[5] ^= 0x01;
        let e = TableProperties::decode(&buf).unwrap_err();
        assert!(e.is_corruption(), "{e}");
    }

    #[test]
    fn truncated_block_is_corruption() {
        let buf = sample().encode().unwrap();
        assert!(TableProperties::decode(&buf[..20]).unwrap_err().is_corruption());
    }

    #[test]
    fn layout_rules() {
        let mut p = sample();
        p.fixed_key_len = 0;
        assert_eq!(p.key_layout().unwrap(), KeyLayout::LengthPrefixed);
        p.fixed_key_len = 7;
        assert!(p.key_layout().unwrap_err().is_corruption());
    }
}
