//! format/footer — фиксированный 24-байтовый footer в конце файла.
//!
//! Формат (LE):
//!   [props_offset u64][props_len u32][format_version u32][magic u64]

use byteorder::{ByteOrder, LittleEndian};

use crate::consts::{
    FOOTER_OFF_MAGIC, FOOTER_OFF_PROPS_LEN, FOOTER_OFF_PROPS_OFFSET, FOOTER_OFF_VERSION,
    FOOTER_SIZE, FORMAT_VERSION, RTREE_TABLE_MAGIC,
};
use crate::error::{Result, TableError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub props_offset: u64,
    pub props_len: u32,
    pub format_version: u32,
    pub magic: u64,
}

impl Footer {
    /// Footer текущей версии формата, указывающий на блок properties.
    pub fn new(props_offset: u64, props_len: u32) -> Self {
        Self {
            props_offset,
            props_len,
            format_version: FORMAT_VERSION,
            magic: RTREE_TABLE_MAGIC,
        }
    }

    pub fn encode(&self) -> [u8; FOOTER_SIZE] {
        let mut buf = [0u8; FOOTER_SIZE];
        LittleEndian::write_u64(&mut buf[FOOTER_OFF_PROPS_OFFSET..FOOTER_OFF_PROPS_OFFSET + 8], self.props_offset);
        LittleEndian::write_u32(&mut buf[FOOTER_OFF_PROPS_LEN..FOOTER_OFF_PROPS_LEN + 4], self.props_len);
        LittleEndian::write_u32(&mut buf[FOOTER_OFF_VERSION..FOOTER_OFF_VERSION + 4], self.format_version);
        LittleEndian::write_u64(&mut buf[FOOTER_OFF_MAGIC..FOOTER_OFF_MAGIC + 8], self.magic);
        buf
    }

    /// Разобрать поля footer без семантических проверок.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != FOOTER_SIZE {
            return Err(TableError::corruption(format!(
                "footer must be {} bytes, got {}",
                FOOTER_SIZE,
                buf.len()
            )));
        }
        Ok(Self {
            props_offset: LittleEndian::read_u64(&buf[FOOTER_OFF_PROPS_OFFSET..FOOTER_OFF_PROPS_OFFSET + 8]),
            props_len: LittleEndian::read_u32(&buf[FOOTER_OFF_PROPS_LEN..FOOTER_OFF_PROPS_LEN + 4]),
            format_version: LittleEndian::read_u32(&buf[FOOTER_OFF_VERSION..FOOTER_OFF_VERSION + 4]),
            magic: LittleEndian::read_u64(&buf[FOOTER_OFF_MAGIC..FOOTER_OFF_MAGIC + 8]),
        })
    }

    /// Проверить magic и версию (InvalidFormat), затем handle properties (Corruption).
    pub fn validate(&self, file_size: u64) -> Result<()> {
        if self.magic != RTREE_TABLE_MAGIC {
            return Err(TableError::invalid_format(format!(
                "bad table magic {:#018x} (expected {:#018x})",
                self.magic, RTREE_TABLE_MAGIC
            )));
        }
        if self.format_version != FORMAT_VERSION {
            return Err(TableError::invalid_format(format!(
                "unsupported format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }
        let footer_start = file_size.saturating_sub(FOOTER_SIZE as u64);
        let props_end = self.props_offset.checked_add(self.props_len as u64);
        match props_end {
            Some(end) if end <= footer_start => Ok(()),
            _ => Err(TableError::corruption(format!(
                "properties block [{}..+{}) outside file body (footer at {})",
                self.props_offset, self.props_len, footer_start
            ))),
        }
    }
}
