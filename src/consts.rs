//! Общие константы формата R-tree таблицы (footer, properties, records, internal key).

// -------- Footer --------
// [props_offset u64][props_len u32][format_version u32][magic u64]
pub const RTREE_TABLE_MAGIC: u64 = 0x5254_5245_4554_424C;
pub const FORMAT_VERSION: u32 = 1;
pub const FOOTER_SIZE: usize = 24;

pub const FOOTER_OFF_PROPS_OFFSET: usize = 0;
pub const FOOTER_OFF_PROPS_LEN: usize = 8;
pub const FOOTER_OFF_VERSION: usize = 12;
pub const FOOTER_OFF_MAGIC: usize = 16;

// -------- Properties --------
// [fixed_key_len u32][data_size u64][num_entries u64][raw_key_size u64][raw_value_size u64]
// [cmp_name_len u16][cmp_name][crc32c u32]
pub const PROPS_FIXED_SIZE: usize = 4 + 8 + 8 + 8 + 8 + 2;
pub const PROPS_CRC_SIZE: usize = 4;
pub const PROPS_MAX_COMPARATOR_NAME: usize = u16::MAX as usize;

// -------- Records --------
// [key (fixed_key_len) | klen u32 + key][vlen u32][value]
pub const RECORD_LEN_PREFIX: usize = 4;

// -------- Internal key --------
// user_key ‖ fixed64_le((sequence << 8) | kind)
pub const INTERNAL_KEY_TRAILER: usize = 8;
pub const MAX_SEQUENCE_NUMBER: u64 = (1u64 << 56) - 1;

// -------- Bounding boxes --------
// Одно измерение = [min f64][max f64]
pub const MBR_DIM_SIZE: usize = 16;

// -------- Data region --------
// Индексного блока перед данными нет: data region начинается с нуля.
pub const DATA_START_OFFSET: u64 = 0;
