//! format — metadata блоки таблицы: footer и properties.
//!
//! Раскладка файла:
//!   [data region: записи подряд][properties block][footer 24 B]
//!
//! - footer.rs     — magic/версия/handle properties.
//! - properties.rs — data_size, раскладка ключей, счётчики, имя компаратора (+CRC32C).
//!
//! read_table_properties читает только footer и properties: при несовпадении magic
//! до data region дело не доходит.

pub mod footer;
pub mod properties;

pub use footer::Footer;
pub use properties::TableProperties;

use log::debug;

use crate::consts::FOOTER_SIZE;
use crate::error::{Result, TableError};
use crate::file::DataSource;

/// Прочитать и проверить footer + properties.
///
/// Порядок проверок:
/// - длина файла ≥ footer (Corruption);
/// - magic и версия (InvalidFormat);
/// - handle properties внутри файла (Corruption);
/// - CRC/разбор properties (Corruption);
/// - data_size не заходит на properties (Corruption).
pub fn read_table_properties<S: DataSource + ?Sized>(
    src: &S,
    file_size: u64,
) -> Result<(Footer, TableProperties)> {
    if file_size < FOOTER_SIZE as u64 {
        return Err(TableError::corruption(format!(
            "file is too short ({} bytes) to be a table",
            file_size
        )));
    }

    let footer_buf = src.read_at(file_size - FOOTER_SIZE as u64, FOOTER_SIZE)?;
    let footer = Footer::decode(&footer_buf)?;
    footer.validate(file_size)?;

    let props_buf = src.read_at(footer.props_offset, footer.props_len as usize)?;
    let props = TableProperties::decode(&props_buf)?;

    if props.data_size > footer.props_offset {
        return Err(TableError::corruption(format!(
            "data_size {} exceeds data region bound {} (file_size={})",
            props.data_size, footer.props_offset, file_size
        )));
    }
    props.key_layout()?;

    debug!(
        "read_table_properties: data_size={}, entries={}, fixed_key_len={}, comparator='{}'",
        props.data_size, props.num_entries, props.fixed_key_len, props.comparator_name
    );
    Ok((footer, props))
}

/// Склеить data region, properties и footer в образ файла (для фикстур и утилит).
pub fn assemble_table(data: &[u8], props: &TableProperties) -> Result<Vec<u8>> {
    let props_buf = props.encode()?;
    let props_len = u32::try_from(props_buf.len())
        .map_err(|_| TableError::invalid_format("properties block too large"))?;
    let footer = Footer::new(data.len() as u64, props_len);

    let mut out = Vec::with_capacity(data.len() + props_buf.len() + FOOTER_SIZE);
    out.extend_from_slice(data);
    out.extend_from_slice(&props_buf);
    out.extend_from_slice(&footer.encode());
    Ok(out)
}
