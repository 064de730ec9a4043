// tests/common/mod.rs
//
// Общие помощники интеграционных тестов: уникальные временные каталоги,
// запись таблиц из (internal key, value) через кодеки крейта, открытие в обоих режимах I/O.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;

use RtreeTable::{
    assemble_table, encode_record, InternalIterator, InternalKey, InternalKeyComparator,
    KeyLayout, TableOptions, TableProperties, TableReader, ValueKind,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Оба режима чтения: mmap и buffered.
pub const MODES: [bool; 2] = [true, false];

pub fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let base = std::env::temp_dir();
    base.join(format!("rtreetest-{prefix}-{pid}-{t}-{id}"))
}

pub fn ikey(user_key: &[u8], seq: u64, kind: ValueKind) -> Vec<u8> {
    InternalKey::new(user_key, seq, kind).into_bytes()
}

pub fn put(user_key: &[u8], seq: u64, value: &[u8]) -> (Vec<u8>, Vec<u8>) {
    (ikey(user_key, seq, ValueKind::Value), value.to_vec())
}

/// Data region из записей (в порядке подачи) и properties к нему.
pub fn build_data(
    entries: &[(Vec<u8>, Vec<u8>)],
    layout: KeyLayout,
    comparator_name: &str,
) -> Result<(Vec<u8>, TableProperties)> {
    let mut data = Vec::new();
    let mut props = TableProperties {
        fixed_key_len: match layout {
            KeyLayout::Fixed(n) => n,
            KeyLayout::LengthPrefixed => 0,
        },
        comparator_name: comparator_name.to_string(),
        ..TableProperties::default()
    };
    for (k, v) in entries {
        encode_record(&mut data, k, v, layout)?;
        props.num_entries += 1;
        props.raw_key_size += k.len() as u64;
        props.raw_value_size += v.len() as u64;
    }
    props.data_size = data.len() as u64;
    Ok((data, props))
}

/// Полный образ файла таблицы (побайтовый компаратор, ключи с префиксом длины).
pub fn table_image(entries: &[(Vec<u8>, Vec<u8>)]) -> Result<Vec<u8>> {
    let (data, props) = build_data(entries, KeyLayout::LengthPrefixed, "rtree.BytewiseComparator")?;
    Ok(assemble_table(&data, &props)?)
}

pub fn write_image(prefix: &str, image: &[u8]) -> Result<PathBuf> {
    let root = unique_root(prefix);
    fs::create_dir_all(&root)?;
    let path = root.join("table.sst");
    fs::write(&path, image)?;
    Ok(path)
}

pub fn write_table(prefix: &str, entries: &[(Vec<u8>, Vec<u8>)]) -> Result<PathBuf> {
    write_image(prefix, &table_image(entries)?)
}

pub fn opts(mmap: bool) -> TableOptions {
    TableOptions::default().with_mmap_reads(mmap)
}

pub fn open(path: &PathBuf, mmap: bool) -> Result<TableReader> {
    Ok(TableReader::open_path(path, opts(mmap), InternalKeyComparator::bytewise())?)
}

/// Собрать (key, value) от текущей позиции до конца.
pub fn drain<I: InternalIterator + ?Sized>(it: &mut I) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut out = Vec::new();
    while it.valid() {
        out.push((it.key().to_vec(), it.value().to_vec()));
        it.next();
    }
    out
}

pub fn cleanup(path: &PathBuf) {
    if let Some(dir) = path.parent() {
        let _ = fs::remove_dir_all(dir);
    }
}
