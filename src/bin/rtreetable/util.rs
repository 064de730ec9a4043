use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use RtreeTable::format::read_table_properties;
use RtreeTable::{
    BytewiseComparator, Comparator, InternalKeyComparator, LowxComparator, Mbr, TableOptions,
    TableReader,
};

use super::cli::IoArgs;

// ENV helper
fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_ascii_lowercase())
        .map(|s| s == "1" || s == "true" || s == "yes" || s == "on")
}

/// Опции ридера: дефолты → env → флаги.
pub fn table_options(io: &IoArgs) -> Result<TableOptions> {
    let mut opts = TableOptions::default();
    if let Some(on) = env_bool("RTREE_MMAP_READS") {
        opts.use_mmap_reads = on;
    }
    if let Some(on) = env_bool("RTREE_VERIFY_COMPARATOR") {
        opts.verify_comparator = on;
    }
    if io.mmap {
        opts.use_mmap_reads = true;
    }
    if io.no_mmap {
        opts.use_mmap_reads = false;
    }
    if io.no_verify_comparator {
        opts.verify_comparator = false;
    }
    log::debug!("rtreetable: {}", opts);
    Ok(opts)
}

/// User comparator по имени из properties; неизвестное имя — побайтовый.
pub fn comparator_for(name: &str) -> Arc<dyn Comparator> {
    if name == LowxComparator.name() {
        Arc::new(LowxComparator)
    } else {
        Arc::new(BytewiseComparator)
    }
}

/// Открыть таблицу с компаратором, записанным в её properties.
pub fn open_table(path: &Path, opts: TableOptions) -> Result<TableReader> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let file_size = file.metadata()?.len();
    let (_, props) = read_table_properties(&file, file_size)
        .with_context(|| format!("read properties of {}", path.display()))?;
    let cmp = InternalKeyComparator::new(comparator_for(&props.comparator_name));
    let table = TableReader::open(opts, cmp, file, file_size)
        .with_context(|| format!("open table {}", path.display()))?;
    Ok(table)
}

/// Ключ из аргумента: "hex:..", "bbox:x0,x1,..", иначе UTF-8 литерал.
pub fn decode_key_arg(arg: &str) -> Result<Vec<u8>> {
    if let Some(hx) = arg.strip_prefix("hex:") {
        return decode_hex(hx);
    }
    if let Some(b) = arg.strip_prefix("bbox:") {
        return Ok(parse_bbox(b)?.encode());
    }
    Ok(arg.as_bytes().to_vec())
}

/// "x0,x1,y0,y1,..." → Mbr (пары min,max по измерениям).
pub fn parse_bbox(s: &str) -> Result<Mbr> {
    let nums = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| anyhow!("bad bbox value '{}': {}", p, e)))
        .collect::<Result<Vec<f64>>>()?;
    if nums.is_empty() || nums.len() % 2 != 0 {
        return Err(anyhow!("bbox needs min,max pairs, got {} values", nums.len()));
    }
    let bounds = nums.chunks_exact(2).map(|c| (c[0], c[1])).collect();
    Mbr::new(bounds).ok_or_else(|| anyhow!("bbox '{}' has min > max or NaN", s))
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err(anyhow!("hex string must have even length"));
    }
    let mut out = Vec::with_capacity(s.len() / 2);
    let bytes = s.as_bytes();
    for i in (0..bytes.len()).step_by(2) {
        let h = (bytes[i] as char)
            .to_digit(16)
            .ok_or_else(|| anyhow!("invalid hex at pos {}", i))?;
        let l = (bytes[i + 1] as char)
            .to_digit(16)
            .ok_or_else(|| anyhow!("invalid hex at pos {}", i + 1))?;
        out.push(((h << 4) | l) as u8);
    }
    Ok(out)
}

/// Печатное представление user key: bbox, текст или hex.
pub fn display_user_key(bytes: &[u8]) -> String {
    if let Some(m) = Mbr::decode(bytes) {
        let parts: Vec<String> = m
            .bounds()
            .iter()
            .map(|(lo, hi)| format!("[{}, {}]", lo, hi))
            .collect();
        return format!("bbox{}", parts.join("x"));
    }
    display_text(bytes)
}

pub fn display_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => format!("(binary {} B)", bytes.len()),
    }
}

pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push_str(&format!("{:02x}", b));
    }
    s
}
