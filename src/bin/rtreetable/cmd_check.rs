use anyhow::{anyhow, Result};
use serde_json::json;
use std::cmp::Ordering;
use std::path::PathBuf;

use RtreeTable::{InternalIterator, ReadOptions, TableOptions};

use super::util::{open_table, to_hex};

/// Полный проход: каждая запись декодируется, ключи не убывают, счётчик совпадает с properties.
pub fn exec(path: PathBuf, opts: TableOptions, json: bool) -> Result<()> {
    let table = open_table(&path, opts)?;
    let cmp = table.comparator();
    let mut it = table.new_iterator(&ReadOptions::default());

    let mut records = 0u64;
    let mut out_of_order: Option<(u64, String)> = None;
    let mut prev: Option<Vec<u8>> = None;

    it.seek_to_first();
    while it.valid() {
        if let Some(p) = &prev {
            if out_of_order.is_none() && cmp.compare(p, it.key()) == Ordering::Greater {
                out_of_order = Some((records, to_hex(it.key())));
            }
        }
        prev = Some(it.key().to_vec());
        records += 1;
        it.next();
    }
    let status = it.status();
    let expected = table.properties().num_entries;
    let ok = status.is_ok() && out_of_order.is_none() && records == expected;

    if json {
        let out = json!({
            "ok": ok,
            "records": records,
            "expected_entries": expected,
            "out_of_order_at": out_of_order.as_ref().map(|(i, _)| *i),
            "error": status.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("records: {} (properties say {})", records, expected);
        if let Some((i, k)) = &out_of_order {
            println!("out of order at record #{}: key {}", i, k);
        }
        if let Err(e) = &status {
            println!("decode error after {} records: {}", records, e);
        }
        println!("{}", if ok { "OK" } else { "FAILED" });
    }

    if ok {
        Ok(())
    } else {
        Err(anyhow!("table check failed: {}", path.display()))
    }
}
