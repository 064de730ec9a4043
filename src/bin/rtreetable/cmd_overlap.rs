use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use RtreeTable::{parse_internal_key, InternalIterator, ReadOptions, TableOptions};

use super::util::{display_text, display_user_key, open_table, parse_bbox, to_hex};

pub fn exec(
    path: PathBuf,
    opts: TableOptions,
    bbox: String,
    limit: Option<u64>,
    json: bool,
) -> Result<()> {
    let table = open_table(&path, opts)?;
    let query = parse_bbox(&bbox)?;
    let mut it = table.new_overlap_iterator(&ReadOptions::default(), query)?;

    let limit = limit.unwrap_or(u64::MAX);
    let mut n = 0u64;
    let mut rows = Vec::new();
    it.seek_to_first();
    while it.valid() && n < limit {
        if let Some(p) = parse_internal_key(it.key()) {
            if json {
                rows.push(json!({
                    "user_key_hex": to_hex(p.user_key),
                    "seq": p.sequence,
                    "kind": p.kind.to_string(),
                    "value_hex": to_hex(it.value()),
                }));
            } else {
                println!(
                    "{} @{} {} -> '{}'",
                    display_user_key(p.user_key),
                    p.sequence,
                    p.kind,
                    display_text(it.value())
                );
            }
        }
        n += 1;
        it.next();
    }
    it.status()?;

    if json {
        println!("{}", serde_json::to_string(&rows)?);
    } else {
        println!("({} records intersect {})", n, bbox);
    }
    Ok(())
}
