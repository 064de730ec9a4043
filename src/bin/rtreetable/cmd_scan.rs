use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use RtreeTable::{parse_internal_key, InternalIterator, ReadOptions, TableOptions};

use super::util::{decode_hex, display_text, display_user_key, open_table, to_hex};

pub fn exec(
    path: PathBuf,
    opts: TableOptions,
    from: Option<String>,
    limit: Option<u64>,
    json: bool,
) -> Result<()> {
    let table = open_table(&path, opts)?;
    let mut it = table.new_iterator(&ReadOptions::default());

    match from {
        Some(hx) => it.seek(&decode_hex(&hx)?),
        None => it.seek_to_first(),
    }

    let limit = limit.unwrap_or(u64::MAX);
    let mut n = 0u64;
    if json {
        print!("[");
    }
    while it.valid() && n < limit {
        let (k, v) = (it.key(), it.value());
        // ключи уже провалидированы кодеком
        if let Some(p) = parse_internal_key(k) {
            if json {
                if n > 0 {
                    print!(",");
                }
                let row = json!({
                    "user_key_hex": to_hex(p.user_key),
                    "seq": p.sequence,
                    "kind": p.kind.to_string(),
                    "value_hex": to_hex(v),
                    "value_len": v.len(),
                });
                print!("{}", row);
            } else {
                println!(
                    "{} @{} {} -> '{}' ({} B)",
                    display_user_key(p.user_key),
                    p.sequence,
                    p.kind,
                    display_text(v),
                    v.len()
                );
            }
        }
        n += 1;
        it.next();
    }
    if json {
        println!("]");
    } else if n == 0 {
        println!("(no items)");
    }

    it.status()?;
    Ok(())
}
