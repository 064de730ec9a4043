use anyhow::Result;
use std::path::PathBuf;

use RtreeTable::consts::MAX_SEQUENCE_NUMBER;
use RtreeTable::{lookup_key, GetContext, GetState, ParsedInternalKey, ReadOptions, TableOptions};

use super::util::{decode_key_arg, display_text, display_user_key, to_hex};

pub fn exec(path: PathBuf, opts: TableOptions, key: String, seq: Option<u64>, all: bool) -> Result<()> {
    let table = super::util::open_table(&path, opts)?;
    let user_key = decode_key_arg(&key)?;
    let target = lookup_key(&user_key, seq.unwrap_or(MAX_SEQUENCE_NUMBER));
    let ro = ReadOptions::default();

    if all {
        let mut n = 0u64;
        let mut print_all = |k: &ParsedInternalKey<'_>, v: &[u8]| {
            println!(
                "{} @{} {} -> '{}' ({} B)",
                display_user_key(k.user_key),
                k.sequence,
                k.kind,
                display_text(v),
                v.len()
            );
            n += 1;
            true
        };
        table.get(&ro, target.encoded(), &mut print_all)?;
        println!("({} records ≥ lookup key)", n);
        return Ok(());
    }

    let mut ctx = GetContext::new(table.comparator().user_comparator(), &user_key);
    table.get(&ro, target.encoded(), &mut ctx)?;

    match ctx.state() {
        GetState::Found => {
            let v = ctx.value().unwrap_or_default();
            println!("FOUND '{}': {} B", key, v.len());
            println!("text: {}", display_text(v));
            println!("hex:  {}", to_hex(&v[..v.len().min(64)]));
            if !ctx.merge_operands().is_empty() {
                println!("pending merge operands: {}", ctx.merge_operands().len());
            }
        }
        GetState::Merge => {
            println!("MERGE '{}': {} operands, no base value", key, ctx.merge_operands().len());
            for op in ctx.merge_operands() {
                println!("  '{}' ({} B)", display_text(op), op.len());
            }
        }
        GetState::Deleted => println!("DELETED '{}'", key),
        GetState::NotFound => println!("NOT FOUND '{}'", key),
    }
    Ok(())
}
