use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use RtreeTable::TableOptions;

use super::util::open_table;

pub fn exec(path: PathBuf, opts: TableOptions, json: bool) -> Result<()> {
    let table = open_table(&path, opts)?;
    let footer = table.footer();
    let props = table.properties();

    if json {
        let out = json!({
            "path": path.display().to_string(),
            "file_size": table.file_size(),
            "mmap": table.is_mmap_mode(),
            "footer": {
                "props_offset": footer.props_offset,
                "props_len": footer.props_len,
                "format_version": footer.format_version,
                "magic": format!("{:#018x}", footer.magic),
            },
            "data_region": [table.data_start_offset(), table.data_end_offset()],
            "properties": props,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("table:           {}", path.display());
    println!("file_size:       {} B (mmap={})", table.file_size(), table.is_mmap_mode());
    println!("format_version:  {}", footer.format_version);
    println!("magic:           {:#018x}", footer.magic);
    println!("properties:      [{}..+{})", footer.props_offset, footer.props_len);
    println!(
        "data region:     [{}..{})",
        table.data_start_offset(),
        table.data_end_offset()
    );
    println!("key layout:      {:?}", table.key_layout());
    println!("entries:         {}", props.num_entries);
    println!("raw key bytes:   {}", props.raw_key_size);
    println!("raw value bytes: {}", props.raw_value_size);
    println!("comparator:      {}", props.comparator_name);
    Ok(())
}
