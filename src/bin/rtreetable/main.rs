use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod util;
mod cmd_props;
mod cmd_scan;
mod cmd_get;
mod cmd_check;
mod cmd_overlap;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    // Пример: RUST_LOG=debug ./rtreetable scan --path t.sst
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    let opts = util::table_options(&cli.io)?;

    match cli.cmd {
        cli::Cmd::Props { path, json } =>
            cmd_props::exec(path, opts, json)?,

        cli::Cmd::Scan { path, from, limit, json } =>
            cmd_scan::exec(path, opts, from, limit, json)?,

        cli::Cmd::Get { path, key, seq, all } =>
            cmd_get::exec(path, opts, key, seq, all)?,

        cli::Cmd::Check { path, json } =>
            cmd_check::exec(path, opts, json)?,

        cli::Cmd::Overlap { path, bbox, limit, json } =>
            cmd_overlap::exec(path, opts, bbox, limit, json)?,
    }

    if cli.io.metrics {
        let ms = RtreeTable::metrics_snapshot();
        println!("{}", serde_json::to_string_pretty(&ms)?);
    }
    Ok(())
}
