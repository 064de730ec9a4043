use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Инспекция R-tree таблиц (только чтение)
#[derive(Parser, Debug)]
#[command(name = "rtreetable", version, about = "Read-only inspector for R-tree table files")]
pub struct Cli {
    #[command(flatten)]
    pub io: IoArgs,

    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Общие флаги ридера. Флаги сильнее переменных окружения
/// RTREE_MMAP_READS / RTREE_VERIFY_COMPARATOR.
#[derive(Args, Debug, Clone)]
pub struct IoArgs {
    /// Map the whole file (zero-copy reads)
    #[arg(long, global = true, conflicts_with = "no_mmap")]
    pub mmap: bool,

    /// Use positioned reads instead of mmap
    #[arg(long, global = true)]
    pub no_mmap: bool,

    /// Do not compare the comparator name stored in the table
    #[arg(long, global = true)]
    pub no_verify_comparator: bool,

    /// Print reader metrics (JSON) after the command
    #[arg(long, global = true)]
    pub metrics: bool,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Footer and properties block
    Props {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Forward scan. --from seeks to the first record ≥ the given internal key (hex).
    Scan {
        #[arg(long)]
        path: PathBuf,
        /// Encoded internal key as hex (user_key ‖ trailer)
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Point lookup of a user key
    ///
    /// Key формы: "text", "hex:deadbeef", "bbox:x0,x1,y0,y1".
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
        /// Snapshot sequence (default: newest)
        #[arg(long)]
        seq: Option<u64>,
        /// Print every record ≥ the lookup key instead of the resolved value
        #[arg(long)]
        all: bool,
    },
    /// Full scan: every record decodes and keys are non-decreasing
    Check {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Records whose bounding box intersects --bbox x0,x1,y0,y1,...
    Overlap {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        bbox: String,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        json: bool,
    },
}
