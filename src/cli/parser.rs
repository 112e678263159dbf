use clap::{Parser, Subcommand};

/// Command-line interface definition for boardmark
/// Board-inspection annotation store: lot directories, history and audit log
#[derive(Parser)]
#[command(
    name = "boardmark",
    version = env!("CARGO_PKG_VERSION"),
    about = "Annotate defect positions on inspected boards and manage the per-lot JSON store",
    long_about = None
)]
pub struct Cli {
    /// Use this configuration file instead of the standard one
    #[arg(global = true, long = "config", value_name = "FILE")]
    pub config: Option<String>,

    /// Override the storage root (useful for tests or a shared drive)
    #[arg(global = true, long = "root", value_name = "DIR")]
    pub root: Option<String>,

    /// Override the worker id recorded in documents and the audit log
    #[arg(global = true, long = "worker", value_name = "ID")]
    pub worker: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the configuration file and the storage root
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Search annotation documents by file name (history is never searched)
    Search {
        /// Case-insensitive substring of the file name
        query: String,

        /// Restrict the search to one lot directory
        #[arg(long)]
        lot: Option<String>,
    },

    /// List the documents of a lot
    List {
        /// Lot number (NNNNNNN-10 or NNNNNNN-20)
        lot: String,

        /// Also list soft-deleted versions
        #[arg(long = "history")]
        history: bool,
    },

    /// List the soft-deleted versions of a lot, newest first
    History {
        lot: String,
    },

    /// Move a board document into history (privileged)
    Del {
        lot: String,

        /// Board number
        board: u32,

        /// Acting user (defaults to the configured worker)
        #[arg(long)]
        actor: Option<String>,
    },

    /// Restore the newest history version of a board (privileged)
    Restore {
        lot: String,

        board: u32,

        #[arg(long)]
        actor: Option<String>,
    },

    /// Regenerate and print lotInfo.json for a lot
    Manifest {
        lot: String,
    },

    /// Back up every history folder, then remove entries past retention
    Maintain {
        /// Skip the retention cleanup
        #[arg(long = "no-gc")]
        no_gc: bool,
    },

    /// Print the operation log
    Log {
        #[arg(long = "print", help = "Print rows from operation_log.csv")]
        print: bool,

        /// Show only the last N rows
        #[arg(long)]
        tail: Option<usize>,
    },

    /// Interactive annotation session driven by commands on stdin
    Session {
        #[arg(long)]
        lot: String,

        #[arg(long)]
        model: String,

        /// Session date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Image shown for the boards of this session
        #[arg(long)]
        image: Option<String>,

        /// Original image size as WIDTHxHEIGHT
        #[arg(long = "image-size", value_name = "WxH")]
        image_size: Option<String>,

        /// Canvas size as WIDTHxHEIGHT (used with --image-size)
        #[arg(long = "canvas", value_name = "WxH")]
        canvas: Option<String>,

        /// Fixed display scale when no image size is given
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
    },
}
