use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Returns the version string, with the git hash appended for non-release
/// builds: "0.3.1" or "0.3.1@abc1234".
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{}", VERSION, GIT_HASH)
        }
    })
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "pantry", bin_name = "pantry", version = get_version())]
#[command(about = "Keep track of what is in the pantry", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding config.json and local data
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Text)]
    pub output: OutputMode,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List items, optionally filtered by name
    #[command(alias = "ls")]
    List {
        /// Only show items whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show items whose name contains TERM (case-insensitive)
    Search { term: String },

    /// Add an item, or add to its quantity if it already exists
    #[command(alias = "a")]
    Add {
        /// Item name
        name: String,

        /// How many to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,

        /// Photo of the item
        #[arg(short, long, value_name = "FILE")]
        image: Option<PathBuf>,
    },

    /// Increase an item's quantity by one
    Inc { name: String },

    /// Decrease an item's quantity by one (never below 1)
    Dec { name: String },

    /// Set an item's quantity
    Set {
        name: String,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove an item
    #[command(alias = "rm")]
    Remove { name: String },

    /// Get or set configuration (backend, data-dir, firebase.<key>)
    Config {
        /// Configuration key
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
