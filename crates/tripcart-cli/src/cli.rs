use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tripcart")]
#[command(about = "Track travel purchases, online or offline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Optional path to the local cache database
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// CLI profile name holding backend configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Work offline: queue every write locally
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a purchase
    #[command(alias = "new")]
    Add {
        /// Item name
        #[arg(required = true)]
        name: Vec<String>,
        /// Price paid
        #[arg(long)]
        price: f64,
        /// Currency the price was paid in (ISO code)
        #[arg(long, value_name = "CUR")]
        currency: String,
        /// Home currency to convert into
        #[arg(long, value_name = "CUR")]
        to: Option<String>,
        /// Units of the home currency per unit paid
        #[arg(long)]
        rate: Option<f64>,
        /// Photo URL or path
        #[arg(long, value_name = "URI")]
        photo: Option<String>,
    },
    /// List items, newest first
    #[command(alias = "ls")]
    List {
        /// Only liked items
        #[arg(long)]
        liked: bool,
        /// Only purchased items
        #[arg(long)]
        purchased: bool,
        /// Case-insensitive name filter
        #[arg(long, value_name = "TEXT")]
        search: Option<String>,
        /// Number of items to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark an item as liked
    Like {
        /// Item ID or unique ID prefix
        id: String,
    },
    /// Clear the liked flag
    Unlike {
        /// Item ID or unique ID prefix
        id: String,
    },
    /// Mark an item as purchased
    Purchase {
        /// Item ID or unique ID prefix
        id: String,
    },
    /// Clear the purchased flag
    Unpurchase {
        /// Item ID or unique ID prefix
        id: String,
    },
    /// Delete an item
    #[command(alias = "rm")]
    Delete {
        /// Item ID or unique ID prefix
        id: String,
    },
    /// Push queued offline changes to the backend
    Sync {
        /// Output the tally as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show connectivity, queue size and last sync time
    Status,
    /// Probe connectivity and sync whenever it comes back
    Watch {
        /// Seconds between probes
        #[arg(long, default_value = "10", value_name = "SECS")]
        interval: u64,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Authenticate a CLI profile with Supabase
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// Supabase project URL
        #[arg(long, value_name = "URL")]
        supabase_url: Option<String>,
        /// Supabase anon/public key
        #[arg(long, value_name = "KEY")]
        supabase_anon_key: Option<String>,
        /// Table holding shopping items
        #[arg(long, value_name = "NAME")]
        items_table: Option<String>,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login with Supabase email/password and store session in keychain
    Login {
        /// Supabase account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Supabase account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status for profile
    Status,
    /// Logout profile and clear stored session
    Logout,
}
