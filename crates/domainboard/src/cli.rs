//! Clap derive structures for the `domainboard` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// domainboard -- operator console for domain listings and purchase tickets
#[derive(Debug, Parser)]
#[command(
    name = "domainboard",
    version,
    about = "Manage domain listings and purchase tickets from the command line",
    long_about = "An operator console for a domain-listing marketplace.\n\n\
        Lists, filters, exports and imports domains, follows customer purchase\n\
        tickets through their lifecycle, and streams new tickets as they arrive.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "DOMAINBOARD_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL, e.g. https://api.example.com/api (overrides profile)
    #[arg(long, env = "DOMAINBOARD_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides env and keyring)
    #[arg(long, env = "DOMAINBOARD_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DOMAINBOARD_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default from config, else 30)
    #[arg(long, env = "DOMAINBOARD_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
    /// CSV with the export column layout
    Csv,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session token in the system keyring
    Login(LoginArgs),

    /// Forget the stored session token
    Logout,

    /// Manage domain listings
    #[command(alias = "dom", alias = "d")]
    Domains(DomainsArgs),

    /// Look up a list of domain names against the listings
    Search(SearchArgs),

    /// Manage customer purchase tickets
    #[command(alias = "t")]
    Tickets(TicketsArgs),

    /// Send a Telegram notification
    Notify {
        /// Message text
        message: String,
    },

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OrderArg {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// Shared pagination arguments for list commands.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page (default from config)
    #[arg(long)]
    pub page_size: Option<usize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (default from profile)
    #[arg(long, short = 'u')]
    pub username: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DOMAINS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub command: DomainsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AvailabilityArg {
    Available,
    Sold,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChannelArg {
    Posted,
    NotPosted,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BulkActionArg {
    /// Mark every listed domain sold
    MarkSold,
    /// Mark every listed domain available
    MarkAvailable,
    /// Post every listed domain to the channel
    PostToChannel,
    /// Remove every listed domain from the channel
    RemoveFromChannel,
}

/// Filter and sort flags shared by `domains list` and `domains export`.
#[derive(Debug, Args)]
pub struct DomainFilterArgs {
    /// Substring of the domain name (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,

    /// Country, exact match (repeatable)
    #[arg(long)]
    pub country: Vec<String>,

    /// Category: GOV, EDU, eCommerce, NEWS, Commerce (repeatable)
    #[arg(long)]
    pub category: Vec<String>,

    /// Domain Authority range, MIN:MAX
    #[arg(long, value_name = "MIN:MAX")]
    pub da: Option<String>,

    /// Page Authority range, MIN:MAX
    #[arg(long, value_name = "MIN:MAX")]
    pub pa: Option<String>,

    /// Spam Score range, MIN:MAX
    #[arg(long, value_name = "MIN:MAX")]
    pub ss: Option<String>,

    /// Availability
    #[arg(long)]
    pub status: Option<AvailabilityArg>,

    /// Channel posting state
    #[arg(long)]
    pub channel: Option<ChannelArg>,

    /// Creation date window, YYYY-MM-DD..YYYY-MM-DD
    #[arg(long, value_name = "FROM..TO")]
    pub created: Option<String>,

    /// Channel post date window, YYYY-MM-DD..YYYY-MM-DD
    #[arg(long, value_name = "FROM..TO")]
    pub posted: Option<String>,

    /// Sort column: name, country, category, type, da, pa, ss, backlink,
    /// price, status, channel, posted, created, updated
    #[arg(long, value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Sort direction
    #[arg(long, default_value = "asc")]
    pub order: OrderArg,
}

/// Editable listing fields for `create` and `update`.
#[derive(Debug, Args)]
pub struct DomainFieldArgs {
    /// Country
    #[arg(long)]
    pub country: Option<String>,

    /// Category
    #[arg(long)]
    pub category: Option<String>,

    /// Panel type: cPanel, Plesk, DirectAdmin, VestaCP, WHM, Shell
    #[arg(long = "type", value_name = "PANEL")]
    pub panel_type: Option<String>,

    /// Price
    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub da: Option<i64>,

    #[arg(long)]
    pub pa: Option<i64>,

    #[arg(long)]
    pub ss: Option<i64>,

    /// Backlink count
    #[arg(long)]
    pub backlink: Option<u64>,

    /// Shell link
    #[arg(long)]
    pub good_link: Option<String>,

    #[arg(long)]
    pub panel_link: Option<String>,

    #[arg(long)]
    pub panel_username: Option<String>,

    #[arg(long)]
    pub panel_password: Option<String>,

    #[arg(long)]
    pub hosting_link: Option<String>,

    #[arg(long)]
    pub hosting_username: Option<String>,

    #[arg(long)]
    pub hosting_password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DomainsCommand {
    /// List domains with filters, sorting and paging
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filters: DomainFilterArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one domain
    Get {
        /// Domain ID or name
        domain: String,
    },

    /// List domains sharing the same hosting panel credentials
    SamePanel {
        /// Domain ID or name
        domain: String,
    },

    /// Export the filtered, sorted set as CSV
    Export {
        #[command(flatten)]
        filters: DomainFilterArgs,

        /// Output file (stdout when omitted)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Print the CSV import template
    Template {
        /// Output file (stdout when omitted)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Import domains from a CSV file
    Import {
        /// CSV file in the template layout
        file: PathBuf,

        /// Validate locally without uploading
        #[arg(long)]
        dry_run: bool,
    },

    /// Create one domain, or several sharing the same credentials
    Create {
        /// Domain name (repeat to create several)
        #[arg(long = "name", required = true)]
        names: Vec<String>,

        #[command(flatten)]
        fields: DomainFieldArgs,
    },

    /// Update a domain's fields
    Update {
        /// Domain ID or name
        domain: String,

        /// New domain name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: DomainFieldArgs,
    },

    /// Delete a domain
    #[command(alias = "rm")]
    Delete {
        /// Domain ID or name
        domain: String,
    },

    /// Mark a domain sold
    Sold {
        /// Domain ID or name
        domain: String,
    },

    /// Mark a domain available
    Available {
        /// Domain ID or name
        domain: String,
    },

    /// Post a domain to the channel
    Post {
        /// Domain ID or name
        domain: String,
    },

    /// Remove a domain from the channel
    Unpost {
        /// Domain ID or name
        domain: String,
    },

    /// Apply one action to many domains by name
    Bulk {
        /// Action to apply
        action: BulkActionArg,

        /// File with one domain name per line
        #[arg(long, short = 'f', conflicts_with = "names")]
        file: Option<PathBuf>,

        /// Domain names
        names: Vec<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SEARCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// File with one domain name per line ("-" for stdin)
    pub file: PathBuf,

    /// Write the results as CSV
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TICKETS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TicketsArgs {
    #[command(subcommand)]
    pub command: TicketsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TicketStatusArg {
    New,
    Read,
    Sold,
    Cancelled,
}

/// Filter and sort flags shared by `tickets list` and `tickets export`.
#[derive(Debug, Args)]
pub struct TicketFilterArgs {
    /// Substring of the customer id
    #[arg(long)]
    pub customer: Option<String>,

    /// Ticket status
    #[arg(long)]
    pub status: Option<TicketStatusArg>,

    /// Substring of a requested domain (repeatable, any match)
    #[arg(long)]
    pub domain: Vec<String>,

    /// Request date window, YYYY-MM-DD..YYYY-MM-DD
    #[arg(long, value_name = "FROM..TO")]
    pub requested: Option<String>,

    /// Sort column: customer, domains, requested, status, price, created, updated
    #[arg(long, value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Sort direction
    #[arg(long, default_value = "asc")]
    pub order: OrderArg,
}

#[derive(Debug, Subcommand)]
pub enum TicketsCommand {
    /// List tickets with filters, sorting and paging
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filters: TicketFilterArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one ticket (marks a new ticket as read)
    Get {
        /// Ticket ID
        ticket: String,
    },

    /// Mark a ticket read
    Read {
        /// Ticket ID
        ticket: String,
    },

    /// Close a ticket as sold
    Sold {
        /// Ticket ID
        ticket: String,

        /// Agreed price
        #[arg(long, required = true)]
        price: f64,

        /// Requested domains that were actually sold (the rest are recorded unsold)
        #[arg(long = "domain", value_name = "NAME")]
        domains: Vec<String>,

        /// Note to attach
        #[arg(long)]
        note: Option<String>,
    },

    /// Close a ticket as cancelled
    Cancel {
        /// Ticket ID
        ticket: String,

        /// Reason
        #[arg(long)]
        note: Option<String>,
    },

    /// Replace a ticket's note
    Note {
        /// Ticket ID
        ticket: String,

        /// Note text
        text: String,
    },

    /// Delete a ticket
    #[command(alias = "rm")]
    Delete {
        /// Ticket ID
        ticket: String,
    },

    /// Export the filtered, sorted set as CSV
    Export {
        #[command(flatten)]
        filters: TicketFilterArgs,

        /// Output file (stdout when omitted)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },

    /// Show the number of new tickets
    Count,

    /// Stream new tickets as they arrive (Ctrl-C to stop)
    Watch,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Key: api_url, websocket_url, username, token_env, ca_cert, insecure, timeout
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
