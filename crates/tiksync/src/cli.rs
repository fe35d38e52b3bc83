//! Clap derive structures for the `tiksync` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use tiksync_core::RateUnit;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tiksync -- reconcile and inspect RouterOS routers
#[derive(Debug, Parser)]
#[command(
    name = "tiksync",
    version,
    about = "Inspect and control RouterOS routers from the command line",
    long_about = "Polls a RouterOS router over its REST endpoint, cross-references\n\
        interfaces, ARP, bridge hosts, DHCP leases, NAT and queues into one\n\
        consistent view, and applies typed changes back to the router.",
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
    /// Router profile to use
    #[arg(long, short = 'p', env = "TIKSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Router URL or address (overrides profile)
    #[arg(long, short = 'r', env = "TIKSYNC_ROUTER", global = true)]
    pub router: Option<String>,

    /// Router username (overrides profile)
    #[arg(long, short = 'u', env = "TIKSYNC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Router password
    #[arg(long, env = "TIKSYNC_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TIKSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Display unit for rates (bps, Kbps, Mbps, B/s, KB/s, MB/s)
    #[arg(long, global = true)]
    pub unit: Option<RateUnit>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Verify the router certificate against the system store
    #[arg(long, env = "TIKSYNC_VERIFY_TLS", global = true)]
    pub verify_tls: bool,

    /// Request timeout in seconds
    #[arg(long, env = "TIKSYNC_TIMEOUT", global = true)]
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
    /// Follow update cycles and print interface traffic
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// List interfaces with their attributed clients and rates
    #[command(alias = "if")]
    Interfaces,

    /// List known hosts (DHCP leases and ARP)
    Hosts(HostsArgs),

    /// List destination NAT rules
    Nat,

    /// List simple queues
    #[command(alias = "q")]
    Queues,

    /// List DHCP leases
    Leases,

    /// Router resources, hardware and firmware
    #[command(alias = "sys")]
    System,

    /// Change router state
    Set(SetArgs),

    /// List or run scripts
    Script(ScriptArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH / HOSTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between update cycles (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Stop after this many cycles
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

#[derive(Debug, Args)]
pub struct HostsArgs {
    /// Only hosts that answered the last probe
    #[arg(long)]
    pub available: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SET
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    Enable,
    Disable,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Self::Enable)
    }
}

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(subcommand)]
    pub command: SetCommand,
}

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Enable or disable an interface
    Interface {
        /// Interface key or name
        name: String,
        state: Toggle,
    },

    /// Enable or disable a NAT rule
    Nat {
        /// Rule identity string (see `tiksync nat`)
        uniq_id: String,
        state: Toggle,
    },

    /// Enable or disable a simple queue
    Queue {
        /// Queue name
        name: String,
        state: Toggle,
    },

    /// Set any field on any entry
    Value {
        /// Router path, e.g. /ip/dns/static
        path: String,
        /// Field that identifies the entry
        match_field: String,
        match_value: String,
        /// Field to set
        field: String,
        value: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SCRIPT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ScriptArgs {
    #[command(subcommand)]
    pub command: ScriptCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScriptCommand {
    /// List scripts
    #[command(alias = "ls")]
    List,

    /// Run a script by name
    Run { name: String },
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

    /// Display current configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key, e.g. "router", "unit", "track_arp"
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

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
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
