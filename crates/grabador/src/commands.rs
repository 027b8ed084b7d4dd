//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use grabar::{Browser, ScriptLanguage, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

/// Grabador: CLI for Grabar - record page interactions and generate Selenium scripts
#[derive(Parser, Debug)]
#[command(name = "grabador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Backend base URL (overrides `api.base_url`)
    #[arg(long, env = "GRABAR_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Backend bearer token (overrides `api.token`)
    #[arg(long, env = "GRABAR_API_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the native-messaging recording host on stdin/stdout
    Host,

    /// Synthesize the locator for an element in an HTML snapshot
    Locate(LocateArgs),

    /// Replay a DOM event log against a snapshot and write the actions
    Record(RecordArgs),

    /// Generate a Selenium script from recorded actions
    Emit(EmitArgs),

    /// Check a generated script against its manifest
    Verify(VerifyArgs),

    /// Manage backend projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manage saved scripts on the backend
    #[command(subcommand)]
    Script(ScriptCommand),

    /// Sign in and print a bearer token
    Login(LoginArgs),

    /// Show or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for the locate command
#[derive(Args, Debug, Clone)]
pub struct LocateArgs {
    /// HTML snapshot file
    pub html: PathBuf,

    /// CSS selector, or XPath when it starts with `/`
    pub query: String,

    /// Resolve the synthesized locator and report how many elements it matches
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the record command
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    /// HTML snapshot file
    pub html: PathBuf,

    /// JSON event log
    pub events: PathBuf,

    /// Page URL recorded as the initial navigation
    #[arg(long)]
    pub url: Option<String>,

    /// Output file for the action sequence (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the emit command
#[derive(Args, Debug, Clone)]
pub struct EmitArgs {
    /// JSON action sequence
    pub actions: PathBuf,

    /// Script language
    #[arg(short, long)]
    pub target: Option<TargetArg>,

    /// Browser to drive
    #[arg(short, long)]
    pub browser: Option<BrowserArg>,

    /// Explicit waits before each action
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub wait: Option<bool>,

    /// Pause after each action in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Start URL when the sequence has no leading navigation
    #[arg(long)]
    pub base_url: Option<String>,

    /// Omit the generated-by header
    #[arg(long)]
    pub no_header: bool,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a `.manifest.json` sidecar next to the output
    #[arg(long, requires = "output")]
    pub manifest: bool,
}

/// Arguments for the verify command
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Generated script file
    pub script: PathBuf,
}

/// Project subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommand {
    /// List projects
    List,
    /// Create a project
    Create {
        /// Project name
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename or describe a project
    Update {
        /// Project id
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a project and its scripts
    Delete {
        /// Project id
        id: String,
    },
}

/// Script subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ScriptCommand {
    /// List scripts in a project
    List {
        /// Project id
        project: String,
    },
    /// Upload a generated script
    Upload {
        /// Project id
        project: String,
        /// Script file
        file: PathBuf,
        /// Display name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Download a saved script
    Download {
        /// Script id
        id: String,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a saved script
    Delete {
        /// Script id
        id: String,
    },
}

/// Arguments for the login command
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "GRABAR_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Store the token in the configuration file
    #[arg(long)]
    pub save: bool,
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Script language argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArg {
    /// Python selenium
    Python,
    /// Node selenium-webdriver
    #[value(alias = "js")]
    Javascript,
}

impl From<TargetArg> for ScriptLanguage {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Python => Self::Python,
            TargetArg::Javascript => Self::JavaScript,
        }
    }
}

/// Browser argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserArg {
    /// Google Chrome
    Chrome,
    /// Mozilla Firefox
    Firefox,
    /// Microsoft Edge
    Edge,
}

impl From<BrowserArg> for Browser {
    fn from(arg: BrowserArg) -> Self {
        match arg {
            BrowserArg::Chrome => Self::Chrome,
            BrowserArg::Firefox => Self::Firefox,
            BrowserArg::Edge => Self::Edge,
        }
    }
}

/// Color output argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
