use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "stratus",
    version,
    about = "Drive cloud infrastructure stacks through their lifecycle"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Access key id (overrides config)
    #[arg(short = 'K', long, global = true, env = "STRATUS_ACCESS_KEY_ID")]
    pub key: Option<String>,

    /// Secret key (overrides config)
    #[arg(short = 'S', long, global = true, env = "STRATUS_SECRET_KEY")]
    pub secret: Option<String>,

    /// Provider region (overrides config)
    #[arg(short = 'r', long, global = true, env = "STRATUS_REGION")]
    pub region: Option<String>,

    /// Orchestration endpoint override
    #[arg(long, global = true, env = "STRATUS_ENDPOINT")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new stack from a template
    Create(StackArgs),
    /// Update an existing stack from a template
    Update(StackArgs),
    /// List stacks
    List(ListArgs),
    /// Show a stack's description, outputs, and resources
    Describe(DescribeArgs),
    /// Show (and optionally poll) a stack's events
    Events(EventsArgs),
    /// Drill into a failed stack's resources
    Inspect(InspectArgs),
    /// Delete a stack
    Destroy(DestroyArgs),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct StackArgs {
    /// Stack name
    pub name: String,

    /// Set a template parameter. Can be used multiple times.
    #[arg(short = 'p', long = "parameter", value_name = "KEY:VALUE")]
    pub parameters: Vec<String>,

    /// Allow a capability. Can be used multiple times.
    #[arg(short = 'C', long = "capability", value_name = "CAPABILITY")]
    pub capabilities: Vec<String>,

    /// Add a notification target. Can be used multiple times.
    #[arg(long = "notification", value_name = "TARGET")]
    pub notifications: Vec<String>,

    /// Set a timeout for the stack operation
    #[arg(short = 't', long, value_name = "MIN")]
    pub timeout: Option<u32>,

    /// Keep failed resources instead of rolling back
    #[arg(long)]
    pub no_rollback: bool,

    /// Do not poll stack events after submission
    #[arg(long = "no-poll")]
    pub no_poll: bool,

    /// Fail on missing parameters instead of prompting
    #[arg(long = "no-parameter-prompts")]
    pub no_parameter_prompts: bool,

    /// Path to the compiled template to submit
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Print the template and exit without submitting
    #[arg(long)]
    pub print_only: bool,

    /// Directory searched when no template path is given
    #[arg(long, value_name = "PATH")]
    pub templates_directory: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Filter by lifecycle status ("none" disables filtering). Can be used
    /// multiple times.
    #[arg(long = "status", value_name = "STATUS")]
    pub statuses: Vec<String>,

    /// Bypass the listing cache for this filter
    #[arg(long)]
    pub force_refresh: bool,

    /// Display attribute to include. Can be used multiple times.
    #[arg(long = "attribute", value_name = "NAME")]
    pub attributes: Vec<String>,

    /// Display every known attribute
    #[arg(long)]
    pub all_attributes: bool,
}

#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Stack name
    pub name: String,

    /// Only show declared outputs
    #[arg(long)]
    pub outputs: bool,

    /// Only show provisioned resources
    #[arg(long)]
    pub resources: bool,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Stack name
    pub name: String,

    /// Keep polling until the stack reaches a terminal state
    #[arg(long)]
    pub poll: bool,

    /// Seconds to sleep between polls
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,

    /// Display attribute to include. Can be used multiple times.
    #[arg(long = "attribute", value_name = "NAME")]
    pub attributes: Vec<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Stack name
    pub name: String,
}

#[derive(Debug, Args)]
pub struct DestroyArgs {
    /// Stack name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}
