//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// taucmdr - Select TAU variants and synthesize measurement environments
#[derive(Parser)]
#[command(name = "taucmdr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Feature file (defaults to the nearest taucmdr.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub features: Option<PathBuf>,

    /// TAU installation prefix (overrides `install.prefix`)
    #[arg(long, global = true, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the tags a TAU variant must carry for the configuration
    Tags(TagsArgs),

    /// Select the TAU variant matching the configuration
    Select(SelectArgs),

    /// Print the synthesized compile-time or run-time environment
    Env(EnvArgs),

    /// Compile through TAU with the selected variant
    Compile(CompileArgs),

    /// Launch an application with TAU measurement enabled
    Run(RunArgs),

    /// Check that the TAU installation provides the configuration
    Verify,

    /// Print the TAU configure arguments for the configuration
    ConfigureArgs,

    /// Verify TAU, building it from source when needed
    Install(InstallArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct TagsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SelectArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Show the run-time environment instead of the compile-time one
    #[arg(long)]
    pub run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompileArgs {
    /// Compiler role, e.g. CC, CXX, FC, MPI_CXX
    pub role: String,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Compiler arguments
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Launcher command, e.g. "mpirun -np 4"
    #[arg(long, allow_hyphen_values = true)]
    pub launcher: Option<String>,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Application command
    #[arg(last = true, required = true)]
    pub app: Vec<String>,
}

#[derive(Args)]
pub struct InstallArgs {
    /// TAU source directory (overrides `install.source`)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Rebuild even if the installation verifies
    #[arg(long)]
    pub force: bool,

    /// Number of parallel make jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
