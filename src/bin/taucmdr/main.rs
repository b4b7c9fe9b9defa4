//! taucmdr CLI - TAU variant selection and environment synthesis

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use taucmdr::core::{ConfigError, InternalError};
use taucmdr::ops::{ExecError, VerifyError};
use taucmdr::resolver::ResolveError;
use taucmdr::util::diagnostic::{emit, Diagnostic};
use taucmdr::util::GlobalContext;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        report(&e, color);
        let code = match e.downcast_ref::<ExecError>() {
            Some(ExecError::RunFailed { code: Some(code), .. }) => *code,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("taucmdr=debug")
    } else {
        EnvFilter::new("taucmdr=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .without_time()
        .init();

    let ctx = GlobalContext::new()?;

    match &cli.command {
        Commands::Tags(args) => commands::tags::execute(&ctx, &cli, args),
        Commands::Select(args) => commands::select::execute(&ctx, &cli, args),
        Commands::Env(args) => commands::env::execute(&ctx, &cli, args),
        Commands::Compile(args) => commands::compile::execute(&ctx, &cli, args),
        Commands::Run(args) => commands::run::execute(&ctx, &cli, args),
        Commands::Verify => commands::verify::execute(&ctx, &cli),
        Commands::ConfigureArgs => commands::configure_args::execute(&ctx, &cli),
        Commands::Install(args) => commands::install::execute(&ctx, &cli, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, using the structured diagnostic when one is available.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(internal) = err.chain().find_map(|c| c.downcast_ref::<InternalError>()) {
        report_internal(err, internal, color);
        return;
    }

    let Some(diagnostic) = err.chain().find_map(diagnostic_for) else {
        eprintln!("error: {:#}", err);
        return;
    };

    let top = err.to_string();
    if top != diagnostic.message {
        eprintln!("error: {}", top);
    }
    emit(&diagnostic, color);
}

/// Internal errors carry miette codes; render them with miette's handler.
fn report_internal(err: &anyhow::Error, internal: &InternalError, color: bool) {
    let _ = miette::set_hook(Box::new(move |_| {
        Box::new(miette::MietteHandlerOpts::new().color(color).build())
    }));

    let top = err.to_string();
    if top != internal.to_string() {
        eprintln!("error: {}", top);
    }
    eprintln!("{:?}", miette::Report::new(internal.clone()));
}

fn diagnostic_for(cause: &(dyn std::error::Error + 'static)) -> Option<Diagnostic> {
    if let Some(e) = cause.downcast_ref::<ResolveError>() {
        return Some(e.to_diagnostic());
    }
    if let Some(e) = cause.downcast_ref::<VerifyError>() {
        return Some(e.to_diagnostic());
    }
    if let Some(e) = cause.downcast_ref::<ExecError>() {
        return Some(e.to_diagnostic());
    }
    cause.downcast_ref::<ConfigError>().map(ConfigError::to_diagnostic)
}
