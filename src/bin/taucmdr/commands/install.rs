//! `taucmdr install` command

use anyhow::Result;

use crate::cli::{Cli, InstallArgs};
use taucmdr::ops::{self, InstallOutcome, MakeBuilder};
use taucmdr::util::diagnostic::TracingSink;
use taucmdr::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, cli: &Cli, args: &InstallArgs) -> Result<()> {
    let installation = ctx.installation(cli.features.as_deref(), cli.prefix.as_deref())?;
    let install_config = &ctx.config().install;

    let source = args
        .source
        .as_ref()
        .or(install_config.source.as_ref())
        .map(|s| ctx.cwd().join(s));
    let builder = MakeBuilder {
        jobs: args.jobs.or(install_config.jobs),
    };

    let outcome = ops::install(
        &installation,
        source.as_deref(),
        args.force,
        &builder,
        &TracingSink,
    )?;

    match &outcome {
        InstallOutcome::AlreadyInstalled(_) => println!(
            "TAU at '{}' is already installed",
            installation.prefix().display()
        ),
        InstallOutcome::Built(_) => {
            println!("Installed TAU at '{}'", installation.prefix().display())
        }
    }
    println!("  variant: {}", outcome.selection());
    Ok(())
}
