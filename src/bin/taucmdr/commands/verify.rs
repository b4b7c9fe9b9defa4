//! `taucmdr verify` command

use anyhow::Result;

use crate::cli::Cli;
use taucmdr::ops;
use taucmdr::util::diagnostic::TracingSink;
use taucmdr::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, cli: &Cli) -> Result<()> {
    let installation = ctx.installation(cli.features.as_deref(), cli.prefix.as_deref())?;
    let selection = ops::verify(&installation, &TracingSink)?;

    println!(
        "TAU installation at '{}' is valid",
        installation.prefix().display()
    );
    println!("  variant: {}", selection);
    Ok(())
}
