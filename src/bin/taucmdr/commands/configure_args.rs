//! `taucmdr configure-args` command

use anyhow::Result;

use crate::cli::Cli;
use taucmdr::builder::configure_args;
use taucmdr::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, cli: &Cli) -> Result<()> {
    let config = ctx.load_features(cli.features.as_deref())?;
    let prefix = ctx.install_prefix(cli.prefix.as_deref())?;

    for arg in configure_args(&config, &prefix)? {
        println!("{}", arg);
    }
    Ok(())
}
