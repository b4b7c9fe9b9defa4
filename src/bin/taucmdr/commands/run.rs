//! `taucmdr run` command

use anyhow::Result;

use crate::cli::{Cli, RunArgs};
use taucmdr::ops;
use taucmdr::util::diagnostic::TracingSink;
use taucmdr::util::process::current_env;
use taucmdr::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, cli: &Cli, args: &RunArgs) -> Result<()> {
    let installation = ctx.installation(cli.features.as_deref(), cli.prefix.as_deref())?;
    let inherited = current_env();
    let launcher: Vec<String> = args
        .launcher
        .as_deref()
        .map(|l| l.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();

    if args.dry_run {
        let spec = ops::run_command(&installation, &launcher, &args.app, &inherited, &TracingSink)?;
        println!("{}", spec);
        return Ok(());
    }

    ops::run(&installation, &launcher, &args.app, &inherited, &TracingSink)
}
