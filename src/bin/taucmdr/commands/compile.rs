//! `taucmdr compile` command

use anyhow::{Context, Result};

use crate::cli::{Cli, CompileArgs};
use taucmdr::core::CompilerRole;
use taucmdr::ops;
use taucmdr::util::diagnostic::TracingSink;
use taucmdr::util::process::current_env;
use taucmdr::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, cli: &Cli, args: &CompileArgs) -> Result<()> {
    let role: CompilerRole = args
        .role
        .parse()
        .with_context(|| format!("invalid compiler role `{}`", args.role))?;
    let installation = ctx.installation(cli.features.as_deref(), cli.prefix.as_deref())?;
    let inherited = current_env();

    if args.dry_run {
        let spec = ops::compile_command(&installation, role, &args.args, &inherited, &TracingSink)?;
        println!("{}", spec);
        return Ok(());
    }

    ops::compile(&installation, role, &args.args, &inherited, &TracingSink)
}
