//! `taucmdr select` command

use anyhow::Result;

use crate::cli::{Cli, SelectArgs};
use taucmdr::resolver::MatchKind;
use taucmdr::util::diagnostic::TracingSink;
use taucmdr::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, cli: &Cli, args: &SelectArgs) -> Result<()> {
    let installation = ctx.installation(cli.features.as_deref(), cli.prefix.as_deref())?;
    let selection = installation.select_variant(&TracingSink)?;

    let extra = match &selection.kind {
        MatchKind::Exact => None,
        MatchKind::Approximate { extra } => Some(extra),
    };

    if args.json {
        let output = serde_json::json!({
            "makefile": selection.variant.path,
            "tags": selection.variant.tags,
            "exact": extra.is_none(),
            "extra": extra,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", selection.variant.path.display());
    Ok(())
}
