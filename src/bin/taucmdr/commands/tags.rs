//! `taucmdr tags` command

use anyhow::Result;

use crate::cli::{Cli, TagsArgs};
use taucmdr::resolver::{derive_tags, incompatible_tags};
use taucmdr::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, cli: &Cli, args: &TagsArgs) -> Result<()> {
    let config = ctx.load_features(cli.features.as_deref())?;
    let tags = derive_tags(&config);
    let incompatible = incompatible_tags(&config);

    if args.json {
        let output = serde_json::json!({
            "tags": tags,
            "incompatible": incompatible,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("tags: {}", tags);
    if !incompatible.is_empty() {
        println!("incompatible: {}", incompatible);
    }
    Ok(())
}
