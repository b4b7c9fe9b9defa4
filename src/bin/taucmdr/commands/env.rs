//! `taucmdr env` command
//!
//! Prints only the variables taucmdr adds or changes, as shell `export`
//! lines or JSON.

use anyhow::Result;

use super::changed_vars;
use crate::cli::{Cli, EnvArgs};
use taucmdr::util::diagnostic::TracingSink;
use taucmdr::util::process::current_env;
use taucmdr::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, cli: &Cli, args: &EnvArgs) -> Result<()> {
    let installation = ctx.installation(cli.features.as_deref(), cli.prefix.as_deref())?;
    let inherited = current_env();

    let synth = if args.run {
        installation.run_time_config(&inherited, &TracingSink)
    } else {
        installation.compile_time_config(&inherited, &TracingSink)?
    };
    let changed = changed_vars(&inherited, &synth.env);
    let removed: Vec<&String> = inherited
        .keys()
        .filter(|key| !synth.env.contains_key(*key))
        .collect();

    if args.json {
        let output = serde_json::json!({
            "options": synth.options,
            "set": changed,
            "unset": removed,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for key in removed {
        println!("unset {}", key);
    }
    for (key, value) in &changed {
        println!("export {}={}", key, shell_quote(value));
    }
    if !synth.options.is_empty() {
        println!("# options: {}", synth.options.join(" "));
    }
    Ok(())
}

fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c))
    {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
