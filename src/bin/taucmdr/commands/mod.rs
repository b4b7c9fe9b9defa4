//! Command implementations

pub mod compile;
pub mod completions;
pub mod configure_args;
pub mod env;
pub mod install;
pub mod run;
pub mod select;
pub mod tags;
pub mod verify;

use taucmdr::builder::Environment;

/// Variables in `synthesized` that are new or differ from `inherited`.
pub fn changed_vars(inherited: &Environment, synthesized: &Environment) -> Environment {
    synthesized
        .iter()
        .filter(|(key, value)| inherited.get(*key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

