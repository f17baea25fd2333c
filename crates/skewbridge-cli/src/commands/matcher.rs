//! Definition matching command

use clap::Args;
use skewbridge_core::transform::ModelMatcher;
use skewbridge_store::read_registration;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct MatchArgs {
    /// Definition file of the current model
    pub current: PathBuf,

    /// Definition file of the legacy model
    pub legacy: PathBuf,
}

pub fn execute(args: MatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let current = read_registration(&args.current)?;
    let legacy = read_registration(&args.legacy)?;

    let rules = ModelMatcher::get_rules(&current, &legacy);
    if rules.is_empty() {
        println!("No matching attributes");
        return Ok(());
    }
    for rule in &rules {
        println!("{}", rule);
    }
    println!("{} rule(s)", rules.len());
    Ok(())
}
