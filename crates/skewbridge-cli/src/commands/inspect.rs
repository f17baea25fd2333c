//! Definition inspection command

use clap::Args;
use skewbridge_core::ModelVersion;
use skewbridge_store::LegacyDefinitionLoader;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Directory holding `.dmr` definition files
    pub dir: PathBuf,

    /// Subsystem name; ignored with --core
    #[arg(required_unless_present = "core")]
    pub name: Option<String>,

    /// Model version, e.g. 1.4 or 1.4.0
    #[arg(long)]
    pub version: String,

    /// Inspect the core model instead of a subsystem
    #[arg(long)]
    pub core: bool,
}

pub fn execute(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let version: ModelVersion = args.version.parse()?;
    let loader = LegacyDefinitionLoader::new(&args.dir);

    let definition = match (&args.name, args.core) {
        (_, true) => loader.load_core(version)?,
        (Some(name), false) => loader.load_subsystem(name, version)?,
        (None, false) => return Err("Must specify a subsystem name or --core".into()),
    };
    let Some(definition) = definition else {
        return Err(format!(
            "no definition for {} {} in {}",
            args.name.as_deref().unwrap_or("core model"),
            version,
            args.dir.display()
        )
        .into());
    };

    println!("Definition: {} {}", definition.name, definition.version);
    println!("  File: {}", definition.path.display());
    println!("  Digest: {}", definition.digest);
    println!(
        "  Root attributes: {}",
        definition.registration.attribute_names().len()
    );
    println!(
        "  Child types: {}",
        definition.registration.child_addresses().len()
    );
    println!("  Total attributes: {}", definition.attribute_count());
    Ok(())
}
