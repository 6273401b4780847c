//! Version command

use crate::cli::VersionArgs;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    if args.json {
        let info = serde_json::json!({
            "version": version,
            "registry_client": imgdigest_registry::VERSION,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("imgdigest {}", version);
    }

    Ok(())
}
