//! Parse command: show the normalized form of an image reference

use crate::cli::ParseArgs;
use crate::output;
use anyhow::Result;
use imgdigest_registry::{normalize_registry_address, ImageReference};

pub fn run(args: ParseArgs) -> Result<()> {
    let reference = ImageReference::parse_normalized(&args.name);

    if args.json {
        let value = serde_json::json!({
            "registry": reference.registry,
            "repository": reference.repository,
            "tag": reference.tag,
            "credential_key": normalize_registry_address(&reference.registry),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    output::header(&args.name);
    output::kv("registry", &reference.registry);
    output::kv("repository", &reference.repository);
    output::kv("tag", &reference.tag);
    output::kv(
        "credential key",
        &normalize_registry_address(&reference.registry),
    );

    Ok(())
}
