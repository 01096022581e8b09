//! Check-image command - validate one image file against the upload limits

use anyhow::{Context, Result};
use listing_guard_domain::ImageValidator;
use std::path::PathBuf;

use crate::args::CheckImageArgs;
use crate::config::AppConfig;

pub async fn execute(args: CheckImageArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let validator = ImageValidator::new(config.images);

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read image: {}", args.file.display()))?;

    let name = args.name.or_else(|| {
        args.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    });

    let result = validator.validate(&bytes, name.as_deref());

    if args.json {
        let output = match &result {
            Ok(info) => serde_json::json!({
                "valid": true,
                "size": info.size,
                "extension": info.extension,
                "dimensions": info.dimensions.map(|(w, h)| serde_json::json!({
                    "width": w,
                    "height": h,
                })),
            }),
            Err(e) => serde_json::json!({
                "valid": false,
                "reason": e.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &result {
            Ok(info) => {
                let dimensions = info
                    .dimensions
                    .map(|(w, h)| format!("{}x{}", w, h))
                    .unwrap_or_else(|| "unknown dimensions".to_string());
                println!("✓ Image OK: {} bytes, {}", info.size, dimensions);
            }
            Err(e) => println!("✗ Image rejected: {}", e),
        }
    }

    if let Err(e) = result {
        tracing::debug!(file = %args.file.display(), error = %e, "Image rejected");
        std::process::exit(1);
    }

    Ok(())
}
