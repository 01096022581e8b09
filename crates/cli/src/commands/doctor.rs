//! Doctor command - validate configuration and show status

use anyhow::Result;
use listing_guard_adapters::store::SqliteListingStore;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::DoctorArgs;
use crate::commands::rules::load_rulebook;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    rulebook: CheckResult,
    images: CheckResult,
    store: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        rulebook: CheckResult::error("Not checked"),
        images: CheckResult::error("Not checked"),
        store: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.rulebook = check_rulebook(config).await;
        report.images = check_images(config);
        report.store = check_store(&config.general.store_db_path).await;
    }

    // Determine overall status
    let checks = [
        &report.config,
        &report.rulebook,
        &report.images,
        &report.store,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

async fn check_rulebook(config: &AppConfig) -> CheckResult {
    let source = match &config.general.rulebook_path {
        Some(path) => path.display().to_string(),
        None => "builtin".to_string(),
    };

    match load_rulebook(config).await {
        Ok(rulebook) => CheckResult::ok(format!(
            "Rulebook: {} ({} tag rules, {} blocked terms)",
            source,
            rulebook.tagging.rules.len(),
            rulebook.moderation.blocked_terms.len()
        ))
        .with_details(serde_json::json!({
            "source": source,
            "fingerprint": rulebook.fingerprint(),
            "tag_rules": rulebook.tagging.rules.len(),
            "keyword_entries": rulebook.keywords.entries().len(),
        })),
        Err(e) => CheckResult::error(format!("{:#}", e)),
    }
}

fn check_images(config: &AppConfig) -> CheckResult {
    let limits = &config.images;

    if limits.min_bytes > limits.max_bytes {
        return CheckResult::error(format!(
            "min_bytes ({}) exceeds max_bytes ({})",
            limits.min_bytes, limits.max_bytes
        ));
    }
    if limits.min_dimension > limits.max_dimension {
        return CheckResult::error(format!(
            "min_dimension ({}) exceeds max_dimension ({})",
            limits.min_dimension, limits.max_dimension
        ));
    }
    if limits.allowed_extensions.is_empty() {
        return CheckResult::warn("No allowed extensions configured; every upload is rejected");
    }

    CheckResult::ok(format!(
        "{}-{} bytes, {}-{} px, types: {}",
        limits.min_bytes,
        limits.max_bytes,
        limits.min_dimension,
        limits.max_dimension,
        limits.allowed_extensions.join(", ")
    ))
}

async fn check_store(path: &Path) -> CheckResult {
    if !path.exists() {
        return CheckResult::warn(format!(
            "Listing store does not exist yet: {} (created on first import)",
            path.display()
        ));
    }

    let store = match SqliteListingStore::new(path).await {
        Ok(s) => s,
        Err(e) => return CheckResult::error(format!("Failed to open listing store: {}", e)),
    };

    match store.count().await {
        Ok(count) => CheckResult::ok(format!("{} listings in {}", count, path.display()))
            .with_details(serde_json::json!({ "count": count })),
        Err(e) => CheckResult::error(format!("Failed to query listing store: {}", e)),
    }
}

fn print_report(report: &DoctorReport) {
    println!("listing-guard Doctor Report");
    println!("===========================");
    println!();

    print_check("Config", &report.config);
    print_check("Rulebook", &report.rulebook);
    print_check("Images", &report.images);
    print_check("Store", &report.store);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}
