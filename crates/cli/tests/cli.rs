use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn listing_guard(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("listing-guard");
    cmd.current_dir(dir.path());
    cmd
}

/// PNG of pseudo-random pixels so it does not compress below the size floor
fn write_noisy_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        let mut v = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503);
        v ^= v >> 13;
        v = v.wrapping_mul(0x5bd1_e995);
        v ^= v >> 15;
        let [r, g, b, _] = v.to_le_bytes();
        image::Rgb([r, g, b])
    });
    img.save(path).expect("write png");
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    listing_guard(&dir)
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("store_db_path"));
    assert!(content.contains("max_dimension = 4096"));

    listing_guard(&dir)
        .args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_show_reflects_env_overrides() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("config.toml"),
        "[general]\nstore_db_path = \"./data/listings.sqlite\"\n",
    )
    .expect("write config");

    let output = listing_guard(&dir)
        .env("LISTING_GUARD__IMAGES__MAX_DIMENSION", "2048")
        .args(["config", "show", "--json"])
        .output()
        .expect("run config show");
    assert!(output.status.success());

    let config = stdout_json(&output);
    assert_eq!(config["general"]["store_db_path"], "./data/listings.sqlite");
    assert_eq!(config["images"]["max_dimension"], 2048);
    assert_eq!(config["images"]["min_dimension"], 100);
    assert_eq!(config["migration"]["page_size"], 100);

    listing_guard(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[images]"))
        .stdout(predicate::str::contains("max_dimension = 4096"));
}

#[test]
fn configured_log_level_applies_without_flag() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("config.toml"),
        "[general]\nlog_level = \"debug\"\n",
    )
    .expect("write config");

    listing_guard(&dir)
        .env_remove("RUST_LOG")
        .args(["moderate", "--title", "Quiet street"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Moderation complete"));

    listing_guard(&dir)
        .env_remove("RUST_LOG")
        .args(["--log-level", "warn", "moderate", "--title", "Quiet street"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Moderation complete").not());
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().expect("temp dir");

    listing_guard(&dir)
        .args(["--config", "nope.toml", "moderate", "--title", "Quiet street"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn moderate_reports_each_verdict() {
    let dir = TempDir::new().expect("temp dir");

    let output = listing_guard(&dir)
        .args(["moderate", "--title", "Sunny bungalow near the park", "--json"])
        .output()
        .expect("run moderate");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["status"], "approved");

    let output = listing_guard(&dir)
        .args([
            "moderate",
            "--title",
            "Sunny bungalow near the park",
            "--description",
            "This bullshit market",
            "--json",
        ])
        .output()
        .expect("run moderate");
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["status"], "blocked");
    let reason = value["reason"].as_str().expect("reason");
    assert!(reason.starts_with("Description: "));
    assert!(!reason.contains("bullshit"));

    listing_guard(&dir)
        .args([
            "moderate",
            "--title",
            "See photos at www.example.com today",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Verdict: flagged_for_review"))
        .stdout(predicate::str::contains(
            "Filtered: See photos at [link removed] today",
        ));
}

#[test]
fn tags_outputs_ordered_json() {
    let dir = TempDir::new().expect("temp dir");

    let output = listing_guard(&dir)
        .args([
            "tags",
            "--title",
            "Cozy updated starter home",
            "--city",
            "Orlando",
            "--price",
            "250000",
            "--bedrooms",
            "3",
            "--json",
        ])
        .output()
        .expect("run tags");
    assert!(output.status.success());

    let tags: Vec<String> = serde_json::from_slice(&output.stdout).expect("tag list");
    assert_eq!(
        tags,
        ["#Orlando", "#Under300K", "#StarterHome", "#Renovation"]
    );
}

#[test]
fn tags_for_lease_listing() {
    let dir = TempDir::new().expect("temp dir");

    listing_guard(&dir)
        .args([
            "tags",
            "--title",
            "Heated pool",
            "--price",
            "2400",
            "--listing-type",
            "Rental",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("#ForLease"))
        .stdout(predicate::str::contains("#Pool"))
        .stdout(predicate::str::contains("#Under100K").not());
}

#[test]
fn search_resolves_query_and_lists_keywords() {
    let dir = TempDir::new().expect("temp dir");

    listing_guard(&dir)
        .args(["search", "fixer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#FixerUpper"));

    let output = listing_guard(&dir)
        .args(["search", "--all", "--json"])
        .output()
        .expect("run search");
    assert!(output.status.success());
    let keywords: Vec<String> = serde_json::from_slice(&output.stdout).expect("keywords");
    let mut sorted = keywords.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(keywords, sorted);
    assert!(keywords.iter().any(|k| k == "waterfront"));

    listing_guard(&dir).args(["search"]).assert().failure();
}

#[test]
fn check_image_accepts_valid_png() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("front.png");
    write_noisy_png(&path, 200, 200);

    let output = listing_guard(&dir)
        .args(["check-image", "--json", "--file"])
        .arg(&path)
        .output()
        .expect("run check-image");
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["valid"], true);
    assert_eq!(value["extension"], "png");
    assert_eq!(value["dimensions"]["width"], 200);
}

#[test]
fn check_image_rejections_exit_nonzero() {
    let dir = TempDir::new().expect("temp dir");
    let tiny = dir.path().join("tiny.png");
    write_noisy_png(&tiny, 50, 50);

    listing_guard(&dir)
        .args(["check-image", "--file"])
        .arg(&tiny)
        .assert()
        .failure()
        .stdout(predicate::str::contains("outside the allowed range"));

    let front = dir.path().join("front.png");
    write_noisy_png(&front, 200, 200);
    listing_guard(&dir)
        .args(["check-image", "--name", "front.gif", "--file"])
        .arg(&front)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unsupported file type 'gif'"));

    let garbage = dir.path().join("broken.jpg");
    fs::write(&garbage, vec![0u8; 2048]).expect("write garbage");
    listing_guard(&dir)
        .args(["check-image", "--file"])
        .arg(&garbage)
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid image"));
}

#[test]
fn env_overrides_image_limits() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("front.png");
    write_noisy_png(&path, 200, 200);

    listing_guard(&dir)
        .env("LISTING_GUARD__IMAGES__MAX_DIMENSION", "150")
        .args(["check-image", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("100-150 pixels"));
}

#[test]
fn screen_reports_full_outcome() {
    let dir = TempDir::new().expect("temp dir");
    write_noisy_png(&dir.path().join("front.png"), 200, 200);
    write_noisy_png(&dir.path().join("thumb.png"), 50, 50);

    let submission = dir.path().join("submission.json");
    fs::write(
        &submission,
        r#"{
  "title": "Cozy starter home, DM me on telegram",
  "city": "Orlando",
  "price": 250000,
  "bedrooms": 3,
  "images": [{"path": "front.png"}]
}"#,
    )
    .expect("write submission");

    let output = listing_guard(&dir)
        .args(["screen", "--json", "--file"])
        .arg(&submission)
        .output()
        .expect("run screen");
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["verdict"]["status"], "flagged_for_review");
    assert_eq!(value["tags"][0], "#Orlando");
    assert!(
        value["tags"]
            .as_array()
            .expect("tags")
            .iter()
            .any(|t| t == "#StarterHome")
    );
    assert_eq!(value["image_errors"].as_array().expect("errors").len(), 0);

    fs::write(
        &submission,
        r#"{"title": "Quiet street", "images": [{"path": "front.png"}, {"path": "thumb.png"}]}"#,
    )
    .expect("write submission");

    listing_guard(&dir)
        .args(["screen", "--file"])
        .arg(&submission)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Image 1 (thumb.png)"))
        .stdout(predicate::str::contains("Not publishable"));
}

#[test]
fn import_then_migrate() {
    let dir = TempDir::new().expect("temp dir");
    let db = dir.path().join("listings.sqlite");
    let listings = dir.path().join("listings.jsonl");
    fs::write(
        &listings,
        concat!(
            r#"{"id": "a", "title": "Heated pool"}"#,
            "\n\n",
            r##"{"id": "b", "title": "Lake house with dock", "tags": ["#Waterfront", "#Vacation"], "features": ["paid_open_house"]}"##,
            "\n",
        ),
    )
    .expect("write listings");

    listing_guard(&dir)
        .args(["import", "--file"])
        .arg(&listings)
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 listings"));

    let retag = |dry_run: bool| {
        let mut cmd = listing_guard(&dir);
        cmd.args(["migrate", "retag", "--json", "--db"]).arg(&db);
        if dry_run {
            cmd.arg("--dry-run");
        }
        let output = cmd.output().expect("run migrate");
        assert!(output.status.success());
        stdout_json(&output)
    };

    let report = retag(true);
    assert_eq!(report["dry_run"], true);
    assert_eq!(report["scanned"], 2);
    assert_eq!(report["updated"], 1);
    assert_eq!(report["skipped"], 1);

    // Dry run wrote nothing, so the real run still has work
    let report = retag(false);
    assert_eq!(report["updated"], 1);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["job"]["kind"], "regenerate_tags");
    assert_eq!(report["rulebook_hash"].as_str().expect("hash").len(), 64);

    let report = retag(false);
    assert_eq!(report["updated"], 0);
    assert_eq!(report["skipped"], 2);

    let output = listing_guard(&dir)
        .args([
            "migrate",
            "patch",
            "--feature",
            "paid_open_house",
            "--tag",
            "#OpenHouse",
            "--json",
            "--db",
        ])
        .arg(&db)
        .output()
        .expect("run patch");
    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["matched"], 1);
    assert_eq!(report["updated"], 1);
    assert_eq!(report["job"]["tag"], "#OpenHouse");

    listing_guard(&dir)
        .args(["migrate", "patch", "--feature", "x", "--tag", "OpenHouse", "--db"])
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid tag"));
}

#[test]
fn import_rejects_malformed_line() {
    let dir = TempDir::new().expect("temp dir");
    let listings = dir.path().join("listings.jsonl");
    fs::write(&listings, "{\"id\": \"a\", \"title\": \"ok\"}\n{not json}\n").expect("write");

    listing_guard(&dir)
        .args(["import", "--file"])
        .arg(&listings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));

    assert!(!dir.path().join("listings.sqlite").exists());
}

#[test]
fn rules_export_validates_and_matches_fingerprint() {
    let dir = TempDir::new().expect("temp dir");

    let output = listing_guard(&dir)
        .args(["rules", "export"])
        .output()
        .expect("run export");
    assert!(output.status.success());
    let rules_path = dir.path().join("rules.toml");
    fs::write(&rules_path, &output.stdout).expect("write rules");

    let output = listing_guard(&dir)
        .args(["rules", "fingerprint"])
        .output()
        .expect("run fingerprint");
    assert!(output.status.success());
    let builtin = String::from_utf8(output.stdout).expect("utf8");
    let builtin = builtin.trim();

    listing_guard(&dir)
        .args(["rules", "validate", "--path"])
        .arg(&rules_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(builtin));
}

#[test]
fn rules_validate_fails_on_bad_table() {
    let dir = TempDir::new().expect("temp dir");
    let rules_path = dir.path().join("rules.toml");
    fs::write(
        &rules_path,
        "[[tagging.rules]]\ntag = \"NoHash\"\ntrigger = { kind = \"phrases\", any = [\"x\"] }\n",
    )
    .expect("write rules");

    listing_guard(&dir)
        .args(["rules", "validate", "--path"])
        .arg(&rules_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation failed"));
}

#[test]
fn configured_rulebook_changes_moderation() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("rules.toml"),
        "[moderation]\nblocked_terms = [\"darn\"]\n",
    )
    .expect("write rules");
    fs::write(
        dir.path().join("config.toml"),
        "[general]\nrulebook_path = \"rules.toml\"\n",
    )
    .expect("write config");

    let output = listing_guard(&dir)
        .args(["moderate", "--title", "Darn nice porch", "--json"])
        .output()
        .expect("run moderate");
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["status"], "blocked");
}

#[test]
fn doctor_reports_json() {
    let dir = TempDir::new().expect("temp dir");

    let output = listing_guard(&dir)
        .args(["doctor", "--json"])
        .output()
        .expect("run doctor");
    assert!(output.status.success());

    let value = stdout_json(&output);
    assert_eq!(value["config"]["status"], "ok");
    assert_eq!(value["rulebook"]["status"], "ok");
    assert_eq!(value["rulebook"]["details"]["source"], "builtin");
    assert_eq!(value["store"]["status"], "warn");
    assert_eq!(value["overall"], "warn");
}
