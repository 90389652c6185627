use std::fs;
use std::path::PathBuf;

use dbafs::config::DbafsConfig;
use dbafs::tooling::cli::{CliContext, Commands};
use tempfile::TempDir;

fn context(temp: &TempDir) -> CliContext {
    let mut config = DbafsConfig::default();
    config.storage.store_path = PathBuf::from(".dbafs-test/store");
    CliContext::with_config(temp.path().to_path_buf(), config).unwrap()
}

#[test]
fn scan_json_contract_has_required_fields() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("files/img")).unwrap();
    fs::write(temp.path().join("files/img/logo.png"), b"png").unwrap();
    let cli = context(&temp);

    let output = cli
        .execute(&Commands::Scan {
            prefix: None,
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.get("prefix").and_then(|v| v.as_str()), Some("files"));
    for key in ["added", "updated", "removed", "reparented"] {
        assert!(parsed.get(key).and_then(|v| v.as_array()).is_some(), "{}", key);
    }
}

#[test]
fn ls_json_contract_has_record_fields() {
    let temp = TempDir::new().unwrap();
    let cli = context(&temp);
    cli.execute(&Commands::Mkdir {
        path: "files/docs".to_string(),
    })
    .unwrap();

    let output = cli
        .execute(&Commands::Ls {
            prefix: Some("files".to_string()),
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let record = &parsed.as_array().unwrap()[0];
    for key in [
        "id", "parent_id", "path", "name", "kind", "extension", "hash", "size", "tstamp",
        "version",
    ] {
        assert!(record.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(record["name"], "docs");
}

#[test]
fn cp_rm_and_hash_commands() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("files")).unwrap();
    fs::write(temp.path().join("files/a.txt"), b"a").unwrap();
    let cli = context(&temp);

    cli.execute(&Commands::Cp {
        from: "files/a.txt".to_string(),
        to: "files/b.txt".to_string(),
    })
    .unwrap();
    let hash_a = cli
        .execute(&Commands::Hash {
            path: "files/a.txt".to_string(),
        })
        .unwrap();
    let hash_b = cli
        .execute(&Commands::Hash {
            path: "files/b.txt".to_string(),
        })
        .unwrap();
    assert_eq!(
        hash_a.split_whitespace().next(),
        hash_b.split_whitespace().next()
    );

    cli.execute(&Commands::Rm {
        path: "files/a.txt".to_string(),
    })
    .unwrap();
    assert!(!temp.path().join("files/a.txt").exists());
    assert!(cli
        .execute(&Commands::Rm {
            path: "files/a.txt".to_string(),
        })
        .is_err());
}

#[test]
fn protect_commands_toggle_marker() {
    let temp = TempDir::new().unwrap();
    let cli = context(&temp);
    cli.execute(&Commands::Mkdir {
        path: "files/secure".to_string(),
    })
    .unwrap();

    cli.execute(&Commands::Protect {
        path: "files/secure".to_string(),
    })
    .unwrap();
    assert!(temp.path().join("files/secure/.htaccess").is_file());

    cli.execute(&Commands::Unprotect {
        path: "files/secure".to_string(),
    })
    .unwrap();
    assert!(!temp.path().join("files/secure/.htaccess").exists());
}

#[test]
fn config_command_renders_toml() {
    let temp = TempDir::new().unwrap();
    let cli = context(&temp);
    let output = cli.execute(&Commands::Config).unwrap();
    let parsed: toml::Value = toml::from_str(&output).unwrap();
    assert_eq!(
        parsed["files"]["upload_path"].as_str(),
        Some("files")
    );
}
