//! Integration tests for anka-cache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn anka_cache() -> Command {
        cargo_bin_cmd!("anka-cache")
    }

    fn base_args(config: &std::path::Path) -> Vec<String> {
        vec![
            "--anka-command".into(),
            "anka run build-vm".into(),
            "--s3-prefix".into(),
            "caches/project".into(),
            "--s3-bucket".into(),
            "anka-cache-integration-test-no-such-bucket".into(),
            "--config-file".into(),
            config.display().to_string(),
        ]
    }

    #[test]
    fn help_displays() {
        anka_cache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Buildkite build caches"));
    }

    #[test]
    fn version_displays() {
        anka_cache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("anka-cache"));
    }

    #[test]
    fn missing_required_flag_fails() {
        anka_cache()
            .args(["restore-caches", "--s3-bucket", "bucket"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("required"));
    }

    #[test]
    fn unknown_command_rejected() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("cache.yml");
        fs::write(&config, "- keys: [gems-v1]\n  paths: [vendor]\n").unwrap();

        let mut args = base_args(&config);
        args.push("purge-caches".into());

        anka_cache()
            .args(args)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("invalid value"));
    }

    #[test]
    fn non_array_config_rejected() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("cache.yml");
        fs::write(&config, "keys: [gems-v1]\npaths: [vendor]\n").unwrap();

        let mut args = base_args(&config);
        args.push("restore-caches".into());

        anka_cache()
            .args(args)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains(
                "Config must be an array of cache objects",
            ));
    }

    #[test]
    fn extra_config_key_rejected() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("cache.yml");
        fs::write(
            &config,
            "- keys: [gems-v1]\n  paths: [vendor]\n  ttl: 7\n",
        )
        .unwrap();

        let mut args = base_args(&config);
        args.push("save-caches".into());

        anka_cache()
            .args(args)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains(
                "Cache must only have \"keys\" and \"paths\" keys",
            ));
    }

    #[test]
    fn missing_config_file_fails() {
        let mut args = base_args(std::path::Path::new("no-such-config.yml"));
        args.push("restore-caches".into());

        anka_cache()
            .args(args)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("no-such-config.yml"));
    }

    #[test]
    fn restore_with_no_matches_succeeds() {
        // The bucket does not exist, so every listing degrades to a miss
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("cache.yml");
        fs::write(&config, "- keys: [gems-v1]\n  paths: [vendor]\n").unwrap();

        let mut args = base_args(&config);
        args.push("restore-caches".into());

        anka_cache()
            .args(args)
            .current_dir(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("No caches to restore for gems-v1"));
    }
}
