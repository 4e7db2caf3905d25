use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

/// Runs the vitrine binary in an isolated temp directory, so `.vitrine/`
/// lands there and no ambient token or root leaks in.
pub struct VitrineTest {
    pub temp_dir: TempDir,
}

impl VitrineTest {
    pub fn new() -> Self {
        VitrineTest {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_vitrine"))
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("VITRINE_ROOT")
            .env_remove("VITRINE_API_TOKEN")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute vitrine command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).expect("Command did not print JSON")
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join(".vitrine").join("config.yaml")
    }

    pub fn write_config(&self, content: &str) {
        let path = self.config_path();
        fs::create_dir_all(path.parent().expect("config path has a parent"))
            .expect("Failed to create .vitrine directory");
        fs::write(path, content).expect("Failed to write config file");
    }
}
