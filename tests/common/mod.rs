use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use interview_keeper::config::Config;

/// Configuration writing into `dir` with one known user and no archive
#[allow(dead_code)]
pub fn local_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.transcripts.directory = dir.path().to_path_buf();
    config.archive.enabled = false;
    config
        .auth
        .passwords
        .insert("alice".to_string(), "wonderland".to_string());
    config
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Writes a service-account key file using the test RSA key
#[allow(dead_code)]
pub fn write_service_account(dir: &TempDir, token_uri: &str) -> PathBuf {
    let key = serde_json::json!({
        "type": "service_account",
        "client_email": "uploader@project.iam.gserviceaccount.com",
        "private_key": include_str!("../fixtures/test_rsa_key.pem"),
        "private_key_id": "key-1",
        "token_uri": token_uri,
    });
    let path = dir.path().join("service-account.json");
    fs::write(&path, key.to_string()).expect("failed to write key file");
    path
}
