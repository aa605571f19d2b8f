//! Testes de integração para a CLI do docstore.

use std::process::Command;

/// Binário compilado do docstore.
fn docstore_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_docstore"))
}

#[test]
fn test_version_command() {
    let output = docstore_bin()
        .arg("version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("docstore"));
}

#[test]
fn test_help_command() {
    let output = docstore_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("init"));
    assert!(stdout.contains("parse"));
    assert!(stdout.contains("inspect"));
    assert!(stdout.contains("replay"));
}

#[test]
fn test_parse_prints_hash_and_ast() {
    let output = docstore_bin()
        .arg("parse")
        .arg("query { hello }")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ec2e01311ab3b02f3d8c8c712f9e579356d332cd007ac4c1ea5df727f482f05f"));
    assert!(stdout.contains("\"OperationDefinition\""));
}

#[test]
fn test_parse_rejects_invalid_query() {
    let output = docstore_bin()
        .arg("parse")
        .arg("query {")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}

#[test]
fn test_inspect_reports_reference_size() {
    let output = docstore_bin()
        .arg("inspect")
        .arg("query { hello }")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("apollo:ec2e01311ab3b02f3d8c8c712f9e579356d332cd007ac4c1ea5df727f482f05f"));
    assert!(stdout.contains("total size: 508 bytes"));
}

#[test]
fn test_init_creates_config() {
    use std::fs;
    use tempfile::TempDir;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("docstore.toml");

    let output = docstore_bin()
        .arg("init")
        .arg("--path")
        .arg(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "init command failed");
    assert!(config_path.exists(), "Config file was not created");

    // Verifica conteúdo básico
    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[general]"));
    assert!(content.contains("[document_store]"));
}

#[test]
fn test_replay_counts_hits() {
    use std::fs;
    use tempfile::TempDir;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("queries.graphql");
    fs::write(&input, "{ a }\n{ b }\n\n{ a }\nquery {\n").expect("Failed to write queries");

    let output = docstore_bin()
        .arg("--config")
        .arg(temp_dir.path().join("missing.toml"))
        .arg("replay")
        .arg(&input)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mode:       embedded"));
    assert!(stdout.contains("hits:       1"));
    assert!(stdout.contains("misses:     3"));
    assert!(stdout.contains("failures:   1"));
}

#[test]
fn test_replay_without_cache() {
    use std::fs;
    use tempfile::TempDir;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("queries.graphql");
    fs::write(&input, "{ a }\n{ a }\n").expect("Failed to write queries");

    let output = docstore_bin()
        .arg("replay")
        .arg(&input)
        .arg("--no-cache")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mode:       disabled"));
    assert!(stdout.contains("bypassed:   2"));
}

#[test]
fn test_invalid_config_is_fatal() {
    use std::fs;
    use tempfile::TempDir;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("docstore.toml");
    // Modo desconhecido deve falhar antes de executar o comando
    fs::write(&config_path, "[document_store]\nmode = \"sometimes\"\n").expect("Failed to write");

    let output = docstore_bin()
        .arg("--config")
        .arg(&config_path)
        .arg("version")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}

#[test]
fn test_invalid_command() {
    let output = docstore_bin()
        .arg("invalid-command-that-does-not-exist")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}

#[test]
fn test_quiet_flag() {
    let output = docstore_bin()
        .arg("-q")
        .arg("version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
}
