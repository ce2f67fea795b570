use std::process::Command;

fn config_path() -> String {
    format!("{}/config/localhost.yaml", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn cli_mode_with_config_and_dry_run_prints_statement() {
    let binary_path = env!("CARGO_BIN_EXE_siwe-handshake-cli");

    let output = Command::new(binary_path)
        .arg("--config")
        .arg(config_path())
        .arg("--dry-run")
        .arg("--log-level")
        .arg("error")
        .env_remove("SIWE_AGENT__PRIVATE_KEY")
        .output()
        .expect("Failed to start siwe-handshake-cli binary");

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(
        "127.0.0.1:8000 wants you to sign in with your Ethereum account:\n\
         0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266\n"
    ));
    assert!(stdout.contains("\nChain ID: 1\n"));
    assert!(stdout.contains("\nExpiration Time: "));
}

#[test]
fn cli_mode_with_malformed_signing_key_fails() {
    let binary_path = env!("CARGO_BIN_EXE_siwe-handshake-cli");

    let output = Command::new(binary_path)
        .arg("--config")
        .arg(config_path())
        .arg("--dry-run")
        .env("SIWE_AGENT__PRIVATE_KEY", "0x1234")
        .output()
        .expect("Failed to start siwe-handshake-cli binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("load signing key"), "stderr: {stderr}");
}

#[test]
fn cli_mode_requires_config() {
    let binary_path = env!("CARGO_BIN_EXE_siwe-handshake-cli");

    let output = Command::new(binary_path)
        .arg("--dry-run")
        .output()
        .expect("Failed to start siwe-handshake-cli binary");

    assert!(!output.status.success());
}
