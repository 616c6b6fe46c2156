// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use assert_cmd::Command;
use predicates::prelude::*;

fn mint() -> Command {
    let mut cmd = Command::cargo_bin("mint").unwrap();
    // Keep the user's real settings and keys out of the picture
    cmd.current_dir(std::env::temp_dir())
        .env("HOME", std::env::temp_dir().join("mint-test-no-home"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("GOOGLE_API_KEY")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_subcommands() {
    mint()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("providers"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn providers_lists_every_backend() {
    mint()
        .arg("providers")
        .assert()
        .success()
        .stdout(predicate::str::contains("OPENAI_API_KEY"))
        .stdout(predicate::str::contains("claude-sonnet-4-5"))
        .stdout(predicate::str::contains("gemini-2.5-flash"));
}

#[test]
fn out_of_range_temperature_is_rejected() {
    mint()
        .args(["generate", "--temp", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("temperature must be between 0.0 and 1.0"));
}

#[test]
fn unknown_provider_is_rejected() {
    mint()
        .args(["generate", "--provider", "ollama"])
        .assert()
        .failure();
}

#[test]
fn generate_without_key_names_the_variable() {
    mint()
        .args(["generate", "--provider", "anthropic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn config_show_prints_defaults() {
    mint()
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider:           openai"))
        .stdout(predicate::str::contains("Temperature:        0.25"));
}

#[test]
fn config_set_persists_to_home() {
    let home = tempfile::tempdir().unwrap();

    Command::cargo_bin("mint")
        .unwrap()
        .current_dir(home.path())
        .env("HOME", home.path())
        .args(["config", "--set-provider", "google", "--set-options", "3"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(home.path().join(".mintrc")).unwrap();
    assert!(saved.contains("provider: google"));
    assert!(saved.contains("num_options: 3"));
}

#[test]
fn completions_generate_for_bash() {
    mint()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mint"));
}
