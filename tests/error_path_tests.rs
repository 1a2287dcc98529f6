//! Exit-code and error-path tests
//!
//! Every fatal condition carries its own exit code; operators branch on
//! them, so the integers are part of the external contract.

mod common;

use common::TestWorkspace;
use predicates::prelude::*;

#[test]
fn test_missing_config_file_exits_100() {
    let workspace = TestWorkspace::new();

    workspace
        .packager_cmd()
        .args(["create", "-c", "no-such-config.yaml"])
        .assert()
        .code(100)
        .stderr(predicate::str::contains("Cannot access config file"));
}

#[test]
fn test_invalid_yaml_exits_101() {
    let workspace = TestWorkspace::new();
    workspace.write_config("core_modules: [unclosed");

    workspace
        .packager_cmd()
        .args(["create", "-c", "config.yaml"])
        .assert()
        .code(101)
        .stderr(predicate::str::contains("Invalid yaml file"));
}

#[test]
fn test_missing_agent_config_exits_110_before_any_install() {
    let workspace = TestWorkspace::new();
    workspace.write_config(&workspace.base_config());

    workspace
        .packager_cmd()
        .args(["create", "-c", "config.yaml"])
        .assert()
        .code(110)
        .stderr(predicate::str::contains("cloudify_agent_module"));

    assert!(workspace.install_log().is_empty());
}

#[test]
fn test_existing_venv_without_force_exits_120() {
    let workspace = TestWorkspace::new();
    std::fs::create_dir_all(workspace.venv_path()).expect("pre-existing venv");
    let config = format!("{}cloudify_agent_module: cloudify-agent\n", workspace.base_config());
    workspace.write_config(&config);

    workspace
        .packager_cmd()
        .args(["create", "-c", "config.yaml"])
        .assert()
        .code(120)
        .stderr(predicate::str::contains("Virtualenv already exists"));
}

#[test]
fn test_existing_archive_without_force_exits_121() {
    let workspace = TestWorkspace::new();
    std::fs::write(workspace.tar_path(), "CONTENT").expect("pre-existing archive");
    let config = format!("{}cloudify_agent_module: cloudify-agent\n", workspace.base_config());
    workspace.write_config(&config);

    workspace
        .packager_cmd()
        .args(["create", "-c", "config.yaml"])
        .assert()
        .code(121)
        .stderr(predicate::str::contains("Destination tar already exists"));

    // The pre-existing archive is left untouched.
    assert_eq!(workspace.read_file("agent.tar.gz"), "CONTENT");
}

#[test]
fn test_install_failure_exits_130_and_aborts_the_sequence() {
    let workspace = TestWorkspace::new();
    let config = format!(
        "{}\
additional_modules:
  - fail-locator==1.0
additional_plugins:
  fabric_plugin: cloudify-fabric-plugin==1.0
cloudify_agent_module: cloudify-agent
",
        workspace.base_config()
    );
    workspace.write_config(&config);

    workspace
        .packager_cmd()
        .args(["create", "-c", "config.yaml"])
        .assert()
        .code(130)
        .stderr(predicate::str::contains("Could not install module"));

    let log = workspace.install_log();
    // The failing call is the last one; nothing after it ran, and the
    // half-installed environment is left in place for inspection.
    assert_eq!(
        log.last().map(String::as_str),
        Some("install fail-locator==1.0")
    );
    assert!(!log.iter().any(|l| l.contains("fabric")));
    assert!(workspace.venv_path().is_dir());
    assert!(!workspace.tar_path().exists());
}
