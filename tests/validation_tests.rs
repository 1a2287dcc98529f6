//! Post-install validation tests

mod common;

use common::TestWorkspace;
use predicates::prelude::*;

#[test]
fn test_validation_failure_aggregates_all_missing_names() {
    let workspace = TestWorkspace::new();
    // Locators that do not carry the canonical names: the installs succeed
    // but the recorded names never appear in the freeze listing.
    let config = format!(
        "{}\
core_modules:
  cloudify_rest_client: phantom-a==1.0
core_plugins:
  cloudify_script_plugin: phantom-b==1.0
cloudify_agent_module: cloudify-agent
",
        workspace.base_config()
    );
    workspace.write_config(&config);

    workspace
        .packager_cmd()
        .args(["create", "-c", "config.yaml"])
        .assert()
        .code(140)
        .stderr(predicate::str::contains("cloudify-rest-client"))
        .stderr(predicate::str::contains("cloudify-script-plugin"));

    // Validation failed, so no archive was produced.
    assert!(!workspace.tar_path().exists());
}

#[test]
fn test_no_validate_skips_the_check_entirely() {
    let workspace = TestWorkspace::new();
    let config = format!(
        "{}\
core_modules:
  cloudify_rest_client: phantom-a==1.0
cloudify_agent_module: cloudify-agent
",
        workspace.base_config()
    );
    workspace.write_config(&config);

    workspace
        .packager_cmd()
        .args(["create", "-c", "config.yaml", "--no-validate"])
        .assert()
        .success();

    assert!(workspace.tar_path().is_file());
}

#[test]
fn test_validation_passes_when_every_recorded_name_is_present() {
    let workspace = TestWorkspace::new();
    let config = format!(
        "{}\
core_modules:
  cloudify_rest_client: cloudify-rest-client==3.1
core_plugins:
  cloudify_diamond_plugin: cloudify-diamond-plugin==1.3
cloudify_agent_module: cloudify-agent
",
        workspace.base_config()
    );
    workspace.write_config(&config);

    workspace
        .packager_cmd()
        .args(["create", "-c", "config.yaml"])
        .assert()
        .success();
}
