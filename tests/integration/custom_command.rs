//! `bmk custom` behaviour

use super::helpers::*;

#[test]
fn test_custom_runs_override_scripts() {
    let project = Project::new();
    project.add_override("deploy_01_push.sh", "echo \"$BMK_COMMAND_PREFIX\" > pushed");

    let output = project.run(&["custom", "deploy", "--dry-run"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(project.read("pushed").trim(), "deploy");
}

#[test]
fn test_custom_invalid_name() {
    let project = Project::new();

    let output = project.run(&["custom", "../etc"]);

    assert_eq!(output.status.code(), Some(22));
    assert!(stderr(&output).contains("invalid command name"));
}

#[test]
fn test_custom_missing_override_dir() {
    let project = Project::new();

    let output = project.run(&["custom", "deploy"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("does not exist"));
}

#[test]
fn test_custom_unknown_command() {
    let project = Project::new();
    project.add_override("test_01_a.sh", "true");

    let output = project.run(&["custom", "deploy"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("custom command \"deploy\" not found in directory"));
}

#[test]
fn test_custom_ignores_bundled_scripts() {
    let project = Project::new();
    project.add_script("deploy_01_bundled.sh", "touch ran_bundled");

    let output = project.run(&["custom", "deploy"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!project.file_exists("ran_bundled"));
}
