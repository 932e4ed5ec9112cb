//! Warnings from passing parallel scripts

use super::helpers::*;

fn project_with_warning() -> Project {
    let project = Project::new();
    project.add_script("test_01_a.sh", "echo 'warning: deprecated option used'");
    project.add_script("test_01_b.sh", "echo 'all good'");
    project
}

#[test]
fn test_warning_from_passing_script_is_shown() {
    let project = project_with_warning();

    let output = project.run(&["test"]);

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("Warnings from test_01_a.sh"));
    assert!(out.contains("warning: deprecated option used"));
    assert!(!out.contains("all good"));
}

#[test]
fn test_no_warnings_flag_hides_them() {
    let project = project_with_warning();

    let output = project.run(&["--no-warnings", "test"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(!stdout(&output).contains("deprecated option used"));
}

#[test]
fn test_show_warnings_false_in_config() {
    let project = project_with_warning();
    project.write_config("[bmk]\nshow_warnings = false\n");

    let output = project.run(&["test"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(!stdout(&output).contains("Warnings from"));
}

#[test]
fn test_failing_script_output_is_not_a_warning_report() {
    let project = Project::new();
    project.add_script("test_01_a.sh", "echo 'warning: about to fail'\nexit 4");
    project.add_script("test_01_b.sh", "true");

    let output = project.run(&["test"]);

    assert_eq!(output.status.code(), Some(4));
    let out = stdout(&output);
    assert!(!out.contains("Warnings from"));
    assert!(out.contains("Output from test_01_a.sh"));
    assert!(out.contains("warning: about to fail"));
}
