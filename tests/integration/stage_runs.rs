//! End-to-end stage runs through the bmk binary

use super::helpers::*;

#[test]
fn test_all_stages_pass() {
    let project = Project::new();
    project.add_script("test_01_lint.sh", "echo lint >> order.log");
    project.add_script("test_02_a.sh", "echo a >> order.log");
    project.add_script("test_02_b.sh", "echo b >> order.log");
    project.add_script("test_10_final.sh", "echo final >> order.log");

    let output = project.run(&["test"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let order = project.read("order.log");
    let lines: Vec<&str> = order.lines().collect();
    assert_eq!(lines.first(), Some(&"lint"));
    assert_eq!(lines.last(), Some(&"final"));
    assert!(stdout(&output).contains("All 3 stages passed (4 scripts)"));
    assert!(project.tmp_is_empty());
}

#[test]
fn test_script_exit_code_is_propagated() {
    let project = Project::new();
    project.add_script("test_01_fail.sh", "exit 42");

    let output = project.run(&["test"]);

    assert_eq!(output.status.code(), Some(42));
}

#[test]
fn test_parallel_failure_stops_later_stages() {
    let project = Project::new();
    project.add_script("test_01_ok.sh", "true");
    project.add_script("test_02_a.sh", "echo 'assertion failed: x == y'\nexit 3");
    project.add_script("test_02_b.sh", "sleep 0.5\ntouch slow.done");
    project.add_script("test_03_never.sh", "touch never");

    let output = project.run(&["test"]);

    assert_eq!(output.status.code(), Some(3));
    assert!(project.file_exists("slow.done"));
    assert!(!project.file_exists("never"));

    let out = stdout(&output);
    assert!(out.contains("assertion failed: x == y"));
    assert!(out.contains("Stage 2 failed"));
    assert!(project.tmp_is_empty());
}

#[test]
fn test_no_scripts_exits_zero_with_hint() {
    let project = Project::new();

    let output = project.run(&["stages", "deploy"]);

    assert_eq!(output.status.code(), Some(0));
    let out = stdout(&output);
    assert!(out.contains("No scripts found for prefix 'deploy'"));
    assert!(out.contains("deploy_01_description.sh"));
}

#[test]
fn test_build_alias_uses_bld_prefix() {
    let project = Project::new();
    project.add_script("bld_01_compile.sh", "touch built");
    project.add_script("test_01_unit.sh", "touch tested");

    let output = project.run(&["b"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(project.file_exists("built"));
    assert!(!project.file_exists("tested"));
}

#[test]
fn test_forwarded_arguments_keep_hyphens() {
    let project = Project::new();
    project.add_script("clean_01_args.sh", "printf '%s\\n' \"$@\" > args.txt");

    let output = project.run(&["clean", "--all", "-x", "two words"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(project.read("args.txt"), "--all\n-x\ntwo words\n");
}

#[test]
fn test_override_dir_replaces_bundled_scripts() {
    let project = Project::new();
    project.add_script("test_01_bundled.sh", "touch ran_bundled");
    project.add_override("test_01_custom.sh", "touch ran_custom");

    let output = project.run(&["test"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(project.file_exists("ran_custom"));
    assert!(!project.file_exists("ran_bundled"));
}

#[test]
fn test_scripts_receive_environment() {
    let project = Project::new();
    project.write_config("[bmk]\npackage_name = \"demo_pkg\"\n");
    project.add_script(
        "test_01_env.sh",
        "printf '%s\\n' \"$BMK_PACKAGE_NAME\" \"$BMK_COMMAND_PREFIX\" \"$BMK_OUTPUT_FORMAT\" \"$PWD\" > env.txt",
    );

    let output = project.run(&["--human", "test"]);

    assert_eq!(output.status.code(), Some(0));
    let env = project.read("env.txt");
    let lines: Vec<&str> = env.lines().collect();
    assert_eq!(lines[0], "demo_pkg");
    assert_eq!(lines[1], "test");
    assert_eq!(lines[2], "text");
    assert_eq!(
        std::path::Path::new(lines[3])
            .canonicalize()
            .expect("canonicalize pwd"),
        project.path().canonicalize().expect("canonicalize project")
    );
}

#[test]
fn test_invalid_config_is_config_error() {
    let project = Project::new();
    project.write_config("[bmk\nbroken");
    project.add_script("test_01_a.sh", "true");

    let output = project.run(&["test"]);

    assert_eq!(output.status.code(), Some(78));
    assert!(stderr(&output).contains("bmk.toml"));
}

#[test]
fn test_timeout_flag_terminates_script() {
    let project = Project::new();
    project.add_script("test_01_slow.sh", "exec sleep 30");

    let started = std::time::Instant::now();
    let output = project.run(&["--timeout", "1", "test"]);

    assert_eq!(output.status.code(), Some(110));
    assert!(started.elapsed() < std::time::Duration::from_secs(15));
}
