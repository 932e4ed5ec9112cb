//! Signal handling: children are terminated and capture files removed

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::fs;
use std::process::Stdio;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

use super::helpers::*;

fn pid_in(project: &Project, name: &str) -> i32 {
    project
        .read(name)
        .trim()
        .parse()
        .expect("pid file is not a number")
}

fn is_gone(pid: i32) -> bool {
    if kill(Pid::from_raw(pid), None).is_err() {
        return true;
    }
    // A reparented zombie counts as gone
    fs::read_to_string(format!("/proc/{pid}/stat"))
        .ok()
        .and_then(|stat| {
            stat.rsplit_once(')')
                .and_then(|(_, rest)| rest.split_whitespace().next().map(|s| s == "Z"))
        })
        .unwrap_or(false)
}

fn interrupt_parallel_stage(signal: Signal, expected: i32) {
    let project = Project::new();
    for tag in ["a", "b"] {
        project.add_script(
            &format!("test_01_{tag}.sh"),
            &format!("sleep 60 &\necho $! > {tag}.child\necho $$ > {tag}.pid\nwait"),
        );
    }
    project.add_script("test_02_never.sh", "touch never");

    let mut child = project
        .command(&["test"])
        .stdout(Stdio::null())
        .spawn()
        .expect("Failed to spawn bmk");
    for tag in ["a", "b"] {
        assert!(
            wait_for_file(&project.path().join(format!("{tag}.pid")), Duration::from_secs(10)),
            "script {tag} never started"
        );
    }

    let started = Instant::now();
    let bmk = Pid::from_raw(i32::try_from(child.id()).expect("pid fits in i32"));
    kill(bmk, signal).expect("Failed to signal bmk");

    let status = child
        .wait_timeout(Duration::from_secs(15))
        .expect("Failed to wait for bmk")
        .expect("bmk did not exit after signal");

    assert_eq!(status.code(), Some(expected));
    assert!(started.elapsed() < Duration::from_secs(15));
    for tag in ["a", "b"] {
        assert!(is_gone(pid_in(&project, &format!("{tag}.pid"))));
        assert!(is_gone(pid_in(&project, &format!("{tag}.child"))));
    }
    assert!(!project.file_exists("never"));
    assert!(project.tmp_is_empty());
}

#[test]
fn test_sigint_stops_parallel_stage() {
    interrupt_parallel_stage(Signal::SIGINT, 130);
}

#[test]
fn test_sigterm_stops_parallel_stage() {
    interrupt_parallel_stage(Signal::SIGTERM, 143);
}
