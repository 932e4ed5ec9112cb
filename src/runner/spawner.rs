//! Launching script processes

use std::borrow::Cow;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;

use crate::config::RunConfig;
use crate::discovery::ScriptDescriptor;

/// Environment variables handed to every script of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptEnv {
    vars: Vec<(String, String)>,
}

impl ScriptEnv {
    /// Build the `BMK_*` variables for one run
    pub fn for_run(config: &RunConfig, stages_dir: &Path, package_name: Option<&str>) -> Self {
        let mut vars = vec![
            (
                "BMK_PROJECT_DIR".to_string(),
                config.project_dir.display().to_string(),
            ),
            (
                "BMK_STAGES_DIR".to_string(),
                stages_dir.display().to_string(),
            ),
            (
                "BMK_COMMAND_PREFIX".to_string(),
                config.command_prefix.clone(),
            ),
            (
                "BMK_OUTPUT_FORMAT".to_string(),
                config.output_format.as_str().to_string(),
            ),
            (
                "BMK_SHOW_WARNINGS".to_string(),
                if config.show_warnings { "1" } else { "0" }.to_string(),
            ),
        ];
        if let Some(dir) = &config.override_dir {
            vars.push(("BMK_OVERRIDE_DIR".to_string(), dir.display().to_string()));
        }
        if let Some(name) = package_name {
            vars.push(("BMK_PACKAGE_NAME".to_string(), name.to_string()));
        }
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn vars(&self) -> &[(String, String)] {
        &self.vars
    }
}

/// Where a script's output goes
#[derive(Debug)]
pub enum ScriptOutput {
    /// Share the runner's terminal, in its process group
    Inherit,
    /// stdout and stderr both appended to one file, in a new process group
    Capture(File),
}

/// Everything needed to launch one script
#[derive(Debug)]
pub struct LaunchRequest<'a> {
    pub script: &'a ScriptDescriptor,
    pub args: &'a [String],
    pub env: &'a ScriptEnv,
    pub cwd: &'a Path,
    pub output: ScriptOutput,
}

/// Starts script processes
pub trait ScriptSpawner: Send + Sync {
    fn spawn(&self, request: LaunchRequest<'_>) -> io::Result<Child>;
}

/// Picks an interpreter from the script's extension
#[derive(Debug)]
pub struct ShellSpawner {
    shell: String,
    powershell: OnceLock<PathBuf>,
}

impl Default for ShellSpawner {
    fn default() -> Self {
        Self::new("bash")
    }
}

impl ShellSpawner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            powershell: OnceLock::new(),
        }
    }

    /// `pwsh` if on PATH, else `powershell`
    fn powershell(&self) -> &Path {
        self.powershell.get_or_init(|| {
            which::which("pwsh")
                .or_else(|_| which::which("powershell"))
                .unwrap_or_else(|_| PathBuf::from("pwsh"))
        })
    }

    /// Program and leading arguments for a script
    pub fn command_line(&self, script: &Path) -> Vec<String> {
        let path = script.display().to_string();
        match script.extension().and_then(|e| e.to_str()) {
            Some("sh") => vec![self.shell.clone(), path],
            Some("ps1") => vec![
                self.powershell().display().to_string(),
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-File".to_string(),
                path,
            ],
            _ => vec![path],
        }
    }
}

impl ScriptSpawner for ShellSpawner {
    fn spawn(&self, request: LaunchRequest<'_>) -> io::Result<Child> {
        let mut argv = self.command_line(&request.script.path);
        argv.extend(request.args.iter().cloned());

        tracing::debug!(
            script = %request.script.file_name,
            command = %render_command(&argv),
            "spawning script"
        );

        let (program, rest) = argv
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command line"))?;

        let mut cmd = Command::new(program);
        cmd.args(rest)
            .current_dir(request.cwd)
            .envs(request.env.vars().iter().map(|(k, v)| (k, v)));

        match request.output {
            ScriptOutput::Inherit => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
            ScriptOutput::Capture(file) => {
                let stderr = file.try_clone()?;
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::from(file))
                    .stderr(Stdio::from(stderr));
                isolate_group(&mut cmd);
            }
        }

        cmd.spawn()
    }
}

#[cfg(unix)]
fn isolate_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate_group(_cmd: &mut Command) {}

/// Shell-quoted command line for logs
pub fn render_command(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| shell_escape::escape(Cow::Borrowed(arg.as_str())).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(path: &Path) -> ScriptDescriptor {
        ScriptDescriptor {
            path: path.to_path_buf(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            stage: 1,
        }
    }

    #[test]
    fn test_sh_runs_through_shell() {
        let spawner = ShellSpawner::new("dash");
        assert_eq!(
            spawner.command_line(Path::new("/s/test_01_a.sh")),
            vec!["dash", "/s/test_01_a.sh"]
        );
    }

    #[test]
    fn test_other_extensions_run_directly() {
        let spawner = ShellSpawner::default();
        assert_eq!(
            spawner.command_line(Path::new("/s/test_01_a.py")),
            vec!["/s/test_01_a.py"]
        );
    }

    #[test]
    fn test_ps1_uses_noninteractive_flags() {
        let spawner = ShellSpawner::default();
        let argv = spawner.command_line(Path::new("/s/test_01_a.ps1"));
        assert_eq!(argv.len(), 5);
        assert_eq!(&argv[1..4], ["-NoProfile", "-NonInteractive", "-File"]);
        assert_eq!(argv[4], "/s/test_01_a.ps1");
    }

    #[test]
    fn test_render_command_quotes_spaces() {
        let argv = vec!["bash".to_string(), "my script.sh".to_string()];
        assert_eq!(render_command(&argv), "bash 'my script.sh'");
    }

    #[test]
    fn test_env_for_run() {
        let mut config = RunConfig::new("/project", "/bundled", "test");
        config.override_dir = Some(PathBuf::from("/project/makescripts"));
        config.show_warnings = false;

        let env = ScriptEnv::for_run(&config, Path::new("/bundled"), Some("my_pkg"));

        assert_eq!(env.get("BMK_PROJECT_DIR"), Some("/project"));
        assert_eq!(env.get("BMK_STAGES_DIR"), Some("/bundled"));
        assert_eq!(env.get("BMK_OVERRIDE_DIR"), Some("/project/makescripts"));
        assert_eq!(env.get("BMK_COMMAND_PREFIX"), Some("test"));
        assert_eq!(env.get("BMK_PACKAGE_NAME"), Some("my_pkg"));
        assert_eq!(env.get("BMK_OUTPUT_FORMAT"), Some("json"));
        assert_eq!(env.get("BMK_SHOW_WARNINGS"), Some("0"));
    }

    #[test]
    fn test_env_omits_unknown_package() {
        let config = RunConfig::new("/project", "/bundled", "test");
        let env = ScriptEnv::for_run(&config, Path::new("/bundled"), None);
        assert_eq!(env.get("BMK_PACKAGE_NAME"), None);
        assert_eq!(env.get("BMK_OVERRIDE_DIR"), None);
    }

    #[test]
    fn test_capture_receives_both_streams() {
        if !cfg!(target_family = "unix") {
            return;
        }
        let dir = tempfile::TempDir::new().expect("failed to create temp dir");
        let script = dir.path().join("test_01_both.sh");
        std::fs::write(&script, "echo out\necho err >&2\necho \"$BMK_COMMAND_PREFIX\"\n")
            .expect("failed to write script");
        let log = dir.path().join("out.log");
        let file = File::create(&log).expect("failed to create log");

        let config = RunConfig::new(dir.path(), dir.path(), "test");
        let env = ScriptEnv::for_run(&config, dir.path(), None);
        let desc = descriptor(&script);
        let mut child = ShellSpawner::default()
            .spawn(LaunchRequest {
                script: &desc,
                args: &[],
                env: &env,
                cwd: dir.path(),
                output: ScriptOutput::Capture(file),
            })
            .expect("spawn failed");
        let status = child.wait().expect("wait failed");

        assert!(status.success());
        let content = std::fs::read_to_string(&log).expect("failed to read log");
        assert!(content.contains("out"));
        assert!(content.contains("err"));
        assert!(content.contains("test"));
    }
}
