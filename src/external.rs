use crate::command::Launch;
use anyhow::{Context, Result};
use nix::sys::signal::{self, SigHandler, Signal};
use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Command, ExitStatus};
use tracing::debug;

/// Launches programs that are not builtins and waits for them.
///
/// The child inherits the shell's standard streams, environment and working
/// directory. `PATH` is searched the same way `execvp` does.
#[derive(Debug, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launch for ProcessLauncher {
    fn launch(&mut self, argv: &[String]) -> Result<()> {
        let (program, args) = argv.split_first().context("nothing to launch")?;

        let mut command = Command::new(program);
        command.args(args);
        // SAFETY: the hook runs in the child between fork and exec and only calls
        // sigaction, which is async-signal-safe.
        unsafe { command.pre_exec(restore_default_sigint) };

        // A failed exec is reported back through spawn, so the shell process is
        // never replaced by a broken child.
        let mut child = command.spawn().with_context(|| program.clone())?;
        debug!(pid = child.id(), %program, "spawned child");

        // `wait` does not return for a stopped child, only for one that has
        // exited or was killed.
        let status = child
            .wait()
            .with_context(|| format!("{program}: failed to wait for child"))?;
        debug!(%program, status = %describe_status(status), "child terminated");
        Ok(())
    }
}

/// The shell handles SIGINT itself; launched programs get the default action so
/// Ctrl-C stops them without touching the shell.
fn restore_default_sigint() -> io::Result<()> {
    // SAFETY: installing SIG_DFL does not involve any Rust handler.
    unsafe { signal::signal(Signal::SIGINT, SigHandler::SigDfl) }
        .map(drop)
        .map_err(io::Error::from)
}

fn describe_status(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        format!("exited with {code}")
    } else if let Some(signal) = status.signal() {
        if status.core_dumped() {
            format!("killed by signal {signal} (core dumped)")
        } else {
            format!("killed by signal {signal}")
        }
    } else {
        "unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_launch_successful_program() {
        let res = ProcessLauncher::new().launch(&argv(&["true"]));
        assert!(res.is_ok());
    }

    #[test]
    fn test_failing_program_is_not_an_error() {
        let res = ProcessLauncher::new().launch(&argv(&["sh", "-c", "exit 3"]));
        assert!(res.is_ok());
    }

    #[test]
    fn test_child_killed_by_sigint_is_not_an_error() {
        let res = ProcessLauncher::new().launch(&argv(&["sh", "-c", "kill -INT $$"]));
        assert!(res.is_ok());
    }

    #[test]
    fn test_nonexistent_program_reports_its_name() {
        let name = format!("esh_no_such_program_{}", std::process::id());
        let err = ProcessLauncher::new()
            .launch(&argv(&[&name]))
            .expect_err("launching a missing program must fail");
        let msg = format!("{err:#}");
        assert!(msg.contains(&name), "unexpected message: {msg}");
    }

    #[test]
    fn test_stopped_child_is_waited_for_until_it_exits() {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;
        use std::sync::mpsc;
        use std::thread;
        use std::time::{Duration, Instant};

        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let script = format!("echo $$ > {}; kill -STOP $$; exit 7", pid_file.display());

        let (done_tx, done_rx) = mpsc::channel();
        let launcher = thread::spawn(move || {
            let res = ProcessLauncher::new().launch(&argv(&["sh", "-c", &script]));
            done_tx.send(()).unwrap();
            res
        });

        let deadline = Instant::now() + Duration::from_secs(10);
        let pid = loop {
            if let Some(pid) = std::fs::read_to_string(&pid_file)
                .ok()
                .and_then(|text| text.trim().parse::<i32>().ok())
            {
                break Pid::from_raw(pid);
            }
            assert!(Instant::now() < deadline, "child never wrote its pid");
            thread::sleep(Duration::from_millis(10));
        };

        // Stopped, not terminated: the launch must still be waiting.
        assert!(done_rx.recv_timeout(Duration::from_millis(300)).is_err());

        kill(pid, Signal::SIGCONT).unwrap();
        done_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(launcher.join().unwrap().is_ok());
    }

    #[test]
    fn test_empty_argv_is_rejected() {
        assert!(ProcessLauncher::new().launch(&[]).is_err());
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(ExitStatus::from_raw(0)), "exited with 0");
        assert_eq!(describe_status(ExitStatus::from_raw(2 << 8)), "exited with 2");
        assert_eq!(describe_status(ExitStatus::from_raw(9)), "killed by signal 9");
    }
}
