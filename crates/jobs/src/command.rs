// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Killable subprocess wrapper.
//!
//! Children are spawned into their own process group so that `kill` takes
//! down the whole tree, not just the immediate child. Stdout and stderr are
//! captured incrementally into shared buffers that stay readable after the
//! process exits.

use crate::job::JobError;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ProcState {
    /// Not spawned yet.
    Init,
    /// Running with this process-group id.
    Running(i32),
    Finished,
    /// `kill` was called; if before spawn, the spawn is aborted.
    Killed,
}

/// One supervised subprocess invocation.
#[derive(Debug)]
pub struct Subprocess {
    state: Mutex<ProcState>,
    stdout: Arc<Mutex<String>>,
    stderr: Arc<Mutex<String>>,
}

impl Default for Subprocess {
    fn default() -> Self {
        Self::new()
    }
}

impl Subprocess {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProcState::Init),
            stdout: Arc::new(Mutex::new(String::new())),
            stderr: Arc::new(Mutex::new(String::new())),
        }
    }

    /// Run `program` in `dir` and wait for it to exit.
    ///
    /// Returns `JobError::Killed` when the process was taken down by
    /// [`Subprocess::kill`], `JobError::Exit` on a non-zero exit.
    pub async fn run(&self, program: &str, dir: &Path) -> Result<(), JobError> {
        let mut cmd = tokio::process::Command::new(program);
        cmd.current_dir(dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        let mut child = cmd.spawn().map_err(JobError::Spawn)?;

        {
            let mut state = self.state.lock();
            match *state {
                ProcState::Killed => {
                    // Raced with kill: the process is already up, take it down.
                    if let Some(pid) = child.id() {
                        let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
                    }
                }
                _ => {
                    let pid = child.id().map(|p| p as i32).unwrap_or(0);
                    *state = ProcState::Running(pid);
                }
            }
        }

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let (status, _, _) = tokio::join!(
            child.wait(),
            capture(stdout_pipe, Arc::clone(&self.stdout)),
            capture(stderr_pipe, Arc::clone(&self.stderr)),
        );
        let status = status?;

        let was_killed = {
            let mut state = self.state.lock();
            let killed = matches!(*state, ProcState::Killed);
            if !killed {
                *state = ProcState::Finished;
            }
            killed
        };

        if was_killed {
            Err(JobError::Killed)
        } else if status.success() {
            Ok(())
        } else {
            Err(JobError::Exit(status))
        }
    }

    /// Kill the whole process group. Safe to call before, during, or after
    /// the run; at most one SIGKILL is delivered.
    pub fn kill(&self) {
        let mut state = self.state.lock();
        match *state {
            ProcState::Running(pid) => {
                *state = ProcState::Killed;
                if pid > 0 {
                    let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
                }
            }
            ProcState::Init => *state = ProcState::Killed,
            ProcState::Finished | ProcState::Killed => {}
        }
    }

    pub fn stdout(&self) -> String {
        self.stdout.lock().clone()
    }

    pub fn stderr(&self) -> String {
        self.stderr.lock().clone()
    }
}

async fn capture<R>(pipe: Option<R>, sink: Arc<Mutex<String>>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else { return };
    let mut buf = [0u8; 4096];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => sink.lock().push_str(&String::from_utf8_lossy(&buf[..n])),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
