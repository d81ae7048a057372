// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! Process-level invocation of a `git` binary.
//!
//! Grounded on the subprocess pattern the pack uses for shelling out to
//! `git` (`Command::new("git")` call sites across the Mira crates), but
//! given the typed, composable builder shape the teacher gives its other
//! "thin wrapper over an external primitive" seams (e.g. [`super::tree`]'s
//! bottom-up builder).

use std::{
    ffi::OsStr,
    io::Write,
    path::Path,
    process::{Command, Stdio},
};

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to spawn `git {args}`: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to stdin of `git {args}`: {source}")]
    WriteStdin {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`git {args}` exited with status {status}: {stderr}")]
    NonZeroExit {
        args: String,
        status: i32,
        stderr: String,
    },

    #[error("`git {args}` produced output that is not valid utf-8")]
    InvalidUtf8 { args: String },
}

/// The outcome of [`Executor::execute`]: every stream the child produced,
/// regardless of exit status.
pub struct Output {
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Bytes actually accepted onto the child's stdin before it closed the
    /// pipe or the write completed. Equal to the full input length unless
    /// the child stopped reading early.
    pub stdin_bytes_written: usize,
}

/// A composable, single-shot invocation of the `git` binary.
///
/// Built with `withArgs`/`withEnv`/`withStdin`/`withGitDir` in any order,
/// then consumed by [`Executor::execute`] (raw streams) or
/// [`Executor::execute_string`] (trimmed stdout, error on non-zero exit).
///
/// An `Executor` is single-use: constructing one and calling `execute*`
/// spawns exactly one child process. Higher layers that mutate the working
/// tree (the `older-Git` `merge`/`checkout` fallback in `merge_tree`) are
/// responsible for not running two such executors concurrently against the
/// same `GIT_DIR` (see the crate's concurrency notes).
#[derive(Clone, Debug)]
pub struct Executor {
    git_binary: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    stdin: Option<Vec<u8>>,
}

impl Default for Executor {
    fn default() -> Self {
        Self {
            git_binary: "git".to_string(),
            args: Vec::new(),
            env: Vec::new(),
            stdin: None,
        }
    }
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_git_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.args.push("--git-dir".to_string());
        self.args
            .push(dir.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string_lossy().into_owned()));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    fn argv_display(&self) -> String {
        self.args.join(" ")
    }

    fn spawn(&self) -> Result<std::process::Child, Error> {
        let mut cmd = Command::new(&self.git_binary);
        cmd.args(&self.args);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        cmd.stdin(if self.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(args = %self.argv_display(), "spawning git");

        cmd.spawn().map_err(|source| Error::Spawn {
            args: self.argv_display(),
            source,
        })
    }

    /// Run the command, returning every stream produced regardless of exit
    /// status. Callers that need "fail loudly on non-zero" semantics should
    /// use [`Executor::execute_string`] instead.
    pub fn execute(&self) -> Result<Output, Error> {
        let mut child = self.spawn()?;

        let mut stdin_bytes_written = 0usize;
        if let Some(input) = &self.stdin {
            let mut stdin = child.stdin.take().expect("stdin was requested as piped");
            let mut remaining = input.as_slice();
            while !remaining.is_empty() {
                match stdin.write(remaining) {
                    Ok(0) => break,
                    Ok(n) => {
                        stdin_bytes_written += n;
                        remaining = &remaining[n..];
                    },
                    Err(source) if source.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(source) => {
                        return Err(Error::WriteStdin {
                            args: self.argv_display(),
                            source,
                        });
                    },
                }
            }
            // Drop to close the pipe so the child can observe EOF and exit.
            drop(stdin);
        }

        let output = child.wait_with_output().map_err(|source| Error::Spawn {
            args: self.argv_display(),
            source,
        })?;

        Ok(Output {
            status: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
            stdin_bytes_written,
        })
    }

    /// Run the command and return trimmed stdout as a `String`. Any non-zero
    /// exit status is turned into [`Error::NonZeroExit`] carrying the
    /// trimmed stderr.
    pub fn execute_string(&self) -> Result<String, Error> {
        let output = self.execute()?;
        if output.status != 0 {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::NonZeroExit {
                args: self.argv_display(),
                status: output.status,
                stderr,
            });
        }
        String::from_utf8(output.stdout)
            .map(|s| s.trim_end_matches(['\n', '\r']).to_string())
            .map_err(|_| Error::InvalidUtf8 {
                args: self.argv_display(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_is_additive() {
        let exec = Executor::new()
            .with_git_dir("/tmp/repo/.git")
            .with_args(["rev-parse", "HEAD"]);
        assert_eq!(exec.argv_display(), "--git-dir /tmp/repo/.git rev-parse HEAD");
    }
}
