// Copyright © The gittuf-rs Contributors
//
// This file is part of radicle-link, distributed under the GPLv3 with Radicle
// Linking Exception. For full terms see the included LICENSE file.

//! A handle onto a single Git repository, resolved once and reused for every
//! subsequent operation in this crate.

use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::{executor::Executor, Error, Result};

/// A mutable, injectable notion of "now", so tests can pin author/committer
/// timestamps instead of depending on wall-clock time.
pub trait Clock: std::fmt::Debug + Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// File status codes as reported by `git status --porcelain=1`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusEntry {
    pub x: char,
    pub y: char,
}

/// An opened handle onto a repository's object database.
///
/// Resolution order for the backing `GIT_DIR`, matching plain `git`'s own
/// resolution: an explicit path (verified to be a git directory itself, or
/// to contain a `.git` subdirectory), else the `GIT_DIR` environment
/// variable, else `git rev-parse --git-dir` run from the current directory.
#[derive(Debug)]
pub struct Repository {
    git_dir: PathBuf,
    bare: bool,
    clock: Box<dyn Clock>,
    /// Best-effort: `None` when the repository has no commit-graph, which
    /// is not an error, just a missing optimization.
    commit_graph: Option<PathBuf>,
}

impl Repository {
    pub fn open(path: Option<impl AsRef<Path>>) -> Result<Self> {
        let git_dir = match path {
            Some(p) => Self::resolve_explicit(p.as_ref())?,
            None => Self::resolve_ambient()?,
        };

        let bare = !git_dir
            .file_name()
            .map(|n| n == ".git")
            .unwrap_or(false);

        let commit_graph = {
            let candidate = git_dir.join("objects/info/commit-graph");
            candidate.exists().then_some(candidate)
        };

        Ok(Self {
            git_dir,
            bare,
            clock: Box::new(SystemClock),
            commit_graph,
        })
    }

    fn resolve_explicit(path: &Path) -> Result<PathBuf> {
        if Self::looks_like_git_dir(path) {
            return Ok(path.to_path_buf());
        }
        let dotgit = path.join(".git");
        if Self::looks_like_git_dir(&dotgit) {
            return Ok(dotgit);
        }
        Err(Error::ReferenceNotFound(format!(
            "{} is not a git directory",
            path.display()
        )))
    }

    fn looks_like_git_dir(path: &Path) -> bool {
        path.join("HEAD").exists() && path.join("objects").is_dir()
    }

    fn resolve_ambient() -> Result<PathBuf> {
        if let Ok(dir) = env::var("GIT_DIR") {
            return Ok(PathBuf::from(dir));
        }
        let out = Executor::new()
            .with_args(["rev-parse", "--git-dir"])
            .execute_string()?;
        Ok(PathBuf::from(out))
    }

    /// Replace the injected clock, e.g. with a fixed-time test double.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn is_bare(&self) -> bool {
        self.bare
    }

    pub fn has_commit_graph(&self) -> bool {
        self.commit_graph.is_some()
    }

    /// Build an [`Executor`] pre-populated with `--git-dir` pointing at this
    /// handle's resolved directory.
    pub fn executor(&self) -> Executor {
        Executor::new().with_git_dir(&self.git_dir)
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.executor()
            .with_args(["config", "--local", key, value])
            .execute_string()?;
        Ok(())
    }

    /// All config keys visible to this repository, lower-cased, parsed out
    /// of `config --get-regexp .*`. Keys appearing multiple times keep the
    /// last value, matching `git config --get`'s "last one wins" semantics.
    pub fn get_config(&self) -> Result<BTreeMap<String, String>> {
        let out = self
            .executor()
            .with_args(["config", "--get-regexp", ".*"])
            .execute_string()
            .unwrap_or_default();

        let mut map = BTreeMap::new();
        for line in out.lines() {
            if let Some((key, value)) = line.split_once(' ') {
                map.insert(key.to_ascii_lowercase(), value.to_string());
            } else {
                map.insert(line.to_ascii_lowercase(), String::new());
            }
        }
        Ok(map)
    }

    /// Working-tree status, parsed from NUL-separated porcelain v1 output.
    pub fn status(&self) -> Result<BTreeMap<String, StatusEntry>> {
        let output = self
            .executor()
            .with_args([
                "status",
                "--porcelain=1",
                "-z",
                "--untracked-files=all",
                "--ignored",
            ])
            .execute()?;

        let raw = String::from_utf8_lossy(&output.stdout);
        let mut map = BTreeMap::new();
        let mut fields = raw.split('\0').filter(|s| !s.is_empty());
        while let Some(entry) = fields.next() {
            if entry.len() < 3 {
                continue;
            }
            let mut chars = entry.chars();
            let x = chars.next().unwrap_or(' ');
            let y = chars.next().unwrap_or(' ');
            let path = entry[2..].trim_start().to_string();
            // Renames carry a second NUL-separated field (the "from" path);
            // it isn't surfaced in the status map, matching the map<path,
            // {x,y}> shape.
            if x == 'R' || y == 'R' {
                fields.next();
            }
            map.insert(path, StatusEntry { x, y });
        }
        Ok(map)
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.executor()
            .with_args(["remote", "add", name, url])
            .execute_string()?;
        Ok(())
    }

    pub fn remove_remote(&self, name: &str) -> Result<()> {
        self.executor()
            .with_args(["remote", "remove", name])
            .execute_string()?;
        Ok(())
    }

    pub fn get_remote_url(&self, name: &str) -> Result<String> {
        self.executor()
            .with_args(["remote", "get-url", name])
            .execute_string()
            .map_err(Into::into)
    }
}
