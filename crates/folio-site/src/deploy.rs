//! Git branch publishing for built sites (GitHub Pages style).
//!
//! The deploy branch is cloned into a temporary directory, its contents are
//! replaced by the build output, and the result is committed and pushed.
//! A branch that doesn't exist yet is created as an orphan.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use ignore::WalkBuilder;

/// Deploy target settings.
#[derive(Clone, Debug)]
pub struct PublishConfig {
    /// Git remote URL or path.
    pub remote: String,
    /// Branch holding the published site.
    pub branch: String,
    /// Commit message.
    pub message: String,
    /// Commit but don't push.
    pub dry_run: bool,
}

/// Error returned by [`GitPublisher`].
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Build output not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },
}

/// What a deploy did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeployOutcome {
    /// The branch already matched the build output.
    UpToDate,
    /// A commit was created but not pushed.
    Committed { files: usize },
    /// A commit was created and pushed.
    Pushed { files: usize },
}

/// Publishes a built site directory to a git branch.
pub struct GitPublisher {
    config: PublishConfig,
}

impl GitPublisher {
    #[must_use]
    pub fn new(config: PublishConfig) -> Self {
        Self { config }
    }

    /// Publish `directory` to the configured branch.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing, a git command fails, or
    /// files can't be copied.
    pub fn publish(&self, directory: &Path) -> Result<DeployOutcome, DeployError> {
        if !directory.is_dir() {
            return Err(DeployError::DirectoryNotFound(directory.to_path_buf()));
        }
        let files = collect_files(directory)?;

        let workdir = tempfile::tempdir()?;
        let repo = workdir.path();
        self.checkout(repo)?;

        clear_worktree(repo)?;
        for (relative, source) in &files {
            let target = repo.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(source, &target)?;
        }
        tracing::debug!(files = files.len(), "Copied build output into worktree");

        git(repo, ["add", "--all"])?;
        let status = git(repo, ["status", "--porcelain"])?;
        if status.stdout.is_empty() {
            tracing::info!(branch = %self.config.branch, "Deploy branch is up to date");
            return Ok(DeployOutcome::UpToDate);
        }
        git(repo, ["commit", "--quiet", "-m", self.config.message.as_str()])?;

        if self.config.dry_run {
            tracing::info!(branch = %self.config.branch, "Dry run, skipping push");
            return Ok(DeployOutcome::Committed { files: files.len() });
        }

        git(repo, ["push", "--quiet", "origin", self.config.branch.as_str()])?;
        tracing::info!(
            remote = %self.config.remote,
            branch = %self.config.branch,
            "Pushed deploy commit"
        );
        Ok(DeployOutcome::Pushed { files: files.len() })
    }

    /// Clone the deploy branch, or start an orphan branch when it's missing.
    fn checkout(&self, repo: &Path) -> Result<(), DeployError> {
        let PublishConfig { remote, branch, .. } = &self.config;

        if self.branch_exists()? {
            tracing::debug!(%remote, %branch, "Cloning deploy branch");
            let target = repo.as_os_str();
            git(
                repo,
                [
                    OsStr::new("clone"),
                    OsStr::new("--quiet"),
                    OsStr::new("--depth"),
                    OsStr::new("1"),
                    OsStr::new("--branch"),
                    OsStr::new(branch),
                    OsStr::new(remote),
                    target,
                ],
            )?;
        } else {
            tracing::info!(%branch, "Deploy branch not found, creating it");
            git(repo, ["init", "--quiet"])?;
            git(repo, ["checkout", "--quiet", "--orphan", branch.as_str()])?;
            git(repo, ["remote", "add", "origin", remote.as_str()])?;
        }
        Ok(())
    }

    fn branch_exists(&self) -> Result<bool, DeployError> {
        let output = Command::new("git")
            .args(["ls-remote", "--exit-code", "--heads"])
            .arg(&self.config.remote)
            .arg(&self.config.branch)
            .output()?;
        match output.status.code() {
            Some(0) => Ok(true),
            // --exit-code: no matching refs
            Some(2) => Ok(false),
            _ => Err(git_error("ls-remote", &output)),
        }
    }
}

/// Run git in `dir`, failing on a non-zero exit.
fn git<I, S>(dir: &Path, args: I) -> Result<Output, DeployError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let output = Command::new("git").args(&args).current_dir(dir).output()?;
    if output.status.success() {
        Ok(output)
    } else {
        let command = args
            .first()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .unwrap_or_default();
        Err(git_error(&command, &output))
    }
}

fn git_error(command: &str, output: &Output) -> DeployError {
    DeployError::Git {
        command: command.to_owned(),
        message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
    }
}

/// Remove everything in the worktree except `.git`.
fn clear_worktree(repo: &Path) -> io::Result<()> {
    for entry in fs::read_dir(repo)? {
        let entry = entry?;
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

/// Files under `directory` as (`/`-separated relative path, absolute path),
/// sorted by relative path. Symlinks are followed.
fn collect_files(directory: &Path) -> io::Result<Vec<(String, PathBuf)>> {
    let walker = WalkBuilder::new(directory)
        .standard_filters(false)
        .hidden(false)
        .follow_links(true)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.into_path();
        if let Ok(relative) = path.strip_prefix(directory) {
            let relative = relative.to_string_lossy().replace('\\', "/");
            files.push((relative, path));
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok()
    }

    fn set_identity() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("GIT_AUTHOR_NAME", "Folio Test");
            std::env::set_var("GIT_AUTHOR_EMAIL", "folio@example.com");
            std::env::set_var("GIT_COMMITTER_NAME", "Folio Test");
            std::env::set_var("GIT_COMMITTER_EMAIL", "folio@example.com");
        }
    }

    fn site(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn publisher(remote: &Path, dry_run: bool) -> GitPublisher {
        GitPublisher::new(PublishConfig {
            remote: remote.to_string_lossy().into_owned(),
            branch: "gh-pages".to_owned(),
            message: "Deploy website".to_owned(),
            dry_run,
        })
    }

    fn branch_files(remote: &Path) -> Vec<String> {
        let output = Command::new("git")
            .args(["ls-tree", "-r", "--name-only", "gh-pages"])
            .current_dir(remote)
            .output()
            .unwrap();
        String::from_utf8(output.stdout)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn test_collect_files_sorted_relative() {
        let dir = site(&[("b.html", ""), ("a/index.html", ""), (".nojekyll", "")]);
        let files: Vec<String> = collect_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|(rel, _)| rel)
            .collect();
        assert_eq!(files, vec![".nojekyll", "a/index.html", "b.html"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_files_follows_symlinked_dirs() {
        let dir = site(&[("index.html", "")]);
        let shared = site(&[("logo.svg", "<svg/>")]);
        std::os::unix::fs::symlink(shared.path(), dir.path().join("img")).unwrap();

        let files = collect_files(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|(rel, _)| rel.as_str()).collect();
        assert_eq!(names, vec!["img/logo.svg", "index.html"]);
        assert_eq!(fs::read_to_string(&files[0].1).unwrap(), "<svg/>");
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = publisher(dir.path(), true)
            .publish(&dir.path().join("build"))
            .unwrap_err();
        assert!(matches!(err, DeployError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_publish_to_new_then_existing_branch() {
        if !git_available() {
            return;
        }
        set_identity();
        let remote = tempfile::tempdir().unwrap();
        git(remote.path(), ["init", "--quiet", "--bare"]).unwrap();

        let first = site(&[("index.html", "v1"), ("docs/intro/index.html", "intro")]);
        let outcome = publisher(remote.path(), false).publish(first.path()).unwrap();
        assert_eq!(outcome, DeployOutcome::Pushed { files: 2 });
        assert_eq!(
            branch_files(remote.path()),
            vec!["docs/intro/index.html", "index.html"]
        );

        let second = site(&[("index.html", "v2")]);
        let outcome = publisher(remote.path(), false).publish(second.path()).unwrap();
        assert_eq!(outcome, DeployOutcome::Pushed { files: 1 });
        assert_eq!(branch_files(remote.path()), vec!["index.html"]);

        let outcome = publisher(remote.path(), false).publish(second.path()).unwrap();
        assert_eq!(outcome, DeployOutcome::UpToDate);
    }

    #[test]
    fn test_dry_run_does_not_push() {
        if !git_available() {
            return;
        }
        set_identity();
        let remote = tempfile::tempdir().unwrap();
        git(remote.path(), ["init", "--quiet", "--bare"]).unwrap();

        let build = site(&[("index.html", "home")]);
        let outcome = publisher(remote.path(), true).publish(build.path()).unwrap();
        assert_eq!(outcome, DeployOutcome::Committed { files: 1 });
        assert!(branch_files(remote.path()).is_empty());
    }
}
