use git2::{ErrorCode, IndexAddOption, Oid, Repository, Signature, StatusOptions};
use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GitError {
    #[error("a git repository already exists at '{}'", .path.display())]
    #[diagnostic(code(pkgcreator::git::repository_exists))]
    RepositoryExists { path: PathBuf },

    #[error("no git repository found at '{}'", .path.display())]
    #[diagnostic(
        code(pkgcreator::git::repository_not_found),
        help("Initialise the repository first")
    )]
    RepositoryNotFound { path: PathBuf },

    #[error("nothing to commit in '{}'", .path.display())]
    #[diagnostic(code(pkgcreator::git::nothing_to_commit))]
    NothingToCommit { path: PathBuf },

    #[error("git operation failed in '{}'", .path.display())]
    #[diagnostic(code(pkgcreator::git::libgit2))]
    Git {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },
}

/// Reads `key` (e.g. `user.name`) from the global git configuration.
pub fn config_value(key: &str) -> Option<String> {
    let config = git2::Config::open_default().ok()?;

    config
        .get_string(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Git repository rooted at a generated project directory.
#[derive(Debug, Clone)]
pub struct GitRepository {
    path: PathBuf,
}
impl GitRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn wrap(&self) -> impl Fn(git2::Error) -> GitError + '_ {
        move |source| GitError::Git {
            path: self.path.clone(),
            source,
        }
    }

    pub fn exists(&self) -> bool {
        Repository::open(&self.path).is_ok()
    }

    fn open(&self) -> Result<Repository, GitError> {
        Repository::open(&self.path).map_err(|source| match source.code() {
            ErrorCode::NotFound => GitError::RepositoryNotFound {
                path: self.path.clone(),
            },
            _ => self.wrap()(source),
        })
    }

    pub fn init(&self) -> Result<(), GitError> {
        if self.exists() {
            return Err(GitError::RepositoryExists {
                path: self.path.clone(),
            });
        }

        Repository::init(&self.path).map_err(self.wrap())?;

        log::info!("Initialized empty Git repository in {}", self.path.display());

        Ok(())
    }

    /// Stages every file that is not ignored. Returns the number of index entries.
    pub fn add_all(&self) -> Result<usize, GitError> {
        let repo = self.open()?;
        let mut index = repo.index().map_err(self.wrap())?;

        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .map_err(self.wrap())?;
        index.write().map_err(self.wrap())?;

        log::debug!("staged {} files", index.len());

        Ok(index.len())
    }

    /// Commits the index on top of `HEAD`.
    ///
    /// The configured git identity is used, or `fallback` (name, email) when git has none.
    pub fn commit(&self, message: &str, fallback: (&str, &str)) -> Result<Oid, GitError> {
        let repo = self.open()?;
        let mut index = repo.index().map_err(self.wrap())?;
        let tree_id = index.write_tree().map_err(self.wrap())?;
        let tree = repo.find_tree(tree_id).map_err(self.wrap())?;

        let parent = match repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(self.wrap())?),
            Err(error) if matches!(error.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                None
            }
            Err(error) => return Err(self.wrap()(error)),
        };

        let unchanged = match &parent {
            Some(parent) => parent.tree_id() == tree_id,
            None => index.is_empty(),
        };
        if unchanged {
            return Err(GitError::NothingToCommit {
                path: self.path.clone(),
            });
        }

        let signature = match repo.signature() {
            Ok(signature) => signature,
            Err(_) => Signature::now(fallback.0, fallback.1).map_err(self.wrap())?,
        };

        let parents: Vec<&git2::Commit> = parent.iter().collect();
        let oid = repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(self.wrap())?;

        log::info!("[{}] {}", &oid.to_string()[..7], message);

        Ok(oid)
    }

    /// Whether the work tree has no changes and no untracked files.
    pub fn is_clean(&self) -> Result<bool, GitError> {
        let repo = self.open()?;
        let mut options = StatusOptions::new();
        options.include_untracked(true);

        let statuses = repo.statuses(Some(&mut options)).map_err(self.wrap())?;

        Ok(statuses.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FALLBACK: (&str, &str) = ("Test", "test@example.org");

    #[test]
    fn test_init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GitRepository::new(dir.path());

        repo.init().unwrap();

        assert!(repo.exists());
        assert!(matches!(
            repo.init(),
            Err(GitError::RepositoryExists { .. })
        ));
    }

    #[test]
    fn test_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GitRepository::new(dir.path());

        assert!(matches!(
            repo.add_all(),
            Err(GitError::RepositoryNotFound { .. })
        ));

        repo.init().unwrap();
        fs::write(dir.path().join("example_file.txt"), "").unwrap();

        assert_eq!(repo.add_all().unwrap(), 1);
        repo.commit("Test commit", FALLBACK).unwrap();
        assert!(repo.is_clean().unwrap());

        assert!(matches!(
            repo.commit("Test commit", FALLBACK),
            Err(GitError::NothingToCommit { .. })
        ));
    }

    #[test]
    fn test_empty_repository_has_nothing_to_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GitRepository::new(dir.path());
        repo.init().unwrap();

        assert!(matches!(
            repo.commit("Empty", FALLBACK),
            Err(GitError::NothingToCommit { .. })
        ));
    }
}
