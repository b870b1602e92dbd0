use std::{fs, marker::PhantomData, path::PathBuf};

/// Something a [`Transaction`] created on disk and knows how to remove again.
#[derive(Debug, Clone, PartialEq)]
pub enum Created {
    File(PathBuf),
    Dir(PathBuf),
}
impl Created {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::File(path) | Self::Dir(path) => path,
        }
    }
}
/// Transaction still writing, everything is undone on drop.
pub struct Pending;
/// Transaction that finished writing, nothing is undone on drop.
pub struct Committed;

pub trait Outcome {
    const UNDO_ON_DROP: bool;
}
impl Outcome for Pending {
    const UNDO_ON_DROP: bool = true;
}
impl Outcome for Committed {
    const UNDO_ON_DROP: bool = false;
}
/// Records the files and directories written while materialising a package.
///
/// A `Transaction<Pending>` that is dropped, e.g. because `?` returned early after a
/// failed write, removes everything it recorded in reverse order. Directories are
/// removed with [`fs::remove_dir`], so a directory that somehow gained foreign content
/// is left alone.
///
/// ```rust
/// use pkgcreator::transactions::{Created, Transaction};
///
/// let mut trx = Transaction::new();
/// trx.record(Created::Dir("some/dir".into()));
/// let done = trx.commit(); // kept on disk
/// assert_eq!(done.created().len(), 1);
/// ```
pub struct Transaction<S: Outcome = Pending> {
    created: Vec<Created>,
    state: PhantomData<S>,
}
impl Default for Transaction<Pending> {
    fn default() -> Self {
        Self::new()
    }
}
impl Transaction<Pending> {
    pub fn new() -> Self {
        Transaction {
            created: vec![],
            state: PhantomData,
        }
    }

    pub fn record(&mut self, created: Created) {
        self.created.push(created);
    }

    /// Keeps everything recorded so far.
    pub fn commit(mut self) -> Transaction<Committed> {
        let created = std::mem::take(&mut self.created);

        Transaction {
            created,
            state: PhantomData,
        }
    }
}
impl<S: Outcome> Transaction<S> {
    pub fn created(&self) -> &[Created] {
        &self.created
    }
}
impl<S: Outcome> Drop for Transaction<S> {
    fn drop(&mut self) {
        if !S::UNDO_ON_DROP {
            log::debug!("kept {} created paths", self.created.len());
            return;
        }
        if self.created.is_empty() {
            return;
        }

        log::debug!("rolling back {} created paths", self.created.len());
        while let Some(created) = self.created.pop() {
            let result = match &created {
                Created::File(path) => fs::remove_file(path),
                Created::Dir(path) => fs::remove_dir(path),
            };
            match result {
                Ok(()) => log::debug!("removed {}", created.path().display()),
                Err(error) => log::warn!(
                    "Could not remove '{}' during rollback: {}",
                    created.path().display(),
                    error
                ),
            }
        }
    }
}
