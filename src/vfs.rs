use crate::{
    content::FileContent,
    errors::{FileOperation, IoError},
    structure::DirSpec,
    transactions::{Created, Transaction},
};
use colored::Colorize;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

/// A directory or file staged in memory before it is written to disk.
#[derive(Debug, Clone, PartialEq)]
pub enum VirtualEntry {
    /// Directory, relative to the destination root.
    Dir(PathBuf),
    /// File relative to the destination root, with the content to write into it.
    File(PathBuf, String),
}
impl VirtualEntry {
    pub fn path(&self) -> &Path {
        match self {
            Self::Dir(path) | Self::File(path, _) => path,
        }
    }
}
/// Ordered list of entries, every directory is staged before its children.
#[derive(Debug, Clone, Default)]
pub struct VirtualFS {
    pub entries: Vec<VirtualEntry>,
}
impl VirtualFS {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Stages `spec` with every file filled from `content` (empty when missing).
    pub fn stage(spec: &DirSpec, content: &FileContent) -> Self {
        let mut vfs = Self::new();
        vfs.stage_dir(Path::new(""), spec, content);
        vfs
    }

    fn stage_dir(&mut self, relative: &Path, spec: &DirSpec, content: &FileContent) {
        for (dir_name, sub_spec) in &spec.dirs {
            let dir = relative.join(dir_name);
            self.entries.push(VirtualEntry::Dir(dir.clone()));
            self.stage_dir(&dir, sub_spec, content);
        }

        for file_name in &spec.files {
            let text = content.get(file_name).unwrap_or_default().to_string();
            self.entries
                .push(VirtualEntry::File(relative.join(file_name), text));
        }
    }

    /// Writes every entry below `root`, recording each one in `trx`.
    ///
    /// Nothing is overwritten: directories must not exist yet and files are opened with
    /// `create_new`.
    pub fn apply(&self, root: &Path, trx: &mut Transaction) -> Result<(), IoError> {
        for entry in &self.entries {
            let path = root.join(entry.path());

            match entry {
                VirtualEntry::Dir(_) => {
                    fs::create_dir(&path)
                        .map_err(|error| IoError::new(FileOperation::Mkdir, path.clone(), error))?;

                    trx.record(Created::Dir(path.clone()));
                }
                VirtualEntry::File(_, text) => {
                    let mut file = OpenOptions::new()
                        .write(true)
                        .create_new(true)
                        .open(&path)
                        .map_err(|error| {
                            IoError::new(FileOperation::CreateFile, path.clone(), error)
                        })?;

                    trx.record(Created::File(path.clone()));

                    file.write_all(text.as_bytes())
                        .map_err(|error| IoError::new(FileOperation::Write, path.clone(), error))?;
                }
            }

            println!("{} {}", "create".green(), path.display());
        }

        Ok(())
    }
}
