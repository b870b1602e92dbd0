use crate::{
    content::{FileContent, GITIGNORE, INIT_MODULE, LICENSE, MAIN_MODULE, MANIFEST, README},
    errors::{FileOperation, IoError},
    transactions::{Committed, Created, Transaction},
    vfs::VirtualFS,
};
use indexmap::IndexMap;
use miette::Diagnostic;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum StructureError {
    #[error("The project path '{}' already exists!", .path.display())]
    #[diagnostic(
        code(pkgcreator::structure::package_exists),
        help("Choose another package name or destination, or remove the existing directory")
    )]
    PackageExists { path: PathBuf },

    #[error("I/O error within structure domain")]
    #[diagnostic(code(pkgcreator::structure::io))]
    Io(#[from] IoError),
}

/// Declarative directory tree: plain files plus named sub directories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirSpec {
    pub files: Vec<String>,
    pub dirs: IndexMap<String, DirSpec>,
}
impl DirSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file_name: &str) -> Self {
        self.files.push(file_name.to_string());
        self
    }

    pub fn with_dir(mut self, dir_name: &str, spec: DirSpec) -> Self {
        self.dirs.insert(dir_name.to_string(), spec);
        self
    }

    /// Every file name in the tree, sub directories first.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dirs.values().flat_map(DirSpec::file_names).collect();
        names.extend(self.files.iter().cloned());
        names
    }
}

/// Layout of a `src`-style Python package below `parent_dir`.
#[derive(Debug, Clone)]
pub struct PythonPackage {
    parent_dir: PathBuf,
    dir_name: String,
    name: String,
    with_main_module: bool,
}
impl PythonPackage {
    pub fn new<P: AsRef<Path>>(parent_dir: P, name: &str) -> Self {
        Self {
            parent_dir: parent_dir.as_ref().to_path_buf(),
            dir_name: name.to_string(),
            name: name.to_string(),
            with_main_module: false,
        }
    }

    /// Uses `dir_name` for the project directory instead of the package name.
    pub fn with_dir_name(mut self, dir_name: &str) -> Self {
        self.dir_name = dir_name.to_string();
        self
    }

    /// Adds a `__main__.py` next to `__init__.py`.
    pub fn with_main_module(mut self, with_main_module: bool) -> Self {
        self.with_main_module = with_main_module;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_dir(&self) -> &Path {
        &self.parent_dir
    }

    pub fn project_path(&self) -> PathBuf {
        self.parent_dir.join(&self.dir_name)
    }

    /// The tree rooted at `parent_dir`, holding the single project directory.
    pub fn structure(&self) -> DirSpec {
        let mut module = DirSpec::new().with_file(INIT_MODULE);
        if self.with_main_module {
            module = module.with_file(MAIN_MODULE);
        }

        let project = DirSpec::new()
            .with_dir("src", DirSpec::new().with_dir(&self.name, module))
            .with_file(LICENSE)
            .with_file(README)
            .with_file(MANIFEST)
            .with_file(GITIGNORE);

        DirSpec::new().with_dir(&self.dir_name, project)
    }

    pub fn file_names(&self) -> Vec<String> {
        self.structure().file_names()
    }

    /// Fails when the project directory is already there.
    pub fn ensure_absent(&self) -> Result<(), StructureError> {
        let path = self.project_path();

        match fs::symlink_metadata(&path) {
            Ok(_) => Err(StructureError::PackageExists { path }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(IoError::new(FileOperation::Stat, path, error).into()),
        }
    }

    /// Levels of `parent_dir` that do not exist yet, outermost first.
    fn missing_parent_dirs(&self) -> Vec<PathBuf> {
        let mut missing: Vec<PathBuf> = self
            .parent_dir
            .ancestors()
            .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
            .map(Path::to_path_buf)
            .collect();
        missing.reverse();
        missing
    }

    /// Writes the package to disk.
    ///
    /// Missing levels of `parent_dir` are created. When any write fails, everything created so
    /// far is removed again before the error is returned.
    pub fn create(&self, content: &FileContent) -> Result<Transaction<Committed>, StructureError> {
        self.ensure_absent()?;

        let vfs = VirtualFS::stage(&self.structure(), content);

        let mut trx = Transaction::new();

        for dir in self.missing_parent_dirs() {
            fs::create_dir(&dir)
                .map_err(|error| IoError::new(FileOperation::Mkdir, dir.clone(), error))?;
            trx.record(Created::Dir(dir));
        }

        vfs.apply(&self.parent_dir, &mut trx)?;

        log::debug!("staged {} entries", vfs.entries.len());

        Ok(trx.commit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_and_file_names() {
        let package = PythonPackage::new("/tmp", "demo").with_main_module(true);

        assert_eq!(package.project_path(), PathBuf::from("/tmp/demo"));
        assert_eq!(
            package.file_names(),
            vec![
                "__init__.py",
                "__main__.py",
                "LICENSE",
                "README.md",
                "pyproject.toml",
                ".gitignore"
            ]
        );
    }

    #[test]
    fn test_create_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let package = PythonPackage::new(dir.path(), "demo");

        package.create(&FileContent::default()).unwrap();

        assert!(dir.path().join("demo/src/demo/__init__.py").is_file());
        assert!(matches!(
            package.create(&FileContent::default()),
            Err(StructureError::PackageExists { .. })
        ));
    }

    #[test]
    fn test_create_in_missing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("nested");
        let package = PythonPackage::new(&destination, "demo").with_dir_name("demo-project");

        let committed = package.create(&FileContent::default()).unwrap();

        assert_eq!(committed.created()[0], Created::Dir(destination.clone()));
        assert!(destination.join("demo-project/src/demo").is_dir());
    }

    #[test]
    fn test_failed_create_removes_every_created_parent() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("a/b/c");
        // the module directory cannot be created below a missing "src/sub"
        let package = PythonPackage::new(&destination, "sub/deep").with_dir_name("demo");

        assert!(matches!(
            package.create(&FileContent::default()),
            Err(StructureError::Io(_))
        ));

        assert!(!dir.path().join("a").exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_nested_destination_is_recorded_level_by_level() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("a/b");
        let package = PythonPackage::new(&destination, "demo");

        let committed = package.create(&FileContent::default()).unwrap();

        assert_eq!(
            committed.created()[..2],
            [
                Created::Dir(dir.path().join("a")),
                Created::Dir(destination.clone())
            ]
        );
    }
}
