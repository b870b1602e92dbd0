use crate::errors::{FileOperation, IoError};
use miette::Diagnostic;
use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};
use thiserror::Error;

pub const DEFAULT_VENV_NAME: &str = ".venv";

/// Used for `requires-python` when no interpreter can be asked.
pub const FALLBACK_PYTHON_VERSION: &str = "3.00";

const INTERPRETERS: [&str; 2] = ["python3", "python"];

#[derive(Debug, Error, Diagnostic)]
pub enum VenvError {
    #[error("{} already exists!", .path.display())]
    #[diagnostic(code(pkgcreator::venv::exists))]
    Exists { path: PathBuf },

    #[error("no python interpreter found on PATH")]
    #[diagnostic(
        code(pkgcreator::venv::no_interpreter),
        help("Install Python 3 and make sure `python3` or `python` is on your PATH")
    )]
    NoInterpreter,

    #[error("No python executable found in {}!", .path.display())]
    #[diagnostic(code(pkgcreator::venv::no_python_in_venv))]
    NoPythonInVenv { path: PathBuf },

    #[error("unable to run '{program}'")]
    #[diagnostic(code(pkgcreator::venv::spawn))]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed with {status}")]
    #[diagnostic(code(pkgcreator::venv::command_failed))]
    CommandFailed { command: String, status: ExitStatus },

    #[error("I/O error within venv domain")]
    #[diagnostic(code(pkgcreator::venv::io))]
    Io(#[from] IoError),
}

/// First interpreter of [`INTERPRETERS`] found on `PATH`.
pub fn python_interpreter() -> Option<PathBuf> {
    INTERPRETERS
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Parses `Python 3.12.1` style version output into `(3, 12)`.
pub fn parse_python_version(text: &str) -> Option<(u32, u32)> {
    lazy_static::lazy_static! {
        static ref PYTHON_VERSION_REGEX: regex::Regex =
            regex::Regex::new(r"Python (\d+)\.(\d+)").expect("a valid regex pattern");
    }

    let captures = PYTHON_VERSION_REGEX.captures(text)?;
    let major = captures.get(1)?.as_str().parse().ok()?;
    let minor = captures.get(2)?.as_str().parse().ok()?;

    Some((major, minor))
}

pub fn python_version(python: &Path) -> Option<(u32, u32)> {
    let output = Command::new(python).arg("--version").output().ok()?;

    // python 2 reports its version on stderr
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    parse_python_version(&text)
}

/// Minimum python version for generated manifests, e.g. `3.12` or `3.09`.
pub fn requires_python() -> String {
    python_interpreter()
        .and_then(|python| python_version(&python))
        .map(|(major, minor)| format!("{}.{:02}", major, minor))
        .unwrap_or_else(|| FALLBACK_PYTHON_VERSION.to_string())
}

fn describe(command: &Command) -> String {
    let mut parts = vec![command.get_program().to_string_lossy().to_string()];
    parts.extend(command.get_args().map(|arg| arg.to_string_lossy().to_string()));
    parts.join(" ")
}

/// Runs `command` to completion and forwards its output to the log, line by line.
///
/// Standard output is logged as info, standard error as warnings. A non-zero exit is
/// an error.
pub fn run_logged(command: &mut Command) -> Result<(), VenvError> {
    let description = describe(command);
    log::debug!("running {}", description);

    let output = command.output().map_err(|source| VenvError::Spawn {
        program: command.get_program().to_string_lossy().to_string(),
        source,
    })?;

    for line in String::from_utf8_lossy(&output.stdout).lines() {
        log::info!("{}", line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        log::warn!("{}", line);
    }

    if output.status.success() {
        Ok(())
    } else {
        Err(VenvError::CommandFailed {
            command: description,
            status: output.status,
        })
    }
}

/// Runs `<python> -m pip install [args...] <package>`.
pub fn pip_install(python: &Path, package: &str, args: &[&str]) -> Result<(), VenvError> {
    run_logged(
        Command::new(python)
            .args(["-m", "pip", "install"])
            .args(args)
            .arg(package),
    )
}

/// A python virtual environment inside a project directory.
#[derive(Debug, Clone)]
pub struct VirtualEnvironment {
    venv_dir: PathBuf,
}
impl VirtualEnvironment {
    pub fn new<P: AsRef<Path>>(parent_dir: P) -> Self {
        Self {
            venv_dir: parent_dir.as_ref().join(DEFAULT_VENV_NAME),
        }
    }

    pub fn venv_dir(&self) -> &Path {
        &self.venv_dir
    }

    /// Python executable inside the environment.
    pub fn python(&self) -> Result<PathBuf, VenvError> {
        let candidates = [
            self.venv_dir.join("bin").join("python.exe"),
            self.venv_dir.join("Scripts").join("python.exe"),
            self.venv_dir.join("bin").join("python"),
        ];

        candidates
            .into_iter()
            .find(|path| path.exists())
            .ok_or_else(|| VenvError::NoPythonInVenv {
                path: self.venv_dir.clone(),
            })
    }

    /// Creates the environment with the python interpreter found on `PATH`.
    pub fn create(&self) -> Result<(), VenvError> {
        if self.venv_dir.exists() {
            return Err(VenvError::Exists {
                path: self.venv_dir.clone(),
            });
        }

        let python = python_interpreter().ok_or(VenvError::NoInterpreter)?;

        log::info!(
            "Creating venv in {} (this may take some time)...",
            self.venv_dir.display()
        );

        run_logged(
            Command::new(&python)
                .args(["-m", "venv"])
                .arg(&self.venv_dir),
        )?;

        let gitignore = self.venv_dir.join(".gitignore");
        if !gitignore.exists() {
            fs::write(&gitignore, "*\n")
                .map_err(|error| IoError::new(FileOperation::Write, gitignore, error))?;
        }

        log::info!("Finished creating venv in {}.", self.venv_dir.display());

        Ok(())
    }

    /// Installs `packages`, then `editable` packages with `pip install -e`.
    ///
    /// A failed installation is logged and the remaining packages are still installed.
    /// Returns the number of successful installations.
    pub fn install(&self, packages: &[String], editable: &[String]) -> Result<usize, VenvError> {
        let python = self.python()?;

        let plain = packages.iter().map(|package| (package, false));
        let editable = editable.iter().map(|package| (package, true));

        let mut installed = 0;
        for (package, is_editable) in plain.chain(editable) {
            let args: &[&str] = if is_editable { &["-e"] } else { &[] };

            match pip_install(&python, package, args) {
                Ok(()) => installed += 1,
                Err(error) if is_editable => {
                    log::error!("Did not install editable package {}: {}", package, error)
                }
                Err(error) => log::error!("Did not install package {}: {}", package, error),
            }
        }

        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python_version() {
        assert_eq!(parse_python_version("Python 3.12.1\n"), Some((3, 12)));
        assert_eq!(parse_python_version("Python 2.7.18"), Some((2, 7)));
        assert_eq!(parse_python_version("command not found"), None);
    }

    #[test]
    fn test_venv_dir_name() {
        let parent = Path::new("/tmp/demo");

        assert_eq!(
            VirtualEnvironment::new(parent).venv_dir(),
            Path::new("/tmp/demo/.venv")
        );
    }

    #[test]
    fn test_existing_venv_dir_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(DEFAULT_VENV_NAME)).unwrap();

        assert!(matches!(
            VirtualEnvironment::new(dir.path()).create(),
            Err(VenvError::Exists { .. })
        ));
    }

    #[test]
    fn test_python_missing_in_venv() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            VirtualEnvironment::new(dir.path()).python(),
            Err(VenvError::NoPythonInVenv { .. })
        ));
    }

    #[test]
    fn test_run_logged_reports_failure() {
        let result = run_logged(Command::new("sh").args(["-c", "echo out; exit 3"]));

        assert!(matches!(result, Err(VenvError::CommandFailed { .. })));
    }

    #[test]
    #[ignore = "requires python with the venv module"]
    fn test_create_venv() {
        let dir = tempfile::tempdir().unwrap();
        let venv = VirtualEnvironment::new(dir.path());

        venv.create().unwrap();

        assert!(venv.python().unwrap().exists());
        assert!(venv.venv_dir().join(".gitignore").exists());
    }
}
