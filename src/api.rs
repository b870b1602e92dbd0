use crate::{
    config,
    content::{self, FileContent},
    git::{self, GitRepository},
    license::{self, LicenseCatalog, Licenses},
    preview,
    prompt::{self, decide, PromptMode},
    settings::ProjectSettings,
    structure::{self, PythonPackage},
    venv::{self, VirtualEnvironment},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

const INITIAL_COMMIT_MESSAGE: &str = "Created repository and initial commit";

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PkgError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Structure(#[from] structure::StructureError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Content(#[from] content::ContentError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] prompt::PromptError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    License(#[from] license::LicenseError),
}

/// Everything needed to create one package.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub settings: ProjectSettings,
    pub destination: PathBuf,
    pub prompt_mode: PromptMode,
    pub init_git: bool,
    pub init_venv: bool,
    pub with_main_module: bool,
    pub license_api: String,
}
impl CreateOptions {
    pub fn new<P: AsRef<Path>>(name: &str, destination: P) -> Self {
        Self {
            settings: ProjectSettings::new(name),
            destination: destination.as_ref().to_path_buf(),
            prompt_mode: PromptMode::default(),
            init_git: false,
            init_venv: false,
            with_main_module: false,
            license_api: license::DEFAULT_LICENSE_API.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Creation {
    Created { project_path: PathBuf },
    Aborted,
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Creates a package as described by `options`.
///
/// Settings still at their placeholder values are offered a better value first, then
/// the user confirms the settings. In [`PromptMode::No`] the package is created
/// regardless of that confirmation. Git and venv setup run when requested by flag or
/// prompt; their failures are logged and do not fail the creation.
///
/// # Errors
///
/// Returns a [`PkgError`] if:
///
/// - The project directory already exists.
/// - Prompting the user fails.
/// - A file template cannot be rendered.
/// - A directory or file cannot be created or written to.
pub fn create_package(options: CreateOptions) -> Result<Creation, PkgError> {
    let CreateOptions {
        mut settings,
        destination,
        prompt_mode,
        init_git,
        init_venv,
        with_main_module,
        license_api,
    } = options;

    let package = PythonPackage::new(&destination, &settings.name)
        .with_main_module(with_main_module);
    let project_path = package.project_path();

    package.ensure_absent()?;

    prompt::patch_defaults(&mut settings, package.name(), prompt_mode)?;

    if prompt_mode == PromptMode::Ask {
        preview::print_preview(&package.structure(), &absolute(package.parent_dir()));
    }

    let message = format!(
        "Settings:\n{}\nCreate package '{}' at '{}'?",
        settings,
        package.name(),
        absolute(package.parent_dir()).join(&settings.name).display()
    );
    if !decide(&message, prompt_mode, true)? && prompt_mode != PromptMode::No {
        log::info!("Creation aborted");
        return Ok(Creation::Aborted);
    }

    let license_text = content::license_text(&settings, &license_api);
    let file_content = FileContent::build(
        &settings,
        license_text,
        &venv::requires_python(),
        with_main_module,
    )?;

    package.create(&file_content)?;
    log::info!(
        "Created project '{}' at '{}'",
        package.name(),
        project_path.display()
    );

    if init_git || decide("Initialise Git repository and commit?", prompt_mode, false)? {
        if let Err(error) = initialise_git(&project_path, &settings) {
            log::error!("{}", error);
        }
    }

    if init_venv
        || decide(
            "Initialise venv and install package in editable mode?",
            prompt_mode,
            false,
        )?
    {
        if let Err(error) = initialise_venv(&project_path) {
            log::error!("{}", error);
        }
    }

    Ok(Creation::Created { project_path })
}

fn initialise_git(project_path: &Path, settings: &ProjectSettings) -> Result<(), git::GitError> {
    let repository = GitRepository::new(project_path);

    repository.init()?;
    repository.add_all()?;
    repository.commit(
        INITIAL_COMMIT_MESSAGE,
        (settings.author_name.as_str(), settings.author_mail.as_str()),
    )?;

    Ok(())
}

fn initialise_venv(project_path: &Path) -> Result<(), venv::VenvError> {
    let environment = VirtualEnvironment::new(project_path);

    environment.create()?;
    environment.install(&[], &[absolute(project_path).display().to_string()])?;

    Ok(())
}

/// Fetches and logs the ids of every license available at `api_url`.
pub fn list_licenses(api_url: &str) -> Result<Licenses, PkgError> {
    let licenses = LicenseCatalog::new(api_url)?.available()?;

    let ids: Vec<&str> = licenses.keys().map(String::as_str).collect();
    log::info!("Available licenses are:\n{}", ids.join(", "));

    Ok(licenses)
}
