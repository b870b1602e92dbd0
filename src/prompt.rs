use crate::{
    git,
    settings::{Field, ProjectSettings},
};
use inquire::Confirm;
use miette::Diagnostic;
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PromptError {
    #[error("Error occurred trying to prompt user")]
    #[diagnostic(
        code(pkgcreator::prompt::inquire),
        help("Use `--prompt-mode yes|no|auto` when not running in an interactive terminal")
    )]
    Inquire(#[from] inquire::InquireError),

    #[error("invalid prompt mode: {value}")]
    #[diagnostic(
        code(pkgcreator::prompt::invalid_mode),
        help("Valid prompt modes are: ['ask', 'yes', 'no', 'auto']")
    )]
    InvalidMode { value: String },
}

/// How questions to the user get answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    /// Ask interactively.
    #[default]
    Ask,
    /// Always accept.
    Yes,
    /// Always decline.
    No,
    /// Use the suggested answer of each question.
    Auto,
}
impl PromptMode {
    pub const VARIANTS: [&'static str; 4] = ["ask", "yes", "no", "auto"];

    fn as_str(&self) -> &str {
        match self {
            Self::Ask => "ask",
            Self::Yes => "yes",
            Self::No => "no",
            Self::Auto => "auto",
        }
    }
}
impl FromStr for PromptMode {
    type Err = PromptError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ask" => Ok(Self::Ask),
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            "auto" => Ok(Self::Auto),
            _ => Err(PromptError::InvalidMode {
                value: value.to_string(),
            }),
        }
    }
}
impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Answers a yes/no question according to `mode`, asking only in [`PromptMode::Ask`].
pub fn decide(message: &str, mode: PromptMode, auto_decision: bool) -> Result<bool, PromptError> {
    match mode {
        PromptMode::Yes => Ok(true),
        PromptMode::No => Ok(false),
        PromptMode::Auto => Ok(auto_decision),
        PromptMode::Ask => Ok(Confirm::new(message).with_default(false).prompt()?),
    }
}

/// Offers values for settings that were left at their placeholder defaults.
///
/// The repository name falls back to the package name, author name and mail to the
/// `user.name`/`user.email` of the git configuration.
pub fn patch_defaults(
    settings: &mut ProjectSettings,
    name: &str,
    mode: PromptMode,
) -> Result<(), PromptError> {
    if settings.is_default(Field::GithubRepositoryName) {
        let message = format!("'--github-repositoryname' was not set. Set to {}?", name);
        if decide(&message, mode, true)? {
            settings.github_repositoryname = name.to_string();
            log::info!("Set '--github-repositoryname' to {}", name);
        }
    }

    let from_git = [
        (Field::AuthorName, "--author-name", "user.name"),
        (Field::AuthorMail, "--author-mail", "user.email"),
    ];
    for (field, option, key) in from_git {
        if !settings.is_default(field) {
            continue;
        }
        let Some(value) = git::config_value(key) else {
            continue;
        };

        let message = format!(
            "'{}' was not set. Set to {} (from 'git config')?",
            option, value
        );
        if decide(&message, mode, true)? {
            match field {
                Field::AuthorName => settings.author_name = value.clone(),
                _ => settings.author_mail = value.clone(),
            }
            log::info!("Set '{}' to {}", option, value);
        }
    }

    Ok(())
}
