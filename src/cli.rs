use crate::{
    api::{CreateOptions, PkgError},
    config::Config,
    github::UrlKind,
    license::DEFAULT_LICENSE_API,
    prompt::PromptMode,
    settings::{
        PartialSettings, DEFAULT_AUTHOR_MAIL, DEFAULT_AUTHOR_NAME, DEFAULT_DESCRIPTION,
        DEFAULT_GITHUB_REPOSITORYNAME, DEFAULT_GITHUB_USERNAME,
    },
};
use clap::{crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use std::{ffi::OsString, path::PathBuf};

/// Suffix that keeps [`sentence_style`] from adding a final period.
pub const NO_PERIOD: &str = "<FORMATTER:NOPERIOD>";

const SETTINGS_HEADING: &str = "Project settings";
const URLS_HEADING: &str = "Project urls";
const CONFIG_ENV: &str = "PKGCREATOR_CONFIG";
const LIST_LICENSES_FLAG: &str = "--list-licenses";

/// Starts `text` with a capital letter and ends it with punctuation.
///
/// Unlike a plain capitalisation the rest of the text is untouched, so uppercase words
/// survive. Text ending in [`NO_PERIOD`] loses the marker instead of gaining a period.
pub fn sentence_style(text: &str) -> String {
    let mut chars = text.chars();
    let mut sentence: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => return String::new(),
    };

    if sentence.ends_with(['.', '!', '?']) {
        return sentence;
    }

    match sentence.strip_suffix(NO_PERIOD) {
        Some(stripped) => sentence = stripped.trim_end().to_string(),
        None => sentence.push('.'),
    }

    sentence
}

/// Value name shown as `<NAME>`, or `<NAME={a,b}>` when the value has fixed choices.
pub fn metavar(name: &str, choices: &[&str]) -> String {
    if choices.is_empty() {
        name.to_uppercase()
    } else {
        format!("{}={{{}}}", name.to_uppercase(), choices.join(","))
    }
}

fn settings_arg(id: &'static str, default: &str) -> Arg {
    Arg::new(id)
        .long(id)
        .value_name(metavar(id, &[]))
        .help_heading(SETTINGS_HEADING)
        .help(sentence_style(&format!(
            "{} (default: {})",
            id.replace('-', " "),
            default
        )))
}

fn url_arg(kind: UrlKind) -> Arg {
    let id = kind.as_str();

    Arg::new(id)
        .long(id)
        .value_name(metavar("url", &[]))
        .help_heading(URLS_HEADING)
        .help(sentence_style(&format!("url to {}", id)))
}

/// Builds the `pkgcreator` command line with consistently formatted help.
pub fn build_command() -> Command {
    let mut command = Command::new(crate_name!())
        .about(sentence_style(
            "create a new Python package structure with optional license",
        ))
        .after_help(sentence_style(
            "unset project urls are derived from the github settings",
        ))
        .version(crate_version!())
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .action(ArgAction::Help)
                .help(sentence_style("show this help message and exit")),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .action(ArgAction::Version)
                .help(sentence_style("show the version and exit")),
        )
        .arg(
            Arg::new("name")
                .value_name(metavar("name", &[]))
                .required(true)
                .help(sentence_style("name of the Python package to create")),
        )
        .arg(
            Arg::new("destination")
                .short('d')
                .long("destination")
                .value_name(metavar("destination", &[]))
                .value_parser(value_parser!(PathBuf))
                .default_value(".")
                .hide_default_value(true)
                .help(sentence_style(
                    "destination directory for the package structure (default: current directory)",
                )),
        )
        .arg(
            Arg::new("prompt-mode")
                .short('m')
                .long("prompt-mode")
                .value_name(metavar("mode", &PromptMode::VARIANTS))
                .value_parser(PromptMode::VARIANTS)
                .hide_possible_values(true)
                .default_value("ask")
                .hide_default_value(true)
                .help(sentence_style(
                    "control prompts for user interaction: ask (default), yes (always accept), \
                     no (always decline), auto (decide automatically)",
                )),
        )
        .arg(
            Arg::new("init-git")
                .short('i')
                .long("init-git")
                .action(ArgAction::SetTrue)
                .help(sentence_style(
                    "initialise Git repository and commit created files",
                )),
        )
        .arg(
            Arg::new("init-venv")
                .short('v')
                .long("init-venv")
                .action(ArgAction::SetTrue)
                .help(sentence_style(
                    "initialise a virtual environment and install package in editable mode",
                )),
        )
        .arg(
            Arg::new("script")
                .short('s')
                .long("script")
                .action(ArgAction::SetTrue)
                .help(sentence_style("also create a '__main__.py' entry point")),
        )
        .arg(
            Arg::new("license")
                .short('l')
                .long("license")
                .value_name(metavar("license_id", &[]))
                .help(sentence_style("optional license to include in the package")),
        )
        .arg(
            Arg::new("list-licenses")
                .long("list-licenses")
                .action(ArgAction::SetTrue)
                .help(sentence_style("list all available licenses and exit")),
        )
        .arg(
            Arg::new("license-api")
                .long("license-api")
                .value_name(metavar("url", &[]))
                .help(sentence_style(&format!(
                    "url listing the available licenses (default: {}){}",
                    DEFAULT_LICENSE_API, NO_PERIOD
                ))),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .env(CONFIG_ENV)
                .hide_env(true)
                .value_name(metavar("path", &[]))
                .value_parser(value_parser!(PathBuf))
                .help(sentence_style(&format!(
                    "toml file with default settings (env: {})",
                    CONFIG_ENV
                ))),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help(sentence_style("enable verbose output")),
        )
        .arg(settings_arg("description", DEFAULT_DESCRIPTION))
        .arg(settings_arg("author-name", DEFAULT_AUTHOR_NAME))
        .arg(settings_arg("author-mail", DEFAULT_AUTHOR_MAIL))
        .arg(settings_arg("github-username", DEFAULT_GITHUB_USERNAME))
        .arg(settings_arg(
            "github-repositoryname",
            DEFAULT_GITHUB_REPOSITORYNAME,
        ));

    for kind in UrlKind::PROJECT {
        command = command.arg(url_arg(kind));
    }

    command
}

/// Parses `args` (program name first) with [`build_command`].
///
/// The package name is required except when `--list-licenses` is given.
pub fn matches_from<I, T>(args: I) -> Result<ArgMatches, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let listing = args.iter().skip(1).any(|arg| arg == LIST_LICENSES_FLAG);

    build_command()
        .mut_arg("name", |name| name.required(!listing))
        .try_get_matches_from(args)
}

/// What the parsed command line asks for.
#[derive(Debug, Clone)]
pub enum Action {
    Create(CreateOptions),
    ListLicenses { api_url: String },
}

fn string_arg(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

/// Turns parsed arguments into an [`Action`].
///
/// Command line values win over the config file, which wins over the built-in
/// defaults.
pub fn parse_action(matches: &ArgMatches) -> Result<Action, PkgError> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let api_url = string_arg(matches, "license-api")
        .or(config.license_api)
        .unwrap_or_else(|| DEFAULT_LICENSE_API.to_string());

    if matches.get_flag("list-licenses") {
        return Ok(Action::ListLicenses { api_url });
    }

    let name = matches
        .get_one::<String>("name")
        .expect("name required unless listing licenses");
    let destination = matches
        .get_one::<PathBuf>("destination")
        .expect("destination has a default");

    let mut options = CreateOptions::new(name, destination);
    options.settings.apply(&config.settings);
    options.settings.apply(&PartialSettings {
        license: string_arg(matches, "license"),
        description: string_arg(matches, "description"),
        author_name: string_arg(matches, "author-name"),
        author_mail: string_arg(matches, "author-mail"),
        github_username: string_arg(matches, "github-username"),
        github_repositoryname: string_arg(matches, "github-repositoryname"),
    });
    for kind in UrlKind::PROJECT {
        if let Some(url) = matches.get_one::<String>(kind.as_str()) {
            options.settings.set_url(kind, url);
        }
    }

    options.prompt_mode = match matches.get_one::<String>("prompt-mode") {
        Some(mode) => mode.parse()?,
        None => PromptMode::default(),
    };
    options.init_git = matches.get_flag("init-git");
    options.init_venv = matches.get_flag("init-venv");
    options.with_main_module = matches.get_flag("script");
    options.license_api = api_url;

    Ok(Action::Create(options))
}
