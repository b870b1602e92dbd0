use clap::{crate_version, Arg, ArgAction, Command};
use pkgcreator::{
    cli::{self, sentence_style},
    github::{self, GithubRepository},
    logging,
};
use std::path::PathBuf;

// The CLI layer should only parse inputs and forward them to library code.
fn main() -> miette::Result<()> {
    let matches = Command::new("github-download")
        .about(sentence_style(
            "download a folder or a whole repository from GitHub without cloning it",
        ))
        .version(crate_version!())
        .arg(
            Arg::new("owner")
                .required(true)
                .help(sentence_style("owner of the GitHub repository")),
        )
        .arg(
            Arg::new("repository")
                .required(true)
                .help(sentence_style("name of the GitHub repository")),
        )
        .arg(
            Arg::new("branch")
                .short('b')
                .long("branch")
                .default_value("main")
                .help(sentence_style("branch to download from")),
        )
        .arg(
            Arg::new("subfolder")
                .short('s')
                .long("subfolder")
                .help(sentence_style(
                    "folder of the repository to download (default: everything)",
                )),
        )
        .arg(
            Arg::new("destination")
                .short('d')
                .long("destination")
                .value_parser(clap::value_parser!(PathBuf))
                .help(sentence_style(
                    "target directory (default: 'downloaded_<REPOSITORY>')",
                )),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .default_value(github::DEFAULT_API_URL)
                .hide_default_value(true)
                .help(sentence_style(&format!(
                    "github compatible repository api (default: {}){}",
                    github::DEFAULT_API_URL,
                    cli::NO_PERIOD
                ))),
        )
        .arg(
            Arg::new("no-recursive")
                .short('n')
                .long("no-recursive")
                .action(ArgAction::SetTrue)
                .help(sentence_style("do not descend into sub folders")),
        )
        .get_matches();

    logging::init(false);

    let owner = matches.get_one::<String>("owner").expect("owner required");
    let name = matches
        .get_one::<String>("repository")
        .expect("repository required");
    let branch = matches
        .get_one::<String>("branch")
        .expect("branch has a default");
    let subfolder = matches.get_one::<String>("subfolder").map(String::as_str);
    let destination = matches
        .get_one::<PathBuf>("destination")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format!("downloaded_{}", name)));

    let api_url = matches
        .get_one::<String>("api-url")
        .expect("api url has a default");

    let repository = GithubRepository::new(owner, name)
        .with_branch(branch)
        .with_api_url(api_url);
    let client = github::http_client()?;

    let downloaded = repository.download(
        &client,
        &destination,
        subfolder,
        None,
        !matches.get_flag("no-recursive"),
    )?;

    log::info!(
        "Downloaded {} files to {}",
        downloaded,
        destination.display()
    );

    Ok(())
}
