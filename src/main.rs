use pkgcreator::{
    api::{self, Creation},
    cli::{self, Action},
    logging,
};

// The CLI layer should only parse inputs and forward them to library code.
fn main() -> miette::Result<()> {
    let matches = cli::matches_from(std::env::args_os()).unwrap_or_else(|error| error.exit());

    logging::init(matches.get_flag("verbose"));

    match cli::parse_action(&matches)? {
        Action::ListLicenses { api_url } => {
            api::list_licenses(&api_url)?;
        }
        Action::Create(options) => {
            if let Creation::Aborted = api::create_package(options)? {
                log::debug!("nothing was created");
            }
        }
    }

    Ok(())
}
