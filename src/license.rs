use crate::github::{http_client, ContentEntry, GithubError};
use indexmap::IndexMap;
use miette::Diagnostic;
use reqwest::blocking::Client;
use std::path::Path;
use thiserror::Error;

/// Listing of the license texts published by choosealicense.com.
pub const DEFAULT_LICENSE_API: &str =
    "https://api.github.com/repos/github/choosealicense.com/contents/_licenses";

const FRONT_MATTER_DELIMITER: &str = "\n---\n";

#[derive(Debug, Error, Diagnostic)]
pub enum LicenseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Github(#[from] GithubError),

    #[error("unable to fetch '{url}'")]
    #[diagnostic(
        code(pkgcreator::license::request),
        help("Check your network connection or the license api url")
    )]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("license '{id}' is not available")]
    #[diagnostic(
        code(pkgcreator::license::unknown),
        help("Run with `--list-licenses` to see the available license ids")
    )]
    Unknown { id: String },
}

/// Maps license id to download url, in listing order.
pub type Licenses = IndexMap<String, String>;

/// Keeps the files of a contents listing, keyed by their name without extension.
pub fn licenses_from_listing(entries: Vec<ContentEntry>) -> Licenses {
    entries
        .into_iter()
        .filter(|entry| entry.kind == "file")
        .filter_map(|entry| {
            let id = Path::new(&entry.name)
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())?;

            entry.download_url.map(|url| (id, url))
        })
        .collect()
}

/// Drops a leading front-matter block from a license text.
///
/// The body starts after the first `---` delimiter line; texts without one are
/// returned unchanged.
pub fn strip_front_matter(text: &str) -> &str {
    match text.split(FRONT_MATTER_DELIMITER).nth(1) {
        Some(body) => body.trim_start_matches('\n'),
        None => text,
    }
}

fn get_text(client: &Client, url: &str) -> Result<String, LicenseError> {
    client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(|source| LicenseError::Request {
            url: url.to_string(),
            source,
        })
}

/// Client for a license listing endpoint.
pub struct LicenseCatalog {
    api_url: String,
    client: Client,
}
impl LicenseCatalog {
    pub fn new(api_url: &str) -> Result<Self, LicenseError> {
        Ok(Self {
            api_url: api_url.to_string(),
            client: http_client()?,
        })
    }

    /// Fetches every available license id with its download url.
    pub fn available(&self) -> Result<Licenses, LicenseError> {
        log::debug!("fetching license listing from {}", self.api_url);

        let entries = self
            .client
            .get(&self.api_url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<Vec<ContentEntry>>())
            .map_err(|source| LicenseError::Request {
                url: self.api_url.clone(),
                source,
            })?;

        Ok(licenses_from_listing(entries))
    }

    /// Downloads the text of license `id`, without its front matter.
    pub fn fetch(&self, id: &str) -> Result<String, LicenseError> {
        let licenses = self.available()?;

        let url = licenses
            .get(id)
            .ok_or_else(|| LicenseError::Unknown { id: id.to_string() })?;

        let text = get_text(&self.client, url)?;

        Ok(strip_front_matter(&text).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn entry(name: &str, kind: &str, url: Option<&str>) -> ContentEntry {
        ContentEntry {
            name: name.to_string(),
            kind: kind.to_string(),
            download_url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_listing_keeps_files_without_extension() {
        let licenses = licenses_from_listing(vec![
            entry("mit.txt", "file", Some("https://raw/mit.txt")),
            entry("drafts", "dir", None),
            entry("apache-2.0.txt", "file", Some("https://raw/apache-2.0.txt")),
        ]);

        let ids: Vec<&String> = licenses.keys().collect();
        assert_eq!(ids, vec!["mit", "apache-2.0"]);
        assert_eq!(licenses["mit"], "https://raw/mit.txt");
    }

    #[test]
    fn test_strip_front_matter() {
        let text = "---\ntitle: MIT License\nspdx-id: MIT\n---\n\nMIT License\n\nCopyright";

        assert_eq!(strip_front_matter(text), "MIT License\n\nCopyright");
    }

    #[test]
    fn test_strip_front_matter_without_delimiter() {
        let text = "Plain license text\n";

        assert_eq!(strip_front_matter(text), text);
    }

    #[test]
    fn test_unreachable_api_is_an_error() {
        let catalog = LicenseCatalog::new("http://127.0.0.1:9/licenses").unwrap();

        assert!(matches!(
            catalog.fetch("mit"),
            Err(LicenseError::Request { .. })
        ));
    }

    #[test]
    fn test_fetch_strips_front_matter() {
        let catalog = LicenseCatalog::new(&testing::serve_licenses()).unwrap();

        assert_eq!(catalog.fetch("mit").unwrap(), testing::MIT_LICENSE);
    }

    #[test]
    fn test_available_lists_only_files() {
        let catalog = LicenseCatalog::new(&testing::serve_licenses()).unwrap();

        let licenses = catalog.available().unwrap();

        assert_eq!(licenses.keys().collect::<Vec<_>>(), vec!["mit"]);
        assert!(licenses["mit"].ends_with("/raw/mit.txt"));
    }

    #[test]
    fn test_fetch_unknown_license() {
        let catalog = LicenseCatalog::new(&testing::serve_licenses()).unwrap();

        assert!(matches!(
            catalog.fetch("gpl-3.0"),
            Err(LicenseError::Unknown { id }) if id == "gpl-3.0"
        ));
    }

    #[test]
    #[ignore = "requires network access"]
    fn test_fetch_mit_license() {
        let catalog = LicenseCatalog::new(DEFAULT_LICENSE_API).unwrap();

        let text = catalog.fetch("mit").unwrap();

        assert!(text.starts_with("MIT License"));
    }
}
