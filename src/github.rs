use crate::errors::{FileOperation, IoError};
use miette::Diagnostic;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::{fmt, fs, path::Path};
use thiserror::Error;

const BASE_URL: &str = "https://github.com";
/// Root of the github repository api.
pub const DEFAULT_API_URL: &str = "https://api.github.com/repos";
const DEFAULT_BRANCH: &str = "main";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error, Diagnostic)]
pub enum GithubError {
    #[error("I/O error within github domain")]
    #[diagnostic(code(pkgcreator::github::io))]
    Io(#[from] IoError),

    #[error("unable to build http client")]
    #[diagnostic(code(pkgcreator::github::client))]
    Client(#[source] reqwest::Error),

    #[error("request to '{url}' failed")]
    #[diagnostic(
        code(pkgcreator::github::request),
        help("Check your network connection and that owner, repository and branch exist")
    )]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Builds the blocking client used for every request against github.
///
/// The github api rejects requests without a `User-Agent`, so one is always set.
pub fn http_client() -> Result<Client, GithubError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(GithubError::Client)
}

/// Pages of a repository that can be linked from a generated project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlKind {
    Repository,
    Owner,
    Changelog,
    Documentation,
    Download,
    Funding,
    Homepage,
    Issues,
    ReleaseNotes,
    Source,
}
impl UrlKind {
    /// Url kinds that appear as project urls, in manifest order.
    pub const PROJECT: [UrlKind; 8] = [
        Self::Changelog,
        Self::Documentation,
        Self::Download,
        Self::Funding,
        Self::Homepage,
        Self::Issues,
        Self::ReleaseNotes,
        Self::Source,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Owner => "owner",
            Self::Changelog => "changelog",
            Self::Documentation => "documentation",
            Self::Download => "download",
            Self::Funding => "funding",
            Self::Homepage => "homepage",
            Self::Issues => "issues",
            Self::ReleaseNotes => "releasenotes",
            Self::Source => "source",
        }
    }

    /// Key used in the `[project.urls]` table, e.g. `Releasenotes`.
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One item of a github contents api listing.
#[derive(Debug, Deserialize, Clone)]
pub struct ContentEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GithubRepository {
    pub owner: String,
    pub name: String,
    pub branch: String,
    pub api_url: String,
}
impl GithubRepository {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    /// Talks to a github compatible api below `api_url` instead of github itself.
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn owner_url(&self) -> String {
        format!("{}/{}", BASE_URL, self.owner)
    }

    pub fn repository_url(&self) -> String {
        format!("{}/{}", self.owner_url(), self.name)
    }

    fn repository_api_url(&self) -> String {
        format!("{}/{}/{}", self.api_url, self.owner, self.name)
    }

    /// Returns the web url of `kind`, with `/add` appended when given.
    ///
    /// `Funding` has no counterpart on github and yields `None`.
    pub fn url(&self, kind: UrlKind, add: Option<&str>) -> Option<String> {
        let repo_url = self.repository_url();

        let url = match kind {
            UrlKind::Repository | UrlKind::Download | UrlKind::Homepage => repo_url,
            UrlKind::Owner => self.owner_url(),
            UrlKind::Changelog | UrlKind::ReleaseNotes => format!("{}/commits", repo_url),
            UrlKind::Documentation => format!("{}/README.md", repo_url),
            UrlKind::Issues => format!("{}/issues", repo_url),
            UrlKind::Source => format!("{}.git", repo_url),
            UrlKind::Funding => return None,
        };

        Some(append(url, add))
    }

    /// Returns the contents api url of `subfolder` pinned to `branch` (or the default branch).
    pub fn contents_api_url(&self, subfolder: Option<&str>, branch: Option<&str>) -> String {
        let url = append(format!("{}/contents", self.repository_api_url()), subfolder);
        let branch = branch.unwrap_or(&self.branch);

        format!("{}?ref={}", url, branch)
    }

    /// Lists the entries of `subfolder` through the contents api.
    pub fn list_contents(
        &self,
        client: &Client,
        subfolder: Option<&str>,
        branch: Option<&str>,
    ) -> Result<Vec<ContentEntry>, GithubError> {
        let url = self.contents_api_url(subfolder, branch);

        log::debug!("listing contents of {}", url);

        client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<Vec<ContentEntry>>())
            .map_err(|source| GithubError::Request { url, source })
    }

    /// Downloads a folder (or the whole repository) without cloning it.
    ///
    /// Files are written below `destination`, which is created if needed. Sub
    /// directories are only followed when `recursive` is set. Returns the number of
    /// downloaded files.
    pub fn download(
        &self,
        client: &Client,
        destination: &Path,
        subfolder: Option<&str>,
        branch: Option<&str>,
        recursive: bool,
    ) -> Result<usize, GithubError> {
        let entries = self.list_contents(client, subfolder, branch)?;

        fs::create_dir_all(destination)
            .map_err(|error| IoError::new(FileOperation::Mkdir, destination.into(), error))?;

        let mut downloaded = 0;

        for entry in entries {
            match (entry.kind.as_str(), &entry.download_url) {
                ("file", Some(download_url)) => {
                    log::info!("Downloading {}...", entry.name);

                    let bytes = client
                        .get(download_url)
                        .send()
                        .and_then(|response| response.error_for_status())
                        .and_then(|response| response.bytes())
                        .map_err(|source| GithubError::Request {
                            url: download_url.clone(),
                            source,
                        })?;

                    let file_path = destination.join(&entry.name);
                    fs::write(&file_path, &bytes)
                        .map_err(|error| IoError::new(FileOperation::Write, file_path, error))?;

                    downloaded += 1;
                }
                ("dir", _) if recursive => {
                    let nested = match subfolder {
                        Some(parent) => format!("{}/{}", parent, entry.name),
                        None => entry.name.clone(),
                    };

                    downloaded += self.download(
                        client,
                        &destination.join(&entry.name),
                        Some(&nested),
                        branch,
                        recursive,
                    )?;
                }
                _ => log::debug!("skipping {} ({})", entry.name, entry.kind),
            }
        }

        Ok(downloaded)
    }
}

fn append(url: String, add: Option<&str>) -> String {
    match add {
        Some(add) => format!("{}/{}", url, add),
        None => url,
    }
}
