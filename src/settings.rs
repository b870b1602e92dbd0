use crate::github::{GithubRepository, UrlKind};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_NAME: &str = "PACKAGENAME";
pub const DEFAULT_DESCRIPTION: &str = "PACKAGEDESCRIPTION";
pub const DEFAULT_AUTHOR_NAME: &str = "AUTHORNAME";
pub const DEFAULT_AUTHOR_MAIL: &str = "AUTHORMAIL@SOMETHING.com";
pub const DEFAULT_GITHUB_USERNAME: &str = "USERNAME";
pub const DEFAULT_GITHUB_REPOSITORYNAME: &str = "REPOSITORYNAME";

/// Fields of [`ProjectSettings`] that can be compared against their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    LicenseId,
    Name,
    Description,
    AuthorName,
    AuthorMail,
    GithubUsername,
    GithubRepositoryName,
}

/// Settings given by a config file or the command line, applied over the defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialSettings {
    pub license: Option<String>,
    pub description: Option<String>,
    pub author_name: Option<String>,
    pub author_mail: Option<String>,
    pub github_username: Option<String>,
    pub github_repositoryname: Option<String>,
}

/// Project metadata used to render the generated files.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSettings {
    pub license_id: Option<String>,
    pub name: String,
    pub description: String,
    pub author_name: String,
    pub author_mail: String,
    pub github_username: String,
    pub github_repositoryname: String,
    explicit_urls: IndexMap<UrlKind, String>,
}
impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            license_id: None,
            name: DEFAULT_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            author_mail: DEFAULT_AUTHOR_MAIL.to_string(),
            github_username: DEFAULT_GITHUB_USERNAME.to_string(),
            github_repositoryname: DEFAULT_GITHUB_REPOSITORYNAME.to_string(),
            explicit_urls: IndexMap::new(),
        }
    }
}
impl ProjectSettings {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Overwrites every field that `partial` sets.
    pub fn apply(&mut self, partial: &PartialSettings) {
        if let Some(license) = &partial.license {
            self.license_id = Some(license.clone());
        }
        let pairs = [
            (&mut self.description, &partial.description),
            (&mut self.author_name, &partial.author_name),
            (&mut self.author_mail, &partial.author_mail),
            (&mut self.github_username, &partial.github_username),
            (&mut self.github_repositoryname, &partial.github_repositoryname),
        ];
        for (field, value) in pairs {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
    }

    pub fn set_url(&mut self, kind: UrlKind, url: &str) {
        self.explicit_urls.insert(kind, url.to_string());
    }

    pub fn github_repository(&self) -> GithubRepository {
        GithubRepository::new(&self.github_username, &self.github_repositoryname)
    }

    /// Link to the github repository.
    pub fn github(&self) -> String {
        self.github_repository().repository_url()
    }

    /// Link to the owner of the github repository.
    pub fn github_owner(&self) -> String {
        self.github_repository().owner_url()
    }

    /// Returns the url set for `kind`, falling back to the one derived from github.
    pub fn url(&self, kind: UrlKind) -> Option<String> {
        self.explicit_urls
            .get(&kind)
            .cloned()
            .or_else(|| self.github_repository().url(kind, None))
    }

    /// All available project urls in manifest order.
    pub fn urls(&self) -> IndexMap<UrlKind, String> {
        UrlKind::PROJECT
            .iter()
            .filter_map(|kind| self.url(*kind).map(|url| (*kind, url)))
            .collect()
    }

    pub fn is_default(&self, field: Field) -> bool {
        match field {
            Field::LicenseId => self.license_id.is_none(),
            Field::Name => self.name == DEFAULT_NAME,
            Field::Description => self.description == DEFAULT_DESCRIPTION,
            Field::AuthorName => self.author_name == DEFAULT_AUTHOR_NAME,
            Field::AuthorMail => self.author_mail == DEFAULT_AUTHOR_MAIL,
            Field::GithubUsername => self.github_username == DEFAULT_GITHUB_USERNAME,
            Field::GithubRepositoryName => {
                self.github_repositoryname == DEFAULT_GITHUB_REPOSITORYNAME
            }
        }
    }

    fn table_rows(&self) -> Vec<(String, String)> {
        let mut rows = Vec::new();
        if let Some(license_id) = &self.license_id {
            rows.push(("license_id".to_string(), license_id.clone()));
        }
        for (name, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("author_name", &self.author_name),
            ("author_mail", &self.author_mail),
            ("github_username", &self.github_username),
            ("github_repositoryname", &self.github_repositoryname),
        ] {
            rows.push((name.to_string(), value.clone()));
        }
        for (kind, url) in self.urls() {
            rows.push((kind.to_string(), url));
        }

        rows.retain(|(_, value)| !value.is_empty());
        rows
    }
}
/// Renders a two column table of every non empty setting.
impl fmt::Display for ProjectSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.table_rows();
        let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

        let lines: Vec<String> = rows
            .iter()
            .map(|(name, value)| format!("{:<width$} {}", name, value, width = width))
            .collect();

        write!(f, "{}", lines.join("\n"))
    }
}
