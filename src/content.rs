use crate::{
    github::UrlKind, license::LicenseCatalog, readme::Readme, settings::ProjectSettings,
};
use indexmap::IndexMap;
use miette::Diagnostic;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

pub const GITIGNORE: &str = ".gitignore";
pub const LICENSE: &str = "LICENSE";
pub const MANIFEST: &str = "pyproject.toml";
pub const README: &str = "README.md";
pub const INIT_MODULE: &str = "__init__.py";
pub const MAIN_MODULE: &str = "__main__.py";

const DEFAULT_LICENSE_NAME: &str = "LICENSENAME";

const GITIGNORE_ENTRIES: [&str; 8] = [
    "__pycache__",
    "#.gitignore",
    ".env",
    ".venv",
    ".vscode",
    ".draft*",
    ".playground*",
    "*.egg-info",
];

// values are pre-quoted as toml strings
const MANIFEST_TEMPLATE: &str = r#"[project]
name = {{ name }}
version = "0.1"
authors = [{ name = {{ author_name }}, email = {{ author_mail }} },]
description = {{ description }}
readme = "README.md"
license = { file = "LICENSE" }
requires-python = ">={{ requires_python }}"
dependencies = []
classifiers=[
    "Programming Language :: Python :: 3",
    "Operating System :: OS Independent",
]

[project.urls]
{% for row in urls %}{{ row.label }} = {{ row.url }}
{% endfor %}"#;

const MAIN_MODULE_TEMPLATE: &str = r#"def main():
    print("Hello from {{ name }}!")


if __name__ == "__main__":
    main()
"#;

#[derive(Debug, Error, Diagnostic)]
pub enum ContentError {
    #[error("Error occurred attempting to render '{file_name}'")]
    #[diagnostic(code(pkgcreator::content::render))]
    Render {
        file_name: String,
        #[source]
        source: tera::Error,
    },
}

#[derive(Serialize)]
struct UrlRow {
    label: String,
    url: String,
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

fn render(file_name: &str, template: &str, context: &Context) -> Result<String, ContentError> {
    Tera::one_off(template, context, false).map_err(|source| ContentError::Render {
        file_name: file_name.to_string(),
        source,
    })
}

pub fn gitignore() -> String {
    GITIGNORE_ENTRIES.join("\n")
}

/// Downloads the license text for `settings.license_id`.
///
/// No license id yields an empty text. A failed download is logged and also yields an
/// empty text, so the package can still be created.
pub fn license_text(settings: &ProjectSettings, api_url: &str) -> String {
    let Some(license_id) = &settings.license_id else {
        return String::new();
    };

    let fetched = LicenseCatalog::new(api_url).and_then(|catalog| catalog.fetch(license_id));

    match fetched {
        Ok(text) => text,
        Err(error) => {
            log::error!("{}", error);
            log::debug!("{:?}", error);
            log::warn!("Could not download license '{}'", license_id);
            String::new()
        }
    }
}

/// First line of a license text, e.g. `MIT License`.
pub fn license_name(license_text: &str) -> String {
    license_text
        .lines()
        .next()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| DEFAULT_LICENSE_NAME.to_string())
}

pub fn manifest(settings: &ProjectSettings, requires_python: &str) -> Result<String, ContentError> {
    let urls: Vec<UrlRow> = settings
        .urls()
        .into_iter()
        .map(|(kind, url)| UrlRow {
            label: kind.label(),
            url: toml_string(&url),
        })
        .collect();

    let mut context = Context::new();
    context.insert("name", &toml_string(&settings.name));
    context.insert("author_name", &toml_string(&settings.author_name));
    context.insert("author_mail", &toml_string(&settings.author_mail));
    context.insert("description", &toml_string(&settings.description));
    context.insert("requires_python", requires_python);
    context.insert("urls", &urls);

    render(MANIFEST, MANIFEST_TEMPLATE, &context)
}

pub fn readme(settings: &ProjectSettings, license_name: &str) -> String {
    let mut file = Readme::new();

    let author_link = Readme::link(&settings.author_name, &settings.github_owner());
    let license_link = Readme::link(license_name, "./LICENSE");
    let mut links = IndexMap::new();
    links.insert(
        "Source code".to_string(),
        settings.url(UrlKind::Source).unwrap_or_default(),
    );
    links.insert(
        "Report bugs".to_string(),
        settings.url(UrlKind::Issues).unwrap_or_default(),
    );

    file.add_heading(&settings.name, 0, false);
    file.add_text([settings.description.as_str()], true);
    file.add_text(
        [format!("\nDeveloped and maintained by {}.\n", author_link)],
        false,
    );
    file.add_named_list(&links, false, 0, true);

    file.add_heading("License", 1, false);
    file.add_text([format!("Distributed under the {}.", license_link)], false);

    file.add_heading("Features", 1, false);
    file.add_toc(false, false);
    for feature in (0..5).map(|idx| format!("Feature {}", idx)) {
        file.add_heading(&feature, 2, true);
        file.add_text([format!("Description for feature {}", feature)], false);
    }
    file.add_toc(false, true);

    file.add_heading("Requirements", 1, false);
    file.add_list((0..5).map(|idx| format!("required-package-{}", idx)), false, 0);

    file.content()
}

pub fn main_module(settings: &ProjectSettings) -> Result<String, ContentError> {
    let mut context = Context::new();
    context.insert("name", &settings.name);

    render(MAIN_MODULE, MAIN_MODULE_TEMPLATE, &context)
}

/// Contents of every generated file, keyed by file name.
///
/// Files of the package layout without an entry here are created empty.
#[derive(Debug, Clone, Default)]
pub struct FileContent {
    files: IndexMap<String, String>,
}
impl FileContent {
    pub fn build(
        settings: &ProjectSettings,
        license_text: String,
        requires_python: &str,
        with_main_module: bool,
    ) -> Result<Self, ContentError> {
        let license_name = license_name(&license_text);

        let mut files = IndexMap::new();
        files.insert(GITIGNORE.to_string(), gitignore());
        files.insert(LICENSE.to_string(), license_text);
        files.insert(MANIFEST.to_string(), manifest(settings, requires_python)?);
        files.insert(README.to_string(), readme(settings, &license_name));
        if with_main_module {
            files.insert(MAIN_MODULE.to_string(), main_module(settings)?);
        }

        Ok(Self { files })
    }

    pub fn insert(&mut self, file_name: &str, content: String) {
        self.files.insert(file_name.to_string(), content);
    }

    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.files.get(file_name).map(String::as_str)
    }
}
