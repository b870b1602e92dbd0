pub mod api;
pub mod cli;
pub mod config;
pub mod content;
pub mod errors;
pub mod git;
pub mod github;
pub mod license;
pub mod logging;
pub mod preview;
pub mod prompt;
pub mod readme;
pub mod settings;
pub mod structure;
pub mod transactions;
pub mod venv;
pub mod vfs;

#[cfg(test)]
pub(crate) mod testing;
