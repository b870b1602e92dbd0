use colored::Colorize;
use log::Level;
use std::io::Write;

/// Formats one log line: info plain, warnings and errors with a colored title.
pub fn render(level: Level, message: &str) -> String {
    match level {
        Level::Info => message.to_string(),
        Level::Warn => format!("[WARNING] {}", message).yellow().to_string(),
        Level::Error => format!("[ERROR] {}", message).red().to_string(),
        Level::Debug | Level::Trace => format!("[{}] {}", level, message)
            .bright_black()
            .to_string(),
    }
}

/// Installs the global logger. `RUST_LOG` overrides the level chosen by `verbose`.
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        concat!("warn,", env!("CARGO_CRATE_NAME"), "=debug")
    } else {
        "info"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format(|buf, record| writeln!(buf, "{}", render(record.level(), &record.args().to_string())))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ansi(text: &str) -> String {
        let ansi = regex::Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").unwrap();
        ansi.replace_all(text, "").to_string()
    }

    #[test]
    fn test_render_levels() {
        assert_eq!(strip_ansi(&render(Level::Info, "some info")), "some info");
        assert_eq!(
            strip_ansi(&render(Level::Warn, "something went wrong")),
            "[WARNING] something went wrong"
        );
        assert_eq!(
            strip_ansi(&render(Level::Error, "something went wrong")),
            "[ERROR] something went wrong"
        );
        assert_eq!(strip_ansi(&render(Level::Debug, "details")), "[DEBUG] details");
    }
}
