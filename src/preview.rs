use crate::structure::DirSpec;
use colored::Colorize;
use std::path::Path;

/// Renders `spec` as an ASCII tree below a `root` line.
///
/// Directories are blue and listed before the files of the same directory, which
/// are green.
pub fn render_tree(spec: &DirSpec, root: &str) -> String {
    let mut lines = vec![root.blue().to_string()];
    render_children(spec, "", &mut lines);
    lines.join("\n")
}

fn render_children(spec: &DirSpec, prefix: &str, lines: &mut Vec<String>) {
    let total = spec.dirs.len() + spec.files.len();

    let dirs = spec.dirs.iter().map(|(name, sub)| (name, Some(sub)));
    let files = spec.files.iter().map(|name| (name, None));

    for (idx, (name, sub)) in dirs.chain(files).enumerate() {
        let is_last = idx + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };
        let label = match sub {
            Some(_) => name.blue(),
            None => name.green(),
        };

        lines.push(format!("{}{}{}", prefix.yellow(), connector.yellow(), label));

        if let Some(sub) = sub {
            let child_prefix = if is_last {
                format!("{}    ", prefix)
            } else {
                format!("{}│   ", prefix)
            };
            render_children(sub, &child_prefix, lines);
        }
    }
}

/// Prints what will be created at `destination`.
pub fn print_preview(spec: &DirSpec, destination: &Path) {
    println!(
        "Legend: {} = (directory), {} = (file)",
        "blue".blue(),
        "green".green()
    );
    println!("{} {}\n", "┌─".bold().bright_blue(), "Preview".bold().bright_blue());
    println!("{}", render_tree(spec, &destination.display().to_string()));
    println!();
}
