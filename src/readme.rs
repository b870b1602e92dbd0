use indexmap::IndexMap;

const NEWLINE: &str = "\n";
const TOC_MARKER: &str = "<<MARK-FOR-TOC>>";

/// Line buffer that renders a Markdown document.
///
/// Headings can be collected into a table of contents: call [`Readme::add_toc`] once
/// to leave a marker, add the headings, then call it again to replace the marker with
/// links to everything collected in between.
#[derive(Debug, Default, Clone)]
pub struct Readme {
    lines: Vec<String>,
    headings: Vec<String>,
}
impl Readme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn content(&self) -> String {
        self.lines.join(NEWLINE)
    }

    pub fn add_newline(&mut self) {
        self.lines.push(NEWLINE.to_string());
    }

    pub fn add_text<I, S>(&mut self, lines: I, bold: bool)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in lines {
            let text = text.as_ref();
            if bold {
                self.lines.push(Self::bold(text));
            } else {
                self.lines.push(text.to_string());
            }
        }
    }

    /// Adds a heading of depth `level + 1`, separated from preceding text by a blank line.
    pub fn add_heading(&mut self, text: &str, level: usize, to_toc: bool) {
        let start = match self.lines.last() {
            Some(last) if !last.ends_with(NEWLINE) => NEWLINE,
            _ => "",
        };

        self.lines
            .push(format!("{}{} {}{}", start, "#".repeat(level + 1), text, NEWLINE));

        if to_toc {
            self.headings.push(text.to_string());
        }
    }

    pub fn add_list<I, S>(&mut self, items: I, ordered: bool, level: usize)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (idx, item) in items.into_iter().enumerate() {
            let index = ordered.then_some(idx);
            self.lines.push(Self::list_item(item.as_ref(), index, level));
        }
    }

    pub fn add_named_list(
        &mut self,
        content: &IndexMap<String, String>,
        ordered: bool,
        level: usize,
        bold_name: bool,
    ) {
        let items = content.iter().map(|(name, value)| {
            if bold_name {
                format!("{}: {}", Self::bold(name), value)
            } else {
                format!("{}: {}", name, value)
            }
        });

        self.add_list(items, ordered, level);
    }

    pub fn add_rule(&mut self) {
        self.lines.push(format!("{}---{}", NEWLINE, NEWLINE));
    }

    /// Places the table of contents.
    ///
    /// With `here` the current headings are rendered immediately. Otherwise a previously
    /// left marker is replaced (resetting the collected headings when `clear` is set),
    /// or a new marker is left when there is none yet.
    pub fn add_toc(&mut self, here: bool, clear: bool) {
        if here {
            self.lines.push(self.toc());
            return;
        }

        let Some(idx) = self.lines.iter().position(|line| line == TOC_MARKER) else {
            self.lines.push(TOC_MARKER.to_string());
            return;
        };

        let mut toc = self.toc();
        let next_starts_with_newline = self
            .lines
            .get(idx + 1)
            .is_some_and(|next| next.starts_with(NEWLINE));
        if next_starts_with_newline {
            if let Some(trimmed) = toc.strip_suffix(NEWLINE) {
                toc = trimmed.to_string();
            }
        }

        self.lines[idx] = toc;

        if clear {
            self.headings.clear();
        }
    }

    pub fn toc(&self) -> String {
        let toc_lines: Vec<String> = self
            .headings
            .iter()
            .enumerate()
            .map(|(idx, heading)| {
                format!(
                    "{}. {}",
                    idx,
                    Self::link(heading, &Self::internal_link(heading))
                )
            })
            .collect();

        toc_lines.join(NEWLINE) + NEWLINE
    }

    pub fn bold(text: &str) -> String {
        format!("**{}**", text)
    }

    pub fn italic(text: &str) -> String {
        format!("*{}*", text)
    }

    pub fn link(name: &str, target: &str) -> String {
        format!("[{}]({})", name, target)
    }

    /// Anchor of a heading within the same document, e.g. `#my-heading`.
    pub fn internal_link(text: &str) -> String {
        format!("#{}", text.to_lowercase().replace([' ', '_'], "-"))
    }

    pub fn list_item(text: &str, index: Option<usize>, level: usize) -> String {
        let symbol = match index {
            Some(index) => format!("{}.", index),
            None => "-".to_string(),
        };

        format!("{}{} {}", "  ".repeat(level), symbol, text)
    }
}
