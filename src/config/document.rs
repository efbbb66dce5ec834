//! Line-preserving INI document
//!
//! Parses section/key/value text best-effort and keeps every original line, so
//! a rewrite only touches the bytes of the value being changed. Lines that do
//! not parse (entries before the first header, lines without a separator,
//! broken headers) are invisible to lookups but survive a rewrite untouched.

use std::ops::Range;

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: String,
    line: usize,
    /// Byte range of the value inside `lines[line]`
    value_span: Range<usize>,
}

#[derive(Debug, Clone)]
struct Section {
    name: String,
    header_line: usize,
    entries: Vec<Entry>,
}

impl Section {
    /// Line after which a new key of this section is inserted
    fn last_line(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.line)
            .max()
            .unwrap_or(self.header_line)
    }
}

/// One physical line and the terminator it had in the file
#[derive(Debug, Clone)]
struct Line {
    text: String,
    /// `"\n"`, `"\r\n"` or empty for a last line without one
    ending: &'static str,
}

impl Line {
    fn split(raw: &str) -> Self {
        let (text, ending) = if let Some(text) = raw.strip_suffix("\r\n") {
            (text, "\r\n")
        } else if let Some(text) = raw.strip_suffix('\n') {
            (text, "\n")
        } else {
            (raw, "")
        };
        Self {
            text: text.to_string(),
            ending,
        }
    }
}

/// Parsed INI text with enough bookkeeping to write it back unchanged
#[derive(Debug, Clone, Default)]
pub struct Document {
    lines: Vec<Line>,
    sections: Vec<Section>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        let mut doc = Self {
            lines: text.split_inclusive('\n').map(Line::split).collect(),
            sections: Vec::new(),
        };

        for idx in 0..doc.lines.len() {
            let line = &doc.lines[idx].text;
            let start = if idx == 0 && line.starts_with('\u{feff}') {
                '\u{feff}'.len_utf8()
            } else {
                0
            };

            match classify(&line[start..]) {
                LineKind::Header(name) => {
                    let name = name.to_string();
                    doc.sections.push(Section {
                        name,
                        header_line: idx,
                        entries: Vec::new(),
                    });
                }
                LineKind::Entry { key, value_span } => {
                    // Entries before the first header have nowhere to go
                    let Some(section) = doc.sections.last_mut() else {
                        continue;
                    };
                    let value_span = (value_span.start + start)..(value_span.end + start);
                    section.entries.push(Entry {
                        key: key.to_string(),
                        value: line[value_span.clone()].to_string(),
                        line: idx,
                        value_span,
                    });
                }
                LineKind::Ignored => {}
            }
        }

        doc
    }

    /// Whether `value` reads back unchanged after [`set`](Self::set): no line
    /// breaks, no surrounding whitespace, nothing that starts an inline comment
    pub fn stores_verbatim(value: &str) -> bool {
        if value.contains(['\r', '\n']) {
            return false;
        }
        let line = format!("k={value}");
        match classify(&line) {
            LineKind::Entry { value_span, .. } => line[value_span] == *value,
            _ => false,
        }
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.iter().any(|s| s.name == section)
    }

    /// Value of `key` in `section`; the last occurrence wins
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.find(section, key)
            .map(|(s, e)| self.sections[s].entries[e].value.as_str())
    }

    /// Section names in first-seen order, without duplicates
    pub fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for section in &self.sections {
            if !names.contains(&section.name.as_str()) {
                names.push(&section.name);
            }
        }
        names
    }

    /// Key/value pairs of a section in first-seen key order, later values winning
    pub fn entries(&self, section: &str) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = Vec::new();
        for entry in self
            .sections
            .iter()
            .filter(|s| s.name == section)
            .flat_map(|s| s.entries.iter())
        {
            match out
                .iter_mut()
                .find(|(k, _)| k.eq_ignore_ascii_case(&entry.key))
            {
                Some(slot) => slot.1 = &entry.value,
                None => out.push((&entry.key, &entry.value)),
            }
        }
        out
    }

    /// Overwrite or insert `key` in `section`, creating the section at the end
    /// of the document if needed. Line breaks in `value` become spaces; other
    /// values that fail [`stores_verbatim`](Self::stores_verbatim) are written
    /// but read back differently.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let value = single_line(value);

        if let Some((s, e)) = self.find(section, key) {
            let entry = &mut self.sections[s].entries[e];
            let line = &mut self.lines[entry.line].text;
            line.replace_range(entry.value_span.clone(), &value);
            entry.value_span = entry.value_span.start..entry.value_span.start + value.len();
            entry.value = value;
            return;
        }

        let new_line = format!("{key}={value}");

        if let Some(s) = self.sections.iter().rposition(|sec| sec.name == section) {
            let at = self.sections[s].last_line() + 1;
            self.insert_line(at, new_line.clone());
            self.sections[s].entries.push(Entry {
                key: key.to_string(),
                value_span: (key.len() + 1)..new_line.len(),
                value,
                line: at,
            });
            return;
        }

        if self.lines.last().is_some_and(|l| !l.text.trim().is_empty()) {
            self.insert_line(self.lines.len(), String::new());
        }
        let header_line = self.lines.len();
        self.insert_line(header_line, format!("[{section}]"));
        self.insert_line(header_line + 1, new_line.clone());
        self.sections.push(Section {
            name: section.to_string(),
            header_line,
            entries: vec![Entry {
                key: key.to_string(),
                value_span: (key.len() + 1)..new_line.len(),
                value,
                line: header_line + 1,
            }],
        });
    }

    /// Serialize back to text, every line with its own terminator
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .flat_map(|line| [line.text.as_str(), line.ending])
            .collect()
    }

    /// Terminator used for new lines: the first one seen in the file
    fn default_ending(&self) -> &'static str {
        self.lines
            .iter()
            .map(|line| line.ending)
            .find(|ending| !ending.is_empty())
            .unwrap_or("\n")
    }

    fn find(&self, section: &str, key: &str) -> Option<(usize, usize)> {
        self.sections
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, s)| s.name == section)
            .find_map(|(s_idx, s)| {
                s.entries
                    .iter()
                    .rposition(|e| e.key.eq_ignore_ascii_case(key))
                    .map(|e_idx| (s_idx, e_idx))
            })
    }

    /// Insert before `at`, taking the terminator of the line above. A new last
    /// line inherits the missing terminator of the old one.
    fn insert_line(&mut self, at: usize, text: String) {
        let default_ending = self.default_ending();
        let ending = match at.checked_sub(1).map(|prev| &mut self.lines[prev]) {
            Some(prev) if prev.ending.is_empty() => {
                prev.ending = default_ending;
                ""
            }
            Some(prev) => prev.ending,
            None => default_ending,
        };
        self.lines.insert(at, Line { text, ending });
        for section in &mut self.sections {
            if section.header_line >= at {
                section.header_line += 1;
            }
            for entry in &mut section.entries {
                if entry.line >= at {
                    entry.line += 1;
                }
            }
        }
    }
}

enum LineKind<'a> {
    Header(&'a str),
    Entry {
        key: &'a str,
        value_span: Range<usize>,
    },
    Ignored,
}

fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
        return LineKind::Ignored;
    }

    if let Some(rest) = trimmed.strip_prefix('[') {
        return match rest.rfind(']') {
            Some(close) if !rest[..close].trim().is_empty() => {
                LineKind::Header(rest[..close].trim())
            }
            _ => LineKind::Ignored,
        };
    }

    let Some(sep) = line.find(['=', ':']) else {
        return LineKind::Ignored;
    };
    let key = line[..sep].trim();
    if key.is_empty() {
        return LineKind::Ignored;
    }

    let after = sep + 1;
    let leading = line[after..].len() - line[after..].trim_start().len();
    let value_start = after + leading;
    let value_end = value_start
        + line[value_start..]
            .char_indices()
            .find(|&(i, c)| {
                (c == ';' || c == '#')
                    && line[..value_start + i]
                        .chars()
                        .next_back()
                        .is_some_and(char::is_whitespace)
            })
            .map(|(i, _)| line[value_start..value_start + i].trim_end().len())
            .unwrap_or_else(|| line[value_start..].trim_end().len());

    LineKind::Entry {
        key,
        value_span: value_start..value_end,
    }
}

fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
