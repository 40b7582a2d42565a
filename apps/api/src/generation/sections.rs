//! Section parser: splits generated markdown into titled sections.
//!
//! A line whose first non-blank characters are `##` followed by whitespace (or nothing)
//! opens a section. Text on the marker line is the title; if there is none, the next
//! non-blank line is. Every later non-blank line up to the next marker is content.
//! Text before the first marker is discarded, and a section whose title or content is
//! empty is dropped.
//!
//! States: `Outside` → (marker) → `InTitle` → (title line) → `InContent` → (marker) → ...

use std::str::Lines;

use crate::models::ProposalSection;

/// Parses all sections out of `raw`.
pub fn parse_sections(raw: &str) -> Vec<ProposalSection> {
    SectionParser::new(raw).collect()
}

enum State {
    /// Before the first marker.
    Outside,
    /// After a marker, waiting for the title line.
    InTitle,
    /// Title known, collecting content lines.
    InContent { title: String, lines: Vec<String> },
}

/// Lazy iterator over the sections of a text blob.
pub struct SectionParser<'a> {
    lines: Lines<'a>,
    state: State,
}

impl<'a> SectionParser<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            lines: raw.lines(),
            state: State::Outside,
        }
    }

    /// Leaves the current section, returning it if it has both a title and content.
    fn close(&mut self, next: State) -> Option<ProposalSection> {
        match std::mem::replace(&mut self.state, next) {
            State::InContent { title, lines } => {
                let content = lines.join("\n").trim().to_string();
                (!title.is_empty() && !content.is_empty())
                    .then_some(ProposalSection { title, content })
            }
            State::Outside | State::InTitle => None,
        }
    }
}

impl Iterator for SectionParser<'_> {
    type Item = ProposalSection;

    fn next(&mut self) -> Option<ProposalSection> {
        loop {
            let Some(line) = self.lines.next() else {
                return self.close(State::Outside);
            };

            if let Some(rest) = marker_rest(line) {
                let title = rest.trim();
                let next = if title.is_empty() {
                    State::InTitle
                } else {
                    State::InContent {
                        title: title.to_string(),
                        lines: Vec::new(),
                    }
                };
                if let Some(section) = self.close(next) {
                    return Some(section);
                }
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            match &mut self.state {
                State::Outside => {}
                State::InTitle => {
                    self.state = State::InContent {
                        title: line.trim().to_string(),
                        lines: Vec::new(),
                    };
                }
                State::InContent { lines, .. } => lines.push(line.trim_end().to_string()),
            }
        }
    }
}

/// If `line` is an H2 marker, returns the text after `##`.
fn marker_rest(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("##")?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}
