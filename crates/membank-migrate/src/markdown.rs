// ── Markdown Outline ──
//
// A line-oriented reader for legacy memory bank notes. It only understands the
// handful of constructs those notes use:
//   `# Title`         document title (first level-1 heading before any section)
//   `## Section`      top-level section; everything until the next `## ` is its body
//   `- item` / `1. item` / `- [x] item` list and checklist items
// Headings inside fenced code blocks are treated as text.

use regex::Regex;

// ── Types ──

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub title: Option<String>,
    /// Text between the title and the first section.
    pub preamble: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub text: String,
    /// `Some` for checklist items.
    pub checked: Option<bool>,
}

// ── Public API ──

/// Parse Markdown text into a title, a preamble and `## ` sections.
pub fn parse_outline(text: &str) -> Outline {
    let mut outline = Outline::default();
    let mut current: Option<Section> = None;
    let mut preamble = String::new();
    let mut in_fence = false;

    for line in text.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        }

        let heading = if in_fence { None } else { heading(line) };
        match heading {
            Some((1, title)) if outline.title.is_none() && current.is_none() => {
                outline.title = Some(title.to_string());
            }
            Some((2, name)) => {
                if let Some(done) = current.take() {
                    outline.sections.push(finish(done));
                }
                current = Some(Section {
                    heading: name.to_string(),
                    body: String::new(),
                });
            }
            _ => {
                let target = match current.as_mut() {
                    Some(section) => &mut section.body,
                    None => &mut preamble,
                };
                target.push_str(line);
                target.push('\n');
            }
        }
    }

    if let Some(done) = current.take() {
        outline.sections.push(finish(done));
    }
    outline.preamble = preamble.trim().to_string();
    outline
}

impl Outline {
    /// First section whose heading matches one of `aliases` (case-insensitive,
    /// trailing colon ignored).
    pub fn section(&self, aliases: &[&str]) -> Option<&Section> {
        find_section(&self.sections, aliases)
    }

    /// Body text of the matching section, `None` when absent or empty.
    pub fn section_text(&self, aliases: &[&str]) -> Option<String> {
        self.section(aliases)
            .map(|s| s.body.clone())
            .filter(|body| !body.is_empty())
    }

    /// List items of the matching section; empty when the section is absent.
    pub fn section_items(&self, aliases: &[&str]) -> Vec<String> {
        self.section(aliases)
            .map(|s| list_items(&s.body).into_iter().map(|i| i.text).collect())
            .unwrap_or_default()
    }
}

/// Split a section body into sub-sections at headings of exactly `level`.
/// Text before the first such heading is dropped.
pub fn subsections(body: &str, level: usize) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;
    let mut in_fence = false;

    for line in body.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
        }
        match (in_fence, heading(line)) {
            (false, Some((lvl, name))) if lvl == level => {
                if let Some(done) = current.take() {
                    sections.push(finish(done));
                }
                current = Some(Section {
                    heading: name.to_string(),
                    body: String::new(),
                });
            }
            _ => {
                if let Some(section) = current.as_mut() {
                    section.body.push_str(line);
                    section.body.push('\n');
                }
            }
        }
    }

    if let Some(done) = current.take() {
        sections.push(finish(done));
    }
    sections
}

/// First of `sections` whose heading matches one of `aliases`.
pub fn find_section<'a>(sections: &'a [Section], aliases: &[&str]) -> Option<&'a Section> {
    sections.iter().find(|s| heading_matches(&s.heading, aliases))
}

/// Bullet, numbered and checklist items, in order.
pub fn list_items(body: &str) -> Vec<ListItem> {
    let bullet = Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.*)$").unwrap(); // safe: literal regex
    let checkbox = Regex::new(r"^\[([ xX])\]\s*(.*)$").unwrap(); // safe: literal regex

    let mut items = Vec::new();
    for line in body.lines() {
        let Some(caps) = bullet.captures(line) else {
            continue;
        };
        let rest = caps[1].trim();
        let item = match checkbox.captures(rest) {
            Some(cb) => ListItem {
                text: cb[2].trim().to_string(),
                checked: Some(&cb[1] != " "),
            },
            None => ListItem {
                text: rest.to_string(),
                checked: None,
            },
        };
        if !item.text.is_empty() {
            items.push(item);
        }
    }
    items
}

/// Values of a `tags: #a #b` (or `tags: a, b`) line, if the text has one.
pub fn tag_line(text: &str) -> Vec<String> {
    let re = Regex::new(r"(?mi)^\s*tags\s*:\s*(.+)$").unwrap(); // safe: literal regex
    re.captures(text)
        .map(|caps| {
            caps[1]
                .split(|c: char| c.is_whitespace() || c == ',')
                .map(|t| t.trim_start_matches('#'))
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Heading level and text, e.g. `## Purpose` -> `(2, "Purpose")`.
pub fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((level, rest.trim().trim_end_matches('#').trim()))
}

// ── Helpers ──

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn finish(mut section: Section) -> Section {
    section.body = section.body.trim().to_string();
    section
}

fn heading_matches(heading: &str, aliases: &[&str]) -> bool {
    let normalized = heading.trim().trim_end_matches([':', '：']).trim().to_lowercase();
    aliases.iter().any(|a| a.to_lowercase() == normalized)
}

// ── Tests ──
