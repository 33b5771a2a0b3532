// ── Legacy Frontmatter ──
//
// Older memory bank notes sometimes open with a YAML block:
//   ---
//   title: Login flow
//   tags: [auth, ui]
//   ---
// Strategy: direct string slicing. The opening fence must be the first
// non-blank line; the closing fence is the next line starting with `---`.
// Documents without a fence are returned untouched, and so are documents
// whose fenced block is not a YAML mapping (a note opening with a horizontal
// rule and a list, say).

use serde::{Deserialize, Deserializer};

use crate::error::{MembankError, Result};

// ── Types ──

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LegacyFrontmatter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub tags: Vec<String>,
}

/// `tags: wip`, `tags: a, b` and `tags: [a, b]` are all accepted.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        Some(OneOrMany::Many(tags)) => tags,
    })
}

/// A legacy Markdown document with its optional frontmatter separated out.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDocument<'a> {
    pub frontmatter: Option<LegacyFrontmatter>,
    pub body: &'a str,
}

// ── Public API ──

/// Split and parse the frontmatter of a legacy Markdown document.
///
/// A fence that opens but never closes is treated as ordinary content, since
/// plenty of notes start with a horizontal rule.
pub fn parse<'a>(input: &'a str, path: &str) -> Result<LegacyDocument<'a>> {
    let Some((yaml, body)) = split_frontmatter(input) else {
        return Ok(LegacyDocument {
            frontmatter: None,
            body: input,
        });
    };

    if yaml.trim().is_empty() {
        return Ok(LegacyDocument {
            frontmatter: Some(LegacyFrontmatter::default()),
            body,
        });
    }

    let invalid = |e: serde_yaml::Error| MembankError::InvalidFrontmatter {
        path: path.to_string(),
        reason: e.to_string(),
    };
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(invalid)?;
    if !value.is_mapping() {
        return Ok(LegacyDocument {
            frontmatter: None,
            body: input,
        });
    }
    let frontmatter: LegacyFrontmatter = serde_yaml::from_value(value).map_err(invalid)?;

    Ok(LegacyDocument {
        frontmatter: Some(frontmatter),
        body,
    })
}

// ── Helpers ──

/// Returns (yaml_content, body_content) when a complete fence pair is present.
fn split_frontmatter(input: &str) -> Option<(&str, &str)> {
    let trimmed = input.trim_start();
    let rest = trimmed.strip_prefix("---")?;
    let newline = rest.find('\n')?;
    if !rest[..newline].trim().is_empty() {
        return None;
    }
    let after_opening = &rest[newline + 1..];

    let closing_pos = find_closing_fence(after_opening)?;
    let yaml = &after_opening[..closing_pos];
    let after_closing = &after_opening[closing_pos..];

    let body = match after_closing.find('\n') {
        Some(pos) => after_closing[pos + 1..].trim_start_matches(['\n', '\r']),
        None => "",
    };

    Some((yaml, body))
}

/// Byte offset of the closing `---` fence. Must be at the start of a line.
fn find_closing_fence(content: &str) -> Option<usize> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.starts_with("---") {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

// ── Tests ──
