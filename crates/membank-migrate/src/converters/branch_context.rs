use anyhow::Result;
use membank_core::{DocumentPath, DocumentType, StructuredDocument};
use serde::Serialize;

use crate::markdown::{self, Outline};
use crate::registry::Converter;

const PURPOSE: &[&str] = &["Purpose", "目的"];
const BACKGROUND: &[&str] = &["Background", "背景"];
const USER_STORIES: &[&str] = &["User Stories", "ユーザーストーリー"];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BranchContextContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    branch_name: Option<String>,
    purpose: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<String>,
    user_stories: Vec<UserStory>,
}

#[derive(Debug, Serialize)]
struct UserStory {
    description: String,
    completed: bool,
}

/// `branchContext.md`: why a branch exists and what it must deliver.
pub struct BranchContextConverter;

impl Converter for BranchContextConverter {
    fn convert(&self, markdown: &str, path: &DocumentPath) -> Result<StructuredDocument> {
        super::convert_with(markdown, path, DocumentType::BranchContext, build)
    }
}

fn build(outline: &Outline, path: &DocumentPath) -> BranchContextContent {
    let user_stories = outline
        .section(USER_STORIES)
        .map(|s| markdown::list_items(&s.body))
        .unwrap_or_default()
        .into_iter()
        .map(|item| UserStory {
            description: item.text,
            completed: item.checked.unwrap_or(false),
        })
        .collect();

    BranchContextContent {
        branch_name: path.parent_name().map(String::from),
        purpose: outline.section_text(PURPOSE).unwrap_or_default(),
        background: outline.section_text(BACKGROUND),
        user_stories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_branch_context() {
        let path = DocumentPath::new("feature-login/branchContext.md").unwrap();
        let markdown = "\
# Branch Context

## Purpose

This branch is for X.

## Background

Users asked for it.

## User Stories

- [ ] Log in with email
- [x] Show an error banner
";
        let doc = BranchContextConverter.convert(markdown, &path).unwrap();
        assert_eq!(doc.metadata.document_type, DocumentType::BranchContext);
        assert_eq!(doc.metadata.title, "Branch Context");
        assert_eq!(doc.content["branchName"], "feature-login");
        assert_eq!(doc.content["purpose"], "This branch is for X.");
        assert_eq!(doc.content["background"], "Users asked for it.");
        assert_eq!(
            doc.content["userStories"],
            serde_json::json!([
                { "description": "Log in with email", "completed": false },
                { "description": "Show an error banner", "completed": true },
            ])
        );
    }

    #[test]
    fn test_convert_japanese_sections() {
        let path = DocumentPath::new("branchContext.md").unwrap();
        let markdown = "# ブランチコンテキスト\n\n## 目的\n\nログイン機能の実装\n\n## ユーザーストーリー\n\n- [x] メールでログイン\n";
        let doc = BranchContextConverter.convert(markdown, &path).unwrap();
        assert_eq!(doc.content["purpose"], "ログイン機能の実装");
        assert_eq!(doc.content["userStories"][0]["completed"], true);
        assert!(doc.content.get("branchName").is_none());
        assert!(doc.content.get("background").is_none());
    }

    #[test]
    fn test_missing_sections_produce_empty_content() {
        let path = DocumentPath::new("branchContext.md").unwrap();
        let doc = BranchContextConverter.convert("# Branch Context\n", &path).unwrap();
        assert_eq!(doc.content["purpose"], "");
        assert_eq!(doc.content["userStories"], serde_json::json!([]));
    }
}
