// ── Document Type Classification ──
//
// Pure function of (file name, first content line). The file name wins; the
// first-line heading is only consulted when the name says nothing. Anything
// undetectable is `Generic`.

use membank_core::DocumentType;

const FILE_NAME_RULES: &[(&[&str], DocumentType)] = &[
    (&["branchcontext", "branch-context"], DocumentType::BranchContext),
    (&["activecontext", "active-context"], DocumentType::ActiveContext),
    (&["progress"], DocumentType::Progress),
    (&["systempatterns", "system-patterns"], DocumentType::SystemPatterns),
];

const HEADING_RULES: &[(&[&str], DocumentType)] = &[
    (
        &["branch context", "branchcontext", "ブランチコンテキスト"],
        DocumentType::BranchContext,
    ),
    (
        &["active context", "activecontext", "アクティブコンテキスト"],
        DocumentType::ActiveContext,
    ),
    (&["progress", "進捗"], DocumentType::Progress),
    (
        &["system patterns", "systempatterns", "システムパターン"],
        DocumentType::SystemPatterns,
    ),
];

/// Classify a legacy document from its file name and content.
pub fn classify(file_name: &str, content: &str) -> DocumentType {
    classify_file_name(file_name)
        .or_else(|| classify_first_line(content.lines().next().unwrap_or("")))
        .unwrap_or(DocumentType::Generic)
}

/// Match the lower-cased file name against the known type markers, in order.
pub fn classify_file_name(file_name: &str) -> Option<DocumentType> {
    let name = file_name.to_lowercase();
    match_rules(&name, FILE_NAME_RULES)
}

/// Match a leading heading (`# ...`) against English and Japanese type names.
pub fn classify_first_line(line: &str) -> Option<DocumentType> {
    let heading = line.trim_start().strip_prefix('#')?;
    let text = heading.trim_start_matches('#').trim().to_lowercase();
    match_rules(&text, HEADING_RULES)
}

fn match_rules(haystack: &str, rules: &[(&[&str], DocumentType)]) -> Option<DocumentType> {
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| haystack.contains(n)))
        .map(|(_, doc_type)| *doc_type)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_wins() {
        assert_eq!(classify("activeContext.md", "anything at all"), DocumentType::ActiveContext);
        assert_eq!(
            classify("branchContext.md", "# Progress"),
            DocumentType::BranchContext
        );
        assert_eq!(classify("system-patterns.md", ""), DocumentType::SystemPatterns);
        assert_eq!(classify("PROGRESS.md", ""), DocumentType::Progress);
    }

    #[test]
    fn test_first_line_fallback() {
        assert_eq!(classify("notes.md", "# Active Context"), DocumentType::ActiveContext);
        assert_eq!(classify("notes.md", "## System Patterns\n"), DocumentType::SystemPatterns);
        assert_eq!(classify("notes.md", "# ブランチコンテキスト"), DocumentType::BranchContext);
        assert_eq!(classify("memo.md", "# 進捗状況\n\n本文"), DocumentType::Progress);
    }

    #[test]
    fn test_undetectable_is_generic() {
        assert_eq!(classify("notes.md", "Active Context without a heading"), DocumentType::Generic);
        assert_eq!(classify("notes.md", "\n# Active Context"), DocumentType::Generic);
        assert_eq!(classify("notes.md", ""), DocumentType::Generic);
        assert_eq!(classify("", "# Meeting notes"), DocumentType::Generic);
    }

    #[test]
    fn test_file_name_order() {
        // "branchcontext" is checked before "progress".
        assert_eq!(
            classify_file_name("branchcontext-progress.md"),
            Some(DocumentType::BranchContext)
        );
        assert_eq!(classify_file_name("readme.md"), None);
    }

    #[test]
    fn test_classification_table() {
        let cases = [
            ("branchContext.md", ""),
            ("active-context.md", ""),
            ("progress.md", ""),
            ("systemPatterns.md", ""),
            ("a.md", "# Branch Context"),
            ("b.md", "# アクティブコンテキスト"),
            ("c.md", "# システムパターン"),
            ("d.md", "# Roadmap"),
        ];
        let table: Vec<String> = cases
            .iter()
            .map(|(name, first)| format!("{name} => {}", classify(name, first)))
            .collect();
        insta::assert_snapshot!(table.join("\n"), @r"
        branchContext.md => branch_context
        active-context.md => active_context
        progress.md => progress
        systemPatterns.md => system_patterns
        a.md => branch_context
        b.md => active_context
        c.md => system_patterns
        d.md => generic
        ");
    }
}
