use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// @module: Splitting extracted document text into numbered fragments

// @const: Leading hierarchical question number at a line start
static NUMBER_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)*)[\s.:)]*(.*)$").unwrap()
});

// @const: Mark-allocation patterns, in priority order
static MARKS_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\((\d+)\s*marks?\)",
        r"(?i)\[(\d+)\s*marks?\]",
        r"(?i)\b(\d+)\s*marks?\b",
        r"\((\d+)\)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// A numbered chunk of extracted document text (question or memo answer)
///
/// Produced from the external extractor's raw text output; immutable once
/// created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedFragment {
    /// Hierarchical question number, e.g. "2.3"
    pub number: String,

    /// Raw fragment text
    pub text: String,

    /// Mark allocation parsed from the text, when present
    pub marks: Option<u32>,

    /// Diagram images associated with this fragment
    #[serde(default)]
    pub diagram_paths: Vec<PathBuf>,
}

/// Split raw extracted text into numbered fragments
///
/// A fragment begins at any line that starts with a hierarchical number
/// ("3", "3.1", "3.1.2") and runs until the next numbered line or the end
/// of input. Text before the first numbered line is discarded (cover pages,
/// instructions).
pub fn split_fragments(raw_text: &str) -> Vec<ExtractedFragment> {
    let mut fragments: Vec<ExtractedFragment> = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in raw_text.lines() {
        let trimmed = line.trim();

        if let Some(caps) = NUMBER_LINE_REGEX.captures(trimmed) {
            // Close out the previous fragment
            if let Some((number, lines)) = current.take() {
                fragments.push(build_fragment(number, lines));
            }

            let number = caps.get(1).map(|m| m.as_str().trim_end_matches('.')).unwrap_or_default();
            let rest = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let mut lines = Vec::new();
            if !rest.trim().is_empty() {
                lines.push(rest.trim().to_string());
            }
            current = Some((number.to_string(), lines));
        } else if let Some((_, lines)) = current.as_mut() {
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
    }

    if let Some((number, lines)) = current.take() {
        fragments.push(build_fragment(number, lines));
    }

    fragments
}

fn build_fragment(number: String, lines: Vec<String>) -> ExtractedFragment {
    let text = lines.join("\n").trim().to_string();
    let marks = extract_marks(&text);
    ExtractedFragment {
        number,
        text,
        marks,
        diagram_paths: Vec::new(),
    }
}

/// Parse a mark allocation from fragment text
///
/// Recognizes "(4 marks)", "[4 marks]", bare "4 marks" and a trailing
/// "(4)", in that priority order.
pub fn extract_marks(text: &str) -> Option<u32> {
    if text.trim().is_empty() {
        return None;
    }

    for regex in MARKS_REGEXES.iter() {
        if let Some(caps) = regex.captures(text) {
            if let Some(group) = caps.get(1) {
                if let Ok(parsed) = group.as_str().parse::<u32>() {
                    return Some(parsed);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splitFragments_withNumberedLines_shouldSplitPerNumber() {
        let raw = "INSTRUCTIONS\nAnswer all questions.\n2.1 Calculate the force... (4 marks)\n2.2 State Newton's second law.\n[2 marks]\n";
        let fragments = split_fragments(raw);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].number, "2.1");
        assert!(fragments[0].text.contains("Calculate the force"));
        assert_eq!(fragments[0].marks, Some(4));
        assert_eq!(fragments[1].number, "2.2");
        assert_eq!(fragments[1].marks, Some(2));
    }

    #[test]
    fn test_splitFragments_withMultilineFragment_shouldKeepFollowingLines() {
        let raw = "3 The diagram shows a circuit.\nThe battery has an emf of 12 V.\n3.1 Define emf.";
        let fragments = split_fragments(raw);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].number, "3");
        assert!(fragments[0].text.contains("emf of 12 V"));
        assert_eq!(fragments[1].number, "3.1");
    }

    #[test]
    fn test_splitFragments_withEmptyInput_shouldReturnEmpty() {
        assert!(split_fragments("").is_empty());
        assert!(split_fragments("No numbered content here").is_empty());
    }

    #[test]
    fn test_extractMarks_withParenthesizedMarks_shouldParse() {
        assert_eq!(extract_marks("Calculate the force. (4 marks)"), Some(4));
        assert_eq!(extract_marks("Calculate the force. [3 Marks]"), Some(3));
        assert_eq!(extract_marks("Total 7 marks for this part"), Some(7));
        assert_eq!(extract_marks("Define momentum. (2)"), Some(2));
    }

    #[test]
    fn test_extractMarks_withNoMarks_shouldReturnNone() {
        assert_eq!(extract_marks("State the law."), None);
        assert_eq!(extract_marks(""), None);
    }
}
