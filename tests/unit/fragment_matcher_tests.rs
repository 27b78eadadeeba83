/*!
 * Tests for fragment splitting and question/memo matching over realistic
 * document text
 */

use boardcast::fragment::split_fragments;
use boardcast::matcher::{match_fragments, MatchReason};

use crate::common;

/// Test that a realistic exam paper splits into its numbered questions
#[test]
fn test_split_fragments_withExamText_shouldDropPreambleAndKeepQuestions() {
    let fragments = split_fragments(common::sample_exam_text());

    let numbers: Vec<&str> = fragments.iter().map(|f| f.number.as_str()).collect();
    assert_eq!(numbers, vec!["1.1", "1.2", "2"]);

    // Cover-page text before the first numbered line is discarded
    assert!(!fragments[0].text.contains("Instructions"));
    assert_eq!(fragments[0].marks, Some(2));
    assert_eq!(fragments[1].marks, Some(4));
}

/// Test that exam and memo fragments pair by exact number
#[test]
fn test_match_fragments_withAlignedMemo_shouldMatchAllByNumber() {
    let questions = split_fragments(common::sample_exam_text());
    let answers = split_fragments(common::sample_memo_text());

    let matches = match_fragments(&questions, &answers);

    assert_eq!(matches.len(), 3);
    for m in &matches {
        assert_eq!(m.match_reason, MatchReason::Number);
        assert_eq!(m.similarity_score, 1.0);
        assert!(!m.needs_review);
        assert!(m.answer_text.is_some());
    }
    assert!(matches[1].answer_text.as_deref().unwrap().contains("20 N"));
}

/// Test that a question with no memo counterpart is flagged, not dropped
#[test]
fn test_match_fragments_withMissingAnswer_shouldFlagUnmatched() {
    let questions = split_fragments(
        "1.1 Define velocity. (2)\n\n9.9 State the law of universal gravitation. (3)\n",
    );
    let answers = split_fragments("1.1 Velocity is the rate of change of position.\n");

    let matches = match_fragments(&questions, &answers);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].match_reason, MatchReason::Number);
    assert_eq!(matches[1].match_reason, MatchReason::Unmatched);
    assert!(matches[1].needs_review);
    assert!(matches[1].answer_text.is_none());
}
