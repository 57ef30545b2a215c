//! The line scanner.
//!
//! A single left-to-right pass over one rendered line. The only state that
//! crosses lines is the "inside an unterminated block comment" flag, which
//! the caller threads from the previous row and stores for the next.
//!
//! Rule order is load-bearing: line comment, block comment, string, number,
//! keyword. The number check running before the keyword check means a
//! keyword can never start with a digit, while an alphabetic literal such as
//! `True` still matches as a keyword.

use super::{HighlightKind, Language};

/// Token-boundary predicate used by the number and keyword rules.
pub fn is_separator(ch: char) -> bool {
    ch == '\0' || ch.is_whitespace() || ",.()+-/*=~%[];".contains(ch)
}

fn starts_with_at(chars: &[char], at: usize, pat: &str) -> bool {
    let mut idx = at;
    for pch in pat.chars() {
        if idx >= chars.len() || chars[idx] != pch {
            return false;
        }
        idx += 1;
    }
    true
}

/// Classifies every character of `line` and reports whether the line ends
/// inside an unterminated block comment.
///
/// Pure: the output depends only on the three inputs, and its length always
/// equals the character length of `line`. `language = None` yields all
/// [`HighlightKind::Normal`] and a `false` carry.
pub fn highlight_line(
    line: &str,
    language: Option<&Language>,
    carried_in_comment: bool,
) -> (Vec<HighlightKind>, bool) {
    let chars: Vec<char> = line.chars().collect();
    let mut hl = vec![HighlightKind::Normal; chars.len()];
    let Some(lang) = language else {
        return (hl, false);
    };

    let mut i = 0;
    let mut prev_sep = true;
    let mut in_string: Option<char> = None;
    let mut in_comment = carried_in_comment;

    while i < chars.len() {
        let ch = chars[i];

        // A line comment claims the rest of the line and never carries over.
        if let Some(marker) = lang.line_comment {
            if in_string.is_none() && !in_comment && starts_with_at(&chars, i, marker) {
                for slot in &mut hl[i..] {
                    *slot = HighlightKind::Comment;
                }
                return (hl, false);
            }
        }

        if in_comment {
            hl[i] = HighlightKind::BlockComment;
            if let Some((_, end)) = lang.block_comment {
                if starts_with_at(&chars, i, end) {
                    for slot in &mut hl[i..i + end.len()] {
                        *slot = HighlightKind::BlockComment;
                    }
                    i += end.len();
                    in_comment = false;
                    prev_sep = true;
                    continue;
                }
            }
            prev_sep = false;
            i += 1;
            continue;
        } else if let Some((start, _)) = lang.block_comment {
            if starts_with_at(&chars, i, start) {
                for slot in &mut hl[i..i + start.len()] {
                    *slot = HighlightKind::BlockComment;
                }
                i += start.len();
                in_comment = true;
                prev_sep = false;
                continue;
            }
        }

        if lang.highlight_strings {
            if let Some(quote) = in_string {
                hl[i] = HighlightKind::String;
                if ch == '\\' && i + 1 < chars.len() {
                    // Escape consumes two characters, both string-classed.
                    hl[i + 1] = HighlightKind::String;
                    i += 2;
                    prev_sep = false;
                    continue;
                }
                if ch == quote {
                    in_string = None;
                }
                i += 1;
                continue;
            } else if ch == '"' || ch == '\'' {
                in_string = Some(ch);
                hl[i] = HighlightKind::String;
                i += 1;
                prev_sep = false;
                continue;
            }
        }

        if lang.highlight_numbers {
            let after_number = i > 0 && hl[i - 1] == HighlightKind::Number;
            if (ch.is_ascii_digit() && (prev_sep || after_number)) || (ch == '.' && after_number) {
                hl[i] = HighlightKind::Number;
                i += 1;
                prev_sep = false;
                continue;
            }
        }

        if prev_sep {
            if let Some(len) = match_keyword(lang, &chars, i, &mut hl) {
                i += len;
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(ch);
        i += 1;
    }

    (hl, in_comment)
}

/// Tries each keyword in registry order at position `at`; a match must be
/// followed by a separator or end-of-line. Returns the matched length.
fn match_keyword(
    lang: &Language,
    chars: &[char],
    at: usize,
    hl: &mut [HighlightKind],
) -> Option<usize> {
    for kw in lang.keywords {
        let secondary = kw.ends_with('|');
        let text = if secondary { &kw[..kw.len() - 1] } else { kw };
        let klen = text.chars().count();
        if starts_with_at(chars, at, text)
            && (at + klen >= chars.len() || is_separator(chars[at + klen]))
        {
            let kind = if secondary {
                HighlightKind::KeywordSecondary
            } else {
                HighlightKind::KeywordPrimary
            };
            for slot in &mut hl[at..at + klen] {
                *slot = kind;
            }
            return Some(klen);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::select_language;
    use HighlightKind::*;

    fn c_lang() -> Option<&'static Language> {
        select_language("test.c")
    }

    fn py_lang() -> Option<&'static Language> {
        select_language("test.py")
    }

    #[test]
    fn no_language_is_all_normal() {
        let (hl, carry) = highlight_line("int x = 1;", None, false);
        assert_eq!(hl, vec![Normal; 10]);
        assert!(!carry);
    }

    #[test]
    fn output_length_matches_input() {
        let (hl, _) = highlight_line("while (1) {}", c_lang(), false);
        assert_eq!(hl.len(), "while (1) {}".chars().count());
    }

    #[test]
    fn line_comment_covers_rest_of_line() {
        let line = "// comment int x";
        let (hl, carry) = highlight_line(line, c_lang(), false);
        assert!(hl.iter().all(|&h| h == Comment));
        assert!(!carry);
    }

    #[test]
    fn line_comment_starts_mid_line() {
        let (hl, _) = highlight_line("x = 1 # done", py_lang(), false);
        assert_eq!(hl[6..], vec![Comment; 6][..]);
        assert_eq!(hl[0], Normal);
    }

    #[test]
    fn primary_and_secondary_keywords() {
        let (hl, _) = highlight_line("return int", c_lang(), false);
        assert_eq!(hl[..6], vec![KeywordPrimary; 6][..]);
        assert_eq!(hl[7..10], vec![KeywordSecondary; 3][..]);
    }

    #[test]
    fn keyword_needs_separator_boundary() {
        let (hl, _) = highlight_line("integer", c_lang(), false);
        assert!(hl.iter().all(|&h| h == Normal));
    }

    #[test]
    fn alphabetic_literal_matches_as_keyword() {
        // "True" cannot be claimed by the number rule (no digit start), so
        // the keyword rule still sees it at a separator boundary.
        let (hl, _) = highlight_line("x = True", py_lang(), false);
        assert_eq!(hl[4..], vec![KeywordSecondary; 4][..]);
    }

    #[test]
    fn numbers_with_decimal_point() {
        let (hl, _) = highlight_line("x = 3.14;", c_lang(), false);
        assert_eq!(hl[4..8], vec![Number; 4][..]);
        assert_eq!(hl[8], Normal);
    }

    #[test]
    fn digit_inside_identifier_is_not_a_number() {
        let (hl, _) = highlight_line("x1 = 2", c_lang(), false);
        assert_eq!(hl[1], Normal);
        assert_eq!(hl[5], Number);
    }

    #[test]
    fn string_with_escaped_quote() {
        let line = r#"s = "a\"b";"#;
        let (hl, _) = highlight_line(line, c_lang(), false);
        assert_eq!(hl[4..10], vec![String; 6][..]);
        assert_eq!(hl[10], Normal);
    }

    #[test]
    fn single_quote_string() {
        let (hl, _) = highlight_line("c = 'x'", c_lang(), false);
        assert_eq!(hl[4..], vec![String; 3][..]);
    }

    #[test]
    fn unterminated_string_does_not_carry() {
        let (_, carry) = highlight_line("s = \"open", c_lang(), false);
        assert!(!carry);
    }

    #[test]
    fn comment_marker_inside_string_is_string() {
        let (hl, _) = highlight_line("s = \"// no\"", c_lang(), false);
        assert_eq!(hl[4..], vec![String; 7][..]);
    }

    #[test]
    fn block_comment_opens_and_carries() {
        let (hl, carry) = highlight_line("int /* open", c_lang(), false);
        assert_eq!(hl[..3], vec![KeywordSecondary; 3][..]);
        assert_eq!(hl[4..], vec![BlockComment; 7][..]);
        assert!(carry);
    }

    #[test]
    fn carried_comment_closes_mid_line() {
        let (hl, carry) = highlight_line("end */ int x", c_lang(), true);
        assert_eq!(hl[..6], vec![BlockComment; 6][..]);
        assert_eq!(hl[7..10], vec![KeywordSecondary; 3][..]);
        assert!(!carry);
    }

    #[test]
    fn carried_comment_spans_whole_line() {
        let (hl, carry) = highlight_line("plain text", c_lang(), true);
        assert!(hl.iter().all(|&h| h == BlockComment));
        assert!(carry);
    }

    #[test]
    fn language_without_block_markers_never_enters_block_state() {
        let (hl, carry) = highlight_line("x = 1 /* nope */", py_lang(), false);
        assert!(!hl.contains(&BlockComment));
        assert!(!carry);
    }

    #[test]
    fn deterministic_over_repeat_runs() {
        let line = "for (int i = 0; i < 10; i++) /* loop";
        let first = highlight_line(line, c_lang(), false);
        let second = highlight_line(line, c_lang(), false);
        assert_eq!(first, second);
    }

    #[test]
    fn separator_set_is_fixed() {
        for ch in ",.()+-/*=~%[];".chars() {
            assert!(is_separator(ch));
        }
        assert!(is_separator(' '));
        assert!(is_separator('\0'));
        assert!(!is_separator('_'));
        assert!(!is_separator('a'));
    }
}
