use crate::font::Measure;
use crate::units::Pt;

/// Calculate the width of a given string of text given the font and font size
pub fn width_of_text<M: Measure + ?Sized>(text: &str, font: &M, size: Pt) -> Pt {
    font.width_of(text, size)
}

/// Greedily wraps `text` into lines no wider than `max_width`.
///
/// Words are separated by any run of whitespace and re-joined with a single
/// space. A word that is wider than `max_width` on its own is never split; it
/// is placed alone on its own line and is the only way a returned line can
/// exceed the limit. Blank input yields no lines.
pub fn wrap<M: Measure + ?Sized>(text: &str, font: &M, size: Pt, max_width: Pt) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }

        let candidate = format!("{line} {word}");
        if font.width_of(&candidate, size) <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

/// Truncate `text` to at most `limit` characters, replacing the tail with
/// "..." when anything had to be cut
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Truncate `text` until it measures no wider than `max_width`, ending it
/// with "..." when anything had to be cut
pub fn truncate_to_width<M: Measure + ?Sized>(
    text: &str,
    font: &M,
    size: Pt,
    max_width: Pt,
) -> String {
    if font.width_of(text, size) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>() + "...";
        if font.width_of(&candidate, size) <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is exactly one point wide at any size
    struct Mono;

    impl Measure for Mono {
        fn width_of(&self, text: &str, _size: Pt) -> Pt {
            Pt(text.chars().count() as f32)
        }
    }

    #[test]
    fn greedy_wrapping() {
        let lines = wrap("the quick brown fox jumps", &Mono, Pt(12.0), Pt(10.0));
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn exact_fit_stays_on_one_line() {
        let lines = wrap("abcd efgh", &Mono, Pt(12.0), Pt(9.0));
        assert_eq!(lines, vec!["abcd efgh"]);
    }

    #[test]
    fn long_words_sit_alone() {
        let lines = wrap("a extraordinarily b", &Mono, Pt(12.0), Pt(5.0));
        assert_eq!(lines, vec!["a", "extraordinarily", "b"]);
    }

    #[test]
    fn blank_input_has_no_lines() {
        assert!(wrap("", &Mono, Pt(12.0), Pt(100.0)).is_empty());
        assert!(wrap(" \t\n ", &Mono, Pt(12.0), Pt(100.0)).is_empty());
    }

    #[test]
    fn whitespace_runs_collapse() {
        let lines = wrap("  tooth\n\n#11   (caries) ", &Mono, Pt(12.0), Pt(100.0));
        assert_eq!(lines, vec!["tooth #11 (caries)"]);
    }

    #[test]
    fn truncation_by_characters() {
        assert_eq!(truncate_chars("Amoxicillin", 40), "Amoxicillin");
        assert_eq!(truncate_chars("abcdefghij", 8), "abcde...");
        assert_eq!(truncate_chars("abcdefgh", 8), "abcdefgh");
    }

    #[test]
    fn truncation_by_width() {
        assert_eq!(truncate_to_width("abcdefghij", &Mono, Pt(12.0), Pt(6.0)), "abc...");
        assert_eq!(truncate_to_width("abc", &Mono, Pt(12.0), Pt(6.0)), "abc");
    }
}
