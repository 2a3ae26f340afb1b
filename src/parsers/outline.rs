// Line matchers for AI generated outlines

use regex::Regex;
use std::sync::OnceLock;

// Compiled regex patterns
static SECTION_PATTERN: OnceLock<Regex> = OnceLock::new();
static SLIDE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn get_section_pattern() -> &'static Regex {
    // "1. Title", "2 Title"; the integer must start the line
    SECTION_PATTERN
        .get_or_init(|| Regex::new(r"^\d+\.?\s+(.+)$").expect("section pattern is valid"))
}

fn get_slide_pattern() -> &'static Regex {
    // "Slide 3: Title" anywhere in the line, so "## Slide 3: Title" still matches
    SLIDE_PATTERN
        .get_or_init(|| Regex::new(r"(?i)slide\s+\d+:\s*(.+)$").expect("slide pattern is valid"))
}

/// Return the raw title captured from a numbered section line
pub fn match_section_line(line: &str) -> Option<&str> {
    get_section_pattern()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Return the raw title captured from a "Slide N: ..." line
pub fn match_slide_line(line: &str) -> Option<&str> {
    get_slide_pattern()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Remove markdown emphasis markers and surrounding whitespace
pub fn clean_title(raw: &str) -> String {
    raw.replace("**", "").replace("__", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_line_variants() {
        assert_eq!(match_section_line("1. Introduction"), Some("Introduction"));
        assert_eq!(match_section_line("2 Market"), Some("Market"));
        assert_eq!(match_section_line("10.\tAppendix"), Some("Appendix"));
        // Whitespace must follow the number, so numbered subsections are skipped
        assert_eq!(match_section_line("   1.1 Background"), None);
        assert_eq!(match_section_line("1.1 Background"), None);
        assert_eq!(match_section_line("1.Background"), None);
        assert_eq!(match_section_line("Introduction"), None);
        assert_eq!(match_section_line("- 1. Bullet"), None);
    }

    #[test]
    fn test_slide_line_variants() {
        assert_eq!(match_slide_line("Slide 1: Welcome"), Some("Welcome"));
        assert_eq!(match_slide_line("SLIDE 12:Agenda"), Some("Agenda"));
        assert_eq!(match_slide_line("## Slide 2: Team"), Some("Team"));
        assert_eq!(match_slide_line("Slide: missing number"), None);
        assert_eq!(match_slide_line("  - Key point"), None);
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("**Key** Metrics"), "Key Metrics");
        assert_eq!(clean_title("  __Summary__  "), "Summary");
        assert_eq!(clean_title("** Welcome"), "Welcome");
        assert_eq!(clean_title("**"), "");
    }
}
