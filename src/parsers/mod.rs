// Outline parsers - turn free-form AI outline text into structure entries

pub mod outline;

use crate::models::{OutlineEntry, UnitKind};

/// Parse raw outline text into ordered entries of the given kind.
///
/// Never fails. Lines that do not look like a section or slide heading are
/// dropped, and an outline with no matching lines yields an empty vector.
/// Identifiers are assigned 1..n in output order; numbers written in the
/// source text are ignored so repeated or out-of-order numbering cannot
/// produce colliding ids.
pub fn parse_outline(raw_text: &str, kind: UnitKind) -> Vec<OutlineEntry> {
    let matcher: fn(&str) -> Option<&str> = match kind {
        UnitKind::Sections => outline::match_section_line,
        UnitKind::Slides => outline::match_slide_line,
    };

    let entries: Vec<OutlineEntry> = raw_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(matcher)
        .map(outline::clean_title)
        .filter(|title| !title.is_empty())
        .zip(1u32..)
        .map(|(title, id)| OutlineEntry { id, title })
        .collect();

    log::debug!(
        "[outline] Parsed {} {} from {} bytes of outline text",
        entries.len(),
        kind.plural(),
        raw_text.len()
    );

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(entries: &[OutlineEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_parse_numbered_sections() {
        let entries = parse_outline(
            "1. Introduction\n2. Market Overview\n3. Conclusion",
            UnitKind::Sections,
        );
        assert_eq!(
            entries,
            vec![
                OutlineEntry::new(1, "Introduction"),
                OutlineEntry::new(2, "Market Overview"),
                OutlineEntry::new(3, "Conclusion"),
            ]
        );
    }

    #[test]
    fn test_parse_slides_strips_emphasis() {
        let entries = parse_outline("Slide 1: Welcome\nSlide 2: **Key** Metrics", UnitKind::Slides);
        assert_eq!(
            entries,
            vec![
                OutlineEntry::new(1, "Welcome"),
                OutlineEntry::new(2, "Key Metrics"),
            ]
        );
    }

    #[test]
    fn test_ids_ignore_source_numbering() {
        let entries = parse_outline("3. Third\n3. Again\n1. First", UnitKind::Sections);
        let ids: Vec<u32> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(titles(&entries), vec!["Third", "Again", "First"]);
    }

    #[test]
    fn test_no_matches_yields_empty() {
        let text = "Here is a great outline for you!\n- bullet\n  * another";
        assert!(parse_outline(text, UnitKind::Sections).is_empty());
        assert!(parse_outline(text, UnitKind::Slides).is_empty());
        assert!(parse_outline("", UnitKind::Sections).is_empty());
    }

    #[test]
    fn test_sections_skip_subsections_and_prose() {
        let text = "Document outline:\n\n1. Introduction\n   1.1 Background\n   1.2 Scope\n2. __Analysis__\n   - detail\n3 Summary";
        let entries = parse_outline(text, UnitKind::Sections);
        assert_eq!(titles(&entries), vec!["Introduction", "Analysis", "Summary"]);
    }

    #[test]
    fn test_slides_ignore_bullets_between_headings() {
        let text = "Slide 1: [Title]\n  - Key point\n  - Key point\nslide 2: Roadmap\n  - Q1";
        let entries = parse_outline(text, UnitKind::Slides);
        assert_eq!(titles(&entries), vec!["[Title]", "Roadmap"]);
    }

    #[test]
    fn test_windows_line_endings() {
        let entries = parse_outline("1. One\r\n2. Two\r\n", UnitKind::Sections);
        assert_eq!(titles(&entries), vec!["One", "Two"]);
    }
}
