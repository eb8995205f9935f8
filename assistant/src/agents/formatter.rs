//! Renders retrieval matches into the context block for the generation
//! prompt.

use crate::models::MatchResult;

/// Upper bound on the rendered context, in characters. Entries that would
/// push past it are dropped whole, lowest-ranked first.
pub const CONTEXT_CHAR_BUDGET: usize = 2000;

/// Returned instead of an empty string when nothing matched, so the prompt
/// always carries a well-formed context section.
pub const EMPTY_CONTEXT: &str = "No specific program information available.";

const ENTRY_SEPARATOR: &str = "\n\n";

/// Render ranked matches as numbered, labeled paragraphs within the
/// character budget. Empty input yields [`EMPTY_CONTEXT`].
pub fn format_context(matches: &[MatchResult]) -> String {
    let mut context = String::new();

    for (rank, matched) in matches.iter().enumerate() {
        let entry = render_entry(rank + 1, matched);
        let added = if context.is_empty() {
            entry.len()
        } else {
            ENTRY_SEPARATOR.len() + entry.len()
        };
        if context.len() + added > CONTEXT_CHAR_BUDGET {
            break;
        }
        if !context.is_empty() {
            context.push_str(ENTRY_SEPARATOR);
        }
        context.push_str(&entry);
    }

    if context.is_empty() {
        EMPTY_CONTEXT.to_string()
    } else {
        context
    }
}

fn render_entry(rank: usize, matched: &MatchResult) -> String {
    let record = &matched.record;
    format!(
        "Program {rank}:\n\
         Program Name: {}\n\
         Level: {}\n\
         Faculty: {}\n\
         Duration: {}\n\
         Description: {}",
        field_or_na(&record.name),
        field_or_na(&record.level),
        field_or_na(&record.faculty),
        field_or_na(&record.duration),
        field_or_na(&record.description),
    )
}

fn field_or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchResult, ProgramRecord};

    fn matched(name: &str, description: &str, score: u32) -> MatchResult {
        MatchResult {
            record: ProgramRecord {
                name: name.to_string(),
                level: "undergraduate".to_string(),
                faculty: "Faculty of Sciences".to_string(),
                duration: "4 years".to_string(),
                description: description.to_string(),
            },
            score,
        }
    }

    #[test]
    fn empty_matches_yield_the_sentinel() {
        let context = format_context(&[]);
        assert_eq!(context, EMPTY_CONTEXT);
        assert!(!context.is_empty());
    }

    #[test]
    fn entries_are_numbered_in_rank_order() {
        let context = format_context(&[
            matched("BS Computer Science", "Software.", 6),
            matched("BBA", "Business.", 3),
        ]);
        let cs = context.find("Program 1:\nProgram Name: BS Computer Science");
        let bba = context.find("Program 2:\nProgram Name: BBA");
        assert!(cs.is_some());
        assert!(bba.is_some());
        assert!(cs.unwrap() < bba.unwrap());
    }

    #[test]
    fn all_record_fields_are_rendered() {
        let context = format_context(&[matched("BS Computer Science", "Software.", 6)]);
        assert!(context.contains("Level: undergraduate"));
        assert!(context.contains("Faculty: Faculty of Sciences"));
        assert!(context.contains("Duration: 4 years"));
        assert!(context.contains("Description: Software."));
    }

    #[test]
    fn empty_fields_render_as_na() {
        let entry = MatchResult {
            record: ProgramRecord {
                name: "BS Zoology".to_string(),
                level: String::new(),
                faculty: String::new(),
                duration: String::new(),
                description: String::new(),
            },
            score: 3,
        };
        let context = format_context(&[entry]);
        assert!(context.contains("Level: N/A"));
        assert!(context.contains("Description: N/A"));
    }

    #[test]
    fn output_never_exceeds_the_budget() {
        let long = "agriculture ".repeat(100);
        let entries: Vec<MatchResult> =
            (0..10).map(|i| matched(&format!("BS {i}"), &long, 3)).collect();
        let context = format_context(&entries);
        assert!(context.len() <= CONTEXT_CHAR_BUDGET);
    }

    #[test]
    fn overflow_drops_whole_entries_from_the_bottom() {
        let long = "x".repeat(800);
        let entries = vec![
            matched("BS First", &long, 9),
            matched("BS Second", &long, 6),
            matched("BS Third", &long, 3),
        ];
        let context = format_context(&entries);
        assert!(context.contains("BS First"));
        assert!(context.contains("BS Second"));
        // The third entry would overflow; it is omitted entirely, not cut.
        assert!(!context.contains("BS Third"));
        assert!(context.ends_with(&long));
    }

    #[test]
    fn oversized_first_entry_falls_back_to_the_sentinel() {
        let huge = "y".repeat(CONTEXT_CHAR_BUDGET + 1);
        let context = format_context(&[matched("BS Huge", &huge, 3)]);
        assert_eq!(context, EMPTY_CONTEXT);
    }
}
