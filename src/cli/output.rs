//! Output formatting utilities

use crate::application::DefinitionSummary;
use crate::domain::WritingSystemDefinition;

/// Format the definition list for display
pub fn format_definition_list(summaries: &[DefinitionSummary]) -> String {
    if summaries.is_empty() {
        return "No writing systems found".to_string();
    }

    let width = summaries.iter().map(|s| s.id.len()).max().unwrap_or(0);
    let mut output = String::new();
    for summary in summaries {
        let detail = match (&summary.description, &summary.problem) {
            (Some(description), _) => description.clone(),
            (None, Some(problem)) => format!("(unreadable: {})", problem),
            (None, None) => String::new(),
        };
        output.push_str(&format!("{:<width$}  {}\n", summary.id, detail, width = width));
    }
    output
}

/// Format every field of a definition as `name: value` lines. Empty fields
/// are left out.
pub fn format_definition(ws: &WritingSystemDefinition) -> String {
    let font_size = if ws.default_font_size() != 0.0 {
        ws.default_font_size().to_string()
    } else {
        String::new()
    };
    let rows = [
        ("id", ws.rfc5646()),
        ("description", ws.verbose_description()),
        ("language", ws.language().to_string()),
        ("script", ws.script().to_string()),
        ("region", ws.region().to_string()),
        ("variant", ws.variant()),
        ("language_name", ws.language_name()),
        ("abbreviation", ws.abbreviation().to_string()),
        ("font", ws.default_font_name().to_string()),
        ("font_size", font_size),
        ("keyboard", ws.keyboard().to_string()),
        ("rtl", ws.right_to_left().to_string()),
        ("legacy", ws.is_legacy_encoded().to_string()),
        ("spell_checking_id", ws.spell_checking_id().to_string()),
        ("version_number", ws.version_number().to_string()),
        ("version_description", ws.version_description().to_string()),
        ("modified", ws.date_modified().format("%Y-%m-%d %H:%M:%S").to_string()),
        ("sort_using", ws.sort_using().to_string()),
    ];

    let mut output = String::new();
    for (name, value) in rows {
        if !value.is_empty() {
            output.push_str(&format!("{}: {}\n", name, value));
        }
    }
    if !ws.sort_rules().is_empty() {
        output.push_str("sort_rules:\n");
        for line in ws.sort_rules().lines() {
            output.push_str(&format!("    {}\n", line));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SortRulesType;

    #[test]
    fn test_format_empty_list() {
        assert_eq!(format_definition_list(&[]), "No writing systems found");
    }

    #[test]
    fn test_format_definition_list() {
        let summaries = vec![
            DefinitionSummary {
                id: "en-Latn".to_string(),
                description: Some("English written in Latin script. (en-Latn)".to_string()),
                problem: None,
            },
            DefinitionSummary {
                id: "old".to_string(),
                description: None,
                problem: Some("Malformed LDML: bad".to_string()),
            },
        ];

        let output = format_definition_list(&summaries);
        assert!(output.contains("en-Latn  English written in Latin script. (en-Latn)\n"));
        assert!(output.contains("old      (unreadable: Malformed LDML: bad)\n"));
    }

    #[test]
    fn test_format_definition() {
        let mut ws = WritingSystemDefinition::new();
        ws.set_all_components("fr", "Latn", "CA", "").unwrap();
        ws.set_keyboard("Canadian French");
        ws.set_sort_using(SortRulesType::CustomSimple);
        ws.set_sort_rules("a A\nb B");

        let output = format_definition(&ws);
        assert!(output.starts_with("id: fr-Latn-CA\n"));
        assert!(output.contains("keyboard: Canadian French\n"));
        assert!(output.contains("sort_using: CustomSimple\n"));
        assert!(output.contains("sort_rules:\n    a A\n    b B\n"));
        assert!(!output.contains("font_size"));
        assert!(!output.contains("abbreviation"));
    }
}
