//! Category tree formatting

use crate::services::CategoryWithEnvelopes;

/// Categories with their envelopes as an indented tree
pub fn format_category_tree(categories: &[CategoryWithEnvelopes]) -> String {
    if categories.is_empty() {
        return "No categories found.\n".to_string();
    }

    let mut output = String::new();
    for entry in categories {
        output.push_str(&format!("{}\n", entry.category.name));
        if entry.envelopes.is_empty() {
            output.push_str("  (no envelopes)\n");
        }
        for envelope in &entry.envelopes {
            output.push_str(&format!("  {}  [{}]\n", envelope.name, envelope.id.short()));
        }
    }
    output
}
