//! GraphQL query construction for `nearText` searches.

use docent_core::SearchFilters;

/// Weaviate class holding documentation chunks.
pub const DOC_CLASS_NAME: &str = "Documentation";

/// Document fields that can be used as equality filters. Other keys are ignored.
pub const FILTERABLE_FIELDS: [&str; 4] = ["title", "url", "source", "version"];

const RETURN_FIELDS: &str = "content title url source version _additional { id certainty }";

/// Build the `Get { Documentation(...) }` query text.
///
/// String values are emitted as JSON string literals, which GraphQL accepts
/// verbatim, so user input can never break out of its argument.
pub fn build_search_query(concepts: &[String], limit: usize, filters: Option<&SearchFilters>) -> String {
    let concepts = serde_json::Value::from(concepts.to_vec());
    let mut args = format!("nearText: {{concepts: {concepts}}}, limit: {limit}");

    if let Some(clause) = filters.and_then(where_clause) {
        args.push_str(", where: ");
        args.push_str(&clause);
    }

    format!("{{ Get {{ {DOC_CLASS_NAME}({args}) {{ {RETURN_FIELDS} }} }} }}")
}

/// `Equal` operand per recognised filter, combined with `And` when there are several.
fn where_clause(filters: &SearchFilters) -> Option<String> {
    let operands: Vec<String> = filters
        .iter()
        .filter(|(field, _)| FILTERABLE_FIELDS.contains(&field.as_str()))
        .map(|(field, value)| {
            let value = serde_json::Value::from(value.as_str());
            format!("{{path: [\"{field}\"], operator: Equal, valueText: {value}}}")
        })
        .collect();

    match operands.len() {
        0 => None,
        1 => operands.into_iter().next(),
        _ => Some(format!("{{operator: And, operands: [{}]}}", operands.join(", "))),
    }
}
