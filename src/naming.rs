//! Column naming conventions

use crate::model::FieldSchema;

/// Convert a field identifier to the snake_case column name used by the migration engine
///
/// An underscore is inserted before an upper-case letter that is not the
/// first character when either neighbour is lower-case, so acronym runs stay
/// together: `TenantID -> tenant_id`, `HTTPServer -> http_server`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                let prev_lower = chars[i - 1].is_ascii_lowercase();
                let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
                if prev_lower || next_lower {
                    result.push('_');
                }
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Column name of a field: an explicit `column:` setting wins over the normalized name
pub fn column_name(field: &FieldSchema) -> String {
    field
        .tags
        .orm_setting("column")
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| to_snake_case(&field.name))
}

/// Default table name for a model type: snake_case, pluralized
pub fn default_table_name(model: &str) -> String {
    pluralize(&to_snake_case(model))
}

fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| word.ends_with(end)) {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}
