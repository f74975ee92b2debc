use indexmap::IndexMap;

/// Replace every `{name}` in `query` with the matching value.
///
/// Substitution is purely textual: values are not quoted or escaped, so a
/// value may inject an arbitrary SQL fragment. Report templates and their
/// variables must come from trusted authors only. Placeholders without a
/// matching variable are left in place.
pub fn process_variables(query: &str, vars: &IndexMap<String, String>) -> String {
    let mut rendered = query.to_string();
    for (name, value) in vars {
        let placeholder = format!("{{{name}}}");
        if rendered.contains(&placeholder) {
            rendered = rendered.replace(&placeholder, value);
        }
    }
    rendered
}

/// Remove trailing statement terminators so the query can be nested.
pub fn strip_terminator(query: &str) -> &str {
    query.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}
