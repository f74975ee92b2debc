use indexmap::IndexMap;

/// Render search input as `LIKE` fragments destined for an ANDed `WHERE`.
///
/// Column tokens that parse as an index resolve positionally through
/// `columns`; anything else is taken as a literal column name. Indexes
/// past the end of `columns` are ignored. Terms are interpolated verbatim.
pub fn build_filter_conditions(
    columns: &[String],
    column_search: &IndexMap<String, String>,
    global_search: &str,
) -> Vec<String> {
    let mut conditions = Vec::new();

    for (token, term) in column_search {
        if term.is_empty() {
            continue;
        }
        let column = match token.parse::<usize>() {
            Ok(idx) => match columns.get(idx) {
                Some(name) => name.as_str(),
                None => {
                    tracing::debug!(index = idx, "column search index out of range, skipping");
                    continue;
                }
            },
            Err(_) => token.as_str(),
        };
        conditions.push(like(column, term));
    }

    if !global_search.is_empty() && !columns.is_empty() {
        let group: Vec<String> = columns.iter().map(|c| like(c, global_search)).collect();
        conditions.push(format!("({})", group.join(" OR ")));
    }

    conditions
}

fn like(column: &str, term: &str) -> String {
    format!("{column} LIKE '%{term}%'")
}
