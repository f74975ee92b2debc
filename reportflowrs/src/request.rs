//! Decoding of the grid request protocol (`draw`, `start`, `length`,
//! `search[value]`, `order[0][...]`, `columns[i][...]`, `vars[name]`) into a
//! [`PageRequest`].

use std::collections::BTreeMap;

use crate::config::QueryConfig;
use crate::models::{PageRequest, SortDirection};

impl PageRequest {
    /// Parse a parameter bag using default paging settings.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::from_params_with(params, &QueryConfig::default())
    }

    /// Parse a parameter bag. Malformed numbers fall back to their defaults;
    /// nothing in the request is rejected.
    pub fn from_params_with<I, K, V>(params: I, config: &QueryConfig) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = PageRequest {
            length: config.default_page_length,
            ..Default::default()
        };
        let mut declared: BTreeMap<usize, String> = BTreeMap::new();

        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref());
            let Some((head, path)) = split_key(key) else {
                continue;
            };
            match (head, path.as_slice()) {
                ("draw", []) => request.draw = value.trim().parse().unwrap_or(0),
                ("start", []) => request.start = value.trim().parse().unwrap_or(0),
                ("length", []) => {
                    request.length = value
                        .trim()
                        .parse()
                        .unwrap_or(config.default_page_length)
                }
                ("search", ["value"]) => request.search_value = value.to_string(),
                ("order", ["0", "column"]) => {
                    request.order_column_index = value.trim().parse().ok()
                }
                ("order", ["0", "dir"]) => {
                    request.order_direction = SortDirection::from_input(value)
                }
                ("columns", [idx, "data"]) => {
                    if let Ok(idx) = idx.parse::<usize>() {
                        if !value.is_empty() {
                            declared.insert(idx, value.to_string());
                        }
                    }
                }
                ("columns", [token, "search", "value"]) => {
                    if !value.is_empty() {
                        request
                            .column_search
                            .insert(token.to_string(), value.to_string());
                    }
                }
                ("vars", [name]) => {
                    request
                        .variables
                        .insert(name.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        request.columns = declared.into_values().collect();
        tracing::trace!(
            draw = request.draw,
            start = request.start,
            length = request.length,
            column_filters = request.column_search.len(),
            variables = request.variables.len(),
            "parsed page request"
        );
        request
    }

    /// Parse a raw URL-encoded query string (`draw=1&start=0&...`).
    pub fn from_query_string(query: &str) -> Self {
        Self::from_query_string_with(query, &QueryConfig::default())
    }

    pub fn from_query_string_with(query: &str, config: &QueryConfig) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_params_with(url::form_urlencoded::parse(query.as_bytes()), config)
    }
}

/// Split `columns[3][search][value]` into `("columns", ["3", "search", "value"])`.
fn split_key(key: &str) -> Option<(&str, Vec<&str>)> {
    let Some(open) = key.find('[') else {
        return Some((key, Vec::new()));
    };
    let head = &key[..open];
    let mut rest = &key[open..];
    let mut path = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        path.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    Some((head, path))
}
