use indexmap::IndexMap;
use serde::{de, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored, parameterized report: one `SELECT` template plus optional
/// column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub name: String,
    /// Connection name used by the runtime; `"default"` when absent.
    pub data_source: Option<String>,
    pub base_query: String,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    pub description: Option<String>,
}

impl Report {
    pub fn new(name: impl Into<String>, base_query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_source: None,
            base_query: base_query.into(),
            columns: Vec::new(),
            description: None,
        }
    }

    pub fn with_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = names.into_iter().map(ColumnDescriptor::named).collect();
        self
    }

    pub fn data_source_name(&self) -> &str {
        self.data_source.as_deref().unwrap_or("default")
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub display: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(rename = "desc")]
    pub description: String,
}

impl ColumnDescriptor {
    /// Descriptor with display set to the name and a `text` placeholder type.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display: name.clone(),
            name,
            data_type: "text".to_string(),
            description: String::new(),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(s) => Ok(ColumnDescriptor::named(s)),
            other => {
                #[derive(Deserialize)]
                struct Full {
                    name: String,
                    display: Option<String>,
                    #[serde(rename = "type")]
                    data_type: Option<String>,
                    #[serde(alias = "desc")]
                    description: Option<String>,
                }
                let full = Full::deserialize(other).map_err(de::Error::custom)?;
                Ok(ColumnDescriptor {
                    display: full.display.unwrap_or_else(|| full.name.clone()),
                    name: full.name,
                    data_type: full.data_type.unwrap_or_else(|| "text".to_string()),
                    description: full.description.unwrap_or_default(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Uppercases the input; anything other than `DESC` sorts ascending.
    pub fn from_input(input: &str) -> Self {
        match input.trim().to_uppercase().as_str() {
            "DESC" => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Normalized grid request. Built by [`PageRequest::from_params`] and
/// consumed by the executor for a single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    pub draw: i64,
    pub start: u64,
    pub length: u64,
    pub search_value: String,
    /// Column token (positional index or literal name) to search term.
    pub column_search: IndexMap<String, String>,
    pub order_column_index: Option<usize>,
    pub order_direction: SortDirection,
    pub variables: IndexMap<String, String>,
    /// Names declared through `columns[<i>][data]`, in index order.
    pub columns: Vec<String>,
}

pub const DEFAULT_PAGE_LENGTH: u64 = 10;

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            draw: 0,
            start: 0,
            length: DEFAULT_PAGE_LENGTH,
            search_value: String::new(),
            column_search: IndexMap::new(),
            order_column_index: None,
            order_direction: SortDirection::Asc,
            variables: IndexMap::new(),
            columns: Vec::new(),
        }
    }
}

/// Response envelope for one report call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub draw: i64,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Vec<Map<String, Value>>,
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResult {
    /// Zero-count, empty-data envelope carrying an execution failure.
    pub fn failed(draw: i64, headers: Vec<String>, error: impl Into<String>) -> Self {
        Self {
            draw,
            records_total: 0,
            records_filtered: 0,
            data: Vec::new(),
            headers,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_descriptor_accepts_bare_string() {
        let cols: Vec<ColumnDescriptor> =
            serde_yaml::from_str("- id\n- name: total\n  display: Total\n  type: number\n")
                .unwrap();
        assert_eq!(cols[0], ColumnDescriptor::named("id"));
        assert_eq!(cols[1].display, "Total");
        assert_eq!(cols[1].data_type, "number");
        assert_eq!(cols[1].description, "");
    }

    #[test]
    fn sort_direction_is_permissive() {
        assert_eq!(SortDirection::from_input("Desc"), SortDirection::Desc);
        assert_eq!(SortDirection::from_input("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::from_input("banana"), SortDirection::Asc);
        assert_eq!(SortDirection::from_input(""), SortDirection::Asc);
    }

    #[test]
    fn envelope_uses_grid_field_names() {
        let ok = QueryResult {
            draw: 3,
            records_total: 5,
            records_filtered: 2,
            data: vec![],
            headers: vec!["id".to_string()],
            error: None,
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["recordsTotal"], 5);
        assert_eq!(json["recordsFiltered"], 2);
        assert!(json.get("error").is_none());

        let failed = serde_json::to_value(QueryResult::failed(3, vec![], "boom")).unwrap();
        assert_eq!(failed["error"], "boom");
        assert_eq!(failed["recordsTotal"], 0);
    }
}
