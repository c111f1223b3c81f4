//! Row records extracted from the source table.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Key under which the generated identifier is stored.
pub const ID_FIELD: &str = "id";

/// One data row of the source table.
///
/// Serializes as a flat object: the present fields in configured order,
/// followed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Cell values keyed by configured field name. Trailing fields are
    /// absent when the source row was short.
    #[serde(flatten)]
    pub fields: IndexMap<String, String>,

    /// Fresh per extraction, never reused across invocations.
    pub id: String,
}

impl Record {
    /// Zip `cells` positionally against `field_names` and assign a new id.
    ///
    /// Cells beyond the last field name are dropped; field names beyond the
    /// last cell are left out.
    pub fn from_cells<I>(field_names: &[String], cells: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let fields = field_names.iter().cloned().zip(cells).collect();
        Self {
            fields,
            id: Uuid::new_v4().to_string(),
        }
    }

    /// Get a field value by name.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Number of populated fields (the id is not counted).
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The record as a single JSON object, `id` included.
    pub fn to_item(&self) -> serde_json::Value {
        let mut item: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        item.insert(ID_FIELD.to_string(), serde_json::Value::String(self.id.clone()));
        serde_json::Value::Object(item)
    }
}
