use catalog_db::{Document, StoreError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Description stored when the owner leaves it out.
pub const DEFAULT_DESCRIPTION: &str = "Owner choose not to add the description";

/// Physical condition of a listed book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    New,
    Used,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
        }
    }

    /// Exact, case-sensitive parse of `"new"` / `"used"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Condition::New),
            "used" => Some(Condition::Used),
            _ => None,
        }
    }
}

/// A stored book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Identifier assigned by the store
    #[serde(rename = "_id")]
    pub id: String,
    pub book_name: String,
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_of_publication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<u64>,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

impl Book {
    pub fn from_document(document: Document) -> Result<Self, StoreError> {
        from_document(document)
    }
}

/// A validated book ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBook {
    pub book_name: String,
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_publication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<u64>,
    pub condition: Condition,
    pub description: String,
}

/// A validated partial update. `None` fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_publication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One page of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPage {
    pub total_books: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub data: Vec<Book>,
}

/// Serialize a record into a store document.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record)? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected an object, got {other}"
        ))),
    }
}

fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, StoreError> {
    Ok(serde_json::from_value(serde_json::Value::Object(document))?)
}
