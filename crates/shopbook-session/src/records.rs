//! # Record Codec
//!
//! Domain types travel as JSON document bodies. Bodies embed the record
//! id (so a document is self-contained), and decoding trusts the store's
//! addressing over the body: the document id always wins.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use shopbook_store::{Document, StoreError};

use crate::error::SessionResult;

/// Serializes a record into a document body.
pub(crate) fn to_body<T: Serialize>(record: &T) -> SessionResult<Value> {
    let body = serde_json::to_value(record)
        .map_err(|e| StoreError::Internal(format!("encode record: {e}")))?;
    Ok(body)
}

/// Decodes a document into a record, stamping the document id into the
/// body first.
pub(crate) fn from_doc<T: DeserializeOwned>(collection: &str, doc: &Document) -> SessionResult<T> {
    let mut body = doc.body.clone();
    if let Some(map) = body.as_object_mut() {
        map.insert("id".to_string(), Value::String(doc.id.clone()));
    }

    let record = serde_json::from_value(body)
        .map_err(|e| StoreError::corrupt(collection, format!("{}: {}", doc.id, e)))?;
    Ok(record)
}

/// Decodes a whole query result.
pub(crate) fn decode_all<T: DeserializeOwned>(
    collection: &str,
    docs: &[Document],
) -> SessionResult<Vec<T>> {
    docs.iter().map(|d| from_doc(collection, d)).collect()
}
