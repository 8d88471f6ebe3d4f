use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::errors::{AppError, Result};

/// Returns the next value of a named auto-increment sequence.
///
/// `$inc` on an upserted document initializes the sequence at 1, so the
/// first address ever created gets id 1.
pub async fn next_sequence(db: &Database, key: &str) -> Result<i32> {
    let counters: Collection<Document> = db.collection("counters");

    let updated = counters
        .find_one_and_update(doc! { "_id": key }, doc! { "$inc": { "seq": 1 } })
        .upsert(true)
        .return_document(ReturnDocument::After)
        .await?;

    updated
        .as_ref()
        .and_then(|doc| doc.get_i32("seq").ok())
        .ok_or_else(|| AppError::Internal(format!("counter '{}' returned no sequence", key)))
}
