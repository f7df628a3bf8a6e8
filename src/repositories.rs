use async_trait::async_trait;
use mongodb::{bson::{self, doc, Document}, Client, Collection};
use tracing::{event, Level};

use crate::{domain::CheckoutSession, errors::CheckoutError};

pub const CREATED_AT_FIELD: &str = "createdAt";

#[derive(Debug)]
pub struct MongoDbInitializationInfo {
    pub uri: String,
    pub database: String,
    pub collection: String
}

#[async_trait]
pub trait CheckoutRepository {
    async fn save(&self, id: &str, session: &CheckoutSession) -> Result<(), CheckoutError>;
}

/// Used when no document store is configured. Nothing is kept.
#[derive(Clone, Copy, Default)]
pub struct DisabledCheckoutRepository;

#[async_trait]
impl CheckoutRepository for DisabledCheckoutRepository {
    async fn save(&self, id: &str, _session: &CheckoutSession) -> Result<(), CheckoutError> {
        event!(Level::DEBUG, "persistence disabled, checkout {} not stored", id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct MongoDbCheckoutRepository {
    checkout_collection: Collection<Document>
}

impl MongoDbCheckoutRepository {
    /// The driver connects lazily, so this only fails on a malformed URI.
    pub async fn new(info: &MongoDbInitializationInfo) -> Result<Self, mongodb::error::Error> {
        let client: Client = Client::with_uri_str(&info.uri).await?;
        let database = client.database(&info.database);

        Ok(MongoDbCheckoutRepository {
            checkout_collection: database.collection(&info.collection)
        })
    }
}

/// The record's fields without `_id` and `createdAt`, both of which the
/// store assigns.
fn session_document(id: &str, session: &CheckoutSession) -> Result<Document, CheckoutError> {
    let mut document = bson::to_document(session.fields())
        .map_err(|e| CheckoutError::Store { id: id.to_string(), reason: e.to_string() })?;
    document.remove("_id");
    document.remove(CREATED_AT_FIELD);
    Ok(document)
}

/// Update pipeline that replaces the whole document at `id` with the record
/// and stamps `createdAt` with the server clock at write time. `$literal`
/// keeps `$`-prefixed strings in provider data from being read as expressions.
fn replace_pipeline(id: &str, session: &CheckoutSession) -> Result<Vec<Document>, CheckoutError> {
    let document = session_document(id, session)?;

    Ok(vec![doc! {
        "$replaceWith": {
            "$mergeObjects": [
                {"$literal": document},
                {"_id": id, "createdAt": "$$NOW"}
            ]
        }
    }])
}

#[async_trait]
impl CheckoutRepository for MongoDbCheckoutRepository {
    async fn save(&self, id: &str, session: &CheckoutSession) -> Result<(), CheckoutError> {
        let pipeline = replace_pipeline(id, session)?;

        match self.checkout_collection
            .update_one(doc! {"_id": id}, pipeline)
            .upsert(true)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => Err(CheckoutError::Store { id: id.to_string(), reason: e.to_string() }),
        }
    }
}
