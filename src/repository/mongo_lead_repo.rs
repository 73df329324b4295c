use std::time::Duration;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::{
    ClientOptions, Credential, FindOneAndUpdateOptions, FindOptions, IndexOptions,
    ResolverConfig, ReturnDocument,
};
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::{error, info, instrument};

use crate::config::mongo_conf::MongoConfig;
use crate::model::{now_timestamp, FieldChanges, Lead, CREATED_AT, UPDATED_AT};
use crate::repository::lead_repo::{InsertOutcome, LeadRepository, ListFilter};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Aggregation expression for the greater of `now` and the stored
/// `updatedAt` plus one millisecond, in the stored string format.
fn advanced_updated_at(now: &str) -> Document {
    let field = format!("${}", UPDATED_AT);
    doc! {
        "$max": [
            now,
            {
                "$dateToString": {
                    "format": "%Y-%m-%dT%H:%M:%S.%LZ",
                    "date": { "$add": [{ "$dateFromString": { "dateString": field, "onError": null } }, 1] }
                }
            }
        ]
    }
}

/// Opens the process-wide client. The returned handle is cheap to clone and
/// shares one connection pool.
pub async fn connect_database(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options =
        ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("LeadhubBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(Duration::from_secs(config.connection_timeout_secs));
    client_options.server_selection_timeout =
        Some(Duration::from_secs(config.connection_timeout_secs));

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    info!(database = %config.database, "MongoDB client initialised");
    Ok(client.database(&config.database))
}

pub struct MongoLeadRepository<E: Lead> {
    collection: Collection<E>,
}

impl<E: Lead> MongoLeadRepository<E> {
    pub fn new(database: &Database) -> Self {
        MongoLeadRepository {
            collection: database.collection::<E>(E::COLLECTION),
        }
    }

    /// Unique index on the business key, plus indexes backing the list filters
    /// and the newest-first ordering.
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let mut indexes = vec![IndexModel::builder().keys(single_key(CREATED_AT, -1)).build()];
        if let Some(key) = E::UNIQUE_KEY {
            indexes.push(
                IndexModel::builder()
                    .keys(single_key(key, 1))
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            );
        }
        for field in E::FILTERS {
            indexes.push(IndexModel::builder().keys(single_key(field.name, 1)).build());
        }
        self.collection.create_indexes(indexes, None).await?;
        info!(collection = E::COLLECTION, "Indexes ensured");
        Ok(())
    }
}

fn single_key(field: &str, direction: i32) -> Document {
    let mut keys = Document::new();
    keys.insert(field, direction);
    keys
}

fn equality_filter(filter: &ListFilter) -> Document {
    let mut query = Document::new();
    for (field, value) in &filter.equals {
        query.insert(*field, value.clone());
    }
    query
}

#[async_trait]
impl<E: Lead> LeadRepository<E> for MongoLeadRepository<E> {
    #[instrument(skip(self, record), fields(collection = E::COLLECTION))]
    async fn create(&self, mut record: E) -> RepositoryResult<E> {
        record.set_id(ObjectId::new());
        match self.collection.insert_one(record.clone(), None).await {
            Ok(_) => {
                info!("Record created");
                Ok(record)
            }
            Err(e) => {
                error!("Failed to create record: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[instrument(skip(self, record), fields(collection = E::COLLECTION))]
    async fn insert_if_absent(&self, mut record: E) -> RepositoryResult<InsertOutcome<E>> {
        let (Some(key), Some(value)) = (E::UNIQUE_KEY, record.unique_value()) else {
            return self.create(record).await.map(InsertOutcome::Inserted);
        };
        record.set_id(ObjectId::new());

        let mut filter = Document::new();
        filter.insert(key, value);
        let update = doc! { "$setOnInsert": bson::to_document(&record)? };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();

        match self.collection.find_one_and_update(filter, update, options).await {
            Ok(None) => {
                info!("Record created");
                Ok(InsertOutcome::Inserted(record))
            }
            Ok(Some(existing)) => {
                info!(key, "Record with the same key already exists");
                Ok(InsertOutcome::Existing(existing))
            }
            Err(e) => {
                error!("Failed to upsert record: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[instrument(skip(self), fields(collection = E::COLLECTION, id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<E> {
        match self.collection.find_one(doc! { "_id": id }, None).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(RepositoryError::not_found(format!(
                "{} not found for ID: {}",
                E::LABEL,
                id
            ))),
            Err(e) => {
                error!("Failed to fetch record by ID: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[instrument(skip(self, changes), fields(collection = E::COLLECTION, id = %id))]
    async fn update_fields(
        &self,
        id: ObjectId,
        guard: Option<(&'static str, &'static str)>,
        changes: &FieldChanges,
    ) -> RepositoryResult<Option<E>> {
        let mut filter = doc! { "_id": id };
        if let Some((field, expected)) = guard {
            filter.insert(field, expected);
        }
        // Pipeline form, so the new stamp can be computed from the stored one.
        let mut set = Document::new();
        for (field, value) in changes {
            set.insert(*field, doc! { "$literal": value.clone() });
        }
        set.insert(UPDATED_AT, advanced_updated_at(&now_timestamp()));
        let update = vec![doc! { "$set": set }];

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        match self
            .collection
            .find_one_and_update(filter, update, options)
            .await
        {
            Ok(updated) => {
                info!(matched = updated.is_some(), "Record update applied");
                Ok(updated)
            }
            Err(e) => {
                error!("Failed to update record: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[instrument(skip(self), fields(collection = E::COLLECTION, id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        match self.collection.delete_one(doc! { "_id": id }, None).await {
            Ok(result) if result.deleted_count > 0 => {
                info!("Record deleted");
                Ok(())
            }
            Ok(_) => Err(RepositoryError::not_found(format!(
                "No {} found to delete for ID: {}",
                E::LABEL,
                id
            ))),
            Err(e) => {
                error!("Failed to delete record: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    async fn list(&self, filter: &ListFilter) -> RepositoryResult<Vec<E>> {
        let mut sort = single_key(CREATED_AT, -1);
        sort.insert("_id", -1);
        let options = FindOptions::builder()
            .sort(sort)
            .skip(filter.skip)
            .limit(i64::from(filter.limit))
            .build();

        let mut cursor = self
            .collection
            .find(equality_filter(filter), options)
            .await
            .map_err(|e| {
                error!("Failed to list records: {}", e);
                RepositoryError::from(e)
            })?;
        let mut records = Vec::new();
        while let Some(record) = cursor.next().await {
            match record {
                Ok(r) => records.push(r),
                Err(e) => {
                    error!("Failed to read record from cursor: {}", e);
                    return Err(RepositoryError::from(e));
                }
            }
        }
        info!("Fetched {} records", records.len());
        Ok(records)
    }

    #[instrument(skip(self), fields(collection = E::COLLECTION))]
    async fn count(&self, filter: &ListFilter) -> RepositoryResult<u64> {
        self.collection
            .count_documents(equality_filter(filter), None)
            .await
            .map_err(|e| {
                error!("Failed to count records: {}", e);
                RepositoryError::from(e)
            })
    }
}
