use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::model::{next_timestamp, FieldChanges, Lead, CREATED_AT, UPDATED_AT};
use crate::repository::lead_repo::{InsertOutcome, LeadRepository, ListFilter};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Process-local, non-durable Entity Store.
///
/// Records are held as BSON documents so filters and partial updates see the
/// same stored field names as the MongoDB adapter. A single lock makes every
/// operation, including `insert_if_absent`, atomic.
pub struct InMemoryLeadRepository<E: Lead> {
    records: Mutex<Vec<Document>>,
    _kind: std::marker::PhantomData<fn() -> E>,
}

impl<E: Lead> Default for InMemoryLeadRepository<E> {
    fn default() -> Self {
        InMemoryLeadRepository {
            records: Mutex::new(Vec::new()),
            _kind: std::marker::PhantomData,
        }
    }
}

impl<E: Lead> InMemoryLeadRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn id_of(doc: &Document) -> Option<ObjectId> {
    doc.get_object_id("_id").ok()
}

fn field_equals(doc: &Document, field: &str, expected: &str) -> bool {
    matches!(doc.get(field), Some(Bson::String(value)) if value == expected)
}

fn matches_filter(doc: &Document, filter: &ListFilter) -> bool {
    filter
        .equals
        .iter()
        .all(|(field, value)| field_equals(doc, field, value))
}

fn decode<E: Lead>(doc: &Document) -> RepositoryResult<E> {
    Ok(bson::from_document(doc.clone())?)
}

#[async_trait]
impl<E: Lead> LeadRepository<E> for InMemoryLeadRepository<E> {
    #[instrument(skip(self, record), fields(collection = E::COLLECTION))]
    async fn create(&self, mut record: E) -> RepositoryResult<E> {
        record.set_id(ObjectId::new());
        let doc = bson::to_document(&record)?;
        let mut records = self.records.lock().await;
        if let (Some(key), Some(value)) = (E::UNIQUE_KEY, record.unique_value()) {
            if records.iter().any(|d| field_equals(d, key, &value)) {
                return Err(RepositoryError::already_exists(format!(
                    "Duplicate key: {} = {}",
                    key, value
                )));
            }
        }
        records.push(doc);
        debug!("Record created");
        Ok(record)
    }

    #[instrument(skip(self, record), fields(collection = E::COLLECTION))]
    async fn insert_if_absent(&self, mut record: E) -> RepositoryResult<InsertOutcome<E>> {
        let (Some(key), Some(value)) = (E::UNIQUE_KEY, record.unique_value()) else {
            return self.create(record).await.map(InsertOutcome::Inserted);
        };
        let mut records = self.records.lock().await;
        if let Some(existing) = records.iter().find(|d| field_equals(d, key, &value)) {
            return Ok(InsertOutcome::Existing(decode(existing)?));
        }
        record.set_id(ObjectId::new());
        records.push(bson::to_document(&record)?);
        debug!("Record created");
        Ok(InsertOutcome::Inserted(record))
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<E> {
        let records = self.records.lock().await;
        let doc = records
            .iter()
            .find(|d| id_of(d) == Some(id))
            .ok_or_else(|| {
                RepositoryError::not_found(format!("{} not found for ID: {}", E::LABEL, id))
            })?;
        decode(doc)
    }

    #[instrument(skip(self, changes), fields(collection = E::COLLECTION, id = %id))]
    async fn update_fields(
        &self,
        id: ObjectId,
        guard: Option<(&'static str, &'static str)>,
        changes: &FieldChanges,
    ) -> RepositoryResult<Option<E>> {
        let mut records = self.records.lock().await;
        let Some(doc) = records.iter_mut().find(|d| {
            id_of(d) == Some(id)
                && guard.map_or(true, |(field, expected)| field_equals(d, field, expected))
        }) else {
            return Ok(None);
        };

        let stamp = next_timestamp(doc.get_str(UPDATED_AT).ok());
        let mut updated = doc.clone();
        for (field, value) in changes {
            updated.insert(*field, value.clone());
        }
        updated.insert(UPDATED_AT, stamp);
        // Decode before committing so a bad change never lands in the store.
        let record = decode::<E>(&updated)?;
        *doc = updated;
        Ok(Some(record))
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|d| id_of(d) != Some(id));
        if records.len() == before {
            return Err(RepositoryError::not_found(format!(
                "No {} found to delete for ID: {}",
                E::LABEL,
                id
            )));
        }
        Ok(())
    }

    async fn list(&self, filter: &ListFilter) -> RepositoryResult<Vec<E>> {
        let records = self.records.lock().await;
        // Reverse insertion order first, so equal timestamps stay newest-first
        // under the stable sort.
        let mut matching: Vec<&Document> = records
            .iter()
            .rev()
            .filter(|d| matches_filter(d, filter))
            .collect();
        matching.sort_by(|a, b| {
            let a = a.get_str(CREATED_AT).unwrap_or_default();
            let b = b.get_str(CREATED_AT).unwrap_or_default();
            b.cmp(a)
        });
        let skip = usize::try_from(filter.skip).unwrap_or(usize::MAX);
        matching
            .into_iter()
            .skip(skip)
            .take(filter.limit as usize)
            .map(decode)
            .collect()
    }

    async fn count(&self, filter: &ListFilter) -> RepositoryResult<u64> {
        let records = self.records.lock().await;
        Ok(records.iter().filter(|d| matches_filter(d, filter)).count() as u64)
    }
}
