use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::model::{FieldChanges, Lead};
use crate::repository::repository_error::RepositoryResult;

/// Exact-match filter, ordering window and cap for a list query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListFilter {
    pub equals: FieldChanges,
    pub skip: u64,
    pub limit: u32,
}

/// Result of an insert guarded by the record's unique business key.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome<E> {
    Inserted(E),
    /// A record with the same key already existed; nothing was written.
    Existing(E),
}

/// The Entity Store port for one lead collection.
#[async_trait]
pub trait LeadRepository<E: Lead>: Send + Sync {
    /// Inserts a new record, assigning its id.
    async fn create(&self, record: E) -> RepositoryResult<E>;

    /// Atomically inserts the record unless one with the same `E::UNIQUE_KEY`
    /// value exists, in which case the existing record is returned untouched.
    async fn insert_if_absent(&self, record: E) -> RepositoryResult<InsertOutcome<E>>;

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<E>;

    /// Merges `changes` into the record and advances `updatedAt`.
    ///
    /// When `guard` is set the update only applies if that stored field still
    /// holds that value. Returns `None` when no record matched.
    async fn update_fields(
        &self,
        id: ObjectId,
        guard: Option<(&'static str, &'static str)>,
        changes: &FieldChanges,
    ) -> RepositoryResult<Option<E>>;

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;

    /// Newest-first by `createdAt`.
    async fn list(&self, filter: &ListFilter) -> RepositoryResult<Vec<E>>;

    /// Number of records matching `filter.equals`, ignoring skip and limit.
    async fn count(&self, filter: &ListFilter) -> RepositoryResult<u64>;
}
