use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::{error, info, instrument, warn};

use crate::model::{now_timestamp, Lead, Resubmission};
use crate::repository::lead_repo::{InsertOutcome, LeadRepository, ListFilter};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::util::error::ServiceError;
use crate::validation::ValidationError;

/// How an accepted submission landed in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    /// An existing record was brought back instead of inserting a new one.
    Reactivated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submitted<E> {
    pub record: E,
    pub outcome: SubmitOutcome,
}

/// One page of a filtered, newest-first list.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadPage<E> {
    pub records: Vec<E>,
    /// All records matching the filter, regardless of paging.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[async_trait]
pub trait LeadService<E: Lead>: Send + Sync {
    async fn submit(&self, raw: E::Submission) -> Result<Submitted<E>, ServiceError>;
    async fn get(&self, id: ObjectId) -> Result<E, ServiceError>;
    /// `params` are the raw query parameters: filter fields, `page` and `limit`.
    async fn list(&self, params: &HashMap<String, String>) -> Result<LeadPage<E>, ServiceError>;
    async fn update(&self, id: ObjectId, patch: E::Patch) -> Result<E, ServiceError>;
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError>;
}

pub struct LeadServiceImpl<E: Lead> {
    pub repo: Arc<dyn LeadRepository<E>>,
    /// Bound on every store call.
    pub timeout: Duration,
    pub default_limit: u32,
    pub max_limit: u32,
}

impl<E: Lead> LeadServiceImpl<E> {
    pub fn new(
        repo: Arc<dyn LeadRepository<E>>,
        timeout: Duration,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        LeadServiceImpl { repo, timeout, default_limit, max_limit }
    }

    /// Runs one store call under the configured timeout.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, ServiceError>
    where
        F: Future<Output = RepositoryResult<T>> + Send,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e @ (RepositoryError::NotFound(_) | RepositoryError::AlreadyExists(_)))) => {
                warn!(operation, "{}", e);
                Err(ServiceError::from(e))
            }
            Ok(Err(e)) => {
                error!(operation, "Store call failed: {}", e);
                Err(ServiceError::from(e))
            }
            Err(_) => {
                error!(operation, "Store call timed out after {:?}", self.timeout);
                Err(ServiceError::StoreUnavailable(format!(
                    "{} timed out after {:?}",
                    operation, self.timeout
                )))
            }
        }
    }

    fn list_filter(&self, params: &HashMap<String, String>) -> Result<ListFilter, ValidationError> {
        let mut unsupported: Vec<&str> = params
            .keys()
            .map(String::as_str)
            .filter(|key| !PAGING_PARAMS.contains(key) && !E::FILTERS.iter().any(|f| f.name == *key))
            .collect();
        if !unsupported.is_empty() {
            unsupported.sort_unstable();
            return Err(ValidationError::InvalidValue {
                field: unsupported.join(", "),
                reason: format!("is not a {} filter", E::LABEL),
            });
        }

        let mut equals = Vec::new();
        for field in E::FILTERS {
            let Some(raw) = params.get(field.name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
                continue;
            };
            if !field.allowed.contains(&raw) {
                return Err(ValidationError::InvalidSelection {
                    field: field.name.to_string(),
                    values: vec![raw.to_string()],
                });
            }
            equals.push((field.name, raw.to_string()));
        }

        let limit = match positive_param(params, "limit")? {
            Some(limit) => limit.min(self.max_limit),
            None => self.default_limit.min(self.max_limit),
        };
        let page = positive_param(params, "page")?.unwrap_or(1);

        Ok(ListFilter {
            equals,
            skip: u64::from(page - 1) * u64::from(limit),
            limit,
        })
    }

    fn page_of(filter: &ListFilter) -> u32 {
        if filter.limit == 0 {
            return 1;
        }
        u32::try_from(filter.skip / u64::from(filter.limit)).map_or(u32::MAX, |p| p.saturating_add(1))
    }
}

const PAGING_PARAMS: [&str; 2] = ["limit", "page"];

/// Parses an optional query parameter that must be a positive integer.
fn positive_param(params: &HashMap<String, String>, name: &str) -> Result<Option<u32>, ValidationError> {
    let Some(raw) = params.get(name).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ValidationError::InvalidValue {
            field: name.to_string(),
            reason: "must be a positive integer".to_string(),
        }),
    }
}

#[async_trait]
impl<E: Lead> LeadService<E> for LeadServiceImpl<E> {
    #[instrument(skip(self, raw), fields(lead = E::LABEL))]
    async fn submit(&self, raw: E::Submission) -> Result<Submitted<E>, ServiceError> {
        let record = E::from_submission(raw, &now_timestamp()).map_err(|e| {
            warn!("Rejected submission: {}", e);
            ServiceError::from(e)
        })?;

        match self.bounded("insert", self.repo.insert_if_absent(record)).await? {
            InsertOutcome::Inserted(record) => {
                info!(id = ?record.id(), "Submission stored");
                Ok(Submitted { record, outcome: SubmitOutcome::Created })
            }
            InsertOutcome::Existing(existing) => match existing.on_resubmit() {
                Resubmission::Reject(message) => {
                    warn!("Rejected duplicate submission: {}", message);
                    Err(ServiceError::Conflict(message))
                }
                Resubmission::Reactivate { guard, changes } => {
                    let id = existing.id().ok_or_else(|| {
                        ServiceError::Internal(format!("stored {} has no id", E::LABEL))
                    })?;
                    match self
                        .bounded("reactivate", self.repo.update_fields(id, Some(guard), &changes))
                        .await?
                    {
                        Some(record) => {
                            info!(%id, "Existing record reactivated");
                            Ok(Submitted { record, outcome: SubmitOutcome::Reactivated })
                        }
                        // Another request changed the record between the lookup and the update.
                        None => {
                            warn!(%id, "Reactivation lost a race");
                            Err(ServiceError::Conflict(format!("{} already exists", E::LABEL)))
                        }
                    }
                }
            },
        }
    }

    #[instrument(skip(self), fields(lead = E::LABEL, id = %id))]
    async fn get(&self, id: ObjectId) -> Result<E, ServiceError> {
        self.bounded("get", self.repo.get_by_id(id)).await
    }

    #[instrument(skip(self), fields(lead = E::LABEL))]
    async fn list(&self, params: &HashMap<String, String>) -> Result<LeadPage<E>, ServiceError> {
        let filter = self.list_filter(params).map_err(|e| {
            warn!("Rejected list query: {}", e);
            ServiceError::from(e)
        })?;
        let records = self.bounded("list", self.repo.list(&filter)).await?;
        let total = self.bounded("count", self.repo.count(&filter)).await?;
        if total > u64::from(filter.limit) {
            info!(total, limit = filter.limit, "List result capped");
        }
        Ok(LeadPage {
            records,
            total,
            page: Self::page_of(&filter),
            limit: filter.limit,
        })
    }

    #[instrument(skip(self, patch), fields(lead = E::LABEL, id = %id))]
    async fn update(&self, id: ObjectId, patch: E::Patch) -> Result<E, ServiceError> {
        let changes = E::patch_changes(patch).map_err(|e| {
            warn!("Rejected update: {}", e);
            ServiceError::from(e)
        })?;
        match self.bounded("update", self.repo.update_fields(id, None, &changes)).await? {
            Some(record) => {
                info!(?changes, "Record updated");
                Ok(record)
            }
            None => Err(ServiceError::NotFound(format!("{} not found for ID: {}", E::LABEL, id))),
        }
    }

    #[instrument(skip(self), fields(lead = E::LABEL, id = %id))]
    async fn delete(&self, id: ObjectId) -> Result<(), ServiceError> {
        self.bounded("delete", self.repo.delete(id)).await?;
        info!("Record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::lead_dto::{NewsletterSubmission, OrderPatch, StatusPatch};
    use crate::model::newsletter::{NewsletterSubscriber, SubscriberStatus};
    use crate::model::Order;
    use crate::repository::memory_lead_repo::InMemoryLeadRepository;
    use rstest::rstest;

    struct StalledRepository;

    #[async_trait]
    impl LeadRepository<NewsletterSubscriber> for StalledRepository {
        async fn create(&self, _: NewsletterSubscriber) -> RepositoryResult<NewsletterSubscriber> {
            std::future::pending().await
        }
        async fn insert_if_absent(
            &self,
            _: NewsletterSubscriber,
        ) -> RepositoryResult<InsertOutcome<NewsletterSubscriber>> {
            std::future::pending().await
        }
        async fn get_by_id(&self, _: ObjectId) -> RepositoryResult<NewsletterSubscriber> {
            std::future::pending().await
        }
        async fn update_fields(
            &self,
            _: ObjectId,
            _: Option<(&'static str, &'static str)>,
            _: &crate::model::FieldChanges,
        ) -> RepositoryResult<Option<NewsletterSubscriber>> {
            std::future::pending().await
        }
        async fn delete(&self, _: ObjectId) -> RepositoryResult<()> {
            Err(RepositoryError::connection("server selection timeout"))
        }
        async fn list(&self, _: &ListFilter) -> RepositoryResult<Vec<NewsletterSubscriber>> {
            std::future::pending().await
        }
        async fn count(&self, _: &ListFilter) -> RepositoryResult<u64> {
            std::future::pending().await
        }
    }

    fn newsletter_service() -> LeadServiceImpl<NewsletterSubscriber> {
        LeadServiceImpl::new(
            Arc::new(InMemoryLeadRepository::new()),
            Duration::from_secs(5),
            50,
            100,
        )
    }

    fn signup(email: &str) -> NewsletterSubmission {
        NewsletterSubmission { email: Some(email.to_string()) }
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn resubscribing_an_unsubscribed_email_reactivates_it() {
        let service = newsletter_service();
        let first = service.submit(signup("Reader@Example.com ")).await.unwrap();
        assert_eq!(first.outcome, SubmitOutcome::Created);
        let id = first.record.id.unwrap();

        service
            .update(id, StatusPatch { status: Some("unsubscribed".into()) })
            .await
            .unwrap();
        let again = service.submit(signup("reader@example.com")).await.unwrap();
        assert_eq!(again.outcome, SubmitOutcome::Reactivated);
        assert_eq!(again.record.id, Some(id));
        assert_eq!(again.record.status, SubscriberStatus::Active);

        let page = service.list(&HashMap::new()).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn active_subscriber_resubmitting_is_a_conflict() {
        let service = newsletter_service();
        service.submit(signup("reader@example.com")).await.unwrap();
        let err = service.submit(signup("reader@example.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_order_id_is_a_conflict() {
        use crate::dto::lead_dto::{ContactFields, OrderSubmission, ProductFields};
        let service: LeadServiceImpl<Order> = LeadServiceImpl::new(
            Arc::new(InMemoryLeadRepository::new()),
            Duration::from_secs(5),
            50,
            100,
        );
        let order = || OrderSubmission {
            order_id: Some("ORD-7".into()),
            product: Some(ProductFields { name: Some("Mouse".into()), ..Default::default() }),
            customer_info: Some(ContactFields {
                name: Some("Ravi".into()),
                email: Some("ravi@x.com".into()),
                ..Default::default()
            }),
            quantity: Some(1),
            unit_price: Some(10.0),
            total_price: Some(10.0),
            discount: None,
            notes: None,
        };
        service.submit(order()).await.unwrap();
        let err = service.submit(order()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let id = service.list(&HashMap::new()).await.unwrap().records[0].id.unwrap();
        let updated = service
            .update(id, OrderPatch { order_status: None, payment_status: Some("Paid".into()) })
            .await
            .unwrap();
        assert_eq!(updated.payment_status.to_string(), "Paid");
    }

    #[rstest]
    #[case(&[], 50, 0)]
    #[case(&[("limit", "10")], 10, 0)]
    #[case(&[("limit", "500")], 100, 0)]
    #[case(&[("limit", "20"), ("page", "3")], 20, 40)]
    fn list_window_is_capped(
        #[case] query: &[(&str, &str)],
        #[case] limit: u32,
        #[case] skip: u64,
    ) {
        let filter = newsletter_service().list_filter(&params(query)).unwrap();
        assert_eq!(filter.limit, limit);
        assert_eq!(filter.skip, skip);
    }

    #[rstest]
    #[case("limit", "0")]
    #[case("limit", "ten")]
    #[case("page", "-1")]
    fn bad_paging_is_rejected(#[case] name: &str, #[case] value: &str) {
        let err = newsletter_service().list_filter(&params(&[(name, value)])).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { field, .. } if field == name));
    }

    #[test]
    fn filter_outside_allow_list_is_rejected() {
        let err = newsletter_service()
            .list_filter(&params(&[("status", "deleted")]))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidSelection {
                field: "status".to_string(),
                values: vec!["deleted".to_string()],
            }
        );
    }

    #[test]
    fn unsupported_filter_key_is_rejected() {
        let err = newsletter_service()
            .list_filter(&params(&[("status", "active"), ("customerType", "business")]))
            .unwrap_err();
        assert!(
            matches!(&err, ValidationError::InvalidValue { field, .. } if field == "customerType"),
            "{err:?}"
        );
    }

    #[test]
    fn page_number_follows_skip() {
        let filter = ListFilter { equals: vec![], skip: 40, limit: 20 };
        assert_eq!(LeadServiceImpl::<NewsletterSubscriber>::page_of(&filter), 3);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let err = newsletter_service()
            .update(ObjectId::new(), StatusPatch { status: Some("active".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn stalled_store_surfaces_as_unavailable() {
        let service = LeadServiceImpl::new(
            Arc::new(StalledRepository),
            Duration::from_millis(20),
            50,
            100,
        );
        let err = service.submit(signup("reader@example.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::StoreUnavailable(_)));

        let err = service.delete(ObjectId::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::StoreUnavailable(_)));
    }
}
