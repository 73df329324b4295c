use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::dto::lead_dto::{NewsletterSubmission, StatusPatch};
use crate::model::choice::{choice_enum, Choice};
use crate::model::{status_changes, FieldChanges, FilterField, Lead, Resubmission};
use crate::validation::{self, ValidationError};

choice_enum!(SubscriberStatus {
    Active => "active",
    Pending => "pending",
    Unsubscribed => "unsubscribed",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub status: SubscriberStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Lead for NewsletterSubscriber {
    type Submission = NewsletterSubmission;
    type Patch = StatusPatch;

    const COLLECTION: &'static str = "newsletter_subscribers";
    const ROUTE: &'static str = "/api/newsletter";
    const LIST_KEY: &'static str = "subscribers";
    const LABEL: &'static str = "newsletter subscription";
    const FILTERS: &'static [FilterField] = &[FilterField {
        name: "status",
        allowed: SubscriberStatus::WIRE,
    }];
    const UNIQUE_KEY: Option<&'static str> = Some("email");

    // No confirmation step: a fresh subscription is active immediately.
    fn from_submission(raw: NewsletterSubmission, now: &str) -> Result<Self, ValidationError> {
        Ok(NewsletterSubscriber {
            id: None,
            email: validation::email("email", raw.email)?,
            status: SubscriberStatus::Active,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    fn patch_changes(patch: StatusPatch) -> Result<FieldChanges, ValidationError> {
        status_changes::<SubscriberStatus>(patch)
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn unique_value(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn on_resubmit(&self) -> Resubmission {
        match self.status {
            SubscriberStatus::Unsubscribed => Resubmission::Reactivate {
                guard: ("status", SubscriberStatus::Unsubscribed.as_str()),
                changes: vec![("status", SubscriberStatus::Active.as_str().to_string())],
            },
            _ => Resubmission::Reject(format!("{} is already subscribed", self.email)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2026-10-18T09:00:00.000Z";

    fn subscriber(status: SubscriberStatus) -> NewsletterSubscriber {
        NewsletterSubscriber {
            id: Some(ObjectId::new()),
            email: "asha@x.com".into(),
            status,
            created_at: NOW.into(),
            updated_at: NOW.into(),
        }
    }

    #[test]
    fn fresh_subscription_is_active_with_normalized_email() {
        let raw = NewsletterSubmission { email: Some("  Asha@X.com ".into()) };
        let sub = NewsletterSubscriber::from_submission(raw, NOW).unwrap();
        assert_eq!(sub.email, "asha@x.com");
        assert_eq!(sub.status, SubscriberStatus::Active);
        assert_eq!(sub.unique_value().as_deref(), Some("asha@x.com"));
    }

    #[test]
    fn resubmitting_unsubscribed_reactivates() {
        assert_eq!(
            subscriber(SubscriberStatus::Unsubscribed).on_resubmit(),
            Resubmission::Reactivate {
                guard: ("status", "unsubscribed"),
                changes: vec![("status", "active".to_string())],
            }
        );
    }

    #[test]
    fn resubmitting_active_or_pending_is_rejected() {
        for status in [SubscriberStatus::Active, SubscriberStatus::Pending] {
            assert!(matches!(
                subscriber(status).on_resubmit(),
                Resubmission::Reject(_)
            ));
        }
    }

    #[test]
    fn status_patch_checks_allow_list() {
        let ok = StatusPatch { status: Some("unsubscribed".into()) };
        assert_eq!(
            NewsletterSubscriber::patch_changes(ok),
            Ok(vec![("status", "unsubscribed".to_string())])
        );
        let bad = StatusPatch { status: Some("gone".into()) };
        assert!(matches!(
            NewsletterSubscriber::patch_changes(bad),
            Err(ValidationError::InvalidSelection { .. })
        ));
        assert_eq!(
            NewsletterSubscriber::patch_changes(StatusPatch::default()),
            Err(ValidationError::MissingField("status".to_string()))
        );
    }
}
