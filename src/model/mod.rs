pub mod choice;
pub mod contact;
pub mod newsletter;
pub mod order;
pub mod product_demo;
pub mod repair;
pub mod shop_quote;
pub mod training;

use std::fmt::Debug;

use bson::oid::ObjectId;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Serialize};

use crate::dto::lead_dto::StatusPatch;
use crate::model::choice::Choice;
use crate::validation::{self, ValidationError};

pub use contact::ContactMessage;
pub use newsletter::NewsletterSubscriber;
pub use order::Order;
pub use product_demo::ProductDemoRequest;
pub use repair::RepairRequest;
pub use shop_quote::ShopQuoteRequest;
pub use training::TrainingEnquiry;

/// Stored field name of the creation timestamp, shared by every collection.
pub const CREATED_AT: &str = "createdAt";
/// Stored field name of the last-mutation timestamp.
pub const UPDATED_AT: &str = "updatedAt";

/// Field/value pairs written by a moderation update, in stored field names.
pub type FieldChanges = Vec<(&'static str, String)>;

/// A stored field the admin list can be filtered on, with its allow-list.
#[derive(Debug, Clone, Copy)]
pub struct FilterField {
    pub name: &'static str,
    pub allowed: &'static [&'static str],
}

/// What intake does when a submission collides with an existing unique key.
#[derive(Debug, Clone, PartialEq)]
pub enum Resubmission {
    /// Reject the submission as a conflict with this message.
    Reject(String),
    /// Mutate the existing record, provided `guard` still holds.
    Reactivate {
        guard: (&'static str, &'static str),
        changes: FieldChanges,
    },
}

/// One kind of moderated lead: its record shape, allow-lists and intake rules.
///
/// Every lead collection is an instance of this: the repository, service,
/// handlers and router are all generic over it.
pub trait Lead: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + Unpin + 'static {
    /// Raw body accepted by the intake endpoint.
    type Submission: DeserializeOwned + Send + 'static;
    /// Raw body accepted by the moderation update endpoint.
    type Patch: DeserializeOwned + Send + 'static;

    const COLLECTION: &'static str;
    const ROUTE: &'static str;
    /// Key of the array in list responses.
    const LIST_KEY: &'static str;
    /// Human-readable name used in messages and logs.
    const LABEL: &'static str;
    const FILTERS: &'static [FilterField] = &[];
    /// Stored field carrying a business key that must be unique.
    const UNIQUE_KEY: Option<&'static str> = None;

    /// Validates and normalizes a submission into a new record stamped at `now`.
    fn from_submission(raw: Self::Submission, now: &str) -> Result<Self, ValidationError>;

    /// Validates a moderation patch into the stored fields it changes.
    fn patch_changes(patch: Self::Patch) -> Result<FieldChanges, ValidationError>;

    fn id(&self) -> Option<ObjectId>;
    fn set_id(&mut self, id: ObjectId);

    /// Value of `UNIQUE_KEY` for this record.
    fn unique_value(&self) -> Option<String> {
        None
    }

    fn on_resubmit(&self) -> Resubmission {
        Resubmission::Reject(format!("{} already exists", Self::LABEL))
    }
}

/// Changes for a single-`status` patch, checked against `S`.
pub(crate) fn status_changes<S: Choice>(patch: StatusPatch) -> Result<FieldChanges, ValidationError> {
    let status: S = validation::choice("status", patch.status)?;
    Ok(vec![("status", status.as_str().to_string())])
}

/// Current UTC time, fixed-width RFC 3339 so stored timestamps sort lexically.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Timestamp for a mutation of a record last stamped at `previous`.
///
/// Strictly later than `previous`, even within the same millisecond.
pub fn next_timestamp(previous: Option<&str>) -> String {
    let now = Utc::now();
    let floor = previous
        .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
        .map(|p| p.with_timezone(&Utc) + Duration::milliseconds(1));
    match floor {
        Some(floor) if floor > now => format_timestamp(floor),
        _ => format_timestamp(now),
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_are_fixed_width_utc() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), "2026-01-01T00:00:00.000Z".len());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn next_timestamp_moves_past_previous() {
        let ahead = "2999-01-01T00:00:00.999Z";
        assert_eq!(next_timestamp(Some(ahead)), "2999-01-01T00:00:01.000Z");

        let stale = "2000-01-01T00:00:00.000Z";
        assert!(next_timestamp(Some(stale)).as_str() > stale);
        assert_eq!(next_timestamp(Some("garbage")).len(), stale.len());
    }
}
