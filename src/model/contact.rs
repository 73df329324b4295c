use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::dto::lead_dto::{ContactSubmission, StatusPatch};
use crate::model::{FieldChanges, Lead};
use crate::validation::{self, ValidationError};

/// A message from the public contact form. The inbox is append-only: there is
/// no status to moderate, only list and delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Lead for ContactMessage {
    type Submission = ContactSubmission;
    type Patch = StatusPatch;

    const COLLECTION: &'static str = "contacts";
    const ROUTE: &'static str = "/api/contacts";
    const LIST_KEY: &'static str = "contacts";
    const LABEL: &'static str = "contact message";

    fn from_submission(raw: ContactSubmission, now: &str) -> Result<Self, ValidationError> {
        validation::bounds("", &raw)?;
        Ok(ContactMessage {
            id: None,
            name: validation::required("name", raw.name)?,
            email: validation::email("email", raw.email)?,
            phone: validation::loose_phone("phone", raw.phone)?,
            subject: validation::optional(raw.subject),
            message: validation::required("message", raw.message)?,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    fn patch_changes(_patch: StatusPatch) -> Result<FieldChanges, ValidationError> {
        Err(ValidationError::NotModifiable("status".to_string()))
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2026-10-18T09:00:00.000Z";

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: Some("  Ravi Kumar ".into()),
            email: Some(" Ravi.Kumar@Example.COM".into()),
            phone: Some("+91 98765 43210".into()),
            subject: Some("   ".into()),
            message: Some("Need an AMC quote for 20 desktops.\n".into()),
        }
    }

    #[test]
    fn normalizes_fields() {
        let contact = ContactMessage::from_submission(submission(), NOW).unwrap();
        assert_eq!(contact.name, "Ravi Kumar");
        assert_eq!(contact.email, "ravi.kumar@example.com");
        assert_eq!(contact.phone.as_deref(), Some("+91 98765 43210"));
        assert_eq!(contact.subject, None);
        assert_eq!(contact.message, "Need an AMC quote for 20 desktops.");
        assert_eq!(contact.created_at, NOW);
        assert_eq!(contact.updated_at, NOW);
    }

    #[test]
    fn message_is_required() {
        let raw = ContactSubmission { message: None, ..submission() };
        assert_eq!(
            ContactMessage::from_submission(raw, NOW),
            Err(ValidationError::MissingField("message".to_string()))
        );
    }

    #[test]
    fn overlong_message_is_rejected() {
        let raw = ContactSubmission { message: Some("x".repeat(5001)), ..submission() };
        assert!(matches!(
            ContactMessage::from_submission(raw, NOW),
            Err(ValidationError::InvalidValue { field, .. }) if field == "message"
        ));
    }

    #[test]
    fn status_cannot_be_patched() {
        let patch = StatusPatch { status: Some("read".into()) };
        assert_eq!(
            ContactMessage::patch_changes(patch),
            Err(ValidationError::NotModifiable("status".to_string()))
        );
    }
}
