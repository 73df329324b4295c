use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::dto::lead_dto::{StatusPatch, TrainingSubmission};
use crate::model::choice::{choice_enum, Choice};
use crate::model::{status_changes, FieldChanges, FilterField, Lead};
use crate::validation::{self, ValidationError};

choice_enum!(TrainingProgram {
    Laptop => "laptop",
    Pc => "pc",
    Printer => "printer",
    Gadget => "gadget",
    Corporate => "corporate",
});

choice_enum!(TrainingFormat {
    InPerson => "inPerson",
    Online => "online",
    OnSite => "onSite",
});

choice_enum!(TrainingStatus {
    Pending => "pending",
    Contacted => "contacted",
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineeContact {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingEnquiry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub contact: TraineeContact,
    pub training_programs: Vec<TrainingProgram>,
    pub preferred_format: TrainingFormat,
    pub message: Option<String>,
    pub status: TrainingStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Lead for TrainingEnquiry {
    type Submission = TrainingSubmission;
    type Patch = StatusPatch;

    const COLLECTION: &'static str = "training_enquiries";
    const ROUTE: &'static str = "/api/training-enquiries";
    const LIST_KEY: &'static str = "trainingEnquiries";
    const LABEL: &'static str = "training enquiry";
    const FILTERS: &'static [FilterField] = &[
        FilterField { name: "status", allowed: TrainingStatus::WIRE },
        FilterField { name: "preferredFormat", allowed: TrainingFormat::WIRE },
    ];

    fn from_submission(raw: TrainingSubmission, now: &str) -> Result<Self, ValidationError> {
        validation::bounds("", &raw)?;
        let contact = raw.contact.unwrap_or_default();
        validation::bounds("contact", &contact)?;
        Ok(TrainingEnquiry {
            id: None,
            contact: TraineeContact {
                name: validation::required("contact.name", contact.name)?,
                phone: validation::strict_phone("contact.phone", contact.phone)?,
                email: validation::email("contact.email", contact.email)?,
                address: validation::optional(contact.address),
            },
            training_programs: validation::selections(
                "trainingPrograms",
                raw.training_programs,
                validation::as_is,
            )?,
            preferred_format: validation::choice("preferredFormat", raw.preferred_format)?,
            message: validation::optional(raw.message),
            status: TrainingStatus::Pending,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    fn patch_changes(patch: StatusPatch) -> Result<FieldChanges, ValidationError> {
        status_changes::<TrainingStatus>(patch)
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
    use crate::dto::lead_dto::ContactFields;

    const NOW: &str = "2026-10-18T09:00:00.000Z";

    fn submission() -> TrainingSubmission {
        TrainingSubmission {
            contact: Some(ContactFields {
                name: Some("Farhan".into()),
                phone: Some("9000000001".into()),
                email: Some("farhan@school.edu".into()),
                address: Some("  ".into()),
                ..Default::default()
            }),
            training_programs: Some(vec!["laptop".into(), "printer".into()]),
            preferred_format: Some("onSite".into()),
            message: Some("Batch of 12 staff".into()),
        }
    }

    #[test]
    fn accepts_valid_enquiry() {
        let enquiry = TrainingEnquiry::from_submission(submission(), NOW).unwrap();
        assert_eq!(
            enquiry.training_programs,
            vec![TrainingProgram::Laptop, TrainingProgram::Printer]
        );
        assert_eq!(enquiry.preferred_format, TrainingFormat::OnSite);
        assert_eq!(enquiry.contact.address, None);
        assert_eq!(enquiry.status, TrainingStatus::Pending);
    }

    #[test]
    fn program_codes_are_case_sensitive() {
        let raw = TrainingSubmission {
            training_programs: Some(vec!["Laptop".into()]),
            ..submission()
        };
        assert_eq!(
            TrainingEnquiry::from_submission(raw, NOW),
            Err(ValidationError::InvalidSelection {
                field: "trainingPrograms".to_string(),
                values: vec!["Laptop".to_string()],
            })
        );
    }

    #[test]
    fn preferred_format_is_required() {
        let raw = TrainingSubmission { preferred_format: None, ..submission() };
        assert_eq!(
            TrainingEnquiry::from_submission(raw, NOW),
            Err(ValidationError::MissingField("preferredFormat".to_string()))
        );
    }
}
