use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::dto::lead_dto::{ShopQuoteSubmission, StatusPatch};
use crate::model::choice::{choice_enum, Choice};
use crate::model::{status_changes, FieldChanges, FilterField, Lead};
use crate::validation::{self, ValidationError};

choice_enum!(PcType {
    Laptop => "laptop",
    Desktop => "desktop",
    Gaming => "gaming",
    Workstation => "workstation",
    AllInOne => "allInOne",
    MiniPc => "miniPc",
    Server => "server",
});

choice_enum!(UsageType {
    Business => "business",
    Gaming => "gaming",
    Education => "education",
    HomeOffice => "homeOffice",
    GraphicDesign => "graphicDesign",
    VideoEditing => "videoEditing",
    Programming => "programming",
    Entertainment => "entertainment",
    DataAnalysis => "dataAnalysis",
    General => "general",
});

choice_enum!(QuoteStatus {
    Pending => "pending",
    Quoted => "quoted",
    FollowedUp => "followed_up",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopQuoteRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub contact: QuoteContact,
    pub pc_types: Vec<PcType>,
    pub usage_types: Vec<UsageType>,
    pub budget: Option<String>,
    pub requirements: Option<String>,
    pub status: QuoteStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Lead for ShopQuoteRequest {
    type Submission = ShopQuoteSubmission;
    type Patch = StatusPatch;

    const COLLECTION: &'static str = "shop_quote_requests";
    const ROUTE: &'static str = "/api/shop-quotes";
    const LIST_KEY: &'static str = "shopQuotes";
    const LABEL: &'static str = "shop quote request";
    const FILTERS: &'static [FilterField] = &[FilterField {
        name: "status",
        allowed: QuoteStatus::WIRE,
    }];

    fn from_submission(raw: ShopQuoteSubmission, now: &str) -> Result<Self, ValidationError> {
        validation::bounds("", &raw)?;
        let (prefix, contact) = match raw.contact {
            Some(nested) => ("contact.", nested),
            None => ("", raw.flat_contact),
        };
        validation::bounds(prefix.trim_end_matches('.'), &contact)?;
        Ok(ShopQuoteRequest {
            id: None,
            contact: QuoteContact {
                name: validation::required(&format!("{prefix}name"), contact.name)?,
                email: validation::email(&format!("{prefix}email"), contact.email)?,
                phone: validation::strict_phone(&format!("{prefix}phone"), contact.phone)?,
            },
            pc_types: validation::selections("pcTypes", raw.pc_types, validation::as_is)?,
            usage_types: validation::selections("usageTypes", raw.usage_types, validation::as_is)?,
            budget: validation::optional(raw.budget),
            requirements: validation::optional(raw.requirements),
            status: QuoteStatus::Pending,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    fn patch_changes(patch: StatusPatch) -> Result<FieldChanges, ValidationError> {
        status_changes::<QuoteStatus>(patch)
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

    fn flat() -> ShopQuoteSubmission {
        ShopQuoteSubmission {
            flat_contact: ContactFields {
                name: Some("Asha Rao".into()),
                email: Some("asha@x.com".into()),
                phone: Some("9876543210".into()),
                ..Default::default()
            },
            pc_types: Some(vec!["laptop".into(), "gaming".into()]),
            usage_types: Some(vec!["business".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn valid_selections_are_kept_verbatim() {
        let quote = ShopQuoteRequest::from_submission(flat(), NOW).unwrap();
        assert_eq!(quote.contact.name, "Asha Rao");
        assert_eq!(quote.pc_types, vec![PcType::Laptop, PcType::Gaming]);
        assert_eq!(quote.usage_types, vec![UsageType::Business]);
        assert_eq!(quote.status, QuoteStatus::Pending);
    }

    #[test]
    fn nested_contact_paths_are_reported() {
        let raw = ShopQuoteSubmission {
            contact: Some(ContactFields {
                name: Some("Asha Rao".into()),
                email: Some("not-an-email".into()),
                phone: Some("9876543210".into()),
                ..Default::default()
            }),
            ..flat()
        };
        assert_eq!(
            ShopQuoteRequest::from_submission(raw, NOW),
            Err(ValidationError::InvalidEmail("contact.email".to_string()))
        );
    }

    #[test]
    fn usage_types_must_not_be_empty() {
        let raw = ShopQuoteSubmission { usage_types: Some(vec![]), ..flat() };
        assert_eq!(
            ShopQuoteRequest::from_submission(raw, NOW),
            Err(ValidationError::EmptySelection("usageTypes".to_string()))
        );
    }

    #[test]
    fn allow_lists_have_documented_sizes() {
        assert_eq!(PcType::WIRE.len(), 7);
        assert_eq!(UsageType::WIRE.len(), 10);
    }
}
