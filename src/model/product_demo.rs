use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::dto::lead_dto::{ProductDemoSubmission, StatusPatch};
use crate::model::choice::{choice_enum, Choice};
use crate::model::{status_changes, FieldChanges, FilterField, Lead};
use crate::validation::{self, ValidationError};

choice_enum!(
    /// Software products a demo can be requested for.
    ProductCode {
        Ems => "EMS",
        Sma => "SMA",
        Mma => "MMA",
        Qms => "QMS",
    }
);

choice_enum!(DemoRequestType {
    ProductDemo => "productDemo",
    EnquiryPricing => "enquiryPricing",
});

choice_enum!(DemoStatus {
    Pending => "pending",
    Contacted => "contacted",
    DemoScheduled => "demo_scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoContact {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub company: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDemoRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub contact: DemoContact,
    pub interested_in: Vec<ProductCode>,
    pub request_type: DemoRequestType,
    pub message: Option<String>,
    pub status: DemoStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Lead for ProductDemoRequest {
    type Submission = ProductDemoSubmission;
    type Patch = StatusPatch;

    const COLLECTION: &'static str = "product_demo_requests";
    const ROUTE: &'static str = "/api/product-demos";
    const LIST_KEY: &'static str = "productDemos";
    const LABEL: &'static str = "product demo request";
    const FILTERS: &'static [FilterField] = &[
        FilterField { name: "status", allowed: DemoStatus::WIRE },
        FilterField { name: "requestType", allowed: DemoRequestType::WIRE },
    ];

    fn from_submission(raw: ProductDemoSubmission, now: &str) -> Result<Self, ValidationError> {
        validation::bounds("", &raw)?;
        let contact = raw.contact.unwrap_or_default();
        validation::bounds("contact", &contact)?;
        Ok(ProductDemoRequest {
            id: None,
            contact: DemoContact {
                name: validation::required("contact.name", contact.name)?,
                phone: validation::strict_phone("contact.phone", contact.phone)?,
                email: validation::email("contact.email", contact.email)?,
                company: validation::optional(contact.company),
                location: validation::optional(contact.location),
            },
            interested_in: validation::selections(
                "interestedIn",
                raw.interested_in,
                validation::upper_case,
            )?,
            request_type: validation::choice("requestType", raw.request_type)?,
            message: validation::optional(raw.message),
            status: DemoStatus::Pending,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    fn patch_changes(patch: StatusPatch) -> Result<FieldChanges, ValidationError> {
        status_changes::<DemoStatus>(patch)
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}
