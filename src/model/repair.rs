use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::dto::lead_dto::{RepairSubmission, StatusPatch};
use crate::model::choice::{choice_enum, Choice};
use crate::model::{status_changes, FieldChanges, FilterField, Lead};
use crate::validation::{self, ValidationError};

choice_enum!(CustomerType {
    Individual => "individual",
    Business => "business",
});

choice_enum!(DeviceType {
    Laptop => "laptop",
    Desktop => "desktop",
    Printer => "printer",
    Tablet => "tablet",
    Smartphone => "smartphone",
    Other => "other",
});

choice_enum!(RepairIssue {
    Screen => "screen",
    Battery => "battery",
    Keyboard => "keyboard",
    Power => "power",
    Overheating => "overheating",
    SlowPerformance => "slowPerformance",
    Virus => "virus",
    DataRecovery => "dataRecovery",
    Software => "software",
    Other => "other",
});

choice_enum!(ServiceOption {
    BringToCenter => "bringToCenter",
    RequestHomeService => "requestHomeService",
});

choice_enum!(RepairStatus {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub company: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetails {
    pub device_type: DeviceType,
    pub brand_model: Option<String>,
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub customer_type: CustomerType,
    pub customer_details: CustomerDetails,
    pub device_details: DeviceDetails,
    pub issues: Vec<RepairIssue>,
    pub other_issue: Option<String>,
    pub preferred_service: ServiceOption,
    pub status: RepairStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Lead for RepairRequest {
    type Submission = RepairSubmission;
    type Patch = StatusPatch;

    const COLLECTION: &'static str = "repair_requests";
    const ROUTE: &'static str = "/api/repair-requests";
    const LIST_KEY: &'static str = "repairRequests";
    const LABEL: &'static str = "repair request";
    const FILTERS: &'static [FilterField] = &[
        FilterField { name: "status", allowed: RepairStatus::WIRE },
        FilterField { name: "customerType", allowed: CustomerType::WIRE },
    ];

    fn from_submission(raw: RepairSubmission, now: &str) -> Result<Self, ValidationError> {
        validation::bounds("", &raw)?;
        let customer = raw.customer_details.unwrap_or_default();
        validation::bounds("customerDetails", &customer)?;
        let device = raw.device_details.unwrap_or_default();
        validation::bounds("deviceDetails", &device)?;

        let customer_type = validation::choice("customerType", raw.customer_type)?;
        let customer_details = CustomerDetails {
            name: validation::required("customerDetails.name", customer.name)?,
            phone: validation::strict_phone("customerDetails.phone", customer.phone)?,
            email: validation::email("customerDetails.email", customer.email)?,
            company: validation::optional(customer.company),
            address: validation::optional(customer.address),
        };
        let device_details = DeviceDetails {
            device_type: validation::choice("deviceDetails.deviceType", device.device_type)?,
            brand_model: validation::optional(device.brand_model),
            serial_number: validation::optional(device.serial_number),
        };
        let issues: Vec<RepairIssue> =
            validation::selections("issues", raw.issues, validation::as_is)?;
        let other_issue = validation::optional(raw.other_issue);
        if issues.contains(&RepairIssue::Other) && other_issue.is_none() {
            return Err(ValidationError::MissingField("otherIssue".to_string()));
        }
        let preferred_service = validation::choice("preferredService", raw.preferred_service)?;
        if preferred_service == ServiceOption::RequestHomeService
            && customer_details.address.is_none()
        {
            return Err(ValidationError::MissingField(
                "customerDetails.address".to_string(),
            ));
        }

        Ok(RepairRequest {
            id: None,
            customer_type,
            customer_details,
            device_details,
            issues,
            other_issue,
            preferred_service,
            status: RepairStatus::Pending,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    fn patch_changes(patch: StatusPatch) -> Result<FieldChanges, ValidationError> {
        status_changes::<RepairStatus>(patch)
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}
