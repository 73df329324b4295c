// Raw intake and moderation bodies. Every field is optional at this layer so
// that an absent field surfaces as `MissingField` rather than a JSON error.

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactFields {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 254, message = "must be at most 254 characters"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub location: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 254, message = "must be at most 254 characters"))]
    pub email: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub subject: Option<String>,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubmission {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductDemoSubmission {
    pub contact: Option<ContactFields>,
    pub interested_in: Option<Vec<String>>,
    pub request_type: Option<String>,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub message: Option<String>,
}

/// The shop form posts its contact fields either nested under `contact` or at
/// the top level; the nested block wins when both are present.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShopQuoteSubmission {
    pub contact: Option<ContactFields>,
    #[serde(flatten)]
    pub flat_contact: ContactFields,
    pub pc_types: Option<Vec<String>>,
    pub usage_types: Option<Vec<String>>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub budget: Option<String>,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSubmission {
    pub contact: Option<ContactFields>,
    pub training_programs: Option<Vec<String>>,
    pub preferred_format: Option<String>,
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeviceFields {
    pub device_type: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub brand_model: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RepairSubmission {
    pub customer_type: Option<String>,
    pub customer_details: Option<ContactFields>,
    pub device_details: Option<DeviceFields>,
    pub issues: Option<Vec<String>>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub other_issue: Option<String>,
    pub preferred_service: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub product_id: Option<String>,
    #[validate(length(max = 200, message = "must be at most 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub category: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    #[validate(length(max = 64, message = "must be at most 64 characters"))]
    pub order_id: Option<String>,
    pub product: Option<ProductFields>,
    pub customer_info: Option<ContactFields>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub quantity: Option<u32>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub unit_price: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub total_price: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub discount: Option<f64>,
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Moderation body for entities with a single `status` field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusPatch {
    pub status: Option<String>,
}

/// Moderation body for orders; either status may be changed independently.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderPatch {
    pub order_status: Option<String>,
    pub payment_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shop_submission_accepts_flat_contact_fields() {
        let raw: ShopQuoteSubmission = serde_json::from_value(json!({
            "name": "Asha Rao",
            "email": "asha@x.com",
            "phone": "9876543210",
            "pcTypes": ["laptop"],
            "usageTypes": ["business"]
        }))
        .unwrap();
        assert!(raw.contact.is_none());
        assert_eq!(raw.flat_contact.name.as_deref(), Some("Asha Rao"));
        assert_eq!(raw.pc_types, Some(vec!["laptop".to_string()]));
    }

    #[test]
    fn patches_reject_unknown_fields() {
        let err = serde_json::from_value::<StatusPatch>(json!({ "status": "completed", "email": "x@y.z" }));
        assert!(err.is_err());
        let patch: OrderPatch = serde_json::from_value(json!({ "paymentStatus": "Paid" })).unwrap();
        assert_eq!(patch.payment_status.as_deref(), Some("Paid"));
        assert!(patch.order_status.is_none());
    }
}
