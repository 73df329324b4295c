use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::dto::lead_dto::{OrderPatch, OrderSubmission};
use crate::model::choice::{choice_enum, Choice};
use crate::model::{FieldChanges, FilterField, Lead, Resubmission};
use crate::validation::{self, ValidationError};

choice_enum!(OrderStatus {
    Pending => "Pending",
    Processing => "Processing",
    Shipped => "Shipped",
    Delivered => "Delivered",
    Cancelled => "Cancelled",
});

choice_enum!(PaymentStatus {
    Pending => "Pending",
    Paid => "Paid",
    Failed => "Failed",
});

/// Copy of the catalogue product at order time; not a live reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub product_id: Option<String>,
    pub name: String,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub order_id: String,
    pub product: ProductSnapshot,
    pub customer_info: CustomerInfo,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    pub discount: f64,
    pub notes: Option<String>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Lead for Order {
    type Submission = OrderSubmission;
    type Patch = OrderPatch;

    const COLLECTION: &'static str = "orders";
    const ROUTE: &'static str = "/api/orders";
    const LIST_KEY: &'static str = "orders";
    const LABEL: &'static str = "order";
    const FILTERS: &'static [FilterField] = &[
        FilterField { name: "orderStatus", allowed: OrderStatus::WIRE },
        FilterField { name: "paymentStatus", allowed: PaymentStatus::WIRE },
    ];
    const UNIQUE_KEY: Option<&'static str> = Some("orderId");

    fn from_submission(raw: OrderSubmission, now: &str) -> Result<Self, ValidationError> {
        validation::bounds("", &raw)?;
        let product = raw.product.unwrap_or_default();
        validation::bounds("product", &product)?;
        let customer = raw.customer_info.unwrap_or_default();
        validation::bounds("customerInfo", &customer)?;

        Ok(Order {
            id: None,
            order_id: validation::required("orderId", raw.order_id)?,
            product: ProductSnapshot {
                product_id: validation::optional(product.product_id),
                name: validation::required("product.name", product.name)?,
                category: validation::optional(product.category),
                image: validation::optional(product.image),
            },
            customer_info: CustomerInfo {
                name: validation::required("customerInfo.name", customer.name)?,
                email: validation::email("customerInfo.email", customer.email)?,
                phone: validation::loose_phone("customerInfo.phone", customer.phone)?,
                address: validation::optional(customer.address),
            },
            quantity: validation::required_number("quantity", raw.quantity)?,
            unit_price: validation::required_number("unitPrice", raw.unit_price)?,
            total_price: validation::required_number("totalPrice", raw.total_price)?,
            discount: raw.discount.unwrap_or(0.0),
            notes: validation::optional(raw.notes),
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        })
    }

    fn patch_changes(patch: OrderPatch) -> Result<FieldChanges, ValidationError> {
        if patch.order_status.is_none() && patch.payment_status.is_none() {
            return Err(ValidationError::MissingField("orderStatus".to_string()));
        }
        let mut changes = FieldChanges::new();
        if patch.order_status.is_some() {
            let status: OrderStatus = validation::choice("orderStatus", patch.order_status)?;
            changes.push(("orderStatus", status.as_str().to_string()));
        }
        if patch.payment_status.is_some() {
            let status: PaymentStatus = validation::choice("paymentStatus", patch.payment_status)?;
            changes.push(("paymentStatus", status.as_str().to_string()));
        }
        Ok(changes)
    }

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn unique_value(&self) -> Option<String> {
        Some(self.order_id.clone())
    }

    fn on_resubmit(&self) -> Resubmission {
        Resubmission::Reject(format!("order {} already exists", self.order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::lead_dto::{ContactFields, ProductFields};

    const NOW: &str = "2026-10-18T09:00:00.000Z";

    fn submission() -> OrderSubmission {
        OrderSubmission {
            order_id: Some(" ORD-1001 ".into()),
            product: Some(ProductFields {
                product_id: Some("sku-ssd-512".into()),
                name: Some("512GB NVMe SSD".into()),
                ..Default::default()
            }),
            customer_info: Some(ContactFields {
                name: Some("Dev".into()),
                email: Some("DEV@shop.io".into()),
                ..Default::default()
            }),
            quantity: Some(2),
            unit_price: Some(3499.0),
            total_price: Some(6998.0),
            discount: None,
            notes: None,
        }
    }

    #[test]
    fn both_statuses_start_pending() {
        let order = Order::from_submission(submission(), NOW).unwrap();
        assert_eq!(order.order_id, "ORD-1001");
        assert_eq!(order.customer_info.email, "dev@shop.io");
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.discount, 0.0);
    }

    #[test]
    fn quantity_must_be_positive() {
        let raw = OrderSubmission { quantity: Some(0), ..submission() };
        assert_eq!(
            Order::from_submission(raw, NOW),
            Err(ValidationError::InvalidValue {
                field: "quantity".to_string(),
                reason: "must be at least 1".to_string(),
            })
        );
    }

    #[test]
    fn price_is_required() {
        let raw = OrderSubmission { unit_price: None, ..submission() };
        assert_eq!(
            Order::from_submission(raw, NOW),
            Err(ValidationError::MissingField("unitPrice".to_string()))
        );
    }

    #[test]
    fn statuses_patch_independently() {
        let patch = OrderPatch { order_status: None, payment_status: Some("Paid".into()) };
        assert_eq!(
            Order::patch_changes(patch),
            Ok(vec![("paymentStatus", "Paid".to_string())])
        );

        let patch = OrderPatch {
            order_status: Some("Shipped".into()),
            payment_status: Some("Paid".into()),
        };
        assert_eq!(
            Order::patch_changes(patch),
            Ok(vec![
                ("orderStatus", "Shipped".to_string()),
                ("paymentStatus", "Paid".to_string()),
            ])
        );
    }

    #[test]
    fn patch_rejects_unknown_status_and_empty_body() {
        let patch = OrderPatch { order_status: Some("shipped".into()), payment_status: None };
        assert!(matches!(
            Order::patch_changes(patch),
            Err(ValidationError::InvalidSelection { field, .. }) if field == "orderStatus"
        ));
        assert_eq!(
            Order::patch_changes(OrderPatch::default()),
            Err(ValidationError::MissingField("orderStatus".to_string()))
        );
    }
}
