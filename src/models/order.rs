use crate::entities::{order_detail_entity, order_entity};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: i32,
    pub user_id: i32,
    pub visit_date: Option<NaiveDate>,
    pub rental_date: Option<NaiveDate>,
    pub visit_date_txt: Option<String>,
    pub rental_date_txt: Option<String>,
    #[schema(value_type = String, example = "49.90")]
    pub total_price: Decimal,
    pub status_order: Option<String>,
    pub return_date: Option<NaiveDate>,
    pub return_condition: Option<String>,
    pub delivery_address: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(m: order_entity::Model) -> Self {
        Self {
            order_id: m.order_id,
            user_id: m.user_id,
            visit_date: m.visit_date,
            rental_date: m.rental_date,
            visit_date_txt: m.visit_date_txt,
            rental_date_txt: m.rental_date_txt,
            total_price: m.total_price,
            status_order: m.status_order,
            return_date: m.return_date,
            return_condition: m.return_condition,
            delivery_address: m.delivery_address,
            payment_method: m.payment_method,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailResponse {
    pub order_id: i32,
    pub item_id: i32,
    pub quantity: i32,
    #[schema(value_type = String, example = "9.99")]
    pub price: Decimal,
}

impl From<order_detail_entity::Model> for OrderDetailResponse {
    fn from(m: order_detail_entity::Model) -> Self {
        Self {
            order_id: m.order_id,
            item_id: m.item_id,
            quantity: m.quantity,
            price: m.price,
        }
    }
}

/// Returned by create: the stored row (sensitive columns still sealed) plus
/// the line items written in the same transaction.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedOrderResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub details: Vec<OrderDetailResponse>,
}

fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_amount")
            .with_message("Amount must not be negative".into()));
    }
    Ok(())
}

// No Debug derive: the payload carries plaintext address/payment data.
#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(range(min = 1, message = "user_id must be a positive integer"))]
    #[schema(example = 42)]
    pub user_id: i32,
    #[schema(example = "2024-07-01")]
    pub visit_date: Option<NaiveDate>,
    #[schema(example = "2024-07-03")]
    pub rental_date: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub visit_date_txt: Option<String>,
    #[validate(length(max = 100))]
    pub rental_date_txt: Option<String>,
    #[validate(custom(function = "validate_amount"))]
    #[schema(value_type = String, example = "49.90")]
    pub total_price: Decimal,
    #[validate(length(max = 50))]
    #[schema(example = "pending")]
    pub status_order: Option<String>,
    pub return_date: Option<NaiveDate>,
    #[validate(length(max = 255))]
    pub return_condition: Option<String>,
    #[validate(length(max = 255))]
    #[schema(example = "123 Main St")]
    pub delivery_address: Option<String>,
    #[validate(length(max = 255))]
    #[schema(example = "VISA-1234")]
    pub payment_method: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub details: Vec<OrderDetailRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderDetailRequest {
    #[validate(range(min = 1))]
    pub item_id: i32,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
    #[validate(custom(function = "validate_amount"))]
    #[schema(value_type = String, example = "9.99")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    pub visit_date: Option<NaiveDate>,
    pub rental_date: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub visit_date_txt: Option<String>,
    #[validate(length(max = 100))]
    pub rental_date_txt: Option<String>,
}

/// `order_status` is stored as-is; there is no transition graph.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[schema(example = "delivered")]
    pub order_status: String,
}
