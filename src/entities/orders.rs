use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

/// Columns stored as ciphertext. Anything listed here is encrypted before every
/// write and decrypted after every caller-facing read.
pub const SENSITIVE_COLUMNS: [Column; 2] = [Column::DeliveryAddress, Column::PaymentMethod];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub order_id: i32,
    pub user_id: i32,
    pub visit_date: Option<NaiveDate>,
    pub rental_date: Option<NaiveDate>,
    pub visit_date_txt: Option<String>,
    pub rental_date_txt: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_price: Decimal,
    pub status_order: Option<String>,
    pub return_date: Option<NaiveDate>,
    pub return_condition: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub delivery_address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_details::Entity")]
    OrderDetails,
}

impl Related<super::order_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
