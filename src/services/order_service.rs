use crate::entities::{order_detail_entity as order_details, order_entity as orders};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{FieldCipher, decrypt_sensitive, encrypt_sensitive};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct OrderService {
    pool: DatabaseConnection,
    cipher: Arc<dyn FieldCipher>,
}

impl OrderService {
    pub fn new(pool: DatabaseConnection, cipher: Arc<dyn FieldCipher>) -> Self {
        Self { pool, cipher }
    }

    /// 解密敏感字段后再返回给调用方
    fn reveal(&self, model: orders::Model) -> AppResult<OrderResponse> {
        decrypt_sensitive(model, self.cipher.as_ref()).map(OrderResponse::from)
    }

    fn reveal_all(&self, models: Vec<orders::Model>) -> AppResult<Vec<OrderResponse>> {
        models.into_iter().map(|m| self.reveal(m)).collect()
    }

    pub async fn list_orders(&self) -> AppResult<Vec<OrderResponse>> {
        let rows = orders::Entity::find()
            .order_by_asc(orders::Column::OrderId)
            .all(&self.pool)
            .await?;
        self.reveal_all(rows)
    }

    pub async fn get_order(&self, order_id: i32) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
        self.reveal(order)
    }

    pub async fn get_orders_by_user(&self, user_id: i32) -> AppResult<Vec<OrderResponse>> {
        let rows = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_asc(orders::Column::OrderId)
            .all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(AppError::NotFound(
                "No orders found for the specified user".to_string(),
            ));
        }
        self.reveal_all(rows)
    }

    /// 管理端：全部订单，按创建时间倒序
    pub async fn get_orders_by_admin(&self) -> AppResult<Vec<OrderResponse>> {
        let rows = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::OrderId)
            .all(&self.pool)
            .await?;
        self.reveal_all(rows)
    }

    /// 订单与明细在同一事务内写入。
    ///
    /// 返回的是入库后的行，`delivery_address` / `payment_method` 仍为密文。
    pub async fn create_order(&self, req: CreateOrderRequest) -> AppResult<CreatedOrderResponse> {
        let CreateOrderRequest {
            user_id,
            visit_date,
            rental_date,
            visit_date_txt,
            rental_date_txt,
            total_price,
            status_order,
            return_date,
            return_condition,
            delivery_address,
            payment_method,
            details,
        } = req;

        let mut active = orders::ActiveModel {
            user_id: Set(user_id),
            visit_date: Set(visit_date),
            rental_date: Set(rental_date),
            visit_date_txt: Set(visit_date_txt),
            rental_date_txt: Set(rental_date_txt),
            total_price: Set(total_price),
            status_order: Set(status_order),
            return_date: Set(return_date),
            return_condition: Set(return_condition),
            delivery_address: Set(delivery_address),
            payment_method: Set(payment_method),
            // 各后端统一时间格式
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        // 明文不出本函数
        encrypt_sensitive(&mut active, self.cipher.as_ref())?;

        let txn = self.pool.begin().await?;
        let result = Self::insert_order(&txn, active, &details).await;
        match result {
            Ok(created) => {
                txn.commit().await?;
                log::info!(
                    "Order {} created for user {} with {} detail(s)",
                    created.order.order_id,
                    user_id,
                    created.details.len()
                );
                Ok(created)
            }
            Err(e) => {
                Self::rollback(txn, "create order").await;
                Err(e)
            }
        }
    }

    async fn insert_order(
        txn: &DatabaseTransaction,
        active: orders::ActiveModel,
        details: &[OrderDetailRequest],
    ) -> AppResult<CreatedOrderResponse> {
        let order = active.insert(txn).await?;
        let details = Self::create_order_details(txn, order.order_id, details).await?;
        Ok(CreatedOrderResponse {
            order: OrderResponse::from(order),
            details,
        })
    }

    /// 按输入顺序逐行写入明细，使用调用方传入的连接或事务。
    /// 遇到第一条失败即停止；已写入的行由调用方决定是否回滚。
    pub async fn create_order_details<C>(
        conn: &C,
        order_id: i32,
        details: &[OrderDetailRequest],
    ) -> AppResult<Vec<OrderDetailResponse>>
    where
        C: ConnectionTrait,
    {
        let mut inserted = Vec::with_capacity(details.len());
        for (idx, detail) in details.iter().enumerate() {
            let row = order_details::ActiveModel {
                order_id: Set(order_id),
                item_id: Set(detail.item_id),
                quantity: Set(detail.quantity),
                price: Set(detail.price),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(|e| {
                log::error!(
                    "Failed to insert detail #{idx} (item {}) for order {order_id}: {e}",
                    detail.item_id
                );
                AppError::from(e)
            })?;
            inserted.push(OrderDetailResponse::from(row));
        }
        Ok(inserted)
    }

    /// 同一事务内先删明细再删订单；订单不存在也返回成功
    pub async fn delete_order(&self, order_id: i32) -> AppResult<()> {
        let txn = self.pool.begin().await.map_err(|e| {
            log::error!("Failed to open transaction for order {order_id}: {e}");
            AppError::TransactionFailed("Failed to delete order".to_string())
        })?;

        let deleted = Self::delete_rows(&txn, order_id).await;
        if let Err(e) = deleted {
            log::error!("Failed to delete order {order_id}: {e}");
            Self::rollback(txn, "delete order").await;
            return Err(AppError::TransactionFailed(
                "Failed to delete order".to_string(),
            ));
        }

        txn.commit().await.map_err(|e| {
            log::error!("Failed to commit deletion of order {order_id}: {e}");
            AppError::TransactionFailed("Failed to delete order".to_string())
        })?;

        log::info!("Order {order_id} deleted");
        Ok(())
    }

    // order_details 必须先删，外键约束
    async fn delete_rows(txn: &DatabaseTransaction, order_id: i32) -> Result<(), DbErr> {
        order_details::Entity::delete_many()
            .filter(order_details::Column::OrderId.eq(order_id))
            .exec(txn)
            .await?;
        orders::Entity::delete_by_id(order_id).exec(txn).await?;
        Ok(())
    }

    async fn rollback(txn: DatabaseTransaction, action: &str) {
        if let Err(e) = txn.rollback().await {
            log::error!("Rollback after failed {action} also failed: {e}");
        }
    }

    /// 不校验订单是否存在，未命中也返回成功
    pub async fn update_order_status(&self, order_id: i32, order_status: String) -> AppResult<()> {
        let res = orders::Entity::update_many()
            .col_expr(orders::Column::StatusOrder, Expr::value(order_status))
            .filter(orders::Column::OrderId.eq(order_id))
            .exec(&self.pool)
            .await?;

        log::info!(
            "Status update for order {order_id} touched {} row(s)",
            res.rows_affected
        );
        Ok(())
    }

    /// 覆盖四个日期字段，返回解密后的订单
    pub async fn update_order(
        &self,
        order_id: i32,
        req: UpdateOrderRequest,
    ) -> AppResult<OrderResponse> {
        let updated = orders::ActiveModel {
            order_id: Set(order_id),
            visit_date: Set(req.visit_date),
            rental_date: Set(req.rental_date),
            visit_date_txt: Set(req.visit_date_txt),
            rental_date_txt: Set(req.rental_date_txt),
            ..Default::default()
        }
        .update(&self.pool)
        .await
        .map_err(|e| match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => {
                AppError::NotFound("Order not found".to_string())
            }
            other => AppError::from(other),
        })?;

        log::info!("Order {order_id} dates updated");
        self.reveal(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::setup_service as setup;
    use chrono::{DateTime, NaiveDate, TimeZone};
    use rust_decimal::Decimal;
    use sea_orm::PaginatorTrait;

    fn detail(item_id: i32, quantity: i32, price: Decimal) -> OrderDetailRequest {
        OrderDetailRequest {
            item_id,
            quantity,
            price,
        }
    }

    fn new_order(
        user_id: i32,
        address: Option<&str>,
        payment: Option<&str>,
        details: Vec<OrderDetailRequest>,
    ) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id,
            visit_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            rental_date: NaiveDate::from_ymd_opt(2024, 7, 3),
            visit_date_txt: Some("Jul 1".to_string()),
            rental_date_txt: Some("Jul 3".to_string()),
            total_price: Decimal::new(4990, 2),
            status_order: Some("pending".to_string()),
            return_date: None,
            return_condition: None,
            delivery_address: address.map(str::to_string),
            payment_method: payment.map(str::to_string),
            details,
        }
    }

    async fn seed_order(db: &DatabaseConnection, order_id: i32, created_at: DateTime<Utc>) {
        orders::ActiveModel {
            order_id: Set(order_id),
            user_id: Set(1),
            total_price: Set(Decimal::new(1000, 2)),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
    }

    async fn detail_count(db: &DatabaseConnection, order_id: i32) -> u64 {
        order_details::Entity::find()
            .filter(order_details::Column::OrderId.eq(order_id))
            .count(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_stamps_created_at() {
        let (service, _db) = setup().await;
        let before = Utc::now();
        let created = service
            .create_order(new_order(6, None, None, vec![]))
            .await
            .unwrap();

        let fetched = service.get_order(created.order.order_id).await.unwrap();
        assert_eq!(fetched.created_at, created.order.created_at);
        let drift = (fetched.created_at - before).num_seconds();
        assert!((0..5).contains(&drift), "created_at drifted {drift}s");
    }

    #[tokio::test]
    async fn test_sensitive_fields_round_trip() {
        let (service, db) = setup().await;
        let created = service
            .create_order(new_order(5, Some("123 Main St"), Some("VISA-1234"), vec![]))
            .await
            .unwrap();

        // create 返回的是入库的密文
        assert_ne!(created.order.delivery_address.as_deref(), Some("123 Main St"));
        assert_ne!(created.order.payment_method.as_deref(), Some("VISA-1234"));

        let stored = orders::Entity::find_by_id(created.order.order_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.delivery_address.as_deref(), Some("123 Main St"));
        assert_ne!(stored.payment_method.as_deref(), Some("VISA-1234"));

        let orders = service.get_orders_by_user(5).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].delivery_address.as_deref(), Some("123 Main St"));
        assert_eq!(orders[0].payment_method.as_deref(), Some("VISA-1234"));
    }

    #[tokio::test]
    async fn test_absent_sensitive_fields() {
        let (service, _db) = setup().await;
        let created = service
            .create_order(new_order(6, None, Some(""), vec![]))
            .await
            .unwrap();

        assert_eq!(created.order.delivery_address, None);
        assert_eq!(created.order.payment_method, None);

        let fetched = service.get_order(created.order.order_id).await.unwrap();
        assert_eq!(fetched.delivery_address, None);
        assert_eq!(fetched.payment_method, None);
    }

    #[tokio::test]
    async fn test_reads_decrypt_consistently() {
        let (service, _db) = setup().await;
        let created = service
            .create_order(new_order(7, Some("9 Elm Rd"), Some("CASH"), vec![]))
            .await
            .unwrap();
        let id = created.order.order_id;

        let one = service.get_order(id).await.unwrap();
        assert_eq!(one.delivery_address.as_deref(), Some("9 Elm Rd"));

        let all = service.list_orders().await.unwrap();
        assert_eq!(all[0].payment_method.as_deref(), Some("CASH"));

        let admin = service.get_orders_by_admin().await.unwrap();
        assert_eq!(admin[0].delivery_address.as_deref(), Some("9 Elm Rd"));
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let (service, _db) = setup().await;
        assert!(matches!(
            service.get_order(404).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_orders_by_user_not_found() {
        let (service, _db) = setup().await;
        service
            .create_order(new_order(1, None, None, vec![]))
            .await
            .unwrap();
        assert!(matches!(
            service.get_orders_by_user(2).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_order_details_inserts_rows() {
        let (_service, db) = setup().await;
        seed_order(&db, 10, Utc::now()).await;

        let details = vec![
            detail(1, 2, Decimal::new(999, 2)),
            detail(2, 1, Decimal::new(5, 0)),
        ];
        let inserted = OrderService::create_order_details(&db, 10, &details)
            .await
            .unwrap();

        assert_eq!(inserted.len(), 2);
        assert!(inserted.iter().all(|d| d.order_id == 10));
        assert_eq!(detail_count(&db, 10).await, 2);
    }

    #[tokio::test]
    async fn test_create_order_details_stops_at_first_failure() {
        let (_service, db) = setup().await;
        seed_order(&db, 10, Utc::now()).await;
        db.execute_unprepared(
            "CREATE TRIGGER reject_item_two BEFORE INSERT ON order_details \
             WHEN NEW.item_id = 2 BEGIN SELECT RAISE(ABORT, 'item 2 rejected'); END;",
        )
        .await
        .unwrap();

        let details = vec![
            detail(1, 2, Decimal::new(999, 2)),
            detail(2, 1, Decimal::new(5, 0)),
            detail(3, 1, Decimal::new(1, 0)),
        ];
        let result = OrderService::create_order_details(&db, 10, &details).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        // 第一行已写入，第三行未尝试
        assert_eq!(detail_count(&db, 10).await, 1);
    }

    #[tokio::test]
    async fn test_create_order_is_atomic() {
        let (service, db) = setup().await;
        db.execute_unprepared(
            "CREATE TRIGGER reject_item_two BEFORE INSERT ON order_details \
             WHEN NEW.item_id = 2 BEGIN SELECT RAISE(ABORT, 'item 2 rejected'); END;",
        )
        .await
        .unwrap();

        let req = new_order(
            8,
            Some("1 Side St"),
            None,
            vec![
                detail(1, 1, Decimal::new(100, 2)),
                detail(2, 1, Decimal::new(100, 2)),
            ],
        );
        assert!(service.create_order(req).await.is_err());

        assert_eq!(orders::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(order_details::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_order_removes_details() {
        let (service, db) = setup().await;
        let created = service
            .create_order(new_order(
                9,
                None,
                None,
                vec![
                    detail(1, 2, Decimal::new(999, 2)),
                    detail(2, 1, Decimal::new(5, 0)),
                ],
            ))
            .await
            .unwrap();
        let id = created.order.order_id;
        assert_eq!(detail_count(&db, id).await, 2);

        service.delete_order(id).await.unwrap();

        assert_eq!(detail_count(&db, id).await, 0);
        assert!(matches!(
            service.get_order(id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_order_succeeds() {
        let (service, _db) = setup().await;
        assert!(service.delete_order(12345).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_rolls_back_on_failure() {
        let (service, db) = setup().await;
        let created = service
            .create_order(new_order(
                4,
                None,
                None,
                vec![
                    detail(1, 1, Decimal::new(100, 2)),
                    detail(2, 3, Decimal::new(250, 2)),
                ],
            ))
            .await
            .unwrap();
        let id = created.order.order_id;

        db.execute_unprepared(
            "CREATE TRIGGER block_order_delete BEFORE DELETE ON orders \
             BEGIN SELECT RAISE(ABORT, 'order delete blocked'); END;",
        )
        .await
        .unwrap();

        let result = service.delete_order(id).await;
        assert!(matches!(result, Err(AppError::TransactionFailed(_))));

        // 第一次 DELETE 被回滚
        assert_eq!(detail_count(&db, id).await, 2);
        assert!(service.get_order(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_orders_newest_first() {
        let (service, db) = setup().await;
        seed_order(&db, 1, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()).await;
        seed_order(&db, 2, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()).await;
        seed_order(&db, 3, Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap()).await;

        let ids: Vec<i32> = service
            .get_orders_by_admin()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_update_order_status() {
        let (service, _db) = setup().await;
        let created = service
            .create_order(new_order(3, None, None, vec![]))
            .await
            .unwrap();
        let id = created.order.order_id;

        service
            .update_order_status(id, "returned".to_string())
            .await
            .unwrap();
        assert_eq!(
            service.get_order(id).await.unwrap().status_order.as_deref(),
            Some("returned")
        );

        // 不存在的订单也返回成功
        assert!(
            service
                .update_order_status(9999, "returned".to_string())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_update_order_returns_decrypted_row() {
        let (service, _db) = setup().await;
        let created = service
            .create_order(new_order(2, Some("77 Bay St"), Some("AMEX-0005"), vec![]))
            .await
            .unwrap();
        let id = created.order.order_id;

        let updated = service
            .update_order(
                id,
                UpdateOrderRequest {
                    visit_date: NaiveDate::from_ymd_opt(2024, 8, 10),
                    rental_date: NaiveDate::from_ymd_opt(2024, 8, 12),
                    visit_date_txt: Some("Aug 10".to_string()),
                    rental_date_txt: Some("Aug 12".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.visit_date, NaiveDate::from_ymd_opt(2024, 8, 10));
        assert_eq!(updated.rental_date_txt.as_deref(), Some("Aug 12"));
        assert_eq!(updated.delivery_address.as_deref(), Some("77 Bay St"));
        assert_eq!(updated.payment_method.as_deref(), Some("AMEX-0005"));
        assert_eq!(updated.status_order.as_deref(), Some("pending"));
    }

    #[tokio::test]
    async fn test_update_missing_order_not_found() {
        let (service, _db) = setup().await;
        let result = service
            .update_order(
                31337,
                UpdateOrderRequest {
                    visit_date: None,
                    rental_date: None,
                    visit_date_txt: None,
                    rental_date_txt: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
