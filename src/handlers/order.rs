use crate::error::AppError;
use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use validator::Validate;

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    responses(
        (status = 200, description = "All orders", body = [OrderResponse]),
        (status = 500, description = "Store error")
    )
)]
pub async fn get_orders(order_service: web::Data<OrderService>) -> Result<HttpResponse> {
    match order_service.list_orders().await {
        Ok(orders) => Ok(HttpResponse::Ok().json(ApiResponse::success(orders))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{order_id}",
    tag = "order",
    params(("order_id" = i32, Path, description = "订单ID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match order_service.get_order(path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/user/{user_id}",
    tag = "order",
    params(("user_id" = i32, Path, description = "用户ID")),
    responses(
        (status = 200, description = "Orders of the user, decrypted", body = [OrderResponse]),
        (status = 404, description = "User has no orders")
    )
)]
pub async fn get_orders_by_user(
    order_service: web::Data<OrderService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match order_service.get_orders_by_user(path.into_inner()).await {
        Ok(orders) => Ok(HttpResponse::Ok().json(ApiResponse::success(orders))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreatedOrderResponse),
        (status = 400, description = "Validation failed"),
        (status = 500, description = "Failed to create order")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    // 校验失败直接返回，不访问数据库
    if let Err(errors) = request.validate() {
        return Ok(AppError::from(errors).error_response());
    }

    match order_service.create_order(request).await {
        Ok(created) => Ok(HttpResponse::Created().json(ApiResponse::success(created))),
        Err(e) => Ok(e.masked("Failed to create order").error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{order_id}",
    tag = "order",
    params(("order_id" = i32, Path, description = "订单ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order(
    order_service: web::Data<OrderService>,
    path: web::Path<i32>,
    request: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return Ok(AppError::from(errors).error_response());
    }

    match order_service.update_order(path.into_inner(), request).await {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.masked("Failed to update order").error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/orders/{order_id}/status",
    tag = "order",
    params(("order_id" = i32, Path, description = "订单ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 500, description = "Failed to update order status")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    path: web::Path<i32>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    let order_id = path.into_inner();
    match order_service
        .update_order_status(order_id, request.into_inner().order_status)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Order status updated"))),
        Err(e) => Ok(e.masked("Failed to update order status").error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/orders/{order_id}",
    tag = "order",
    params(("order_id" = i32, Path, description = "订单ID")),
    responses(
        (status = 200, description = "Order and its details deleted"),
        (status = 500, description = "Failed to delete order")
    )
)]
pub async fn delete_order(
    order_service: web::Data<OrderService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match order_service.delete_order(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Order deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .app_data(super::path_config())
            .app_data(super::json_config())
            .route("", web::get().to(get_orders))
            .route("", web::post().to(create_order))
            .route("/user/{user_id}", web::get().to(get_orders_by_user))
            .route("/{order_id}", web::get().to(get_order))
            .route("/{order_id}", web::put().to(update_order))
            .route("/{order_id}", web::delete().to(delete_order))
            .route("/{order_id}/status", web::put().to(update_order_status)),
    );
}
