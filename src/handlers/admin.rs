use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/admin/orders",
    tag = "admin",
    responses(
        (status = 200, description = "All orders, newest first", body = [OrderResponse]),
        (status = 500, description = "Failed to fetch orders")
    )
)]
pub async fn get_orders_by_admin(order_service: web::Data<OrderService>) -> Result<HttpResponse> {
    match order_service.get_orders_by_admin().await {
        Ok(orders) => Ok(HttpResponse::Ok().json(ApiResponse::success(orders))),
        Err(e) => Ok(e.masked("Failed to fetch orders").error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin").route("/orders", web::get().to(get_orders_by_admin)));
}
