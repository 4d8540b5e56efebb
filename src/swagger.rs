use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::order::get_orders,
        handlers::order::get_order,
        handlers::order::get_orders_by_user,
        handlers::order::create_order,
        handlers::order::update_order,
        handlers::order::update_order_status,
        handlers::order::delete_order,
        handlers::admin::get_orders_by_admin,
    ),
    components(
        schemas(
            OrderResponse,
            OrderDetailResponse,
            CreatedOrderResponse,
            CreateOrderRequest,
            OrderDetailRequest,
            UpdateOrderRequest,
            UpdateOrderStatusRequest,
            ApiError,
            FieldError,
        )
    ),
    tags(
        (name = "order", description = "Order management API"),
        (name = "admin", description = "Admin order views"),
    ),
    info(
        title = "Rental Backend API",
        version = "1.0.0",
        description = "Rental order REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
