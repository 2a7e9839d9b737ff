use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{Cart, CartLine, CartLineRequest, CartValidation, CartValidationError, ValidateCartRequest},
        inventory::{MovementList, ProductList, StockAdjustRequest, StockAdjustment},
        payments::{ConfirmPaymentRequest, ConfirmedPayment, CreateIntentRequest, PaymentIntentResponse},
        sales::{CreateSaleRequest, DailySummary, PaymentMethodSummary, SaleList},
    },
    entity::sea_orm_active_enums::{MovementType, PaymentMethod, PaymentStatus, StockType},
    models::{Product, Sale, SaleItem, SaleWithItems, StockMovement, Store},
    response::{ApiResponse, ErrorBody, Meta},
    routes::{health, inventory, payments, sales},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        sales::validate_cart,
        sales::create_sale,
        sales::list_sales,
        sales::daily_summary,
        sales::get_sale,
        sales::download_receipt,
        sales::refund_sale,
        payments::create_intent,
        payments::confirm_payment,
        inventory::list_low_stock,
        inventory::adjust_stock,
        inventory::list_movements
    ),
    components(
        schemas(
            Store,
            Product,
            Sale,
            SaleItem,
            SaleWithItems,
            StockMovement,
            PaymentMethod,
            PaymentStatus,
            StockType,
            MovementType,
            CartLineRequest,
            ValidateCartRequest,
            CartLine,
            Cart,
            CartValidationError,
            CartValidation,
            CreateSaleRequest,
            SaleList,
            PaymentMethodSummary,
            DailySummary,
            CreateIntentRequest,
            PaymentIntentResponse,
            ConfirmPaymentRequest,
            ConfirmedPayment,
            StockAdjustRequest,
            StockAdjustment,
            MovementList,
            ProductList,
            Meta,
            ErrorBody,
            ApiResponse<SaleWithItems>,
            ApiResponse<SaleList>,
            ApiResponse<CartValidation>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Sales", description = "Cart validation, sales, receipts and refunds"),
        (name = "Payments", description = "Card payment intents and confirmation"),
        (name = "Inventory", description = "Stock adjustments, movements and low-stock alerts"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
