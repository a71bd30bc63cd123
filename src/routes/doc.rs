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
        auth::{LoginRequest, SignupRequest, TokenResponse},
        receipts::{CreateReceiptRequest, LineItemInput, PaymentInput, ReceiptList, ReceiptText},
    },
    models::{LineItem, Payment, PaymentKind, Product, Receipt, User},
    response::{ApiResponse, Meta},
    routes::{auth, health, params, receipts},
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
        auth::signup,
        auth::login,
        auth::me,
        receipts::create_receipt,
        receipts::list_receipts,
        receipts::get_receipt_text,
    ),
    components(
        schemas(
            User,
            Product,
            Payment,
            PaymentKind,
            LineItem,
            Receipt,
            SignupRequest,
            LoginRequest,
            TokenResponse,
            CreateReceiptRequest,
            LineItemInput,
            PaymentInput,
            ReceiptList,
            ReceiptText,
            params::Pagination,
            params::ReceiptListQuery,
            Meta,
            ApiResponse<Receipt>,
            ApiResponse<ReceiptList>,
            ApiResponse<ReceiptText>,
            ApiResponse<TokenResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Signup and login endpoints"),
        (name = "Receipts", description = "Receipt creation, filtering and text rendering"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
