//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, loans, titles};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "1.0.0",
        description = "Library circulation core REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Loans
        loans::create_loan,
        loans::return_loan,
        loans::renew_loan,
        loans::get_patron_loans,
        loans::list_overdue,
        loans::trigger_sweep,
        // Titles
        titles::get_availability,
        titles::create_copy,
    ),
    components(
        schemas(
            // Loans
            loans::CheckoutRequest,
            loans::ReturnRequest,
            loans::RenewRequest,
            loans::SweepResponse,
            crate::models::copy::Copy,
            crate::models::copy::CopyState,
            crate::models::copy::ConditionCode,
            crate::models::copy::LoanType,
            // Titles
            titles::CreateCopyRequest,
            crate::models::title::Title,
            crate::models::title::TitleAvailability,
            // Patrons
            crate::models::patron::Patron,
            crate::models::patron::PatronStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "loans", description = "Loan lifecycle management"),
        (name = "titles", description = "Title availability and inventory")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
