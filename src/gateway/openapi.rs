//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8899/docs`
//! - OpenAPI JSON: `http://localhost:8899/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::handlers::health::HealthResponse;
use crate::gateway::types::{
    AccountResponse, BalanceView, CreateAccountRequest, CreateCustomerRequest, CustomerResponse,
    TransferApiRequest, TransferApiResponse,
};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Minibank Ledger API",
        version = "1.0.0",
        description = "Customers, accounts and atomic transfers between accounts. Amounts are integer minor units.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8899", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::customer::create_customer,
        crate::gateway::handlers::customer::get_customer,
        crate::gateway::handlers::customer::list_customers,
        crate::gateway::handlers::customer::create_account,
        crate::gateway::handlers::customer::list_customer_accounts,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::account::list_accounts,
        crate::gateway::handlers::transfer::create_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            CreateCustomerRequest,
            CustomerResponse,
            CreateAccountRequest,
            AccountResponse,
            TransferApiRequest,
            TransferApiResponse,
            BalanceView,
        )
    ),
    tags(
        (name = "Customers", description = "Customer registration and lookup"),
        (name = "Accounts", description = "Account opening and balance queries"),
        (name = "Transfers", description = "Atomic transfers between two accounts"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
