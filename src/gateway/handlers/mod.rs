pub mod account;
pub mod customer;
pub mod health;
pub mod transfer;

pub use account::{get_account, list_accounts};
pub use customer::{
    create_account, create_customer, get_customer, list_customer_accounts, list_customers,
};
pub use health::health_check;
pub use transfer::create_transfer;
