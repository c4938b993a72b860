// Customer Vehicle Data - Core Library
// In-memory query, aggregation and formatting over customer-and-vehicle records

pub mod config;
pub mod customer;
pub mod error;
pub mod format;
pub mod loader;
pub mod query;
pub mod statistics;

// Re-export commonly used types
pub use config::EngineConfig;
pub use customer::{parse_timestamp, Cents, Customer, CustomerField, FieldValue};
pub use error::CustomerDataError;
pub use format::{
    capitalize, format_currency, format_customer, format_customer_with_payments, format_date,
    format_name, format_phone_number, format_relative_time,
};
pub use loader::{load_csv, load_customers, load_json, parse_json, read_csv};
pub use query::{CustomerVehicleData, FilterCriteria, PaymentStatus};
pub use statistics::{PaymentStatistics, Statistics};
