// ⚠️ Error kinds surfaced by the query engine
// File loading and the CLI wrap these in anyhow with context.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerDataError {
    /// Averages over the store were requested but it holds no records
    #[error("store is empty: averages are undefined over zero customers")]
    EmptyStore,

    /// A date argument or record date could not be parsed
    #[error("invalid date: {value:?}")]
    InvalidDate { value: String },

    /// Summed payment amounts exceed the representable cent range
    #[error("payment total overflows the supported amount range")]
    AmountOverflow,

    /// Field name not known to the accessor table
    #[error("unknown customer field: {0:?}")]
    UnknownField(String),
}

pub type Result<T> = std::result::Result<T, CustomerDataError>;
