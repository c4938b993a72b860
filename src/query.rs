// 🔎 Query Engine - read-only lookups over the customer store
// Every query borrows from the store and returns a new derived sequence;
// the stored records and their order are never touched.

use crate::config::EngineConfig;
use crate::customer::{parse_timestamp, Cents, Customer, CustomerField};
use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// FILTER CRITERIA
// ============================================================================

/// Field/value pairs combined with logical AND by `filter_by`
///
/// - `purchased` / `lastpayment`: value is an inclusive lower-bound date
/// - other string fields: case-insensitive substring containment
/// - `id` / `payment_amount`: numeric equality; an unparsable value matches nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    criteria: Vec<(CustomerField, String)>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        FilterCriteria::default()
    }

    /// Add a criterion (builder style)
    pub fn with(mut self, field: CustomerField, value: impl Into<String>) -> Self {
        self.criteria.push((field, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(CustomerField, String)> {
        self.criteria.iter()
    }
}

/// Criterion with its value already parsed for the target field
enum Predicate {
    OnOrAfter(CustomerField, DateTime<Utc>),
    Contains(CustomerField, String),
    IdEquals(i64),
    AmountEquals(Cents),
    Never,
}

impl Predicate {
    fn compile(field: CustomerField, value: &str) -> Result<Self> {
        let predicate = match field {
            date_field if date_field.is_date() => {
                Predicate::OnOrAfter(date_field, parse_timestamp(value)?)
            }
            CustomerField::Id => match value.trim().parse::<i64>() {
                Ok(id) => Predicate::IdEquals(id),
                Err(_) => Predicate::Never,
            },
            CustomerField::PaymentAmount => {
                match value.trim().parse::<f64>().ok().and_then(Cents::from_dollars) {
                    Some(amount) => Predicate::AmountEquals(amount),
                    None => Predicate::Never,
                }
            }
            text_field => Predicate::Contains(text_field, value.to_lowercase()),
        };
        Ok(predicate)
    }

    fn matches(&self, customer: &Customer) -> Result<bool> {
        let matched = match self {
            Predicate::OnOrAfter(CustomerField::Purchased, bound) => customer.purchased_at()? >= *bound,
            Predicate::OnOrAfter(_, bound) => customer.last_payment_at()? >= *bound,
            Predicate::Contains(field, needle) => field
                .text(customer)
                .map_or(false, |text| text.to_lowercase().contains(needle.as_str())),
            Predicate::IdEquals(id) => customer.id == *id,
            // Absent amount excludes the record
            Predicate::AmountEquals(amount) => customer.payment_amount == Some(*amount),
            Predicate::Never => false,
        };
        Ok(matched)
    }
}

// ============================================================================
// PAYMENT STATUS
// ============================================================================

/// Disjoint partition of the store by payment status
/// Priority: no payment > late > current
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentStatus<'a> {
    pub current: Vec<&'a Customer>,
    pub late: Vec<&'a Customer>,
    pub no_payments: Vec<&'a Customer>,
}

impl PaymentStatus<'_> {
    pub fn total(&self) -> usize {
        self.current.len() + self.late.len() + self.no_payments.len()
    }
}

// ============================================================================
// CUSTOMER VEHICLE DATA
// ============================================================================

pub struct CustomerVehicleData {
    customers: Vec<Customer>,
    config: EngineConfig,
}

impl CustomerVehicleData {
    /// Create engine over the given records with default configuration
    pub fn new(customers: Vec<Customer>) -> Self {
        Self::with_config(customers, EngineConfig::default())
    }

    pub fn with_config(customers: Vec<Customer>, config: EngineConfig) -> Self {
        CustomerVehicleData { customers, config }
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// All customers, in stored order
    pub fn get_all_customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn find_customer(&self, id: i64) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn find_by_make(&self, make: &str) -> Vec<&Customer> {
        self.find_by_field(CustomerField::Make, make)
    }

    pub fn find_by_model(&self, model: &str) -> Vec<&Customer> {
        self.find_by_field(CustomerField::Model, model)
    }

    pub fn find_by_city(&self, city: &str) -> Vec<&Customer> {
        self.find_by_field(CustomerField::City, city)
    }

    /// Case-insensitive exact match on a string field
    fn find_by_field(&self, field: CustomerField, value: &str) -> Vec<&Customer> {
        let wanted = value.to_lowercase();
        let found: Vec<&Customer> = self
            .customers
            .iter()
            .filter(|c| field.text(c).map_or(false, |text| text.to_lowercase() == wanted))
            .collect();

        debug!(field = %field, value, matches = found.len(), "find by field");
        found
    }

    /// Customers who purchased strictly after `date`
    pub fn get_customers_after_date(&self, date: &str) -> Result<Vec<&Customer>> {
        if self.customers.is_empty() {
            return Ok(Vec::new());
        }

        let target = parse_timestamp(date)?;
        let mut found = Vec::new();
        for customer in &self.customers {
            if customer.purchased_at()? > target {
                found.push(customer);
            }
        }
        Ok(found)
    }

    /// Customers whose last payment is strictly before `date`
    pub fn get_customers_with_last_payment_before(&self, date: &str) -> Result<Vec<&Customer>> {
        if self.customers.is_empty() {
            return Ok(Vec::new());
        }

        let target = parse_timestamp(date)?;
        let mut found = Vec::new();
        for customer in &self.customers {
            if customer.last_payment_at()? < target {
                found.push(customer);
            }
        }
        Ok(found)
    }

    /// Customers satisfying every criterion
    pub fn filter_by(&self, criteria: &FilterCriteria) -> Result<Vec<&Customer>> {
        if self.customers.is_empty() {
            return Ok(Vec::new());
        }

        let predicates = criteria
            .iter()
            .map(|(field, value)| Predicate::compile(*field, value))
            .collect::<Result<Vec<_>>>()?;

        let mut found = Vec::new();
        'customers: for customer in &self.customers {
            for predicate in &predicates {
                if !predicate.matches(customer)? {
                    continue 'customers;
                }
            }
            found.push(customer);
        }

        debug!(criteria = criteria.len(), matches = found.len(), "filter_by");
        Ok(found)
    }

    /// Stable sort by `field`; ties keep stored relative order in both directions
    pub fn sort_by(&self, field: CustomerField, ascending: bool) -> Result<Vec<&Customer>> {
        let mut keyed = self
            .customers
            .iter()
            .map(|c| Ok((field.sort_key(c)?, c)))
            .collect::<Result<Vec<_>>>()?;

        if ascending {
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
        } else {
            keyed.sort_by(|a, b| b.0.cmp(&a.0));
        }

        Ok(keyed.into_iter().map(|(_, c)| c).collect())
    }

    /// Instant before which a last payment counts as late
    pub fn late_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.config.late_payment_days)
    }

    /// Customers with a positive payment whose last payment predates the late window
    pub fn get_late_payers(&self, now: DateTime<Utc>) -> Result<Vec<&Customer>> {
        let cutoff = self.late_cutoff(now);
        let mut late = Vec::new();
        for customer in &self.customers {
            if customer.has_payment() && customer.last_payment_at()? < cutoff {
                late.push(customer);
            }
        }

        debug!(late = late.len(), %cutoff, "late payers");
        Ok(late)
    }

    /// Partition every customer into exactly one payment-status bucket
    pub fn get_customers_by_payment_status(&self, now: DateTime<Utc>) -> Result<PaymentStatus<'_>> {
        let cutoff = self.late_cutoff(now);
        let mut status = PaymentStatus::default();

        for customer in &self.customers {
            if !customer.has_payment() {
                status.no_payments.push(customer);
            } else if customer.last_payment_at()? < cutoff {
                status.late.push(customer);
            } else {
                status.current.push(customer);
            }
        }

        Ok(status)
    }
}

// ============================================================================
// TESTS
// ============================================================================
