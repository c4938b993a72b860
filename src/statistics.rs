// 📊 Aggregation - store-wide counts, distributions and payment totals
//
// Asymmetry on empty input is intentional:
//   get_statistics() over zero customers → EmptyStore error (averages undefined)
//   get_payment_statistics() over zero positive payments → all-zero result

use crate::customer::{parse_timestamp, Cents, Customer};
use crate::error::{CustomerDataError, Result};
use crate::query::CustomerVehicleData;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// ============================================================================
// RESULT TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_customers: usize,
    pub unique_makes: usize,
    pub unique_models: usize,
    pub unique_cities: usize,

    /// Case-folded make → customer count
    pub make_distribution: BTreeMap<String, usize>,

    /// Case-folded city → customer count
    pub city_distribution: BTreeMap<String, usize>,

    pub average_days_since_purchase: i64,
    pub average_days_since_last_payment: i64,

    /// Mean over positive payments (zero when there are none)
    pub average_payment: Cents,
}

/// Totals over customers with a positive payment amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaymentStatistics {
    pub total_payments: Cents,
    pub average_payment: Cents,
    pub highest_payment: Cents,
    pub lowest_payment: Cents,
}

// ============================================================================
// AGGREGATION
// ============================================================================

impl CustomerVehicleData {
    pub fn get_statistics(&self, now: DateTime<Utc>) -> Result<Statistics> {
        let customers = self.get_all_customers();
        if customers.is_empty() {
            return Err(CustomerDataError::EmptyStore);
        }

        let stats = Statistics {
            total_customers: customers.len(),
            unique_makes: count_distinct(customers, |c| c.make.as_str()),
            unique_models: count_distinct(customers, |c| c.model.as_str()),
            unique_cities: count_distinct(customers, |c| c.city.as_str()),
            make_distribution: self.get_make_distribution(),
            city_distribution: self.get_city_distribution(),
            average_days_since_purchase: self.get_average_days_since_purchase(now)?,
            average_days_since_last_payment: self.get_average_days_since_last_payment(now)?,
            average_payment: self.get_payment_statistics()?.average_payment,
        };

        debug!(total = stats.total_customers, makes = stats.unique_makes, "statistics computed");
        Ok(stats)
    }

    pub fn get_make_distribution(&self) -> BTreeMap<String, usize> {
        distribution(self.get_all_customers(), |c| c.make.as_str())
    }

    pub fn get_city_distribution(&self) -> BTreeMap<String, usize> {
        distribution(self.get_all_customers(), |c| c.city.as_str())
    }

    /// Floored mean of whole days elapsed since purchase
    pub fn get_average_days_since_purchase(&self, now: DateTime<Utc>) -> Result<i64> {
        self.average_days_since(now, |c| c.purchased.as_str())
    }

    /// Floored mean of whole days elapsed since the last payment
    pub fn get_average_days_since_last_payment(&self, now: DateTime<Utc>) -> Result<i64> {
        self.average_days_since(now, |c| c.lastpayment.as_str())
    }

    fn average_days_since<F>(&self, now: DateTime<Utc>, date_of: F) -> Result<i64>
    where
        F: Fn(&Customer) -> &str,
    {
        let customers = self.get_all_customers();
        if customers.is_empty() {
            return Err(CustomerDataError::EmptyStore);
        }

        let mut total_days = 0i64;
        for customer in customers {
            let date = parse_timestamp(date_of(customer))?;
            total_days += whole_days_between(date, now);
        }

        Ok(total_days.div_euclid(customers.len() as i64))
    }

    /// Errors only when the total leaves the representable cent range
    pub fn get_payment_statistics(&self) -> Result<PaymentStatistics> {
        let payments: Vec<Cents> = self
            .get_all_customers()
            .iter()
            .map(Customer::payment)
            .filter(|amount| amount.is_positive())
            .collect();

        let (Some(highest), Some(lowest)) = (payments.iter().max(), payments.iter().min()) else {
            return Ok(PaymentStatistics::default());
        };

        let total = Cents::checked_sum(payments.iter().copied())?;
        let count = payments.len() as i128;

        // Round to the nearest cent; all terms are positive here.
        // The mean never exceeds the highest payment, so it fits back in i64.
        let average = (i128::from(total.as_cents()) + count / 2) / count;

        Ok(PaymentStatistics {
            total_payments: total,
            average_payment: Cents::from_cents(average as i64),
            highest_payment: *highest,
            lowest_payment: *lowest,
        })
    }

    /// Sum of payment amounts whose last payment falls within [start, end]
    pub fn get_total_payments_in_period(&self, start: &str, end: &str) -> Result<Cents> {
        if self.get_all_customers().is_empty() {
            return Ok(Cents::ZERO);
        }

        let start = parse_timestamp(start)?;
        let end = parse_timestamp(end)?;

        let mut total = Cents::ZERO;
        for customer in self.get_all_customers() {
            let paid_at = customer.last_payment_at()?;
            if paid_at >= start && paid_at <= end {
                total = total.checked_add(customer.payment())?;
            }
        }

        debug!(%start, %end, total_cents = total.as_cents(), "payments in period");
        Ok(total)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Whole days from `from` to `to`, floored (negative for future dates)
pub(crate) fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

fn count_distinct<F>(customers: &[Customer], value_of: F) -> usize
where
    F: Fn(&Customer) -> &str,
{
    customers
        .iter()
        .map(|c| value_of(c).to_lowercase())
        .collect::<HashSet<_>>()
        .len()
}

fn distribution<F>(customers: &[Customer], value_of: F) -> BTreeMap<String, usize>
where
    F: Fn(&Customer) -> &str,
{
    let mut counts = BTreeMap::new();
    for customer in customers {
        *counts.entry(value_of(customer).to_lowercase()).or_insert(0) += 1;
    }
    counts
}

// ============================================================================
// TESTS
// ============================================================================
