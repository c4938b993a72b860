// 🚗 Customer Model - One customer-and-vehicle record
// Plus the money type and the enumerated field accessor used by sort/filter

use crate::error::{CustomerDataError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CUSTOMER RECORD
// ============================================================================

/// Customer record as supplied by the input provider
/// Dates stay as the supplied ISO-8601 strings and are parsed on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,

    /// Vehicle purchase date (ISO-8601)
    pub purchased: String,

    /// Most recent payment date (ISO-8601)
    pub lastpayment: String,

    pub phone: String,
    pub make: String,
    pub model: String,
    pub city: String,

    /// Absent or zero means "no recorded payment"
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<Cents>,
}

impl Customer {
    pub fn purchased_at(&self) -> Result<DateTime<Utc>> {
        parse_timestamp(&self.purchased)
    }

    pub fn last_payment_at(&self) -> Result<DateTime<Utc>> {
        parse_timestamp(&self.lastpayment)
    }

    /// Payment amount with absent treated as zero
    pub fn payment(&self) -> Cents {
        self.payment_amount.unwrap_or(Cents::ZERO)
    }

    pub fn has_payment(&self) -> bool {
        self.payment().is_positive()
    }
}

// ============================================================================
// MONEY
// ============================================================================

/// Amount of money in integer cents
/// Decoded from and encoded to a dollar number on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn from_cents(cents: i64) -> Self {
        Cents(cents)
    }

    /// Round to the nearest cent, half away from zero
    /// `None` for NaN, infinities and amounts outside the i64 cent range
    pub fn from_dollars(dollars: f64) -> Option<Self> {
        let cents = (dollars * 100.0).round();
        if !cents.is_finite() || cents < i64::MIN as f64 || cents >= i64::MAX as f64 {
            return None;
        }
        Some(Cents(cents as i64))
    }

    pub const fn as_cents(self) -> i64 {
        self.0
    }

    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Cents) -> Result<Cents> {
        self.0
            .checked_add(rhs.0)
            .map(Cents)
            .ok_or(CustomerDataError::AmountOverflow)
    }

    /// Sum of all amounts; errors instead of wrapping past the i64 range
    pub fn checked_sum<I: IntoIterator<Item = Cents>>(amounts: I) -> Result<Cents> {
        amounts
            .into_iter()
            .try_fold(Cents::ZERO, |total, amount| total.checked_add(amount))
    }
}

impl Serialize for Cents {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_dollars())
    }
}

impl<'de> Deserialize<'de> for Cents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let dollars = f64::deserialize(deserializer)?;
        Cents::from_dollars(dollars)
            .ok_or_else(|| D::Error::custom(format!("payment amount out of range: {}", dollars)))
    }
}

// ============================================================================
// FIELD ACCESSOR
// ============================================================================

/// Sortable / filterable fields of a customer record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    Id,
    FirstName,
    LastName,
    Purchased,
    LastPayment,
    Phone,
    Make,
    Model,
    City,
    PaymentAmount,
}

/// Typed ordering key extracted from one field of a record
/// Keys produced for the same field always share a variant
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Amount(Cents),
}

impl CustomerField {
    pub const ALL: [CustomerField; 10] = [
        CustomerField::Id,
        CustomerField::FirstName,
        CustomerField::LastName,
        CustomerField::Purchased,
        CustomerField::LastPayment,
        CustomerField::Phone,
        CustomerField::Make,
        CustomerField::Model,
        CustomerField::City,
        CustomerField::PaymentAmount,
    ];

    /// Field name as it appears in the input records
    pub fn name(&self) -> &'static str {
        match self {
            CustomerField::Id => "id",
            CustomerField::FirstName => "first_name",
            CustomerField::LastName => "last_name",
            CustomerField::Purchased => "purchased",
            CustomerField::LastPayment => "lastpayment",
            CustomerField::Phone => "phone",
            CustomerField::Make => "make",
            CustomerField::Model => "model",
            CustomerField::City => "city",
            CustomerField::PaymentAmount => "payment_amount",
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, CustomerField::Purchased | CustomerField::LastPayment)
    }

    /// Raw text of a string field; `None` for numeric fields
    pub fn text<'a>(&self, customer: &'a Customer) -> Option<&'a str> {
        match self {
            CustomerField::FirstName => Some(&customer.first_name),
            CustomerField::LastName => Some(&customer.last_name),
            CustomerField::Purchased => Some(&customer.purchased),
            CustomerField::LastPayment => Some(&customer.lastpayment),
            CustomerField::Phone => Some(&customer.phone),
            CustomerField::Make => Some(&customer.make),
            CustomerField::Model => Some(&customer.model),
            CustomerField::City => Some(&customer.city),
            CustomerField::Id | CustomerField::PaymentAmount => None,
        }
    }

    /// Ordering key: dates as timestamps, strings case-folded
    pub fn sort_key(&self, customer: &Customer) -> Result<FieldValue> {
        let key = match self {
            CustomerField::Id => FieldValue::Integer(customer.id),
            CustomerField::Purchased => FieldValue::Timestamp(customer.purchased_at()?),
            CustomerField::LastPayment => FieldValue::Timestamp(customer.last_payment_at()?),
            CustomerField::PaymentAmount => FieldValue::Amount(customer.payment()),
            text_field => {
                let text = text_field.text(customer).unwrap_or_default();
                FieldValue::Text(text.to_lowercase())
            }
        };
        Ok(key)
    }
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CustomerField {
    type Err = CustomerDataError;

    fn from_str(s: &str) -> Result<Self> {
        CustomerField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| CustomerDataError::UnknownField(s.to_string()))
    }
}

// ============================================================================
// DATE PARSING
// ============================================================================

/// Parse an ISO-8601 timestamp into UTC
/// Supports RFC 3339, naive date-times (read as UTC) and bare dates (UTC midnight)
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Some(naive) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }

    Err(CustomerDataError::InvalidDate {
        value: value.to_string(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_timestamp("2019-01-01T00:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap());

        let offset = parse_timestamp("2019-01-01T02:00:00+02:00").unwrap();
        assert_eq!(offset, parsed);
    }

    #[test]
    fn test_parse_bare_date_is_utc_midnight() {
        let parsed = parse_timestamp("2019-12-31").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2019, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime_with_fraction() {
        let parsed = parse_timestamp("2020-06-15T08:30:00.250").unwrap();
        assert_eq!(parsed.timestamp_millis() % 1000, 250);
    }

    #[test]
    fn test_parse_invalid_date() {
        let err = parse_timestamp("not a date").unwrap_err();
        assert_eq!(
            err,
            CustomerDataError::InvalidDate {
                value: "not a date".to_string()
            }
        );
    }

    #[test]
    fn test_cents_from_dollars_rounds() {
        assert_eq!(Cents::from_dollars(1234.5), Some(Cents::from_cents(123450)));
        assert_eq!(Cents::from_dollars(0.005), Some(Cents::from_cents(1)));
        assert_eq!(Cents::from_dollars(19.99), Some(Cents::from_cents(1999)));
    }

    #[test]
    fn test_cents_from_dollars_rejects_out_of_range() {
        assert_eq!(Cents::from_dollars(f64::NAN), None);
        assert_eq!(Cents::from_dollars(f64::INFINITY), None);
        assert_eq!(Cents::from_dollars(1e17), None);
        assert_eq!(Cents::from_dollars(-1e17), None);
        assert!(Cents::from_dollars(9e16).is_some());
    }

    #[test]
    fn test_payment_amount_out_of_range_fails_decoding() {
        let json = r#"{
            "id": 1, "first_name": "a", "last_name": "b",
            "purchased": "2018-04-03", "lastpayment": "2019-02-01",
            "phone": "1", "make": "m", "model": "m", "city": "c",
            "payment_amount": 1e300
        }"#;
        let err = serde_json::from_str::<Customer>(json).unwrap_err();
        assert!(err.to_string().contains("payment amount out of range"));
    }

    #[test]
    fn test_checked_sum_reports_overflow() {
        let big = Cents::from_cents(i64::MAX - 1);
        assert_eq!(
            Cents::checked_sum([big, Cents::from_cents(2)]),
            Err(CustomerDataError::AmountOverflow)
        );
        assert_eq!(
            Cents::checked_sum([Cents::from_cents(100), Cents::from_cents(250)]),
            Ok(Cents::from_cents(350))
        );
    }

    #[test]
    fn test_payment_amount_optional_in_json() {
        let json = r#"{
            "id": 7, "first_name": "neel", "last_name": "mclarty",
            "purchased": "2018-04-03T00:00:00Z", "lastpayment": "2019-02-01T00:00:00Z",
            "phone": "153-158-9353", "make": "saturn", "model": "s-series", "city": "sikeshu"
        }"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.payment_amount, None);
        assert_eq!(customer.payment(), Cents::ZERO);
        assert!(!customer.has_payment());

        let with_amount = json.replace("\"city\": \"sikeshu\"", "\"city\": \"sikeshu\", \"payment_amount\": 412.5");
        let customer: Customer = serde_json::from_str(&with_amount).unwrap();
        assert_eq!(customer.payment_amount, Some(Cents::from_cents(41250)));
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("lastpayment".parse::<CustomerField>().unwrap(), CustomerField::LastPayment);
        assert_eq!("payment_amount".parse::<CustomerField>().unwrap(), CustomerField::PaymentAmount);
        assert_eq!(
            "colour".parse::<CustomerField>().unwrap_err(),
            CustomerDataError::UnknownField("colour".to_string())
        );
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in CustomerField::ALL {
            assert_eq!(field.to_string().parse::<CustomerField>().unwrap(), field);
        }
    }
}
