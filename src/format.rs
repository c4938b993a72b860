// 🖨️ Display Formatting - names, dates, phones, money and full customer cards
// Fixed en-US rendering; every helper is pure and leaves its input untouched.

use crate::customer::{parse_timestamp, Cents, Customer};
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Relative-time output counts 30-day months, not calendar months
const MILLIS_PER_MONTH: i64 = 30 * 24 * 60 * 60 * 1000;

// ============================================================================
// TEXT
// ============================================================================

/// Uppercase the first character, leave the rest as-is
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercase the first character of each word and lowercase the remainder.
/// Splits on single spaces so runs of spaces survive.
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// "neel", "MCLARTY" → "Neel Mclarty"
pub fn format_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", title_case(first_name), title_case(last_name))
}

// ============================================================================
// DATES
// ============================================================================

/// ISO-8601 → "April 3, 2018" (UTC calendar date)
pub fn format_date(date: &str) -> Result<String> {
    let parsed = parse_timestamp(date)?;
    Ok(parsed.format("%B %-d, %Y").to_string())
}

/// Whole 30-day months between `date` and `now`, floored → "N months ago"
pub fn format_relative_time(date: &str, now: DateTime<Utc>) -> Result<String> {
    let parsed = parse_timestamp(date)?;
    let months = (now - parsed).num_milliseconds().div_euclid(MILLIS_PER_MONTH);
    Ok(format!("{} months ago", months))
}

// ============================================================================
// PHONE
// ============================================================================

/// Ten digits → "(DDD) DDD-DDDD"; anything else comes back unchanged
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return phone.to_string();
    }

    format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..])
}

// ============================================================================
// MONEY
// ============================================================================

/// US dollars with thousands separators: 123450 cents → "$1,234.50"
pub fn format_currency(amount: Cents) -> String {
    let cents = amount.as_cents();
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();

    format!(
        "{}${}.{:02}",
        sign,
        group_thousands(magnitude / 100),
        magnitude % 100
    )
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    grouped
}

// ============================================================================
// CUSTOMER CARDS
// ============================================================================

/// Multi-line customer card, blank line between fields
pub fn format_customer(customer: &Customer, now: DateTime<Utc>) -> Result<String> {
    Ok(format!(
        "{}\n\n{} {}\n\nPurchased: {}\n\nLast Payment: {}\n\nPhone: {}\n\nCity: {}",
        format_name(&customer.first_name, &customer.last_name),
        capitalize(&customer.make),
        capitalize(&customer.model),
        format_date(&customer.purchased)?,
        format_relative_time(&customer.lastpayment, now)?,
        format_phone_number(&customer.phone),
        capitalize(&customer.city),
    ))
}

/// Customer card plus a payment line when a nonzero amount is recorded
pub fn format_customer_with_payments(customer: &Customer, now: DateTime<Utc>) -> Result<String> {
    let mut card = format_customer(customer, now)?;

    match customer.payment_amount {
        Some(amount) if amount != Cents::ZERO => {
            card.push_str("\nLast Payment Amount: ");
            card.push_str(&format_currency(amount));
        }
        _ => {}
    }

    Ok(card)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_customer(payment_amount: Option<Cents>) -> Customer {
        Customer {
            id: 1,
            first_name: "neel".to_string(),
            last_name: "mclarty".to_string(),
            purchased: "2018-04-03T00:00:00Z".to_string(),
            lastpayment: "2019-01-01T00:00:00Z".to_string(),
            phone: "153.158.9353".to_string(),
            make: "saturn".to_string(),
            model: "s-series".to_string(),
            city: "sikeshu".to_string(),
            payment_amount,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        // 240 days after 2019-01-01
        Utc.with_ymd_and_hms(2019, 8, 29, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_format_name() {
        assert_eq!(format_name("john", "doe"), "John Doe");
        assert_eq!(format_name("JANE", "sMITH"), "Jane Smith");
        assert_eq!(format_name("mary ann", "van dyke"), "Mary Ann Van Dyke");
    }

    #[test]
    fn test_format_name_preserves_spacing() {
        assert_eq!(format_name("mary  ann", "doe"), "Mary  Ann Doe");
        assert_eq!(format_name(" john", "doe "), " John Doe ");
        assert_eq!(format_name("", "doe"), " Doe");
    }

    #[test]
    fn test_capitalize_keeps_remainder() {
        assert_eq!(capitalize("s-series"), "S-series");
        assert_eq!(capitalize("BMW"), "BMW");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2018-04-03T00:00:00Z").unwrap(), "April 3, 2018");
        assert_eq!(format_date("2020-12-25").unwrap(), "December 25, 2020");
        assert!(format_date("03/04/2018").is_err());
    }

    #[test]
    fn test_format_relative_time_uses_30_day_months() {
        let now = fixed_now();
        assert_eq!(format_relative_time("2019-01-01T00:00:00Z", now).unwrap(), "8 months ago");
        // 239 days floors to 7
        assert_eq!(format_relative_time("2019-01-02T00:00:00Z", now).unwrap(), "7 months ago");
        assert_eq!(format_relative_time("2019-08-28T00:00:00Z", now).unwrap(), "0 months ago");
    }

    #[test]
    fn test_format_phone_valid() {
        assert_eq!(format_phone_number("1234567890"), "(123) 456-7890");
        assert_eq!(format_phone_number("9876543210"), "(987) 654-3210");
        assert_eq!(format_phone_number("(123) 456-7890"), "(123) 456-7890");
        assert_eq!(format_phone_number("123.456.7890"), "(123) 456-7890");
        assert_eq!(format_phone_number("123-456-7890"), "(123) 456-7890");
    }

    #[test]
    fn test_format_phone_invalid_returns_input() {
        assert_eq!(format_phone_number("123"), "123");
        assert_eq!(format_phone_number("12345678901"), "12345678901");
        assert_eq!(format_phone_number("12-34"), "12-34");
        assert_eq!(format_phone_number("abc"), "abc");
        assert_eq!(format_phone_number(""), "");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Cents::from_cents(123450)), "$1,234.50");
        assert_eq!(format_currency(Cents::from_cents(50000)), "$500.00");
        assert_eq!(format_currency(Cents::ZERO), "$0.00");
        assert_eq!(format_currency(Cents::from_cents(5)), "$0.05");
        assert_eq!(format_currency(Cents::from_cents(123456789)), "$1,234,567.89");
        assert_eq!(format_currency(Cents::from_cents(-100000)), "-$1,000.00");
    }

    #[test]
    fn test_format_customer_layout() {
        let customer = create_test_customer(None);
        let card = format_customer(&customer, fixed_now()).unwrap();

        assert_eq!(
            card,
            "Neel Mclarty\n\nSaturn S-series\n\nPurchased: April 3, 2018\n\n\
             Last Payment: 8 months ago\n\nPhone: (153) 158-9353\n\nCity: Sikeshu"
        );
    }

    #[test]
    fn test_format_customer_with_payments_appends_amount() {
        let customer = create_test_customer(Some(Cents::from_cents(50000)));
        let card = format_customer_with_payments(&customer, fixed_now()).unwrap();

        assert!(card.ends_with("City: Sikeshu\nLast Payment Amount: $500.00"));
    }

    #[test]
    fn test_format_customer_with_zero_payment_matches_plain() {
        let now = fixed_now();
        for amount in [Some(Cents::ZERO), None] {
            let customer = create_test_customer(amount);
            let plain = format_customer(&customer, now).unwrap();
            let with_payments = format_customer_with_payments(&customer, now).unwrap();

            assert_eq!(plain, with_payments);
            assert!(!with_payments.contains("Last Payment Amount"));
        }
    }

    #[test]
    fn test_format_customer_does_not_mutate() {
        let customer = create_test_customer(Some(Cents::from_cents(100)));
        let before = customer.clone();
        let _ = format_customer_with_payments(&customer, fixed_now()).unwrap();
        assert_eq!(customer, before);
    }
}
