use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use customer_vehicle_data::{
    format_currency, format_customer, format_customer_with_payments, format_name, load_customers,
    Customer, CustomerField, CustomerVehicleData, EngineConfig, FilterCriteria,
};

#[derive(Parser)]
#[command(
    name = "customer-vehicle-data",
    version,
    about = "Query and report on customer-and-vehicle records"
)]
struct Cli {
    /// Customer data file (.json array or .csv with a header row)
    #[arg(long, default_value = "data.json")]
    data: PathBuf,

    /// Days after which a payment counts as late
    #[arg(long, default_value_t = 30)]
    late_days: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print one customer card with payment details
    Show {
        /// Customer id (first record when omitted)
        #[arg(long)]
        id: Option<i64>,
    },
    /// Payment tracking report over the whole store
    Report {
        #[arg(long, default_value = "2019-12-01T00:00:00Z")]
        start: String,
        #[arg(long, default_value = "2020-01-31T00:00:00Z")]
        end: String,
    },
    /// Store-wide statistics
    Stats {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Exact, case-insensitive lookup by make, model or city
    Find {
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    /// Filter with FIELD=VALUE criteria (all must match)
    Filter {
        #[arg(value_name = "FIELD=VALUE", required = true)]
        criteria: Vec<String>,
    },
    /// List customers sorted by a field
    Sort {
        field: CustomerField,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let customers = load_customers(&cli.data)?;
    let config = EngineConfig::new().with_late_payment_days(cli.late_days);
    let data = CustomerVehicleData::with_config(customers, config);

    // Read the clock once per invocation
    let now = Utc::now();

    match cli.command {
        Command::Show { id } => run_show(&data, id, now)?,
        Command::Report { start, end } => run_report(&data, &start, &end, now)?,
        Command::Stats { json } => run_stats(&data, json, now)?,
        Command::Find { make, model, city } => {
            let found = if let Some(make) = make {
                data.find_by_make(&make)
            } else if let Some(model) = model {
                data.find_by_model(&model)
            } else if let Some(city) = city {
                data.find_by_city(&city)
            } else {
                bail!("find needs one of --make, --model or --city");
            };
            print_list(&found);
        }
        Command::Filter { criteria } => {
            let criteria = parse_criteria(&criteria)?;
            print_list(&data.filter_by(&criteria)?);
        }
        Command::Sort { field, desc } => print_list(&data.sort_by(field, !desc)?),
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn first_or_by_id(data: &CustomerVehicleData, id: Option<i64>) -> Result<&Customer> {
    match id {
        Some(id) => data
            .find_customer(id)
            .with_context(|| format!("No customer with id {}", id)),
        None => data
            .get_all_customers()
            .first()
            .context("Data file contains no customers"),
    }
}

fn run_show(data: &CustomerVehicleData, id: Option<i64>, now: DateTime<Utc>) -> Result<()> {
    let customer = first_or_by_id(data, id)?;
    println!("{}", format_customer_with_payments(customer, now)?);
    Ok(())
}

fn run_report(data: &CustomerVehicleData, start: &str, end: &str, now: DateTime<Utc>) -> Result<()> {
    let customer = first_or_by_id(data, None)?;

    println!("Customer Information:");
    println!("{}", format_customer(customer, now)?);

    println!("\nPayment Tracking:");
    let late_payers = data.get_late_payers(now)?;
    println!("Number of late payers: {}", late_payers.len());

    let payment_stats = data.get_payment_statistics()?;
    println!("\nPayment Statistics:");
    println!("Total Payments: {}", format_currency(payment_stats.total_payments));
    println!("Average Payment: {}", format_currency(payment_stats.average_payment));
    println!("Highest Payment: {}", format_currency(payment_stats.highest_payment));
    println!("Lowest Payment: {}", format_currency(payment_stats.lowest_payment));

    let period_total = data.get_total_payments_in_period(start, end)?;
    println!("\nPayment Period Analysis:");
    println!("Total payments in period: {}", format_currency(period_total));

    let status = data.get_customers_by_payment_status(now)?;
    println!("\nPayment Status Summary:");
    println!("Current payers: {}", status.current.len());
    println!("Late payers: {}", status.late.len());
    println!("No payments: {}", status.no_payments.len());

    println!("\nDetailed Customer Information with Payments:");
    println!("{}", format_customer_with_payments(customer, now)?);

    Ok(())
}

fn run_stats(data: &CustomerVehicleData, json: bool, now: DateTime<Utc>) -> Result<()> {
    let stats = data.get_statistics(now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Total customers: {}", stats.total_customers);
    println!("Unique makes: {}", stats.unique_makes);
    println!("Unique models: {}", stats.unique_models);
    println!("Unique cities: {}", stats.unique_cities);
    println!("Average days since purchase: {}", stats.average_days_since_purchase);
    println!("Average days since last payment: {}", stats.average_days_since_last_payment);
    println!("Average payment: {}", format_currency(stats.average_payment));

    println!("\nMakes:");
    for (make, count) in &stats.make_distribution {
        println!("  {:<20} {}", make, count);
    }

    println!("\nCities:");
    for (city, count) in &stats.city_distribution {
        println!("  {:<20} {}", city, count);
    }

    Ok(())
}

fn parse_criteria(raw: &[String]) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::new();
    for pair in raw {
        let (field, value) = pair
            .split_once('=')
            .with_context(|| format!("Criterion must be FIELD=VALUE: {:?}", pair))?;
        let field: CustomerField = field.trim().parse()?;
        criteria = criteria.with(field, value);
    }
    Ok(criteria)
}

fn print_list(customers: &[&Customer]) {
    for customer in customers {
        println!(
            "{:>6}  {}",
            customer.id,
            format_name(&customer.first_name, &customer.last_name)
        );
    }
    println!("({} customers)", customers.len());
}
