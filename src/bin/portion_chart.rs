//! Print a chart of daily portions across the weight range
//! Usage: cargo run --bin portion_chart -- [age_weeks] [step_lbs]

use dfc::config;
use dfc::portions::parse_positive;
use dfc::tools::calculator::MEALS_PER_DAY;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let age_weeks = args.get(1).and_then(|s| parse_positive(s)).unwrap_or(9.0);
    let step = args.get(2).and_then(|s| parse_positive(s)).unwrap_or(5.0);

    let (tables, source) = config::load_tables()?;
    let max_weight = tables
        .kibble_weight_range()
        .map_or(tables.max_raw_weight(), |(_, max)| max.max(tables.max_raw_weight()));

    let sample = tables.estimate(step, age_weeks);
    println!("Tables: {}", source);
    println!(
        "Age: {} weeks ({}, kibble band {})",
        age_weeks, sample.life_stage, sample.age_band
    );
    println!();
    println!(
        "{:>8}  {:>10}  {:>10}  {:>10}  {:>10}",
        "lbs", "raw g/day", "kibble g", "raw/meal", "kibble/meal"
    );

    let meals = f64::from(MEALS_PER_DAY);
    let mut weight = step;
    while weight <= max_weight + step {
        let est = tables.estimate(weight, age_weeks);
        if !est.has_portion() {
            println!("{:>8.1}  outside the tables", weight);
            break;
        }
        println!(
            "{:>8.1}  {:>10.0}  {:>10.0}  {:>10.0}  {:>10.0}",
            weight,
            est.raw_food_grams,
            est.kibble_grams,
            est.raw_food_grams / meals,
            est.kibble_grams / meals
        );
        weight += step;
    }

    Ok(())
}
