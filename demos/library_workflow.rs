//! Rule library example
//!
//! This example demonstrates:
//! - Scanning a directory of rule sets with RulesLibrary
//! - Resolving an entry rule set together with its dependencies
//! - Running untyped JSON contexts with host functions

use serde_json::json;
use std::collections::HashMap;
use yabre_repository::{LibrarySettings, RulesLibrary};
use yabre_sdk::{Runner, RunnerBuilder};

const LIBRARY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/rules/library");

fn main() -> anyhow::Result<()> {
    yabre_demos::init_tracing()?;

    println!("=== Rule Library Example ===\n");

    let library = RulesLibrary::new(LibrarySettings::new().with_base_path(LIBRARY))?;

    println!("Rule sets:");
    let mut names: Vec<_> = library.rule_names_and_paths().iter().collect();
    names.sort();
    for (name, path) in names {
        println!("  {} ({})", name, path);
    }
    println!(
        "Resolution order for order-fulfilment: {:?}\n",
        library.resolve_dependencies("order-fulfilment")?
    );

    let stock: HashMap<&str, i64> = HashMap::from([("mug", 12), ("poster", 0), ("tee", 3)]);

    let runner: Runner<serde_json::Value> = RunnerBuilder::new()
        .with_library(&library, "order-fulfilment")
        .with_function("stock_level", move |sku: String| {
            stock.get(sku.as_str()).copied().unwrap_or(0)
        })
        .with_function("shipping_cost", |country: String| match country.as_str() {
            "US" => 4.99,
            _ => 12.5,
        })
        .build()?;

    let orders = vec![
        json!({"id": 1, "payment": "captured", "country": "US",
               "lines": [{"sku": "mug", "price": 9.5, "quantity": 2}]}),
        json!({"id": 2, "payment": "captured", "country": "DE",
               "lines": [{"sku": "tee", "price": 25.0, "quantity": 2}]}),
        json!({"id": 3, "payment": "captured", "country": "US",
               "lines": [{"sku": "poster", "price": 15.0, "quantity": 1}]}),
        json!({"id": 4, "payment": "pending", "country": "US", "lines": []}),
    ];

    for mut order in orders {
        runner.run(&mut order, None)?;
        println!("{}", serde_json::to_string_pretty(&order)?);
    }

    Ok(())
}
