use dotenvy::dotenv;
use serde_json::json;
use std::io::{self, BufRead, Write};

use pow_ledger::Ledger;
use pow_ledger::config::Config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();
    let mut ledger = Ledger::new(config.difficulty);
    println!("⛓️ Ledger ready (difficulty {})", ledger.difficulty());

    let mut input = io::stdin().lock();
    let count: usize = prompt(&mut input, "Enter the number of entries to mine: ")?
        .parse()
        .map_err(|_| "expected a non-negative number")?;

    for i in 1..=count {
        println!("\nStaging a record and mining entry {i}...");
        ledger.stage(format!("Data Record {i}"));
        ledger.commit()?;
    }

    println!("\nLedger:");
    print_chain(&ledger);
    println!("\nIs the ledger valid? {}", ledger.is_valid());

    let answer = prompt(
        &mut input,
        &format!("\nEnter the entry index to tamper with (1 to {count}): "),
    )?;
    match answer.parse::<usize>() {
        Ok(k) if (1..=count).contains(&k) => {
            println!("\nTampering with entry {k}...");
            ledger.overwrite_payload(k, vec![json!("Tampered Data Record")])?;
        }
        _ => println!("Invalid block index!"),
    }

    println!("\nLedger after tampering:");
    print_chain(&ledger);

    let report = ledger.validate();
    println!("\nIs the ledger valid after tampering? {}", report.is_valid());
    if let Some(index) = report.failing_index() {
        println!("First failing entry: {index}");
    }
    Ok(())
}

fn prompt(input: &mut impl BufRead, message: &str) -> io::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_chain(ledger: &Ledger) {
    for entry in ledger.entries() {
        println!("{entry}");
    }
}
