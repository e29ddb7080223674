//! lending-ledger CLI
//!
//! Replay lending scripts and inspect interest accrual from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Replay a script of ledger calls
//! lending-ledger replay --input script.json
//!
//! # Output as JSON, and persist the final ledger state
//! lending-ledger replay --input script.json --format json --state-out state.json
//!
//! # Compound a debt of 50.5 tokens for 2 days at 12%
//! lending-ledger quote --debt 50.5 --rate 12 --days 2
//!
//! # Generate a random script for testing
//! lending-ledger generate --accounts 5 --steps 100
//! ```
//!
//! Set `RUST_LOG=lending_ledger=info` to trace every committed call.

use lending_ledger::core::amount::{format_amount, parse_ether};
use lending_ledger::engine::interest::InterestAccrualEngine;
use lending_ledger::engine::report::ReserveReport;
use lending_ledger::simulation::script::{replay, Script};
use lending_ledger::simulation::stress_test::{generate_random_script, ScriptConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"lending-ledger — collateralized lending ledger with daily compounding interest

USAGE:
    lending-ledger <COMMAND> [OPTIONS]

COMMANDS:
    replay      Replay a JSON script of ledger calls
    quote       Compute the repay amount of a debt after whole days
    generate    Generate a random script (for testing)
    help        Show this message

OPTIONS (replay):
    --input <FILE>       Path to JSON script file
    --format <FORMAT>    Output format: text (default) or json
    --state-out <FILE>   Write the final ledger state to a file

OPTIONS (quote):
    --debt <TOKENS>      Debt in whole tokens, decimals allowed (required)
    --rate <PERCENT>     Yearly interest rate (default: 12)
    --days <N>           Whole days elapsed (default: 1)

OPTIONS (generate):
    --accounts <N>       Number of vault accounts (default: 5)
    --steps <N>          Number of steps (default: 50)
    --output <FILE>      Write to file instead of stdout

EXAMPLES:
    lending-ledger replay --input script.json
    lending-ledger replay --input script.json --format json --state-out state.json
    lending-ledger quote --debt 50.5 --rate 12 --days 2
    lending-ledger generate --accounts 10 --steps 200 --output script.json"#
    );
}

fn next_value(args: &[String], i: usize, flag: &str, expected: &str) -> String {
    args.get(i).cloned().unwrap_or_else(|| {
        eprintln!("{} requires {}", flag, expected);
        process::exit(1);
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    value.parse().unwrap_or_else(|_| {
        eprintln!("{} requires a number, got '{}'", flag, value);
        process::exit(1);
    })
}

fn load_script(path: &str) -> Script {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    Script::from_json(&content).unwrap_or_else(|e| {
        eprintln!("Error loading script: {}", e);
        eprintln!("Expected format:");
        eprintln!(r#"{{
  "config": {{ "interest_rate_percent": 12, "origination_fee_percent": 1,
              "collateralization_ratio_percent": 150, "liquidation_penalty_percent": 25 }},
  "owner": "owner",
  "steps": [
    {{ "caller": "owner", "op": "reserve_deposit", "amount": "100000000000000000000" }},
    {{ "caller": "alice", "op": "vault_deposit", "amount": "100000000000000000000" }},
    {{ "caller": "alice", "op": "vault_borrow", "amount": "50000000000000000000" }},
    {{ "caller": "alice", "op": "repay_in_full", "advance_seconds": 172810 }}
  ]
}}"#);
        process::exit(1);
    })
}

fn write_output(path: &str, content: &str) {
    fs::write(path, content).unwrap_or_else(|e| {
        eprintln!("Error writing to '{}': {}", path, e);
        process::exit(1);
    });
}

fn cmd_replay(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut state_out: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(next_value(args, i, "--input", "a file path"));
            }
            "--format" => {
                i += 1;
                format = next_value(args, i, "--format", "'text' or 'json'");
            }
            "--state-out" => {
                i += 1;
                state_out = Some(next_value(args, i, "--state-out", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let script = load_script(&path);
    let result = replay(&script).unwrap_or_else(|e| {
        eprintln!("Error replaying script: {}", e);
        process::exit(1);
    });
    log::info!(
        "replayed {} steps, {} rejected",
        result.outcomes.len(),
        result.failures().count()
    );

    if format == "json" {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing replay: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}", result);

        let end = script.end().unwrap_or_else(|e| {
            eprintln!("Error replaying script: {}", e);
            process::exit(1);
        });
        println!("{}", ReserveReport::from_state(&result.final_state, end));
    }

    if let Some(out) = state_out {
        match result.final_state.to_json() {
            Ok(json) => write_output(&out, &json),
            Err(e) => {
                eprintln!("Error serializing state: {}", e);
                process::exit(1);
            }
        }
        eprintln!("Final state written to {}", out);
    }
}

fn cmd_quote(args: &[String]) {
    let mut debt = None;
    let mut rate = 12u32;
    let mut days = 1u64;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--debt" => {
                i += 1;
                let raw = next_value(args, i, "--debt", "a token amount");
                debt = Some(parse_ether(&raw).unwrap_or_else(|| {
                    eprintln!("Invalid debt amount '{}'", raw);
                    process::exit(1);
                }));
            }
            "--rate" => {
                i += 1;
                rate = parse_number(&next_value(args, i, "--rate", "a percentage"), "--rate");
            }
            "--days" => {
                i += 1;
                days = parse_number(&next_value(args, i, "--days", "a number of days"), "--days");
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let debt = debt.unwrap_or_else(|| {
        eprintln!("Error: --debt <TOKENS> is required");
        process::exit(1);
    });

    match InterestAccrualEngine::compound(debt, rate, days) {
        Ok(owed) => {
            println!("Debt:       {} ({} units)", format_amount(debt), debt);
            println!("Rate:       {}% yearly, compounded daily", rate);
            println!("Days:       {}", days);
            println!("Repay:      {} ({} units)", format_amount(owed), owed);
            println!("Interest:   {}", format_amount(owed - debt));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = ScriptConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--accounts" => {
                i += 1;
                config.account_count =
                    parse_number(&next_value(args, i, "--accounts", "a number"), "--accounts");
            }
            "--steps" => {
                i += 1;
                config.step_count = parse_number(&next_value(args, i, "--steps", "a number"), "--steps");
            }
            "--output" => {
                i += 1;
                output_path = Some(next_value(args, i, "--output", "a file path"));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let script = generate_random_script(&config);
    let json = serde_json::to_string_pretty(&script).unwrap_or_else(|e| {
        eprintln!("Error serializing script: {}", e);
        process::exit(1);
    });

    if let Some(path) = output_path {
        write_output(&path, &json);
        eprintln!(
            "Generated {} steps across {} accounts → {}",
            script.steps.len(),
            config.account_count,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "replay" => cmd_replay(rest),
        "quote" => cmd_quote(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
