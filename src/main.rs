//! loan-ledger CLI
//!
//! Track repayments against the approved loans from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show loans, installments and what has been paid
//! loan-ledger list
//!
//! # Post a payment of 4280.37 against loan 1
//! loan-ledger pay 1 4280.37
//!
//! # Print the payment-intent URI for an amount
//! loan-ledger intent 4280.37
//!
//! # Month-by-month breakdown of loan 3
//! loan-ledger schedule 3
//! ```

use loan_ledger::{
    FileStore, LedgerConfig, LedgerSession, LoanId, SafeTimeProvider, TimeSource,
};
use std::path::PathBuf;
use std::process;

const DEFAULT_DATA_DIR: &str = ".loan-ledger";

fn print_usage() {
    eprintln!(
        r#"loan-ledger: track repayments against approved loans

USAGE:
    loan-ledger <COMMAND> [OPTIONS]

COMMANDS:
    list                    Show loans, installments and amounts paid
    pay <LOAN_ID> <AMOUNT>  Post a payment and save the ledger
    intent <AMOUNT>         Print a payment-intent URI for the amount
    schedule <LOAN_ID>      Show the amortization schedule of a loan
    help                    Show this message

OPTIONS:
    --data-dir <DIR>        Directory holding the stored ledger (default: {DEFAULT_DATA_DIR})
    --config <FILE>         JSON configuration file
    --format <FORMAT>       Output format: text (default) or json

LOGGING:
    Set RUST_LOG=info (or debug) to see ledger activity on stderr.
"#
    );
}

struct Options {
    data_dir: PathBuf,
    config: Option<PathBuf>,
    json: bool,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        config: None,
        json: false,
        positional: Vec::new(),
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" => {
                i += 1;
                let value = args.get(i).ok_or("--data-dir needs a value")?;
                options.data_dir = PathBuf::from(value);
            }
            "--config" => {
                i += 1;
                let value = args.get(i).ok_or("--config needs a value")?;
                options.config = Some(PathBuf::from(value));
            }
            "--format" => {
                i += 1;
                match args.get(i).map(String::as_str) {
                    Some("json") => options.json = true,
                    Some("text") => options.json = false,
                    other => return Err(format!("unknown format: {:?}", other)),
                }
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option: {}", flag)),
            value => options.positional.push(value.to_string()),
        }
        i += 1;
    }

    Ok(options)
}

fn parse_loan_id(raw: Option<&String>) -> Result<LoanId, String> {
    let raw = raw.ok_or("missing loan id")?;
    raw.parse::<LoanId>()
        .map_err(|_| format!("loan id must be a positive integer, got {:?}", raw))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn run(command: &str, options: Options) -> Result<(), String> {
    let config = match &options.config {
        Some(path) => LedgerConfig::from_file(path).map_err(|e| e.to_string())?,
        None => LedgerConfig::default(),
    };
    let store = FileStore::open(&options.data_dir).map_err(|e| e.to_string())?;
    let time = SafeTimeProvider::new(TimeSource::System);
    let mut session = LedgerSession::open(store, config, &time).map_err(|e| e.to_string())?;

    match command {
        "list" => {
            let ledger = session.ledger();
            if options.json {
                println!("{}", to_json(ledger)?);
                return Ok(());
            }
            println!(
                "{:>4}  {:<16} {:>14} {:>7} {:>7} {:>12} {:>14} {:>14}  {}",
                "ID", "TYPE", "AMOUNT", "RATE", "MONTHS", "INSTALLMENT", "PAID", "OUTSTANDING", "STATUS"
            );
            for loan in ledger.loans() {
                println!(
                    "{:>4}  {:<16} {:>14} {:>7} {:>7} {:>12} {:>14} {:>14}  {:?}",
                    loan.id(),
                    loan.loan_type(),
                    loan.amount(),
                    loan.interest_rate().to_string(),
                    loan.tenure_months(),
                    loan.installment(),
                    loan.paid(),
                    loan.outstanding(),
                    loan.status(),
                );
            }
            println!();
            println!("Total paid:        {}", ledger.total_paid());
            println!("Total outstanding: {}", ledger.total_outstanding());
        }
        "pay" => {
            let loan_id = parse_loan_id(options.positional.first())?;
            let amount = options.positional.get(1).ok_or("missing amount")?;
            let receipt = session.pay(loan_id, amount).map_err(|e| e.to_string())?;
            if options.json {
                println!("{}", to_json(&receipt)?);
            } else {
                println!("Receipt:     {}", receipt.receipt_id);
                println!("Loan:        {}", receipt.loan_id);
                println!("Amount:      {}", receipt.amount);
                println!("Total paid:  {}", receipt.total_paid);
                println!("Outstanding: {}", receipt.outstanding);
                println!("Status:      {:?}", receipt.status);
            }
        }
        "intent" => {
            let amount = options.positional.first().ok_or("missing amount")?;
            let intent = session.payment_intent(amount).map_err(|e| e.to_string())?;
            if options.json {
                println!("{}", to_json(&intent)?);
            } else {
                println!("{}", intent);
            }
        }
        "schedule" => {
            let loan_id = parse_loan_id(options.positional.first())?;
            let loan = session
                .ledger()
                .get(loan_id)
                .ok_or(format!("unknown loan: {}", loan_id))?;
            let schedule = loan.schedule().map_err(|e| e.to_string())?;

            println!(
                "{} ({}): {} at {} over {} months, installment {}",
                loan.loan_type(),
                loan.id(),
                schedule.principal,
                schedule.interest_rate,
                schedule.tenure_months,
                schedule.installment
            );
            println!(
                "{:>6} {:>14} {:>12} {:>12} {:>12} {:>14}",
                "PERIOD", "OPENING", "PAYMENT", "INTEREST", "PRINCIPAL", "CLOSING"
            );
            for row in &schedule.payments {
                println!(
                    "{:>6} {:>14} {:>12} {:>12} {:>12} {:>14}",
                    row.period,
                    row.opening_balance,
                    row.payment_amount,
                    row.interest_portion,
                    row.principal_portion,
                    row.closing_balance
                );
            }
            println!();
            println!("Total interest: {}", schedule.total_interest);
            println!("Total payment:  {}", schedule.total_payment);
        }
        other => return Err(format!("unknown command: {}", other)),
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().cloned() else {
        print_usage();
        process::exit(1);
    };

    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let options = match parse_options(&args[1..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {}", message);
            print_usage();
            process::exit(2);
        }
    };

    if let Err(message) = run(&command, options) {
        eprintln!("error: {}", message);
        process::exit(1);
    }
}
