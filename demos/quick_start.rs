/// quick start - seed a ledger, post payments, persist and reload
use loan_ledger::{Ledger, LedgerConfig, MemoryStore, Money, PaymentConfig, PaymentIntent};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = LedgerConfig::default();
    let mut store = MemoryStore::new();

    // first run: nothing stored, so the catalog is seeded
    let ledger = Ledger::load(&store, &config)?;
    for loan in ledger.loans() {
        println!("{:<14} installment {} over {} months", loan.loan_type(), loan.installment(), loan.tenure_months());
    }

    // pay the first installment of the personal loan
    let installment = ledger.get(1).ok_or("personal loan missing")?.installment();
    let ledger = ledger.post_payment(1, installment)?;
    ledger.save(&mut store, &config)?;

    let intent = PaymentIntent::new(&PaymentConfig::default(), Money::from_major(500))?;
    println!("\nscan to pay: {}", intent);

    // next run picks up where we left off
    let reloaded = Ledger::load(&store, &config)?;
    let personal = reloaded.get(1).ok_or("personal loan missing")?;
    println!("\npersonal loan paid {} of {} ({:?})", personal.paid(), personal.total_payable(), personal.status());

    Ok(())
}
