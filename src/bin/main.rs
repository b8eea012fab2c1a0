// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use wallet_ledger_rs::service::{
    CreateBalance, CreateCard, CreateTopUp, CreateTransfer, CreateUser, CreateWithdrawal,
};
use wallet_ledger_rs::{Ledger, LedgerConfig, LedgerError, UserId};

/// Wallet Ledger - Replay wallet operation CSV files
///
/// Reads operations from a CSV file and outputs balance states to stdout.
/// Supports balance openings, top-ups, withdrawals, and transfers.
#[derive(Parser, Debug)]
#[command(name = "wallet-ledger-rs")]
#[command(about = "A wallet ledger that replays operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: type,user,counterparty,amount,method
    /// Example: cargo run -- operations.csv > balances.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Smallest accepted top-up amount, currency minor units
    #[arg(long, default_value_t = 50_000)]
    topup_min: i64,

    /// Largest accepted top-up amount, currency minor units
    #[arg(long, default_value_t = 10_000_000)]
    topup_max: i64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let config = LedgerConfig {
        topup_min: args.topup_min,
        topup_max: args.topup_max,
    };
    let ledger = match replay_operations(BufReader::new(file), config) {
        Ok(ledger) => ledger,
        Err(e) => {
            eprintln!("Error replaying operations: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = write_balances(&ledger, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, user, counterparty, amount, method`
#[derive(Debug, serde::Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    op: String,
    user: u32,
    #[serde(deserialize_with = "csv::invalid_option")]
    counterparty: Option<u32>,
    amount: i64,
    #[serde(default)]
    method: String,
}

/// Balance row written to stdout.
#[derive(Debug, serde::Serialize)]
struct BalanceRow {
    user: u32,
    card: String,
    total: i64,
    last_withdrawal: i64,
}

/// Maps CSV user references to provisioned ledger users.
///
/// The first `balance` row for a reference registers a user and issues a
/// card; later rows reuse the mapping.
struct Provisioner {
    users: HashMap<u32, UserId>,
}

impl Provisioner {
    fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    fn provision(&mut self, ledger: &Ledger, user_ref: u32) -> Result<UserId, LedgerError> {
        if let Some(&id) = self.users.get(&user_ref) {
            return Ok(id);
        }
        let user = ledger.users.create(CreateUser {
            name: format!("user-{user_ref}"),
            email: format!("user-{user_ref}@wallet.local"),
        })?;
        ledger.cards.create(CreateCard {
            user_id: user.id,
            card_number: format!("card-{user_ref}"),
            card_type: "debit".into(),
            expire_date: chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            provider: "replay".into(),
        })?;
        self.users.insert(user_ref, user.id);
        Ok(user.id)
    }

    fn resolve(&self, user_ref: u32) -> Result<UserId, LedgerError> {
        self.users.get(&user_ref).copied().ok_or(LedgerError::NotFound)
    }
}

/// Replay operations from a CSV reader against a fresh ledger.
///
/// Malformed rows and failed operations are skipped; failures are logged so
/// a replay of a partially-bad file still produces the balances of the
/// committed operations.
///
/// # CSV Format
///
/// Expected columns: `type, user, counterparty, amount, method`
/// - `type`: Operation (balance, topup, withdrawal, transfer)
/// - `user`: Acting user reference
/// - `counterparty`: Receiver reference (transfers only)
/// - `amount`: Amount in currency minor units
/// - `method`: Funding method (top-ups only)
///
/// # Example
///
/// ```csv
/// type,user,counterparty,amount,method
/// balance,1,,200000,
/// topup,1,,60000,bank_transfer
/// withdrawal,1,,25000,
/// ```
pub fn replay_operations<R: Read>(reader: R, config: LedgerConfig) -> Result<Ledger, csv::Error> {
    let ledger = Ledger::new(config);
    let mut provisioner = Provisioner::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row, error = %e, "skipping malformed row");
                continue;
            }
        };
        if let Err(e) = apply_operation(&ledger, &mut provisioner, row, &record) {
            tracing::warn!(row, op = %record.op, error = %e, "skipping failed operation");
        }
    }

    Ok(ledger)
}

fn apply_operation(
    ledger: &Ledger,
    provisioner: &mut Provisioner,
    row: usize,
    record: &CsvRecord,
) -> Result<(), LedgerError> {
    match record.op.to_lowercase().as_str() {
        "balance" => {
            let user_id = provisioner.provision(ledger, record.user)?;
            let card = ledger.cards.find_by_user_id(user_id)?;
            ledger.balances.create(CreateBalance {
                card_id: card.id,
                total: record.amount,
            })?;
        }
        "topup" => {
            let user_id = provisioner.resolve(record.user)?;
            ledger.topups.create(CreateTopUp {
                user_id,
                topup_no: format!("REPLAY-{row}"),
                amount: record.amount,
                method: record.method.clone(),
            })?;
        }
        "withdrawal" => {
            let user_id = provisioner.resolve(record.user)?;
            ledger.withdrawals.create(CreateWithdrawal {
                user_id,
                amount: record.amount,
            })?;
        }
        "transfer" => {
            let sender_id = provisioner.resolve(record.user)?;
            let receiver_ref = record
                .counterparty
                .ok_or(LedgerError::Validation("transfer requires a counterparty"))?;
            let receiver_id = provisioner.resolve(receiver_ref)?;
            ledger.transfers.create(CreateTransfer {
                sender_id,
                receiver_id,
                amount: record.amount,
            })?;
        }
        _ => return Err(LedgerError::Validation("unrecognized operation type")),
    }
    Ok(())
}

/// Write balance states to a CSV writer.
///
/// # CSV Format
///
/// Columns: `user, card, total, last_withdrawal`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_balances<W: Write>(ledger: &Ledger, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    let balances = ledger.balances.find_all().unwrap_or_default();
    for balance in balances {
        let card = ledger
            .cards
            .find_by_id(balance.card_id)
            .map(|c| c.card_number)
            .unwrap_or_default();
        wtr.serialize(BalanceRow {
            user: balance.user_id.0,
            card,
            total: balance.total,
            last_withdrawal: balance.withdraw_amount,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
