//! Input handling for the `tradefeed-publisher` binary.

use std::io::BufRead;

use tracing::warn;

use tradefeed_transactions::Transaction;

/// Result of reading a JSON-lines batch.
#[derive(Debug, Default)]
pub struct ParsedInput {
    pub transactions: Vec<Transaction>,
    /// Lines that were neither blank nor a valid transaction.
    pub rejected: usize,
}

/// Read one JSON transaction per line. Blank lines are ignored; malformed
/// lines are logged and counted, never fatal.
pub fn read_transactions<R: BufRead>(reader: R) -> std::io::Result<ParsedInput> {
    let mut input = ParsedInput::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed = serde_json::from_str::<Transaction>(&line)
            .map_err(|e| e.to_string())
            .and_then(|tx| tx.validate().map(|()| tx).map_err(|e| e.to_string()));

        match parsed {
            Ok(tx) => input.transactions.push(tx),
            Err(error) => {
                warn!(line = idx + 1, %error, "skipping malformed transaction");
                input.rejected += 1;
            }
        }
    }

    Ok(input)
}
