use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradefeed_core::{DomainError, DomainResult};

use crate::calendar::format_business_date;

/// A raw financial transaction, before it is stamped for publication.
///
/// Only `ref_no` is mandatory. Every other field may legitimately be unknown
/// and is modelled as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub ref_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ap_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cusip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmu: Option<String>,
}

impl Transaction {
    /// Create a transaction with every optional field absent.
    pub fn new(ref_no: impl Into<String>) -> DomainResult<Self> {
        let tx = Self {
            ref_no: ref_no.into(),
            ap_no: None,
            cusip: None,
            quantity: None,
            amount: None,
            settlement_date: None,
            trade_date: None,
            fmu: None,
        };
        tx.validate()?;
        Ok(tx)
    }

    /// Check invariants that serde cannot express (used after deserializing).
    pub fn validate(&self) -> DomainResult<()> {
        if self.ref_no.trim().is_empty() {
            return Err(DomainError::validation("ref_no must not be blank"));
        }
        Ok(())
    }

    pub fn with_ap_no(mut self, ap_no: impl Into<String>) -> Self {
        self.ap_no = Some(ap_no.into());
        self
    }

    pub fn with_cusip(mut self, cusip: impl Into<String>) -> Self {
        self.cusip = Some(cusip.into());
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_settlement_date(mut self, date: NaiveDate) -> Self {
        self.settlement_date = Some(date);
        self
    }

    pub fn with_trade_date(mut self, date: NaiveDate) -> Self {
        self.trade_date = Some(date);
        self
    }

    pub fn with_fmu(mut self, fmu: impl Into<String>) -> Self {
        self.fmu = Some(fmu.into());
        self
    }
}

/// A transaction stamped with the close of business date it is published under.
///
/// The stamp is computed at publish time and lives only here; publishing the
/// same [`Transaction`] on different days yields different stamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedTransaction {
    #[serde(flatten)]
    transaction: Transaction,
    close_of_business_date: String,
}

impl PublishedTransaction {
    pub fn stamp(transaction: Transaction, close_of_business: NaiveDate) -> Self {
        Self {
            transaction,
            close_of_business_date: format_business_date(close_of_business),
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn ref_no(&self) -> &str {
        &self.transaction.ref_no
    }

    /// `YYYY-MM-DD`.
    pub fn close_of_business_date(&self) -> &str {
        &self.close_of_business_date
    }

    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_rejects_blank_ref_no() {
        assert!(matches!(Transaction::new(""), Err(DomainError::Validation(_))));
        assert!(matches!(Transaction::new("   "), Err(DomainError::Validation(_))));
        assert!(Transaction::new("TX-1").is_ok());
    }

    #[test]
    fn builder_sets_only_requested_fields() {
        let tx = Transaction::new("TX-1")
            .unwrap()
            .with_cusip("037833100")
            .with_amount(Decimal::new(1250, 2));

        assert_eq!(tx.cusip.as_deref(), Some("037833100"));
        assert_eq!(tx.amount, Some(Decimal::new(1250, 2)));
        assert_eq!(tx.ap_no, None);
        assert_eq!(tx.quantity, None);
        assert_eq!(tx.fmu, None);
    }

    #[test]
    fn stamp_keeps_transaction_and_formats_date() {
        let tx = Transaction::new("TX-2").unwrap().with_fmu("FMU-9");
        let published = PublishedTransaction::stamp(tx.clone(), date(2025, 4, 22));

        assert_eq!(published.ref_no(), "TX-2");
        assert_eq!(published.close_of_business_date(), "2025-04-22");
        assert_eq!(published.transaction(), &tx);
        assert_eq!(published.into_transaction(), tx);
    }

    #[test]
    fn deserializes_minimal_record_with_absent_fields() {
        let tx: Transaction = serde_json::from_str(r#"{"refNo":"TX-3"}"#).unwrap();

        assert_eq!(tx, Transaction::new("TX-3").unwrap());
    }

    #[test]
    fn deserializes_full_record() {
        let tx: Transaction = serde_json::from_str(
            r#"{
                "refNo": "TX-4",
                "apNo": "AP-1",
                "cusip": "594918104",
                "quantity": "100",
                "amount": "4210.75",
                "settlementDate": "2025-04-24",
                "tradeDate": "2025-04-22",
                "fmu": "FMU-1"
            }"#,
        )
        .unwrap();

        assert_eq!(tx.ap_no.as_deref(), Some("AP-1"));
        assert_eq!(tx.quantity, Some(Decimal::new(100, 0)));
        assert_eq!(tx.amount, Some(Decimal::new(421075, 2)));
        assert_eq!(tx.settlement_date, Some(date(2025, 4, 24)));
        assert_eq!(tx.trade_date, Some(date(2025, 4, 22)));
    }
}
