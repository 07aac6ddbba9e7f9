//! Payload encoding for published transactions.
//!
//! ## Payload contract
//!
//! Downstream consumers receive one JSON object per record:
//!
//! ```text
//! {"refNo":"TX-1","cusip":"037833100","amount":"12.50","tradeDate":"2025-04-22","closeOfBusinessDate":"2025-04-22"}
//! ```
//!
//! - keys are camelCase, in declaration order, `closeOfBusinessDate` last
//! - absent optional fields are omitted (never `null`)
//! - decimals are strings, dates are `YYYY-MM-DD`

use thiserror::Error;

use crate::transaction::PublishedTransaction;

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode transaction {ref_no} as JSON: {source}")]
    Json {
        ref_no: String,
        #[source]
        source: serde_json::Error,
    },

    /// Failure raised by a non-JSON [`RecordSerializer`].
    #[error("failed to encode transaction {ref_no}: {source}")]
    Encoding {
        ref_no: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SerializeError {
    pub fn encoding(
        ref_no: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Encoding {
            ref_no: ref_no.into(),
            source: source.into(),
        }
    }

    pub fn ref_no(&self) -> &str {
        match self {
            SerializeError::Json { ref_no, .. } | SerializeError::Encoding { ref_no, .. } => ref_no,
        }
    }
}

/// Turns a stamped record into the payload string handed to the messaging client.
pub trait RecordSerializer: Send + Sync {
    fn serialize(&self, record: &PublishedTransaction) -> Result<String, SerializeError>;
}

/// Compact JSON encoding (see module docs for the contract).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordSerializer;

impl RecordSerializer for JsonRecordSerializer {
    fn serialize(&self, record: &PublishedTransaction) -> Result<String, SerializeError> {
        serde_json::to_string(record).map_err(|source| SerializeError::Json {
            ref_no: record.ref_no().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::Value as JsonValue;

    fn cob() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 22).unwrap()
    }

    #[test]
    fn minimal_record_has_only_ref_no_and_stamp() {
        let record = PublishedTransaction::stamp(Transaction::new("TX-1").unwrap(), cob());
        let payload = JsonRecordSerializer.serialize(&record).unwrap();

        assert_eq!(payload, r#"{"refNo":"TX-1","closeOfBusinessDate":"2025-04-22"}"#);
    }

    #[test]
    fn full_record_uses_fixed_key_order_and_string_decimals() {
        let tx = Transaction::new("TX-2")
            .unwrap()
            .with_ap_no("AP-7")
            .with_cusip("037833100")
            .with_quantity(Decimal::new(100, 0))
            .with_amount(Decimal::new(1250, 2))
            .with_settlement_date(NaiveDate::from_ymd_opt(2025, 4, 24).unwrap())
            .with_trade_date(NaiveDate::from_ymd_opt(2025, 4, 22).unwrap())
            .with_fmu("FMU-3");
        let payload = JsonRecordSerializer
            .serialize(&PublishedTransaction::stamp(tx, cob()))
            .unwrap();

        assert_eq!(
            payload,
            concat!(
                r#"{"refNo":"TX-2","apNo":"AP-7","cusip":"037833100","quantity":"100","#,
                r#""amount":"12.50","settlementDate":"2025-04-24","tradeDate":"2025-04-22","#,
                r#""fmu":"FMU-3","closeOfBusinessDate":"2025-04-22"}"#
            )
        );
    }

    #[test]
    fn absent_fields_are_omitted_not_null() {
        let tx = Transaction::new("TX-3").unwrap().with_cusip("594918104");
        let payload = JsonRecordSerializer
            .serialize(&PublishedTransaction::stamp(tx, cob()))
            .unwrap();
        let value: JsonValue = serde_json::from_str(&payload).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert!(!object.contains_key("amount"));
        assert!(!object.contains_key("apNo"));
        assert!(object.values().all(|v| !v.is_null()));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let tx = Transaction::new("TX-4").unwrap().with_amount(Decimal::new(-5, 1));
        let record = PublishedTransaction::stamp(tx, cob());

        let first = JsonRecordSerializer.serialize(&record).unwrap();
        let second = JsonRecordSerializer.serialize(&record).unwrap();

        assert_eq!(first, second);
        assert!(first.contains(r#""amount":"-0.5""#));
    }

    #[test]
    fn encoding_error_keeps_ref_no_and_source_message() {
        let err = SerializeError::encoding("TX-6", "field too long for fixed-width layout");

        assert_eq!(err.ref_no(), "TX-6");
        assert_eq!(
            err.to_string(),
            "failed to encode transaction TX-6: field too long for fixed-width layout"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn payload_reads_back_into_the_same_record() {
        let tx = Transaction::new("TX-5").unwrap().with_quantity(Decimal::new(3, 0));
        let record = PublishedTransaction::stamp(tx, cob());
        let payload = JsonRecordSerializer.serialize(&record).unwrap();

        let decoded: PublishedTransaction = serde_json::from_str(&payload).unwrap();
        assert_eq!(decoded, record);
    }
}
