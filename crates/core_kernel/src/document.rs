//! Human-readable document numbers
//!
//! Invoices, returns and batches carry a `PREFIX-YYYYMMDDHHMMSS-XXXXXX`
//! number alongside their UUID so paper copies stay legible.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Well-known document prefixes.
pub mod prefix {
    pub const SALES_INVOICE: &str = "SAL";
    pub const PURCHASE_INVOICE: &str = "PUR";
    pub const SALES_RETURN: &str = "RET";
    pub const STOCK_TRANSFER: &str = "TRF";
    pub const STOCK_ADJUSTMENT: &str = "ADJ";
    pub const STOCK_BATCH: &str = "BAT";
}

/// Generates a document number for the current instant.
pub fn doc_number(prefix: &str) -> String {
    doc_number_at(prefix, Utc::now())
}

/// Generates a document number for a given instant.
///
/// The suffix comes from a fresh v4 UUID, so two documents generated in the
/// same second still get distinct numbers.
pub fn doc_number_at(prefix: &str, at: DateTime<Utc>) -> String {
    let stamp = at.format("%Y%m%d%H%M%S");
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, stamp, &suffix[..6].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_doc_number_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 9).unwrap();
        let number = doc_number_at(prefix::SALES_INVOICE, at);
        assert!(number.starts_with("SAL-20240305143009-"));
        assert_eq!(number.len(), "SAL-20240305143009-".len() + 6);
    }

    #[test]
    fn test_doc_numbers_are_unique() {
        let a = doc_number(prefix::STOCK_BATCH);
        let b = doc_number(prefix::STOCK_BATCH);
        assert_ne!(a, b);
    }
}
