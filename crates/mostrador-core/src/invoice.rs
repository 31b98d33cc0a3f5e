//! Invoice numbers: `FACT-<year>-<6-digit sequence>`.
//!
//! The sequence restarts at 1 every local calendar year. Assigning the next
//! number is the database's job (a per-year counter bumped inside the sale
//! transaction); this module only formats and parses.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Prefix shared by every invoice number.
pub const INVOICE_PREFIX: &str = "FACT";

/// Highest sequence that still fits the six-digit field.
pub const MAX_SEQUENCE: u32 = 999_999;

/// A parsed invoice number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvoiceNumber {
    pub year: i32,
    pub sequence: u32,
}

impl InvoiceNumber {
    /// Builds an invoice number, rejecting sequences outside `1..=999_999`.
    pub fn new(year: i32, sequence: u32) -> Result<Self, ValidationError> {
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(ValidationError::OutOfRange {
                field: "invoiceSequence".to_string(),
                min: 1,
                max: i64::from(MAX_SEQUENCE),
            });
        }
        Ok(InvoiceNumber { year, sequence })
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{:06}", INVOICE_PREFIX, self.year, self.sequence)
    }
}

impl FromStr for InvoiceNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "invoiceNumber".to_string(),
            reason: reason.to_string(),
        };

        let mut parts = s.trim().splitn(3, '-');
        let (prefix, year, seq) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(y), Some(s)) => (p, y, s),
            _ => return Err(invalid("expected FACT-<year>-<sequence>")),
        };

        if prefix != INVOICE_PREFIX {
            return Err(invalid("must start with FACT"));
        }
        if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("year must be four digits"));
        }
        if seq.len() != 6 || !seq.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("sequence must be six digits"));
        }

        let year = year.parse().map_err(|_| invalid("year is not a number"))?;
        let sequence = seq.parse().map_err(|_| invalid("sequence is not a number"))?;
        InvoiceNumber::new(year, sequence)
    }
}

/// Formats `FACT-<year>-<sequence>` without range checks.
pub fn format_invoice_number(year: i32, sequence: u32) -> String {
    InvoiceNumber { year, sequence }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_sequence() {
        assert_eq!(format_invoice_number(2026, 1), "FACT-2026-000001");
        assert_eq!(format_invoice_number(2026, 123_456), "FACT-2026-123456");
    }

    #[test]
    fn test_parse() {
        let number: InvoiceNumber = "FACT-2026-000042".parse().unwrap();
        assert_eq!(number, InvoiceNumber { year: 2026, sequence: 42 });
        assert_eq!(number.to_string(), "FACT-2026-000042");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "FACT-2026", "FAC-2026-000001", "FACT-26-000001", "FACT-2026-1", "FACT-2026-00000a", "FACT-2026-000000"] {
            assert!(bad.parse::<InvoiceNumber>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_ordering_follows_year_then_sequence() {
        let a = InvoiceNumber::new(2025, 999_999).unwrap();
        let b = InvoiceNumber::new(2026, 1).unwrap();
        assert!(a < b);
    }
}
