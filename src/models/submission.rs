use rust_decimal::Decimal;
use serde_json::Value;

use super::discrepancy::DiscrepancyType;

/// A received-quantity field as entered by staff. Blank is meaningful: the
/// line has not been counted this round and stays pending. Zero is a real
/// count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityField {
    Blank,
    Value(i32),
}

impl QuantityField {
    /// Parses the loose client encoding: absent, null, empty and
    /// non-numeric strings are all blank; numbers and numeric strings are
    /// counts. Negative counts are rejected outright.
    pub fn parse(raw: Option<&Value>) -> Result<Self, String> {
        let value = match raw {
            None | Some(Value::Null) => return Ok(QuantityField::Blank),
            Some(v) => v,
        };

        let parsed = match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| format!("quantity is not an integer: {}", n))?,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(QuantityField::Blank);
                }
                match trimmed.parse::<i64>() {
                    Ok(n) => n,
                    // Legacy front ends sometimes post stray text; treat it
                    // as not-yet-counted rather than failing the batch.
                    Err(_) => return Ok(QuantityField::Blank),
                }
            }
            other => return Err(format!("quantity has unsupported type: {}", other)),
        };

        if parsed < 0 {
            return Err(format!("quantity cannot be negative: {}", parsed));
        }
        i32::try_from(parsed)
            .map(QuantityField::Value)
            .map_err(|_| format!("quantity out of range: {}", parsed))
    }

    pub fn value(&self) -> Option<i32> {
        match self {
            QuantityField::Blank => None,
            QuantityField::Value(n) => Some(*n),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, QuantityField::Blank)
    }
}

/// Parses the legacy readonly flag once at the boundary. The old client sent
/// `false`, `'false'`, `0` and `'0'` for editable rows; absent means
/// editable. Anything outside the known encodings is an input error, not a
/// guess.
pub fn parse_readonly_flag(raw: Option<&Value>) -> Result<bool, String> {
    match raw {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(format!("unrecognized readonly flag: {}", n)),
        },
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "false" | "0" | "" => Ok(false),
            "true" | "1" => Ok(true),
            other => Err(format!("unrecognized readonly flag: {:?}", other)),
        },
        Some(other) => Err(format!("unrecognized readonly flag: {}", other)),
    }
}

/// One fully-parsed line of a receive submission.
#[derive(Debug, Clone)]
pub struct SubmittedLine {
    pub product_id: String,
    pub received: QuantityField,
    pub slip_qty: Option<i32>,
    pub damaged_qty: i32,
    pub discrepancy: DiscrepancyType,
    pub unit_cost: Option<Decimal>,
    pub note: Option<String>,
    pub substitution_product_id: Option<String>,
    pub readonly: bool,
}

/// Running totals over one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
pub struct ReceiveStats {
    pub lines: u32,
    pub ordered: i64,
    pub slip: i64,
    pub received: i64,
    pub damaged: i64,
    pub issues: u32,
}

impl ReceiveStats {
    pub fn record_line(
        &mut self,
        ordered: i32,
        slip: Option<i32>,
        received: i32,
        damaged: i32,
    ) {
        self.lines += 1;
        self.ordered += i64::from(ordered);
        self.slip += i64::from(slip.unwrap_or(0));
        self.received += i64::from(received);
        self.damaged += i64::from(damaged);
    }

    pub fn record_issue(&mut self) {
        self.issues += 1;
    }

    /// Diagnostic completion-confidence score, 0..=100. Not authoritative:
    /// the completion decision is the accounted-lines count, never this.
    pub fn confidence(&self) -> u8 {
        if self.lines == 0 {
            return 0;
        }
        let ok = f64::from(self.lines - self.issues.min(self.lines));
        let raw = (ok / f64::from(self.lines)) * 100.0 - f64::from(self.issues) * 4.0;
        raw.round().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_quantity_forms() {
        for raw in [None, Some(json!(null)), Some(json!("")), Some(json!("  "))] {
            assert_eq!(
                QuantityField::parse(raw.as_ref()).unwrap(),
                QuantityField::Blank
            );
        }
    }

    #[test]
    fn non_numeric_string_is_pending_not_error() {
        assert_eq!(
            QuantityField::parse(Some(&json!("abc"))).unwrap(),
            QuantityField::Blank
        );
    }

    #[test]
    fn numeric_forms_parse() {
        assert_eq!(
            QuantityField::parse(Some(&json!(7))).unwrap(),
            QuantityField::Value(7)
        );
        assert_eq!(
            QuantityField::parse(Some(&json!("12"))).unwrap(),
            QuantityField::Value(12)
        );
        assert_eq!(
            QuantityField::parse(Some(&json!("0"))).unwrap(),
            QuantityField::Value(0)
        );
    }

    #[test]
    fn negative_quantity_rejected() {
        assert!(QuantityField::parse(Some(&json!(-1))).is_err());
        assert!(QuantityField::parse(Some(&json!("-3"))).is_err());
    }

    #[test]
    fn zero_is_a_count_not_blank() {
        assert!(!QuantityField::Value(0).is_blank());
        assert_eq!(QuantityField::Value(0).value(), Some(0));
    }

    #[test]
    fn readonly_legacy_falsy_forms() {
        for raw in [
            Some(json!(false)),
            Some(json!("false")),
            Some(json!(0)),
            Some(json!("0")),
            Some(json!(null)),
            None,
        ] {
            assert_eq!(parse_readonly_flag(raw.as_ref()).unwrap(), false);
        }
    }

    #[test]
    fn readonly_truthy_forms() {
        for raw in [json!(true), json!("true"), json!(1), json!("1"), json!("TRUE")] {
            assert_eq!(parse_readonly_flag(Some(&raw)).unwrap(), true);
        }
    }

    #[test]
    fn readonly_garbage_is_an_error() {
        assert!(parse_readonly_flag(Some(&json!("yes"))).is_err());
        assert!(parse_readonly_flag(Some(&json!(2))).is_err());
        assert!(parse_readonly_flag(Some(&json!([]))).is_err());
    }

    #[test]
    fn confidence_formula() {
        let mut stats = ReceiveStats::default();
        assert_eq!(stats.confidence(), 0);

        stats.record_line(10, None, 10, 0);
        stats.record_line(5, None, 5, 0);
        stats.record_line(8, None, 6, 0);
        stats.record_issue();
        // round((2/3)*100 - 4) = round(62.67) = 63
        assert_eq!(stats.confidence(), 63);
    }

    #[test]
    fn confidence_clamps_to_zero() {
        let mut stats = ReceiveStats::default();
        for _ in 0..4 {
            stats.record_line(1, None, 0, 0);
            stats.record_issue();
        }
        // all lines are issues: 0*100 - 16 clamps at 0
        assert_eq!(stats.confidence(), 0);
    }

    #[test]
    fn confidence_perfect_run() {
        let mut stats = ReceiveStats::default();
        stats.record_line(10, Some(10), 10, 0);
        stats.record_line(5, Some(5), 5, 0);
        assert_eq!(stats.confidence(), 100);
    }
}
