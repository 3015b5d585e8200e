use serde::{Deserialize, Serialize};

/// Staff-declared classification of why received differs from ordered.
/// Wire strings match the legacy receiving front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum DiscrepancyType {
    #[default]
    Ok,
    SentLow,
    Missing,
    SentHigh,
    Unordered,
    Damaged,
    Substituted,
    Expired,
    NotCompliant,
}

impl DiscrepancyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyType::Ok => "OK",
            DiscrepancyType::SentLow => "SENT_LOW",
            DiscrepancyType::Missing => "MISSING",
            DiscrepancyType::SentHigh => "SENT_HIGH",
            DiscrepancyType::Unordered => "UNORDERED",
            DiscrepancyType::Damaged => "DAMAGED",
            DiscrepancyType::Substituted => "SUBSTITUTED",
            DiscrepancyType::Expired => "EXPIRED",
            DiscrepancyType::NotCompliant => "NOT_COMPLIANT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "OK" | "" => Some(DiscrepancyType::Ok),
            "SENT_LOW" => Some(DiscrepancyType::SentLow),
            "MISSING" => Some(DiscrepancyType::Missing),
            "SENT_HIGH" => Some(DiscrepancyType::SentHigh),
            "UNORDERED" => Some(DiscrepancyType::Unordered),
            "DAMAGED" => Some(DiscrepancyType::Damaged),
            "SUBSTITUTED" => Some(DiscrepancyType::Substituted),
            "EXPIRED" => Some(DiscrepancyType::Expired),
            "NOT_COMPLIANT" => Some(DiscrepancyType::NotCompliant),
            _ => None,
        }
    }
}

impl TryFrom<String> for DiscrepancyType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DiscrepancyType::parse(&value)
            .ok_or_else(|| format!("unknown discrepancy type: {}", value))
    }
}

impl From<DiscrepancyType> for String {
    fn from(value: DiscrepancyType) -> Self {
        value.as_str().to_string()
    }
}

/// Signed quantity delta for one line, plus the claim quantity derived from
/// it. Positive delta = overage, negative = shortage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDelta {
    pub case_type: DiscrepancyType,
    pub delta_qty: i32,
    pub claim_qty: i32,
}

/// Classifies one line's quantities against its declared discrepancy type.
///
/// Returns `None` for `OK`: no case and no claim line are produced even when
/// actual differs from ordered. Selecting OK suppresses over/under detection.
/// This reproduces the legacy behavior exactly and stays until the product
/// owner rules on it; do not "fix" it here.
pub fn classify(
    ordered: i32,
    received: Option<i32>,
    damaged: i32,
    declared: DiscrepancyType,
) -> Option<CaseDelta> {
    let actual = received.unwrap_or(0) + damaged;

    let delta_qty = match declared {
        DiscrepancyType::Ok => return None,
        DiscrepancyType::SentLow
        | DiscrepancyType::Missing
        | DiscrepancyType::SentHigh
        | DiscrepancyType::Unordered => actual - ordered,
        DiscrepancyType::Damaged => -damaged,
        DiscrepancyType::Substituted
        | DiscrepancyType::Expired
        | DiscrepancyType::NotCompliant => 0,
    };

    let mut claim_qty = delta_qty.abs().max(0);
    if declared == DiscrepancyType::Missing {
        // A missing-item claim always claims at least one unit.
        claim_qty = claim_qty.max(1);
    }

    Some(CaseDelta {
        case_type: declared,
        delta_qty,
        claim_qty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(DiscrepancyType::SentLow, 10, Some(6), 0, -4, 4; "sent low shortage")]
    #[test_case(DiscrepancyType::SentLow, 10, Some(10), 0, 0, 0; "sent low even")]
    #[test_case(DiscrepancyType::SentHigh, 10, Some(13), 0, 3, 3; "sent high overage")]
    #[test_case(DiscrepancyType::Unordered, 0, Some(2), 0, 2, 2; "unordered arrival")]
    #[test_case(DiscrepancyType::Missing, 5, Some(5), 0, 0, 1; "missing floors claim at one")]
    #[test_case(DiscrepancyType::Missing, 5, Some(2), 0, -3, 3; "missing with shortage")]
    #[test_case(DiscrepancyType::Damaged, 10, Some(8), 2, -2, 2; "damaged counts against")]
    #[test_case(DiscrepancyType::Substituted, 10, Some(4), 0, 0, 0; "substituted manual review")]
    #[test_case(DiscrepancyType::Expired, 6, Some(6), 0, 0, 0; "expired manual review")]
    #[test_case(DiscrepancyType::NotCompliant, 6, Some(6), 0, 0, 0; "not compliant manual review")]
    fn delta_table(
        declared: DiscrepancyType,
        ordered: i32,
        received: Option<i32>,
        damaged: i32,
        expect_delta: i32,
        expect_claim: i32,
    ) {
        let case = classify(ordered, received, damaged, declared).expect("case expected");
        assert_eq!(case.delta_qty, expect_delta);
        assert_eq!(case.claim_qty, expect_claim);
        assert_eq!(case.case_type, declared);
    }

    #[test]
    fn ok_suppresses_case_even_on_mismatch() {
        assert_eq!(classify(10, Some(3), 0, DiscrepancyType::Ok), None);
        assert_eq!(classify(10, None, 0, DiscrepancyType::Ok), None);
    }

    #[test]
    fn damaged_units_count_toward_actual_for_shortage() {
        // 7 good + 3 damaged against 10 ordered: nothing short.
        let case = classify(10, Some(7), 3, DiscrepancyType::SentLow).unwrap();
        assert_eq!(case.delta_qty, 0);
        assert_eq!(case.claim_qty, 0);
    }

    #[test]
    fn blank_received_treated_as_zero() {
        let case = classify(4, None, 0, DiscrepancyType::Missing).unwrap();
        assert_eq!(case.delta_qty, -4);
        assert_eq!(case.claim_qty, 4);
    }

    #[test]
    fn wire_strings_round_trip() {
        for dt in [
            DiscrepancyType::Ok,
            DiscrepancyType::SentLow,
            DiscrepancyType::Missing,
            DiscrepancyType::SentHigh,
            DiscrepancyType::Unordered,
            DiscrepancyType::Damaged,
            DiscrepancyType::Substituted,
            DiscrepancyType::Expired,
            DiscrepancyType::NotCompliant,
        ] {
            assert_eq!(DiscrepancyType::parse(dt.as_str()), Some(dt));
        }
        assert_eq!(DiscrepancyType::parse("bogus"), None);
        assert_eq!(DiscrepancyType::parse(""), Some(DiscrepancyType::Ok));
    }

    proptest! {
        #[test]
        fn claim_qty_never_negative(
            ordered in 0..10_000i32,
            received in proptest::option::of(0..10_000i32),
            damaged in 0..10_000i32,
        ) {
            for declared in [
                DiscrepancyType::SentLow,
                DiscrepancyType::Missing,
                DiscrepancyType::SentHigh,
                DiscrepancyType::Unordered,
                DiscrepancyType::Damaged,
                DiscrepancyType::Substituted,
            ] {
                let case = classify(ordered, received, damaged, declared).unwrap();
                prop_assert!(case.claim_qty >= 0);
                if declared == DiscrepancyType::Missing {
                    prop_assert!(case.claim_qty >= 1);
                }
            }
        }

        #[test]
        fn shortage_claims_match_delta_magnitude(
            ordered in 0..10_000i32,
            received in 0..10_000i32,
        ) {
            let case = classify(ordered, Some(received), 0, DiscrepancyType::SentLow).unwrap();
            prop_assert_eq!(case.delta_qty, received - ordered);
            if case.delta_qty != 0 {
                prop_assert_eq!(case.claim_qty, case.delta_qty.abs());
            }
        }
    }
}
