//! Card brand classification from number prefixes.
//!
//! Fallback only: when a payment gateway supplied the brand, that value
//! wins and this classifier is never consulted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card brand recognized from a number prefix (BIN range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl CardBrand {
    /// Classifies a card number by its prefix.
    ///
    /// Whitespace and hyphens are stripped first. Rules, in order:
    /// `4…` visa, `51…`-`55…` mastercard, `34…`/`37…` amex, `6…`
    /// discover; anything else (including empty input) is unknown.
    pub fn classify(card_number: &str) -> CardBrand {
        let clean = normalize_card_number(card_number);
        if clean.is_empty() {
            return CardBrand::Unknown;
        }

        if clean.starts_with('4') {
            return CardBrand::Visa;
        }
        if clean.starts_with('5') && clean.len() >= 2 {
            let first_two: u32 = clean
                .get(0..2)
                .and_then(|prefix| prefix.parse().ok())
                .unwrap_or(0);
            return if (51..=55).contains(&first_two) {
                CardBrand::Mastercard
            } else {
                CardBrand::Unknown
            };
        }
        if clean.starts_with("34") || clean.starts_with("37") {
            return CardBrand::Amex;
        }
        if clean.starts_with('6') {
            return CardBrand::Discover;
        }

        CardBrand::Unknown
    }

    /// Returns the lower-case brand token.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Amex => "amex",
            CardBrand::Discover => "discover",
            CardBrand::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strips whitespace and hyphens from a card number as entered.
pub fn normalize_card_number(card_number: &str) -> String {
    card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_visa_prefix() {
        assert_eq!(CardBrand::classify("4111111111111111"), CardBrand::Visa);
    }

    #[test]
    fn classifies_mastercard_range() {
        assert_eq!(CardBrand::classify("5500000000000000"), CardBrand::Mastercard);
        assert_eq!(CardBrand::classify("5100000000000000"), CardBrand::Mastercard);
        assert_eq!(CardBrand::classify("5555555555554444"), CardBrand::Mastercard);
    }

    #[test]
    fn five_prefix_outside_range_is_unknown() {
        assert_eq!(CardBrand::classify("5600000000000000"), CardBrand::Unknown);
        assert_eq!(CardBrand::classify("5000000000000000"), CardBrand::Unknown);
    }

    #[test]
    fn lone_five_is_unknown() {
        assert_eq!(CardBrand::classify("5"), CardBrand::Unknown);
    }

    #[test]
    fn classifies_amex_prefixes() {
        assert_eq!(CardBrand::classify("341111111111111"), CardBrand::Amex);
        assert_eq!(CardBrand::classify("371449635398431"), CardBrand::Amex);
    }

    #[test]
    fn classifies_discover_prefix() {
        assert_eq!(CardBrand::classify("6011111111111111"), CardBrand::Discover);
    }

    #[test]
    fn empty_input_is_unknown() {
        assert_eq!(CardBrand::classify(""), CardBrand::Unknown);
    }

    #[test]
    fn unrecognized_prefix_is_unknown() {
        assert_eq!(CardBrand::classify("9999999999999999"), CardBrand::Unknown);
    }

    #[test]
    fn strips_spaces_and_hyphens_before_matching() {
        assert_eq!(CardBrand::classify("4111 1111 1111 1111"), CardBrand::Visa);
        assert_eq!(CardBrand::classify("5500-0000-0000-0000"), CardBrand::Mastercard);
    }

    #[test]
    fn normalize_removes_separators_only() {
        assert_eq!(normalize_card_number(" 4111-11 11"), "411111");
        assert_eq!(normalize_card_number(""), "");
    }

    #[test]
    fn brand_tokens_are_lower_case() {
        assert_eq!(CardBrand::Visa.as_str(), "visa");
        assert_eq!(CardBrand::Unknown.to_string(), "unknown");
    }

    #[test]
    fn brand_serializes_as_lower_case() {
        let json = serde_json::to_string(&CardBrand::Mastercard).unwrap();
        assert_eq!(json, "\"mastercard\"");
    }
}
