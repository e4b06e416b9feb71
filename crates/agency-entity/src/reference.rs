//! Static reference data: countries and airlines.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A destination country.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Country {
    /// Short code, e.g. `KSA`.
    pub code: String,
    pub name: String,
    /// Display glyph.
    pub flag: Option<String>,
}

/// An airline the agency buys seats from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Airline {
    pub id: String,
    pub name: String,
    /// IATA-style code used as the flight number prefix.
    pub code: String,
}

impl Airline {
    /// Prefix for generated flight numbers when the airline is not on file.
    ///
    /// Takes the initials of the name, or its first two letters for a
    /// single-word name.
    pub fn fallback_code(name: &str) -> String {
        let words: Vec<&str> = name.split_whitespace().collect();
        let code: String = if words.len() > 1 {
            words.iter().filter_map(|w| w.chars().next()).take(3).collect()
        } else {
            name.chars().filter(|c| c.is_alphanumeric()).take(2).collect()
        };
        if code.is_empty() {
            "XX".to_string()
        } else {
            code.to_uppercase()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_code() {
        assert_eq!(Airline::fallback_code("Saudia"), "SA");
        assert_eq!(Airline::fallback_code("Pakistan International Airlines"), "PIA");
        assert_eq!(Airline::fallback_code("  "), "XX");
    }
}
