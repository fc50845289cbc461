//! Airport code type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid airport code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid airport code: {reason}")]
pub struct InvalidAirportCode {
    reason: &'static str,
}

/// A valid 3-letter IATA airport code.
///
/// Airport codes are always 3 uppercase ASCII letters. This type guarantees
/// that any `AirportCode` value is valid by construction, so it can be used
/// directly as the equality predicate of a candidate query.
///
/// # Examples
///
/// ```
/// use gate_server::domain::AirportCode;
///
/// let fco = AirportCode::parse("FCO").unwrap();
/// assert_eq!(fco.as_str(), "FCO");
///
/// // Lowercase is rejected by `parse`...
/// assert!(AirportCode::parse("fco").is_err());
///
/// // ...but accepted by `parse_normalized`
/// assert_eq!(AirportCode::parse_normalized(" fco ").unwrap(), fco);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode([u8; 3]);

impl AirportCode {
    /// Parse an airport code from a string.
    ///
    /// The input must be exactly 3 uppercase ASCII letters (A-Z).
    pub fn parse(s: &str) -> Result<Self, InvalidAirportCode> {
        let bytes = s.as_bytes();

        let [a, b, c] = bytes else {
            return Err(InvalidAirportCode {
                reason: "must be exactly 3 characters",
            });
        };

        if !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(InvalidAirportCode {
                reason: "must be uppercase ASCII letters A-Z",
            });
        }

        Ok(AirportCode([*a, *b, *c]))
    }

    /// Parse user input, trimming whitespace and uppercasing first.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidAirportCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the airport code as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Debug for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AirportCode({})", self.as_str())
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for AirportCode {
    type Error = InvalidAirportCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AirportCode> for String {
    fn from(code: AirportCode) -> Self {
        code.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_codes() {
        assert!(AirportCode::parse("FCO").is_ok());
        assert!(AirportCode::parse("LHR").is_ok());
        assert!(AirportCode::parse("JFK").is_ok());
        assert!(AirportCode::parse("AAA").is_ok());
    }

    #[test]
    fn reject_lowercase() {
        assert!(AirportCode::parse("fco").is_err());
        assert!(AirportCode::parse("Fco").is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(AirportCode::parse("").is_err());
        assert!(AirportCode::parse("FC").is_err());
        assert!(AirportCode::parse("FCOO").is_err());
    }

    #[test]
    fn reject_non_letters() {
        assert!(AirportCode::parse("F1O").is_err());
        assert!(AirportCode::parse("F O").is_err());
        assert!(AirportCode::parse("FÖ").is_err());
    }

    #[test]
    fn normalized_parsing() {
        let code = AirportCode::parse_normalized("  mxp\n").unwrap();
        assert_eq!(code.as_str(), "MXP");
        assert!(AirportCode::parse_normalized("malpensa").is_err());
    }

    #[test]
    fn display_and_debug() {
        let code = AirportCode::parse("NAP").unwrap();
        assert_eq!(code.to_string(), "NAP");
        assert_eq!(format!("{code:?}"), "AirportCode(NAP)");
    }

    #[test]
    fn serde_as_string() {
        let code = AirportCode::parse("CDG").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"CDG\"");

        let back: AirportCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);

        assert!(serde_json::from_str::<AirportCode>("\"cdg\"").is_err());
    }
}
