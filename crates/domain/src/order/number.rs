//! Human-decodable order numbers.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::OrderError;

const PREFIX: &str = "ORD-";
const SUFFIX_LEN: usize = 4;
const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Order number of the form `ORD-<timestamp>-<suffix>`.
///
/// The timestamp is the creation instant in milliseconds since the Unix
/// epoch, upper-case base 36. The suffix is four random base-36 characters.
/// Uniqueness is enforced by the order store, not by generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber {
    value: String,
    issued_at: DateTime<Utc>,
}

impl OrderNumber {
    /// Generates a number for the current instant.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now(), &mut rand::rng())
    }

    /// Generates a number for `issued_at` with the given random source.
    pub fn generate_at<R: Rng>(issued_at: DateTime<Utc>, rng: &mut R) -> Self {
        let millis = u64::try_from(issued_at.timestamp_millis()).unwrap_or(0);
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();

        Self {
            value: format!("{PREFIX}{}-{suffix}", encode_base36(millis)),
            // Millisecond precision, so `timestamp()` equals a re-parse.
            issued_at: DateTime::from_timestamp_millis(millis as i64).unwrap_or_default(),
        }
    }

    /// Parses and validates an order number.
    pub fn parse(value: &str) -> Result<Self, OrderError> {
        let invalid = || OrderError::InvalidOrderNumber {
            value: value.to_string(),
        };

        let (timestamp, suffix) = value
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.split_once('-'))
            .ok_or_else(invalid)?;

        if timestamp.is_empty() || !is_base36(timestamp) {
            return Err(invalid());
        }
        if suffix.len() != SUFFIX_LEN || !is_base36(suffix) {
            return Err(invalid());
        }

        let issued_at = u64::from_str_radix(timestamp, 36)
            .ok()
            .and_then(|millis| i64::try_from(millis).ok())
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(invalid)?;

        Ok(Self {
            value: value.to_string(),
            issued_at,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the creation instant embedded in the number.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.value
    }
}

fn encode_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

fn is_base36(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}
