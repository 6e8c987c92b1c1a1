use serde::{Deserialize, Serialize};
use std::fmt;

/// Postal codes resolved by a plain `postal lookup` run, in output order.
pub const POSTAL_CODES: &[PostalCode] = &[
    PostalCode(760674),
    PostalCode(762507),
    PostalCode(760813),
    PostalCode(760115),
    PostalCode(760701),
    PostalCode(760131),
    PostalCode(760260),
    PostalCode(760838),
    PostalCode(760398),
    PostalCode(768893),
    PostalCode(760162),
    PostalCode(760436),
    PostalCode(760461),
    PostalCode(760765),
    PostalCode(760107),
    PostalCode(750513),
    PostalCode(750105),
    PostalCode(751351),
    PostalCode(750463),
    PostalCode(753588),
    PostalCode(751364),
];

/// Six-digit Singapore postal code. Rendered zero-padded, so `18956` prints as `018956`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostalCode(pub u32);

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl std::str::FromStr for PostalCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.len() > 6 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(anyhow::anyhow!("Invalid postal code '{s}': expected up to 6 digits."));
        }

        trimmed
            .parse::<u32>()
            .map(PostalCode)
            .map_err(|e| anyhow::anyhow!("Invalid postal code '{s}': {e}"))
    }
}

/// A longitude or latitude exactly as the service sent it.
///
/// OneMap returns coordinates as JSON strings, but numbers are accepted too.
/// Either way the value is printed back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Text(String),
    Number(serde_json::Number),
}

impl Coordinate {
    /// Numeric value, if the coordinate parses as one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Coordinate::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Coordinate::Number(n) => n.as_f64(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Text(s) => f.write_str(s),
            Coordinate::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Coordinate::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub address: String,
    pub longitude: Coordinate,
    pub latitude: Coordinate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(LookupResult),
    NotFound,
}

impl LookupOutcome {
    /// Render the pipe-delimited output line for `postal`, without a newline.
    pub fn render_line(&self, postal: PostalCode) -> String {
        match self {
            LookupOutcome::Found(r) => {
                format!("{postal}|{}|{}|{}", r.address, r.longitude, r.latitude)
            }
            LookupOutcome::NotFound => format!("{postal}|No results found"),
        }
    }
}
