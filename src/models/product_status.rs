use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::errors::ServiceError;

const MAX_STATUS_LEN: usize = 64;

static STATUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9_]+$").expect("status pattern is a valid regex"));

/// A product status name.
///
/// Statuses are an open set kept in the `product_statuses` lookup table, so
/// this is a validated string rather than an enum. Input is trimmed and
/// uppercased; the result must match `[A-Z0-9_]{1,64}`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct ProductStatus(String);

impl ProductStatus {
    pub const PUBLISHED: &'static str = "PUBLISHED";
    pub const DRAFT: &'static str = "DRAFT";
    pub const ARCHIVED: &'static str = "ARCHIVED";

    /// Normalizes and validates a raw status name.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(ServiceError::ValidationError(
                "Status name is required".to_string(),
            ));
        }
        if normalized.len() > MAX_STATUS_LEN || !STATUS_RE.is_match(&normalized) {
            return Err(ServiceError::ValidationError(format!(
                "Invalid status name \"{}\": use up to {} letters, digits or underscores",
                raw.trim(),
                MAX_STATUS_LEN
            )));
        }
        Ok(Self(normalized))
    }

    pub fn published() -> Self {
        Self(Self::PUBLISHED.to_string())
    }

    pub fn is_published(&self) -> bool {
        self.0 == Self::PUBLISHED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        Self::published()
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductStatus {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProductStatus {
    type Error = ServiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProductStatus> for String {
    fn from(status: ProductStatus) -> Self {
        status.0
    }
}

impl AsRef<str> for ProductStatus {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("published", "PUBLISHED")]
    #[case("  draft ", "DRAFT")]
    #[case("Coming_Soon", "COMING_SOON")]
    #[case("SEASON_2025", "SEASON_2025")]
    fn parse_normalizes_names(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(ProductStatus::parse(raw).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("out of stock")]
    #[case("pre-order")]
    fn parse_rejects_invalid_names(#[case] raw: &str) {
        assert!(matches!(
            ProductStatus::parse(raw),
            Err(ServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn parse_rejects_overlong_names() {
        let raw = "A".repeat(MAX_STATUS_LEN + 1);
        assert!(ProductStatus::parse(&raw).is_err());
        assert!(ProductStatus::parse(&"A".repeat(MAX_STATUS_LEN)).is_ok());
    }

    #[test]
    fn default_status_is_published() {
        let status = ProductStatus::default();
        assert!(status.is_published());
        assert_eq!(status.to_string(), "PUBLISHED");
    }

    #[test]
    fn serde_round_trips_through_plain_string() {
        let status: ProductStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status.as_str(), ProductStatus::ARCHIVED);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"ARCHIVED\"");
        assert!(serde_json::from_str::<ProductStatus>("\"no way\"").is_err());
    }
}
