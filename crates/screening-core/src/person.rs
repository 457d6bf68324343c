//! # Person Query
//!
//! The identifying attributes of the natural person being screened, plus
//! the request identifier under which the screen is audited.
//!
//! A [`PersonQuery`] is immutable once built. The only hard validation rule
//! is a non-empty `full_name`; everything else is passed to the matching
//! engine as a weak signal and the engine alone decides relevance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Upper bound on caller-supplied request id length.
pub const MAX_REQUEST_ID_LEN: usize = 128;

// ---------------------------------------------------------------------------
// RequestId
// ---------------------------------------------------------------------------

/// Identifier keying one screening request and its audit record.
///
/// Either supplied by the caller (so retries collapse onto the same audit
/// record) or generated as a UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Validate a caller-supplied request id. Surrounding whitespace is
    /// trimmed; blank, overlong, or control-character ids are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidRequestId(
                "request_id must not be blank".into(),
            ));
        }
        if trimmed.len() > MAX_REQUEST_ID_LEN {
            return Err(ValidationError::InvalidRequestId(format!(
                "request_id must not exceed {MAX_REQUEST_ID_LEN} characters"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::InvalidRequestId(
                "request_id must not contain control characters".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Generate a fresh random request id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Access the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// PersonQuery
// ---------------------------------------------------------------------------

/// The person being screened.
///
/// Fields are private; use [`PersonQuery::builder`] to construct and the
/// accessors to read. Deserialization goes through the same builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPersonQuery")]
pub struct PersonQuery {
    full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    passport_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    national_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction_context: Option<String>,
}

#[derive(Deserialize)]
struct RawPersonQuery {
    full_name: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    passport_number: Option<String>,
    #[serde(default)]
    national_id: Option<String>,
    #[serde(default)]
    request_id: Option<RequestId>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    transaction_context: Option<String>,
}

impl TryFrom<RawPersonQuery> for PersonQuery {
    type Error = ValidationError;

    fn try_from(raw: RawPersonQuery) -> Result<Self, Self::Error> {
        let mut builder = PersonQuery::builder(raw.full_name);
        if let Some(country) = raw.country {
            builder = builder.country(country);
        }
        if let Some(date) = raw.date_of_birth {
            builder = builder.date_of_birth(date);
        }
        if let Some(passport) = raw.passport_number {
            builder = builder.passport_number(passport);
        }
        if let Some(national_id) = raw.national_id {
            builder = builder.national_id(national_id);
        }
        if let Some(id) = raw.request_id {
            builder = builder.request_id(id);
        }
        if let Some(user_id) = raw.user_id {
            builder = builder.user_id(user_id);
        }
        if let Some(context) = raw.transaction_context {
            builder = builder.transaction_context(context);
        }
        builder.build()
    }
}

impl PersonQuery {
    /// Start building a query for the given full name.
    pub fn builder(full_name: impl Into<String>) -> PersonQueryBuilder {
        PersonQueryBuilder {
            full_name: full_name.into(),
            country: None,
            date_of_birth: None,
            passport_number: None,
            national_id: None,
            request_id: None,
            user_id: None,
            transaction_context: None,
        }
    }

    /// Parse a `YYYY-MM-DD` date of birth.
    pub fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, ValidationError> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDateOfBirth(raw.to_string()))
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// ISO-2 country code, upper-cased.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn passport_number(&self) -> Option<&str> {
        self.passport_number.as_deref()
    }

    pub fn national_id(&self) -> Option<&str> {
        self.national_id.as_deref()
    }

    /// The caller-supplied request id, if any.
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Caller's internal user reference. Audit-only; never sent upstream.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Business context of the screen ("withdrawal", "registration", ...).
    /// Audit-only; never sent upstream.
    pub fn transaction_context(&self) -> Option<&str> {
        self.transaction_context.as_deref()
    }
}

/// Builder for [`PersonQuery`].
///
/// Optional string fields are trimmed; a blank value is treated as absent.
#[derive(Debug, Clone)]
pub struct PersonQueryBuilder {
    full_name: String,
    country: Option<String>,
    date_of_birth: Option<NaiveDate>,
    passport_number: Option<String>,
    national_id: Option<String>,
    request_id: Option<RequestId>,
    user_id: Option<String>,
    transaction_context: Option<String>,
}

impl PersonQueryBuilder {
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = non_blank(country.into()).map(|c| c.to_ascii_uppercase());
        self
    }

    pub fn date_of_birth(mut self, date: NaiveDate) -> Self {
        self.date_of_birth = Some(date);
        self
    }

    pub fn passport_number(mut self, value: impl Into<String>) -> Self {
        self.passport_number = non_blank(value.into());
        self
    }

    pub fn national_id(mut self, value: impl Into<String>) -> Self {
        self.national_id = non_blank(value.into());
        self
    }

    pub fn request_id(mut self, id: RequestId) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn user_id(mut self, value: impl Into<String>) -> Self {
        self.user_id = non_blank(value.into());
        self
    }

    pub fn transaction_context(mut self, value: impl Into<String>) -> Self {
        self.transaction_context = non_blank(value.into());
        self
    }

    /// Finish the query. Fails only when `full_name` is blank.
    pub fn build(self) -> Result<PersonQuery, ValidationError> {
        let full_name = non_blank(self.full_name).ok_or(ValidationError::EmptyFullName)?;
        Ok(PersonQuery {
            full_name,
            country: self.country,
            date_of_birth: self.date_of_birth,
            passport_number: self.passport_number,
            national_id: self.national_id,
            request_id: self.request_id,
            user_id: self.user_id,
            transaction_context: self.transaction_context,
        })
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_full_name() {
        assert_eq!(
            PersonQuery::builder("   ").build().unwrap_err(),
            ValidationError::EmptyFullName
        );
        assert_eq!(
            PersonQuery::builder("").build().unwrap_err(),
            ValidationError::EmptyFullName
        );
    }

    #[test]
    fn builder_trims_and_normalizes() {
        let q = PersonQuery::builder("  Jane Smith ")
            .country(" us ")
            .passport_number("  ")
            .national_id(" X-123 ")
            .build()
            .unwrap();
        assert_eq!(q.full_name(), "Jane Smith");
        assert_eq!(q.country(), Some("US"));
        assert_eq!(q.passport_number(), None);
        assert_eq!(q.national_id(), Some("X-123"));
        assert!(q.request_id().is_none());
    }

    #[test]
    fn parse_date_of_birth_accepts_iso_dates() {
        let d = PersonQuery::parse_date_of_birth("1960-08-31").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(1960, 8, 31).unwrap());
    }

    #[test]
    fn parse_date_of_birth_rejects_other_formats() {
        assert!(PersonQuery::parse_date_of_birth("31/08/1960").is_err());
        assert!(PersonQuery::parse_date_of_birth("1960-02-30").is_err());
        assert!(PersonQuery::parse_date_of_birth("").is_err());
    }

    #[test]
    fn request_id_validation() {
        assert_eq!(RequestId::new(" abc-1 ").unwrap().as_str(), "abc-1");
        assert!(RequestId::new("  ").is_err());
        assert!(RequestId::new("a".repeat(MAX_REQUEST_ID_LEN + 1)).is_err());
        assert!(RequestId::new("bad\nid").is_err());
    }

    #[test]
    fn generated_request_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }

    #[test]
    fn request_id_deserialize_validates() {
        let ok: RequestId = serde_json::from_str("\"req-7\"").unwrap();
        assert_eq!(ok.as_str(), "req-7");
        assert!(serde_json::from_str::<RequestId>("\"\"").is_err());
    }

    #[test]
    fn person_query_serializes_without_absent_fields() {
        let q = PersonQuery::builder("Jane Smith")
            .date_of_birth(NaiveDate::from_ymd_opt(1980, 1, 2).unwrap())
            .build()
            .unwrap();
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["full_name"], "Jane Smith");
        assert_eq!(json["date_of_birth"], "1980-01-02");
        assert!(json.get("country").is_none());
        assert!(json.get("request_id").is_none());
    }

    #[test]
    fn person_query_deserialize_validates() {
        assert!(serde_json::from_str::<PersonQuery>(r#"{"full_name": "  "}"#).is_err());
        assert!(serde_json::from_str::<PersonQuery>(r#"{"country": "US"}"#).is_err());

        let q: PersonQuery =
            serde_json::from_str(r#"{"full_name": " Jane Smith ", "country": "us", "passport_number": ""}"#)
                .unwrap();
        assert_eq!(q.full_name(), "Jane Smith");
        assert_eq!(q.country(), Some("US"));
        assert_eq!(q.passport_number(), None);
    }
}
