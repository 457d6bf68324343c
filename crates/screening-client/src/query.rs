//! # Query Builder
//!
//! Pure translation from a [`PersonQuery`] to the engine's match payload.
//! `name` is always present; every other property appears only when the
//! caller supplied it. No validation happens here beyond what
//! [`PersonQuery`] already guarantees.

use std::collections::BTreeMap;

use screening_core::PersonQuery;

use crate::types::{EntityQuery, MatchRequest};

/// Id of the single query carried by every match request.
pub const QUERY_ID: &str = "q1";

/// Entity schema for natural persons.
pub const PERSON_SCHEMA: &str = "Person";

pub const NAME: &str = "name";
pub const COUNTRY: &str = "country";
pub const BIRTH_DATE: &str = "birthDate";
pub const PASSPORT_NUMBER: &str = "passportNumber";
pub const ID_NUMBER: &str = "idNumber";

/// Build the match payload for a person.
pub fn build_match_request(query: &PersonQuery) -> MatchRequest {
    let mut properties: BTreeMap<String, Vec<String>> = BTreeMap::new();
    properties.insert(NAME.into(), vec![query.full_name().to_string()]);

    if let Some(country) = query.country() {
        properties.insert(COUNTRY.into(), vec![country.to_ascii_lowercase()]);
    }
    if let Some(dob) = query.date_of_birth() {
        properties.insert(BIRTH_DATE.into(), vec![dob.format("%Y-%m-%d").to_string()]);
    }
    if let Some(passport) = query.passport_number() {
        properties.insert(PASSPORT_NUMBER.into(), vec![passport.to_string()]);
    }
    if let Some(national_id) = query.national_id() {
        properties.insert(ID_NUMBER.into(), vec![national_id.to_string()]);
    }

    let mut queries = BTreeMap::new();
    queries.insert(
        QUERY_ID.to_string(),
        EntityQuery {
            schema: PERSON_SCHEMA.to_string(),
            properties,
        },
    );
    MatchRequest { queries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use screening_core::RequestId;

    #[test]
    fn name_only_query() {
        let q = PersonQuery::builder("Jane Smith").build().unwrap();
        let req = build_match_request(&q);
        let entity = &req.queries[QUERY_ID];
        assert_eq!(entity.schema, "Person");
        assert_eq!(entity.properties.len(), 1);
        assert_eq!(entity.properties[NAME], vec!["Jane Smith"]);
    }

    #[test]
    fn all_optional_fields_are_mapped() {
        let q = PersonQuery::builder("Hassan Nasrallah")
            .country("LB")
            .date_of_birth(NaiveDate::from_ymd_opt(1960, 8, 31).unwrap())
            .passport_number("P1234567")
            .national_id("ID-42")
            .request_id(RequestId::new("req-1").unwrap())
            .user_id("user-9")
            .transaction_context("withdrawal")
            .build()
            .unwrap();
        let req = build_match_request(&q);
        let props = &req.queries[QUERY_ID].properties;
        assert_eq!(props[COUNTRY], vec!["lb"]);
        assert_eq!(props[BIRTH_DATE], vec!["1960-08-31"]);
        assert_eq!(props[PASSPORT_NUMBER], vec!["P1234567"]);
        assert_eq!(props[ID_NUMBER], vec!["ID-42"]);
        // Caller context never leaves the service.
        assert_eq!(props.len(), 5);
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("user-9"));
        assert!(!json.contains("withdrawal"));
        assert!(!json.contains("req-1"));
    }

    #[test]
    fn property_keys_lists_sent_fields() {
        let q = PersonQuery::builder("Jane Smith").country("us").build().unwrap();
        let req = build_match_request(&q);
        assert_eq!(req.property_keys(QUERY_ID), vec!["country", "name"]);
        assert!(req.property_keys("missing").is_empty());
    }
}
