//! Serde-deserializable types matching the people endpoint response.
//!
//! These types are separate from `Person` to keep the nested wire shape
//! (profile, location) out of the rest of the application.

use color_eyre::{eyre::eyre, Result};
use serde::de::Error as _;
use serde::Deserialize;
use serde_json::Value;

use crate::person::Person;

#[derive(Debug, Deserialize)]
pub struct ApiLocation {
  #[serde(deserialize_with = "deserialize_lenient_f64")]
  pub lat: f64,
  #[serde(deserialize_with = "deserialize_lenient_f64")]
  pub long: f64,
}

#[derive(Debug, Deserialize)]
pub struct ApiProfile {
  pub name: String,
  pub address: String,
  pub location: ApiLocation,
}

#[derive(Debug, Deserialize)]
pub struct ApiPerson {
  #[serde(deserialize_with = "deserialize_lenient_string")]
  pub id: String,
  #[serde(deserialize_with = "deserialize_lenient_string")]
  pub email: String,
  #[serde(deserialize_with = "deserialize_lenient_string")]
  pub phone: String,
  pub profile: ApiProfile,
}

impl From<ApiPerson> for Person {
  fn from(api: ApiPerson) -> Self {
    Person {
      id: api.id,
      name: api.profile.name,
      email_id: api.email,
      phone_no: api.phone,
      address: api.profile.address,
      latitude: api.profile.location.lat,
      longitude: api.profile.location.long,
    }
  }
}

/// Accept a string, or a number/bool rendered as text (`"id": 1` -> "1").
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: serde::Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::String(s) => Ok(s),
    Value::Number(n) => Ok(n.to_string()),
    Value::Bool(b) => Ok(b.to_string()),
    other => Err(D::Error::custom(format!("expected a string, found {}", other))),
  }
}

/// Accept a number, or a string holding one (`"lat": "51.5"`).
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: serde::Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Number(n) => n
      .as_f64()
      .ok_or_else(|| D::Error::custom(format!("number {} out of range", n))),
    Value::String(s) => s
      .trim()
      .parse::<f64>()
      .map_err(|_| D::Error::custom(format!("expected a number, found \"{}\"", s))),
    other => Err(D::Error::custom(format!("expected a number, found {}", other))),
  }
}

/// Parse a response body into persons.
///
/// Every element must be well formed; one bad record rejects the whole
/// payload so a refresh never stores a partial list.
pub fn parse_persons(text: &str) -> Result<Vec<Person>> {
  let value: Value =
    serde_json::from_str(text).map_err(|e| eyre!("Invalid JSON: {}", e))?;

  // Either `{"data": [...]}` or the bare array
  let data = match value {
    Value::Object(mut map) => map
      .remove("data")
      .ok_or_else(|| eyre!("Expected a \"data\" array or a bare array"))?,
    value => value,
  };

  let records: Vec<ApiPerson> =
    serde_json::from_value(data).map_err(|e| eyre!("Unexpected record shape in response: {}", e))?;

  Ok(records.into_iter().map(Person::from).collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  const RECORD: &str = r#"{
    "id": "a1",
    "email": "ada@example.com",
    "phone": "555-0100",
    "profile": {
      "name": "Ada",
      "address": "12 Harbour Road",
      "location": { "lat": 51.5, "long": -0.12 }
    }
  }"#;

  #[test]
  fn test_parses_wrapped_data_array() {
    let persons = parse_persons(&format!(r#"{{"data": [{RECORD}]}}"#)).unwrap();

    assert_eq!(
      persons,
      vec![Person {
        id: "a1".to_string(),
        name: "Ada".to_string(),
        email_id: "ada@example.com".to_string(),
        phone_no: "555-0100".to_string(),
        address: "12 Harbour Road".to_string(),
        latitude: 51.5,
        longitude: -0.12,
      }]
    );
  }

  #[test]
  fn test_parses_bare_array() {
    let persons = parse_persons(&format!("[{RECORD}, {RECORD}]")).unwrap();
    assert_eq!(persons.len(), 2);
    assert_eq!(persons[1].name, "Ada");
  }

  #[test]
  fn test_integer_coordinates_are_accepted() {
    let text = RECORD.replace("51.5", "51").replace("-0.12", "0");
    let persons = parse_persons(&format!("[{text}]")).unwrap();
    assert_eq!(persons[0].latitude, 51.0);
    assert_eq!(persons[0].longitude, 0.0);
  }

  #[test]
  fn test_empty_data_array_is_valid() {
    assert!(parse_persons(r#"{"data": []}"#).unwrap().is_empty());
  }

  #[test]
  fn test_object_without_data_is_rejected() {
    assert!(parse_persons(r#"{"people": []}"#).is_err());
  }

  #[test]
  fn test_malformed_json_is_rejected() {
    assert!(parse_persons("{not json").is_err());
    assert!(parse_persons("").is_err());
  }

  #[test]
  fn test_missing_nested_field_rejects_whole_payload() {
    let broken = RECORD.replace(r#""address": "12 Harbour Road","#, "");
    assert!(parse_persons(&format!("[{RECORD}, {broken}]")).is_err());
  }

  #[test]
  fn test_missing_field_is_named_in_error() {
    let broken = RECORD.replace(r#""address": "12 Harbour Road","#, "");
    let err = parse_persons(&format!(r#"{{"data": [{broken}]}}"#)).unwrap_err();
    assert!(err.to_string().contains("address"), "got: {err}");
  }

  #[test]
  fn test_numeric_ids_and_string_coordinates_are_coerced() {
    let text = r#"{"data": [{
      "id": 1,
      "email": "ada@example.com",
      "phone": 5550100,
      "profile": {
        "name": "Ada",
        "address": "12 Harbour Road",
        "location": { "lat": "51.5", "long": 2 }
      }
    }]}"#;
    let persons = parse_persons(text).unwrap();

    assert_eq!(persons[0].id, "1");
    assert_eq!(persons[0].phone_no, "5550100");
    assert_eq!(persons[0].latitude, 51.5);
    assert_eq!(persons[0].longitude, 2.0);
  }

  #[test]
  fn test_non_numeric_coordinate_is_rejected() {
    let text = RECORD.replace("51.5", r#""north""#);
    let err = parse_persons(&format!("[{text}]")).unwrap_err();
    assert!(err.to_string().contains("north"), "got: {err}");
  }

  #[test]
  fn test_data_that_is_not_an_array_is_rejected() {
    assert!(parse_persons(r#"{"data": {"id": "a1"}}"#).is_err());
  }
}
