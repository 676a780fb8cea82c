use serde::{Deserialize, Serialize};

/// A single person record, as stored locally and shown in the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub id: String,
  pub name: String,
  pub email_id: String,
  pub phone_no: String,
  pub address: String,
  pub latitude: f64,
  pub longitude: f64,
}

impl Person {
  /// Case-insensitive match against name, email, phone and address
  pub fn matches(&self, filter: &str) -> bool {
    if filter.is_empty() {
      return true;
    }
    let needle = filter.to_lowercase();
    [&self.name, &self.email_id, &self.phone_no, &self.address]
      .iter()
      .any(|field| field.to_lowercase().contains(&needle))
  }
}

#[cfg(test)]
pub(crate) fn sample(id: &str, name: &str) -> Person {
  Person {
    id: id.to_string(),
    name: name.to_string(),
    email_id: format!("{}@example.com", name.to_lowercase()),
    phone_no: "+1 555 0100".to_string(),
    address: "12 Harbour Road".to_string(),
    latitude: 51.5072,
    longitude: -0.1276,
  }
}
