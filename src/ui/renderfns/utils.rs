/// Truncate a string to at most `max_len` characters, adding "..." if cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Format a coordinate pair with a fixed precision
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
  format!("{:.5}, {:.5}", latitude, longitude)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Zoë Ångström", 6), "Zoë...");
  }

  #[test]
  fn test_format_coordinates() {
    assert_eq!(format_coordinates(51.5072, -0.1276), "51.50720, -0.12760");
  }
}
