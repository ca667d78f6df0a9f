use std::path::Path;

use crate::errors::{config_error, Result};

/// Match configuration for the classifier.
///
/// Three lists of lower-cased patterns decide which flows belong to the
/// monitored service and which of those deserve a detailed report:
///
/// - `hosts`: hostname fragments selecting in-scope flows. Substring
///   semantics are intentional so subdomains and region-sharded hosts
///   match a parent pattern.
/// - `keywords`: fragments matched against the full URL and against
///   text request bodies.
/// - `endpoints`: URL path fragments of known-interesting API surfaces.
///
/// The configuration is immutable at runtime. It is supplied at
/// construction time, typically from a JSON document, so the heuristic
/// lists can be updated without code changes:
///
/// ```rust
/// let config = flowlens::MatchConfig::from_json(
///   r#"{"hosts": ["api.example.com"], "keywords": ["queue"], "endpoints": ["/v1/me/player"]}"#,
/// ).unwrap();
/// assert_eq!(config.hosts(), ["api.example.com"]);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct MatchConfig {
  #[serde(default)]
  hosts: Vec<String>,
  #[serde(default)]
  keywords: Vec<String>,
  #[serde(default)]
  endpoints: Vec<String>,
}

impl MatchConfig {
  /// Create a configuration from pattern lists.
  ///
  /// Patterns are case-folded once here so per-flow classification
  /// never folds the configuration side again.
  pub fn new<H, K, E>(hosts: H, keywords: K, endpoints: E) -> Self
  where
    H: IntoIterator,
    H::Item: Into<String>,
    K: IntoIterator,
    K::Item: Into<String>,
    E: IntoIterator,
    E::Item: Into<String>,
  {
    MatchConfig {
      hosts: hosts.into_iter().map(Into::into).collect(),
      keywords: keywords.into_iter().map(Into::into).collect(),
      endpoints: endpoints.into_iter().map(Into::into).collect(),
    }
    .normalized()
  }
  /// Parse a configuration from a JSON document.
  ///
  /// Unknown patterns are kept as-is (lower-cased); an empty host list
  /// is rejected, see [`MatchConfig::validate`].
  pub fn from_json(json: &str) -> Result<Self> {
    let config: MatchConfig = serde_json::from_str(json)?;
    let config = config.normalized();
    config.validate()?;
    Ok(config)
  }
  /// Read and parse a configuration from a JSON file.
  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json(&json)
  }
  /// Lower-case all patterns and drop blank entries.
  pub fn normalized(mut self) -> Self {
    for list in [&mut self.hosts, &mut self.keywords, &mut self.endpoints] {
      list.retain(|pattern| !pattern.trim().is_empty());
      for pattern in list.iter_mut() {
        *pattern = pattern.trim().to_lowercase();
      }
    }
    self
  }
  /// Reject a configuration that can never select a flow.
  ///
  /// A monitor without host patterns reports nothing at all; surfacing
  /// that at load time beats a silently idle observer. A configuration
  /// without keywords or endpoints is legal (every in-scope flow is
  /// then merely observed) but is worth a log line.
  pub fn validate(&self) -> Result<()> {
    if self.hosts.is_empty() {
      return Err(config_error("host list is empty, no flow can match"));
    }
    if self.keywords.is_empty() && self.endpoints.is_empty() {
      tracing::warn!("no keywords or endpoints configured, no flow will be flagged");
    }
    Ok(())
  }
  /// Hostname fragments selecting in-scope flows.
  #[inline]
  pub fn hosts(&self) -> &[String] {
    &self.hosts
  }
  /// Interest keywords matched against URLs and text request bodies.
  #[inline]
  pub fn keywords(&self) -> &[String] {
    &self.keywords
  }
  /// Interesting URL path fragments.
  #[inline]
  pub fn endpoints(&self) -> &[String] {
    &self.endpoints
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_normalizes_patterns() {
    let config = MatchConfig::new(["API.Example.COM", "  "], ["Queue "], Vec::<String>::new());
    assert_eq!(config.hosts(), ["api.example.com"]);
    assert_eq!(config.keywords(), ["queue"]);
    assert!(config.endpoints().is_empty());
  }

  #[test]
  fn from_json_accepts_partial_documents() {
    let config = MatchConfig::from_json(r#"{"hosts": ["dealer.example.com"]}"#).unwrap();
    assert_eq!(config.hosts(), ["dealer.example.com"]);
    assert!(config.keywords().is_empty());
    assert!(config.endpoints().is_empty());
  }

  #[test]
  fn from_json_rejects_empty_hosts() {
    let err = MatchConfig::from_json(r#"{"keywords": ["queue"]}"#).unwrap_err();
    assert!(matches!(err, crate::Error::Config(_)));
  }

  #[test]
  fn from_json_rejects_malformed_documents() {
    let err = MatchConfig::from_json("{hosts: [").unwrap_err();
    assert!(matches!(err, crate::Error::Json(_)));
  }

  #[test]
  fn from_json_file_round_trip() {
    let path = std::env::temp_dir().join("flowlens-config-test.json");
    std::fs::write(
      &path,
      r#"{"hosts": ["accounts.example.com"], "keywords": ["shuffle"], "endpoints": ["/queue"]}"#,
    )
    .unwrap();
    let config = MatchConfig::from_json_file(&path).unwrap();
    assert_eq!(config.hosts(), ["accounts.example.com"]);
    assert_eq!(config.keywords(), ["shuffle"]);
    assert_eq!(config.endpoints(), ["/queue"]);
    std::fs::remove_file(&path).ok();
  }
}
