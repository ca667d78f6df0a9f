use std::fmt;
use std::ops::Deref;

use bytes::Bytes;

/// A captured message body.
///
/// Bodies arrive from the host proxy engine as raw bytes; whether they
/// are text is only decided at inspection time, through the fallible
/// [`Body::as_text`] (strict UTF-8) or the charset-aware decode on
/// [`crate::FlowView`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Body {
  inner: Bytes,
}

impl Deref for Body {
  type Target = Bytes;

  fn deref(&self) -> &Self::Target {
    &self.inner
  }
}

impl Body {
  /// Interpret the body as UTF-8 text.
  ///
  /// Returns `None` for non-text content instead of failing: a binary
  /// body is a normal observation, not an error.
  pub fn as_text(&self) -> Option<&str> {
    std::str::from_utf8(&self.inner).ok()
  }
}

impl From<Bytes> for Body {
  #[inline]
  fn from(b: Bytes) -> Body {
    Body { inner: b }
  }
}

impl From<String> for Body {
  #[inline]
  fn from(s: String) -> Body {
    s.into_bytes().into()
  }
}

impl From<&'static str> for Body {
  #[inline]
  fn from(s: &'static str) -> Body {
    s.as_bytes().into()
  }
}

impl From<&'static [u8]> for Body {
  #[inline]
  fn from(s: &'static [u8]) -> Body {
    Body {
      inner: Bytes::from_static(s),
    }
  }
}

impl From<Vec<u8>> for Body {
  #[inline]
  fn from(v: Vec<u8>) -> Body {
    Body { inner: v.into() }
  }
}

impl fmt::Debug for Body {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self.as_text() {
      Some(s) => fmt::Display::fmt(s, f),
      None => fmt::Debug::fmt(&self.inner, f),
    }
  }
}

impl fmt::Display for Body {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self.as_text() {
      Some(s) => fmt::Display::fmt(s, f),
      None => fmt::Debug::fmt(&self.inner, f),
    }
  }
}

impl serde::Serialize for Body {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_bytes(&self.inner)
  }
}

impl<'de> serde::Deserialize<'de> for Body {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let s = Vec::deserialize(deserializer)?;
    Ok(Body::from(s))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_body_decodes() {
    let body = Body::from("queue up the next track");
    assert_eq!(body.as_text(), Some("queue up the next track"));
  }

  #[test]
  fn binary_body_is_not_text() {
    let body = Body::from(vec![0xff, 0xfe, 0x00, 0x9c]);
    assert!(body.as_text().is_none());
    assert_eq!(body.len(), 4);
  }

  #[test]
  fn empty_body_is_empty_text() {
    let body = Body::default();
    assert_eq!(body.as_text(), Some(""));
    assert!(body.is_empty());
  }
}
