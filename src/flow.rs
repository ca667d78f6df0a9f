use std::fmt::{Debug, Formatter};

use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};

use crate::body::Body;
#[cfg(feature = "charset")]
use encoding_rs::{Encoding, UTF_8};
#[cfg(feature = "charset")]
use mime::Mime;

/// A read-only projection of one HTTP transaction.
///
/// The host proxy engine constructs a `FlowView` per observed
/// transaction from its own internal flow representation and hands it
/// to the observer hooks; nothing in this crate retains it beyond the
/// call. The response half is optional because the request phase of a
/// transaction is observed before any response exists.
///
/// # Examples
///
/// ```rust
/// use flowlens::FlowView;
///
/// let flow = FlowView::builder()
///   .method(http::Method::GET)
///   .uri("https://api.example.com/v1/queue/next".parse().unwrap())
///   .build();
/// assert_eq!(flow.host(), "api.example.com");
/// ```
#[derive(Default, Clone, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct FlowView {
  host: String,
  #[serde(with = "http_serde::method")]
  method: Method,
  #[serde(with = "http_serde::uri")]
  uri: Uri,
  #[serde(with = "http_serde::header_map")]
  request_headers: HeaderMap<HeaderValue>,
  #[serde(default)]
  request_body: Option<Body>,
  #[serde(default, with = "http_serde::option::status_code")]
  status_code: Option<StatusCode>,
  #[serde(default, with = "http_serde::option::header_map")]
  response_headers: Option<HeaderMap<HeaderValue>>,
  #[serde(default)]
  response_body: Option<Body>,
}

impl Debug for FlowView {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FlowView")
      .field("host", &self.host)
      .field("method", &self.method)
      .field("uri", &self.uri)
      .field("request_headers", &self.request_headers)
      .field("request_body", &self.request_body)
      .field("status_code", &self.status_code)
      .field("response_headers", &self.response_headers)
      .field("response_body", &self.response_body)
      .finish()
  }
}

impl FlowView {
  /// A flow view builder
  ///
  /// This type can be used to construct an instance of `FlowView`
  /// through a builder-like pattern.
  pub fn builder() -> FlowViewBuilder {
    FlowViewBuilder::default()
  }
  /// Get the host this flow was addressed to.
  #[inline]
  pub fn host(&self) -> &str {
    &self.host
  }
  /// Get the request `Method` of this flow.
  #[inline]
  pub fn method(&self) -> &Method {
    &self.method
  }
  /// Get the full request `Uri` of this flow.
  #[inline]
  pub fn uri(&self) -> &Uri {
    &self.uri
  }
  /// Get the request `Headers` of this flow.
  #[inline]
  pub fn request_headers(&self) -> &HeaderMap {
    &self.request_headers
  }
  /// Get the request body, if one was captured.
  #[inline]
  pub fn request_body(&self) -> Option<&Body> {
    self.request_body.as_ref()
  }
  /// Get the response `StatusCode`, once a response has been observed.
  #[inline]
  pub fn status_code(&self) -> Option<StatusCode> {
    self.status_code
  }
  /// Get the response `Headers`, once a response has been observed.
  #[inline]
  pub fn response_headers(&self) -> Option<&HeaderMap> {
    self.response_headers.as_ref()
  }
  /// Get the response body, if one was captured.
  #[inline]
  pub fn response_body(&self) -> Option<&Body> {
    self.response_body.as_ref()
  }
  /// Decode the request body as text.
  ///
  /// Returns `None` when no body was captured or the body is not
  /// decodable text. With the `charset` feature the `charset` parameter
  /// of the request `Content-Type` header is honored; otherwise the
  /// body must be strict UTF-8.
  pub fn request_text(&self) -> Option<String> {
    let body = self.request_body.as_ref()?;
    decode_body(body, Some(&self.request_headers))
  }
  /// Decode the response body as text.
  ///
  /// Same decoding rules as [`FlowView::request_text`], driven by the
  /// response `Content-Type` header.
  pub fn response_text(&self) -> Option<String> {
    let body = self.response_body.as_ref()?;
    decode_body(body, self.response_headers.as_ref())
  }
}

/// 获取编码并且尝试解码
#[cfg(feature = "charset")]
fn decode_body(body: &Body, headers: Option<&HeaderMap>) -> Option<String> {
  let content_type = headers
    .and_then(|h| h.get(http::header::CONTENT_TYPE))
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.parse::<Mime>().ok());
  let label = content_type
    .as_ref()
    .and_then(|mime| mime.get_param("charset").map(|charset| charset.as_str()))
    .unwrap_or("utf-8");
  let encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
  let (text, _, had_errors) = encoding.decode(body);
  if had_errors {
    None
  } else {
    Some(text.into_owned())
  }
}

#[cfg(not(feature = "charset"))]
fn decode_body(body: &Body, _headers: Option<&HeaderMap>) -> Option<String> {
  body.as_text().map(|s| s.to_string())
}

/// A builder to construct the properties of a `FlowView`.
///
/// The host is optional: when unset it is taken from the URI authority,
/// so a host engine that only has the full URL at hand does not need to
/// split it itself.
#[derive(Debug, Default, Clone)]
pub struct FlowViewBuilder {
  host: Option<String>,
  method: Method,
  uri: Uri,
  request_headers: HeaderMap<HeaderValue>,
  request_body: Option<Body>,
  status_code: Option<StatusCode>,
  response_headers: Option<HeaderMap<HeaderValue>>,
  response_body: Option<Body>,
}

impl FlowViewBuilder {
  /// Set the host this flow was addressed to.
  pub fn host<H: Into<String>>(mut self, host: H) -> FlowViewBuilder {
    self.host = Some(host.into());
    self
  }
  /// Set the request method.
  pub fn method(mut self, method: Method) -> FlowViewBuilder {
    self.method = method;
    self
  }
  /// Set the full request URI.
  pub fn uri(mut self, uri: Uri) -> FlowViewBuilder {
    self.uri = uri;
    self
  }
  /// Replace the request header map.
  pub fn request_headers(mut self, headers: HeaderMap) -> FlowViewBuilder {
    self.request_headers = headers;
    self
  }
  /// Append one request header.
  pub fn request_header(mut self, key: HeaderName, value: HeaderValue) -> FlowViewBuilder {
    self.request_headers.append(key, value);
    self
  }
  /// Set the request body.
  pub fn request_body<T: Into<Body>>(mut self, body: T) -> FlowViewBuilder {
    self.request_body = Some(body.into());
    self
  }
  /// Set the response status code.
  pub fn status_code(mut self, status_code: StatusCode) -> FlowViewBuilder {
    self.status_code = Some(status_code);
    self
  }
  /// Replace the response header map.
  pub fn response_headers(mut self, headers: HeaderMap) -> FlowViewBuilder {
    self.response_headers = Some(headers);
    self
  }
  /// Append one response header.
  pub fn response_header(mut self, key: HeaderName, value: HeaderValue) -> FlowViewBuilder {
    self
      .response_headers
      .get_or_insert_with(HeaderMap::new)
      .append(key, value);
    self
  }
  /// Set the response body.
  pub fn response_body<T: Into<Body>>(mut self, body: T) -> FlowViewBuilder {
    self.response_body = Some(body.into());
    self
  }
  /// Build a `FlowView`, falling back to the URI host when no explicit
  /// host was set.
  pub fn build(self) -> FlowView {
    let host = match self.host {
      Some(host) => host,
      None => self.uri.host().unwrap_or_default().to_string(),
    };
    FlowView {
      host,
      method: self.method,
      uri: self.uri,
      request_headers: self.request_headers,
      request_body: self.request_body,
      status_code: self.status_code,
      response_headers: self.response_headers,
      response_body: self.response_body,
    }
  }
}
