use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::Mutex;

use crate::flow::FlowView;

/// Longest authorization prefix ever shown. The full credential is
/// never emitted.
const AUTH_PREVIEW_CHARS: usize = 20;
/// Request body preview length.
const REQUEST_BODY_CHARS: usize = 200;
/// Pretty-printed structured response body preview length.
const JSON_BODY_CHARS: usize = 500;
/// Fallback preview length when a claimed-JSON body fails to parse.
const RAW_BODY_CHARS: usize = 300;
/// Plain text response body preview length.
const PLAIN_BODY_CHARS: usize = 200;
/// Truncation marker appended to every shortened value.
const ELLIPSIS: &str = "...";

/// Presentation options for a [`Reporter`].
///
/// The tags keep flagged and merely-observed flows visually apart in a
/// scrolling console; the header allow-list names the request headers
/// worth echoing, including the service-specific auth token header.
#[derive(Debug, Clone)]
pub struct ReportStyle {
  /// Tag emitted for flows matching the interest predicate.
  pub flagged_tag: String,
  /// Tag emitted for in-scope flows that are not interesting.
  pub observed_tag: String,
  /// Request headers echoed into reports, matched case-insensitively.
  pub headers: Vec<String>,
}

impl Default for ReportStyle {
  fn default() -> Self {
    ReportStyle {
      flagged_tag: ">> FLAGGED".to_string(),
      observed_tag: "-- observed".to_string(),
      headers: vec![
        "authorization".to_string(),
        "x-auth-token".to_string(),
        "user-agent".to_string(),
      ],
    }
  }
}

/// Formats classified flows into human-readable console reports.
///
/// Reports are line-oriented and append-only, meant for operator review
/// rather than machine parsing. Each report is assembled off-lock and
/// written with a single locked write, so concurrently observed flows
/// never interleave inside one report. The reporter never fails: every
/// formatting problem degrades to a placeholder or an omitted field.
pub struct Reporter {
  style: ReportStyle,
  out: Mutex<Box<dyn Write + Send>>,
}

impl Reporter {
  /// Create a reporter writing to standard output.
  pub fn new() -> Self {
    Self::with_writer(ReportStyle::default(), std::io::stdout())
  }
  /// Create a stdout reporter with custom presentation options.
  pub fn with_style(style: ReportStyle) -> Self {
    Self::with_writer(style, std::io::stdout())
  }
  /// Create a reporter writing to an arbitrary sink.
  pub fn with_writer<W: Write + Send + 'static>(style: ReportStyle, writer: W) -> Self {
    Reporter {
      style,
      out: Mutex::new(Box::new(writer)),
    }
  }
  /// Report an observed request.
  ///
  /// Emits the timestamp and tag, the request line, the allow-listed
  /// headers (authorization truncated to its first
  /// 20 characters) and, for interesting flows only, the request body
  /// preview.
  pub fn report_request(&self, flow: &FlowView, interesting: bool) {
    let mut report = String::new();
    let tag = if interesting {
      &self.style.flagged_tag
    } else {
      &self.style.observed_tag
    };
    let _ = writeln!(report);
    let _ = writeln!(report, "[{}] {}", timestamp(), tag);
    let _ = writeln!(report, "  {} {}", flow.method(), flow.uri());
    for name in &self.style.headers {
      if let Some(value) = flow.request_headers().get(name.as_str()) {
        let value = String::from_utf8_lossy(value.as_bytes());
        let shown = if name.eq_ignore_ascii_case("authorization") {
          truncate_chars(&value, AUTH_PREVIEW_CHARS)
        } else {
          value
        };
        let _ = writeln!(report, "  {}: {}", title_case(name), shown);
      }
    }
    if interesting {
      if let Some(body) = flow.request_body() {
        match flow.request_text() {
          Some(text) if !text.is_empty() => {
            let _ = writeln!(
              report,
              "  Request Body: {}",
              truncate_chars(&text, REQUEST_BODY_CHARS)
            );
          }
          Some(_) => {}
          None => {
            let _ = writeln!(report, "  Request Body: <binary data, {} bytes>", body.len());
          }
        }
      }
    }
    self.emit(report);
  }
  /// Report an observed response.
  ///
  /// Emits nothing unless the flow is interesting. Structured bodies
  /// are re-serialized with indentation for readability; every decoding
  /// or parsing failure falls back to a shorter raw preview or a byte
  /// count placeholder.
  pub fn report_response(&self, flow: &FlowView, interesting: bool) {
    if !interesting {
      return;
    }
    let mut report = String::new();
    if let Some(status_code) = flow.status_code() {
      let _ = writeln!(report, "  Response: {}", status_code.as_u16());
    }
    if let Some(body) = flow.response_body() {
      match flow.response_text() {
        Some(text) => {
          let _ = writeln!(report, "  Response Body: {}", render_body(flow, &text));
        }
        None => {
          let _ = writeln!(report, "  Response Body: <binary data, {} bytes>", body.len());
        }
      }
    }
    if !report.is_empty() {
      self.emit(report);
    }
  }
  /// Write one assembled report.
  ///
  /// Failures are logged and swallowed: an observer must never block or
  /// abort the proxy pipeline over its own console.
  fn emit(&self, report: String) {
    let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Err(err) = out.write_all(report.as_bytes()).and_then(|_| out.flush()) {
      tracing::debug!("report write failed: {err}");
    }
  }
}

impl Default for Reporter {
  fn default() -> Self {
    Self::new()
  }
}

fn timestamp() -> impl std::fmt::Display {
  chrono::Local::now().format("%H:%M:%S")
}

/// Response bodies claiming to be JSON get pretty-printed before
/// truncation; everything else is previewed raw.
fn render_body<'a>(flow: &FlowView, text: &'a str) -> Cow<'a, str> {
  if content_type_is_json(flow) {
    match serde_json::from_str::<serde_json::Value>(text) {
      Ok(value) => match serde_json::to_string_pretty(&value) {
        Ok(pretty) => Cow::Owned(truncate_chars(&pretty, JSON_BODY_CHARS).into_owned()),
        Err(_) => truncate_chars(text, RAW_BODY_CHARS),
      },
      Err(_) => truncate_chars(text, RAW_BODY_CHARS),
    }
  } else {
    truncate_chars(text, PLAIN_BODY_CHARS)
  }
}

fn content_type_is_json(flow: &FlowView) -> bool {
  flow
    .response_headers()
    .and_then(|headers| headers.get(http::header::CONTENT_TYPE))
    .and_then(|value| value.to_str().ok())
    .map(|value| value.trim_start().to_ascii_lowercase().starts_with("application/json"))
    .unwrap_or(false)
}

/// Truncate to `max` characters plus a marker. Counts characters, not
/// bytes, so multi-byte sequences are never split.
fn truncate_chars(s: &str, max: usize) -> Cow<'_, str> {
  match s.char_indices().nth(max) {
    Some((index, _)) => Cow::Owned(format!("{}{}", &s[..index], ELLIPSIS)),
    None => Cow::Borrowed(s),
  }
}

/// `authorization` -> `Authorization`, `x-auth-token` -> `X-Auth-Token`.
fn title_case(name: &str) -> String {
  name
    .split('-')
    .map(|part| {
      let mut chars = part.chars();
      match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
      }
    })
    .collect::<Vec<_>>()
    .join("-")
}
