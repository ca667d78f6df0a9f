//! Integration tests for flowlens

use flowlens::{FlowView, MatchConfig, ObserverRegistry, ReportStyle, Reporter, ServiceMonitor};
use http::HeaderValue;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Shared capture sink standing in for the operator console.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
  fn contents(&self) -> String {
    String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
  }
}

impl Write for SharedBuf {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.0.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }
  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

fn test_config() -> MatchConfig {
  MatchConfig::new(
    ["api.example.com", "spclient.wg.example.com"],
    ["queue", "shuffle", "radio"],
    ["/v1/me/player", "/connect-state"],
  )
}

fn capturing_monitor() -> (ServiceMonitor, SharedBuf) {
  let buf = SharedBuf::default();
  let reporter = Reporter::with_writer(ReportStyle::default(), buf.clone());
  (ServiceMonitor::with_reporter(test_config(), reporter), buf)
}

#[test]
fn test_out_of_scope_flow_is_silent() {
  let (monitor, buf) = capturing_monitor();

  let flow = FlowView::builder()
    .uri("https://cdn.other.net/v1/queue/next".parse().unwrap())
    .request_body("shuffle everything")
    .build();

  let classification = monitor.inspect_request(&flow);
  assert!(!classification.target_service, "host must not match");
  monitor.inspect_response(&flow);

  assert!(
    buf.contents().is_empty(),
    "out-of-scope flows must produce no output"
  );
}

#[test]
fn test_in_scope_flow_gets_exactly_one_tag() {
  let (monitor, buf) = capturing_monitor();

  let observed = FlowView::builder()
    .uri("https://api.example.com/v1/tracks/42".parse().unwrap())
    .build();
  monitor.inspect_request(&observed);

  let out = buf.contents();
  assert_eq!(out.matches("-- observed").count(), 1);
  assert_eq!(out.matches(">> FLAGGED").count(), 0);

  let flagged = FlowView::builder()
    .uri("https://api.example.com/v1/queue/next".parse().unwrap())
    .build();
  monitor.inspect_request(&flagged);

  let out = buf.contents();
  assert_eq!(out.matches("-- observed").count(), 1);
  assert_eq!(out.matches(">> FLAGGED").count(), 1);
}

#[test]
fn test_keyword_in_url_is_interesting() {
  let (monitor, _buf) = capturing_monitor();

  let flow = FlowView::builder()
    .uri("https://api.example.com/v1/queue/next".parse().unwrap())
    .build();

  assert!(monitor.classifier().is_interesting(&flow));
}

#[test]
fn test_binary_body_falls_back_to_url_checks() {
  let (monitor, buf) = capturing_monitor();

  // body check must contribute false without raising; the URL keyword
  // still flags the flow
  let flow = FlowView::builder()
    .method(http::Method::POST)
    .uri("https://api.example.com/v1/queue".parse().unwrap())
    .request_body(vec![0x00, 0xff, 0xfe, 0x9c, 0x80, 0x80])
    .build();

  let classification = monitor.inspect_request(&flow);
  assert!(classification.interesting);
  assert!(buf.contents().contains("  Request Body: <binary data, 6 bytes>"));
}

#[test]
fn test_authorization_value_is_truncated_to_twenty_characters() {
  let (monitor, buf) = capturing_monitor();

  let value = "abcdefghijklmnopqrstuvwxyz1234";
  assert_eq!(value.len(), 30);
  let flow = FlowView::builder()
    .uri("https://api.example.com/v1/me".parse().unwrap())
    .request_header(http::header::AUTHORIZATION, HeaderValue::from_static(value))
    .build();
  monitor.inspect_request(&flow);

  let out = buf.contents();
  assert!(
    out.contains("  Authorization: abcdefghijklmnopqrst...\n"),
    "expected the first 20 characters plus the marker, got:\n{out}"
  );
  assert!(!out.contains(value), "full credential must never be emitted");
}

#[test]
fn test_json_response_body_is_pretty_printed_and_truncated() {
  let (monitor, buf) = capturing_monitor();

  let body = format!(r#"{{"data":"{}"}}"#, "x".repeat(989));
  assert_eq!(body.chars().count(), 1000);

  let flow = FlowView::builder()
    .uri("https://api.example.com/v1/queue/next".parse().unwrap())
    .status_code(http::StatusCode::OK)
    .response_header(
      http::header::CONTENT_TYPE,
      HeaderValue::from_static("application/json"),
    )
    .response_body(body.clone())
    .build();
  monitor.inspect_response(&flow);

  let value: serde_json::Value = serde_json::from_str(&body).unwrap();
  let pretty = serde_json::to_string_pretty(&value).unwrap();
  let preview: String = pretty.chars().take(500).collect();

  let out = buf.contents();
  assert!(out.contains("  Response: 200"));
  assert!(
    out.contains(&format!("  Response Body: {preview}...")),
    "expected the pretty-printed body truncated to 500 characters"
  );
}

#[test]
fn test_non_json_response_body_is_truncated_shorter() {
  let (monitor, buf) = capturing_monitor();

  let body = format!(r#"{{"data":"{}"}}"#, "x".repeat(989));
  let flow = FlowView::builder()
    .uri("https://api.example.com/v1/queue/next".parse().unwrap())
    .status_code(http::StatusCode::OK)
    .response_header(
      http::header::CONTENT_TYPE,
      HeaderValue::from_static("text/plain"),
    )
    .response_body(body.clone())
    .build();
  monitor.inspect_response(&flow);

  let preview: String = body.chars().take(200).collect();
  assert!(
    buf.contents().contains(&format!("  Response Body: {preview}...")),
    "non-JSON bodies use the 200 character preview"
  );
}

#[test]
fn test_classification_is_idempotent() {
  let (monitor, _buf) = capturing_monitor();

  let flow = FlowView::builder()
    .uri("https://spclient.wg.example.com/connect-state/v1/devices".parse().unwrap())
    .request_body("seed=blend")
    .build();

  let first = monitor.classifier().classify(&flow);
  let second = monitor.classifier().classify(&flow);
  assert_eq!(first, second);
  assert!(first.target_service);
  assert!(first.interesting);
}

#[tokio::test]
async fn test_registry_fans_out_to_registered_monitor() {
  let buf = SharedBuf::default();
  let reporter = Reporter::with_writer(ReportStyle::default(), buf.clone());
  let monitor = Arc::new(ServiceMonitor::with_reporter(test_config(), reporter));

  let mut registry = ObserverRegistry::new();
  assert!(!registry.has_observers());
  registry.register_request_observer(monitor.clone());
  registry.register_response_observer(monitor);
  assert!(registry.has_observers());

  let flow = FlowView::builder()
    .uri("https://api.example.com/v1/me/player/devices".parse().unwrap())
    .status_code(http::StatusCode::OK)
    .response_header(
      http::header::CONTENT_TYPE,
      HeaderValue::from_static("application/json"),
    )
    .response_body(r#"{"devices": []}"#)
    .build();

  registry.notify_request(&flow).await;
  registry.notify_response(&flow).await;

  let out = buf.contents();
  assert!(out.contains(">> FLAGGED"));
  assert!(out.contains("  Response: 200"));
  assert!(out.contains("\"devices\": []"));
}

#[test]
fn test_concurrent_reports_do_not_interleave() {
  let (monitor, buf) = capturing_monitor();
  let monitor = Arc::new(monitor);

  let handles: Vec<_> = (0..8)
    .map(|i| {
      let monitor = monitor.clone();
      std::thread::spawn(move || {
        let flow = FlowView::builder()
          .uri(
            format!("https://api.example.com/v1/queue/item{i}")
              .parse()
              .unwrap(),
          )
          .build();
        monitor.inspect_request(&flow);
      })
    })
    .collect();
  for handle in handles {
    handle.join().unwrap();
  }

  let out = buf.contents();
  for i in 0..8 {
    assert_eq!(
      out
        .matches(&format!("  GET https://api.example.com/v1/queue/item{i}"))
        .count(),
      1
    );
  }
  // every tag line must be immediately followed by its own request line
  let lines: Vec<&str> = out.lines().collect();
  for (index, line) in lines.iter().enumerate() {
    if line.contains(">> FLAGGED") {
      assert!(
        lines[index + 1].starts_with("  GET https://api.example.com/"),
        "report torn apart by a concurrent writer:\n{out}"
      );
    }
  }
}
