//! Classifier and reporter wired into one observer

use crate::classifier::{Classification, Classifier};
use crate::config::MatchConfig;
use crate::flow::FlowView;
use crate::observer::{RequestObserver, ResponseObserver};
use crate::reporter::Reporter;

/// The classifier+reporter pair for one monitored service.
///
/// A host proxy engine registers one `ServiceMonitor` per service it
/// wants watched. Out-of-scope flows are dropped without output; in-
/// scope flows get a request report, and flagged flows additionally get
/// a response report.
///
/// All state is read-only after construction, so one monitor may be
/// shared across any number of concurrent flows.
///
/// # Examples
///
/// ```rust
/// use flowlens::{FlowView, MatchConfig, ServiceMonitor};
///
/// let config = MatchConfig::new(["api.example.com"], ["queue"], ["/v1/me/player"]);
/// let monitor = ServiceMonitor::new(config);
/// let flow = FlowView::builder()
///   .uri("https://api.example.com/v1/queue/next".parse().unwrap())
///   .build();
/// let classification = monitor.inspect_request(&flow);
/// assert!(classification.interesting);
/// ```
pub struct ServiceMonitor {
  classifier: Classifier,
  reporter: Reporter,
}

impl ServiceMonitor {
  /// Create a monitor reporting to standard output.
  pub fn new(config: MatchConfig) -> Self {
    Self::with_reporter(config, Reporter::new())
  }
  /// Create a monitor with a custom reporter.
  pub fn with_reporter(config: MatchConfig, reporter: Reporter) -> Self {
    ServiceMonitor {
      classifier: Classifier::new(config),
      reporter,
    }
  }
  /// Get the classifier driving this monitor.
  pub fn classifier(&self) -> &Classifier {
    &self.classifier
  }
  /// Classify one request event and report it when in scope.
  ///
  /// This is the synchronous core of [`RequestObserver::observe_request`];
  /// hosts that are not async can call it directly. Returns the
  /// classification so callers can act on the verdict themselves.
  pub fn inspect_request(&self, flow: &FlowView) -> Classification {
    let classification = self.classifier.classify(flow);
    if classification.target_service {
      self.reporter.report_request(flow, classification.interesting);
    }
    classification
  }
  /// Classify one response event and report it when flagged.
  pub fn inspect_response(&self, flow: &FlowView) -> Classification {
    let classification = self.classifier.classify(flow);
    if classification.target_service {
      self.reporter.report_response(flow, classification.interesting);
    }
    classification
  }
}

#[async_trait::async_trait]
impl RequestObserver for ServiceMonitor {
  async fn observe_request(&self, flow: &FlowView) {
    self.inspect_request(flow);
  }
}

#[async_trait::async_trait]
impl ResponseObserver for ServiceMonitor {
  async fn observe_response(&self, flow: &FlowView) {
    self.inspect_response(flow);
  }
}
