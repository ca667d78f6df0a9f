use crate::config::MatchConfig;
use crate::flow::FlowView;

/// The verdict for one flow.
///
/// Computed fresh on every call and never cached: the request and
/// response phases of the same transaction evaluate independently, and
/// a body captured later may change the interest verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
  /// The flow is addressed to the monitored service.
  pub target_service: bool,
  /// The flow also matches the interest predicate. Only ever true for
  /// in-scope flows.
  pub interesting: bool,
}

impl Classification {
  /// Whether a reporter should emit anything for this flow.
  #[inline]
  pub fn reportable(&self) -> bool {
    self.target_service
  }
}

/// Classifies flows against a [`MatchConfig`].
///
/// Classification is a pure function of the flow and the configuration:
/// no side effects, no state across calls, safe to invoke concurrently
/// from any number of flows.
#[derive(Debug, Clone)]
pub struct Classifier {
  config: MatchConfig,
}

impl Classifier {
  /// Create a classifier. The configuration is normalized once so the
  /// per-flow hot path only folds the flow side.
  pub fn new(config: MatchConfig) -> Self {
    Classifier {
      config: config.normalized(),
    }
  }
  /// Get the match configuration driving this classifier.
  pub fn config(&self) -> &MatchConfig {
    &self.config
  }
  /// Whether the flow is addressed to the monitored service.
  ///
  /// The case-folded flow host is matched by substring, so
  /// `spclient.wg.example.com` matches a configured `example.com`.
  pub fn is_target_service(&self, flow: &FlowView) -> bool {
    let host = flow.host().to_lowercase();
    self.config.hosts().iter().any(|h| host.contains(h.as_str()))
  }
  /// Whether the flow matches the interest predicate.
  ///
  /// True when the lower-cased URL contains any keyword or endpoint
  /// fragment, or when a text request body contains any keyword. Checks
  /// run cheapest first: both URL scans happen before the body is
  /// decoded, and a body that is not text is a non-match, never an
  /// error.
  pub fn is_interesting(&self, flow: &FlowView) -> bool {
    let url = flow.uri().to_string().to_lowercase();
    if self.config.keywords().iter().any(|k| url.contains(k.as_str())) {
      return true;
    }
    if self.config.endpoints().iter().any(|e| url.contains(e.as_str())) {
      return true;
    }
    if !self.config.keywords().is_empty() {
      if let Some(text) = flow.request_text() {
        let text = text.to_lowercase();
        return self.config.keywords().iter().any(|k| text.contains(k.as_str()));
      }
    }
    false
  }
  /// Classify one flow.
  ///
  /// The interest predicate is only evaluated for in-scope flows, so an
  /// out-of-scope flow never pays for body decoding.
  pub fn classify(&self, flow: &FlowView) -> Classification {
    let target_service = self.is_target_service(flow);
    let interesting = target_service && self.is_interesting(flow);
    tracing::trace!(
      host = %flow.host(),
      target_service,
      interesting,
      "classified flow"
    );
    Classification {
      target_service,
      interesting,
    }
  }
}
