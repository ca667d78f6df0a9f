//! Flow observation interfaces
//!
//! The host proxy engine owns the protocol handling; this crate only
//! looks at what the engine captured. These traits are the registration
//! seam: the engine constructs observers once, registers them, and
//! notifies them per flow event.

use crate::flow::FlowView;
use std::sync::Arc;

/// Trait for observing captured HTTP requests
///
/// Observation is one-way: implementors may not modify, block, or fail
/// the flow, so the hook returns nothing.
#[async_trait::async_trait]
pub trait RequestObserver: Send + Sync {
  /// Called once per observed request event.
  async fn observe_request(&self, flow: &FlowView);
}

/// Trait for observing captured HTTP responses
#[async_trait::async_trait]
pub trait ResponseObserver: Send + Sync {
  /// Called once per observed response event.
  async fn observe_response(&self, flow: &FlowView);
}

/// Combined observer registry
///
/// Holds the observers a host engine registered and fans each flow
/// event out to them in registration order.
pub struct ObserverRegistry {
  request_observers: Vec<Arc<dyn RequestObserver>>,
  response_observers: Vec<Arc<dyn ResponseObserver>>,
}

impl ObserverRegistry {
  /// Create a new observer registry
  pub fn new() -> Self {
    Self {
      request_observers: Vec::new(),
      response_observers: Vec::new(),
    }
  }

  /// Add a request observer
  pub fn register_request_observer(&mut self, observer: Arc<dyn RequestObserver>) {
    self.request_observers.push(observer);
  }

  /// Add a response observer
  pub fn register_response_observer(&mut self, observer: Arc<dyn ResponseObserver>) {
    self.response_observers.push(observer);
  }

  /// Notify all request observers of one flow
  pub async fn notify_request(&self, flow: &FlowView) {
    for observer in &self.request_observers {
      observer.observe_request(flow).await;
    }
  }

  /// Notify all response observers of one flow
  pub async fn notify_response(&self, flow: &FlowView) {
    for observer in &self.response_observers {
      observer.observe_response(flow).await;
    }
  }

  /// Check if any observers are registered
  pub fn has_observers(&self) -> bool {
    !self.request_observers.is_empty() || !self.response_observers.is_empty()
  }
}

impl Default for ObserverRegistry {
  fn default() -> Self {
    Self::new()
  }
}
