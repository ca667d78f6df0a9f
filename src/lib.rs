#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # flowlens
//!
//! The `flowlens` crate classifies HTTP(S) flows captured by an
//! intercepting proxy and reports the ones worth an operator's
//! attention.
//!
//! It is a pure observer: the host proxy engine terminates TLS, parses
//! HTTP and manages connections, then hands each captured transaction
//! to this crate as a [`FlowView`]. `flowlens` decides whether the flow
//! belongs to the monitored service, whether it matches the interest
//! heuristics, and prints a compact report (truncated bodies, redacted
//! credentials) to the console. Nothing flows back into the proxy.
//!
//! ## Classifying and reporting a flow
//!
//! ```rust
//! use flowlens::{FlowView, MatchConfig, ServiceMonitor};
//!
//! let config = MatchConfig::new(
//!   ["api.example.com"],
//!   ["queue", "shuffle"],
//!   ["/v1/me/player"],
//! );
//! let monitor = ServiceMonitor::new(config);
//!
//! let flow = FlowView::builder()
//!   .method(flowlens::Method::GET)
//!   .uri("https://api.example.com/v1/queue/next".parse().unwrap())
//!   .build();
//!
//! let classification = monitor.inspect_request(&flow);
//! assert!(classification.target_service);
//! assert!(classification.interesting);
//! ```
//!
//! ## Registering with a host engine
//!
//! Hosts drive observers through the [`ObserverRegistry`] seam instead
//! of a global addon list:
//!
//! ```rust
//! use flowlens::{MatchConfig, ObserverRegistry, ServiceMonitor};
//! use std::sync::Arc;
//!
//! let monitor = Arc::new(ServiceMonitor::new(MatchConfig::new(
//!   ["accounts.example.com"],
//!   ["token"],
//!   Vec::<String>::new(),
//! )));
//! let mut registry = ObserverRegistry::new();
//! registry.register_request_observer(monitor.clone());
//! registry.register_response_observer(monitor);
//! assert!(registry.has_observers());
//! ```
//!
//! ## Configuration
//!
//! The heuristic lists are an operational concern, not a code one:
//! [`MatchConfig::from_json_file`] loads them from a JSON document so
//! they can be tuned without rebuilding.
//!
//! ## Optional Features
//!
//! The following are a list of [Cargo features][cargo-features] that can be
//! enabled or disabled:
//!
//! - **charset** *(enabled by default)*: Improved support for decoding
//!   text: body decoding honors the `charset` parameter of the
//!   `Content-Type` header instead of requiring strict UTF-8.
//!
//! [cargo-features]: https://doc.rust-lang.org/cargo/reference/features.html
mod body;
mod classifier;
mod config;
mod errors;
mod flow;
mod monitor;
pub mod observer;
mod reporter;

pub use body::Body;
pub use classifier::{Classification, Classifier};
pub use config::MatchConfig;
pub use errors::{Error, Result};
pub use flow::{FlowView, FlowViewBuilder};
pub use http::header;
pub use http::uri;
pub use http::Method;
pub use http::{StatusCode, Version};
pub use monitor::ServiceMonitor;
pub use observer::{ObserverRegistry, RequestObserver, ResponseObserver};
pub use reporter::{ReportStyle, Reporter};
