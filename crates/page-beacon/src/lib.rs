//! Page Telemetry Crate
//!
//! Batches page analytics events (page views, clicks, section visibility) and
//! ships them to the collection endpoint without ever blocking the page.
//!
//! # Architecture
//!
//! - [`TelemetryClient`] owns the FIFO queue and flushes one batch at a time.
//! - [`producers`] turn DOM observations into events.
//! - [`Transport`] delivers serialized batches: the host's beacon when it has
//!   one, otherwise a keep-alive `POST`.
//! - [`Environment`] is the seam to the host page; [`SimulatedPage`] is the
//!   in-memory implementation used by tests and demos.
//! - [`PageSession`] wires them together and serves every flush trigger from
//!   one task.
//!
//! # Example
//!
//! ```rust,no_run
//! use page_beacon::{BeaconConfig, PageSession, SimulatedPage};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> page_beacon::Result<()> {
//!     let page = SimulatedPage::new("https://fabio.dev/")?;
//!     let handle = page.handle();
//!
//!     let shutdown = CancellationToken::new();
//!     let session = PageSession::start(page, BeaconConfig::default())?.spawn(shutdown.clone());
//!
//!     handle.hide();
//!     handle.wait_for_deliveries(1).await;
//!
//!     shutdown.cancel();
//!     let stats = session.await.expect("session task panicked");
//!     println!("sent {} events", stats.sent);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dom;
pub mod environment;
pub mod error;
pub mod event;
pub mod producers;
pub mod queue;
pub mod session;
pub mod simulated;
pub mod transport;

pub use client::{ClientStats, FlushReport, FlushTrigger, TelemetryClient};
pub use config::{BeaconConfig, OutboundPolicy, QueueLimit, DEFAULT_ENDPOINT};
pub use dom::{Element, Location};
pub use environment::{BeaconSink, Environment, IntersectionEntry, PageSignal, SignalSender};
pub use error::{BeaconError, Result};
pub use event::{EventFields, EventName, TelemetryEvent, TrackRequest};
pub use queue::EventQueue;
pub use session::PageSession;
pub use simulated::{Delivery, PageHandle, SimulatedPage};
pub use transport::{select_transport, BeaconTransport, KeepAliveTransport, Transport, TransportKind};
