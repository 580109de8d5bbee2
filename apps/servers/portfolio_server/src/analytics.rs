pub mod dto;
pub mod redact;
pub mod service;

pub use dto::{TrackEventDto, TrackRequestDto, TrackResponse};
pub use redact::{hash_identifier, redact_metadata};
pub use service::{AnalyticsService, ClientInfo, IngestResult, DISABLED_MESSAGE};
