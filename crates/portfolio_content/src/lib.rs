//! Portfolio content served to the site pages.
//!
//! The data is bundled per language and served by [`MockContentApi`], which
//! adds a fixed artificial delay to every call.

pub mod api;
pub mod error;
pub mod filter;
pub mod model;

pub use api::{MockContentApi, DEFAULT_DELAY};
pub use error::{ContentError, Result};
pub use filter::{ListFilter, Listed};
pub use model::{ExperienceItem, ItemKind, Language, PortfolioData, Post, Profile, Project, SocialLink, TimelineItem};
