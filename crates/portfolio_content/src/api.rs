use crate::error::{ContentError, Result};
use crate::filter::ListFilter;
use crate::model::{Language, PortfolioData, Post, Project};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Artificial latency of every call, long enough to see loading skeletons.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

const EN_FIXTURE: &str = include_str!("../data/en.json");
const PT_FIXTURE: &str = include_str!("../data/pt.json");

/// In-memory content source with a fixed simulated network delay.
///
/// Cheap to clone; the parsed fixtures are shared.
#[derive(Debug, Clone)]
pub struct MockContentApi {
	en: Arc<PortfolioData>,
	pt: Arc<PortfolioData>,
	delay: Duration,
}

fn parse(language: Language, raw: &str) -> Result<Arc<PortfolioData>> {
	serde_json::from_str(raw).map(Arc::new).map_err(|source| ContentError::Fixture { language, source })
}

impl MockContentApi {
	/// Parse the bundled English and Portuguese fixtures.
	pub fn load() -> Result<Self> {
		Ok(Self {
			en: parse(Language::En, EN_FIXTURE)?,
			pt: parse(Language::Pt, PT_FIXTURE)?,
			delay: DEFAULT_DELAY,
		})
	}

	#[must_use]
	pub const fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	#[must_use]
	pub const fn delay(&self) -> Duration {
		self.delay
	}

	fn data(&self, lang: Language) -> &Arc<PortfolioData> {
		match lang {
			Language::En => &self.en,
			Language::Pt => &self.pt,
		}
	}

	async fn respond(&self) {
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
	}

	#[instrument(skip(self))]
	pub async fn portfolio(&self, lang: Language) -> Arc<PortfolioData> {
		self.respond().await;
		self.data(lang).clone()
	}

	#[instrument(skip(self))]
	pub async fn posts(&self, lang: Language, filter: &ListFilter) -> Vec<Post> {
		self.respond().await;
		let posts = filter.apply(&self.data(lang).posts);
		tracing::debug!(count = posts.len(), "posts listed");
		posts
	}

	#[instrument(skip(self))]
	pub async fn post(&self, lang: Language, slug: &str) -> Option<Post> {
		self.respond().await;
		self.data(lang).posts.iter().find(|p| p.slug == slug).cloned()
	}

	#[instrument(skip(self))]
	pub async fn projects(&self, lang: Language, filter: &ListFilter) -> Vec<Project> {
		self.respond().await;
		let projects = filter.apply(&self.data(lang).projects);
		tracing::debug!(count = projects.len(), "projects listed");
		projects
	}

	#[instrument(skip(self))]
	pub async fn project(&self, lang: Language, id: u32) -> Option<Project> {
		self.respond().await;
		self.data(lang).projects.iter().find(|p| p.id == id).cloned()
	}
}
