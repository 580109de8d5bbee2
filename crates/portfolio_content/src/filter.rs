//! Tag and free-text filtering for the blog and project lists.

use crate::model::{Post, Project};
use serde::Deserialize;

/// Filter applied to list pages. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListFilter {
	#[serde(default)]
	pub tag: Option<String>,
	#[serde(default, rename = "q")]
	pub text: Option<String>,
}

impl ListFilter {
	#[must_use]
	pub fn tag(mut self, tag: impl Into<String>) -> Self {
		self.tag = Some(tag.into());
		self
	}

	#[must_use]
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	/// Tags match exactly; text is a case-insensitive substring of the title
	/// or the description.
	#[must_use]
	pub fn matches<T: Listed + ?Sized>(&self, item: &T) -> bool {
		let tag_ok = match self.tag.as_deref().filter(|t| !t.is_empty()) {
			Some(tag) => item.tags().iter().any(|t| t == tag),
			None => true,
		};
		let text_ok = match self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
			Some(text) => {
				let needle = text.to_lowercase();
				item.title().to_lowercase().contains(&needle) || item.desc().to_lowercase().contains(&needle)
			}
			None => true,
		};
		tag_ok && text_ok
	}

	#[must_use]
	pub fn apply<T: Listed + Clone>(&self, items: &[T]) -> Vec<T> {
		items.iter().filter(|item| self.matches(*item)).cloned().collect()
	}
}

/// Something that shows up in a list page.
pub trait Listed {
	fn title(&self) -> &str;
	fn desc(&self) -> &str;
	fn tags(&self) -> &[String];
}

impl Listed for Post {
	fn title(&self) -> &str {
		&self.title
	}

	fn desc(&self) -> &str {
		&self.desc
	}

	fn tags(&self) -> &[String] {
		&self.tags
	}
}

impl Listed for Project {
	fn title(&self) -> &str {
		&self.title
	}

	fn desc(&self) -> &str {
		&self.desc
	}

	fn tags(&self) -> &[String] {
		&self.tags
	}
}
