//! Typed portfolio content, shaped like the JSON the pages consume.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Site language. Unknown codes fall back to English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
	#[default]
	En,
	Pt,
}

impl Language {
	#[must_use]
	pub fn from_code(code: &str) -> Self {
		match code.trim().to_ascii_lowercase().as_str() {
			"pt" | "pt-br" => Self::Pt,
			_ => Self::En,
		}
	}

	#[must_use]
	pub const fn code(self) -> &'static str {
		match self {
			Self::En => "en",
			Self::Pt => "pt",
		}
	}
}

impl fmt::Display for Language {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.code())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
	pub network: String,
	pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
	pub name: String,
	pub greeting: String,
	pub role: String,
	pub short_bio: String,
	pub long_bio: String,
	pub location: String,
	pub email: String,
	pub phone: String,
	pub social_links: Vec<SocialLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceItem {
	pub id: u32,
	pub title: String,
	pub subtitle: String,
	pub date: String,
	pub location: String,
	pub description: String,
}

/// Education and certificate entries share one shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
	pub id: u32,
	pub title: String,
	pub subtitle: String,
	pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
	Project,
	Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
	pub id: u32,
	pub title: String,
	pub desc: String,
	pub details: String,
	pub tags: Vec<String>,
	pub year: String,
	pub link: String,
	pub repo: String,
	#[serde(rename = "type")]
	pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	pub id: u32,
	pub slug: String,
	pub title: String,
	pub desc: String,
	pub content: String,
	pub date: String,
	pub read_time: String,
	pub tags: Vec<String>,
	#[serde(rename = "type")]
	pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioData {
	pub profile: Profile,
	pub skills: Vec<String>,
	pub experience: Vec<ExperienceItem>,
	pub education: Vec<TimelineItem>,
	pub certificates: Vec<TimelineItem>,
	pub projects: Vec<Project>,
	pub posts: Vec<Post>,
}
