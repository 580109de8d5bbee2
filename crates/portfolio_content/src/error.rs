use crate::model::Language;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
	#[error("Failed to parse {language} content fixture: {source}")]
	Fixture {
		language: Language,
		#[source]
		source: serde_json::Error,
	},
}

pub type Result<T> = std::result::Result<T, ContentError>;
