use crate::{AppState, PortfolioError};
use axum::extract::{Path, Query, State};
use axum::Json;
use portfolio_content::{Language, ListFilter, PortfolioData, Post, Project};
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
	#[serde(default)]
	pub lang: Option<String>,
}

impl LangQuery {
	fn language(&self) -> Language {
		self.lang.as_deref().map(Language::from_code).unwrap_or_default()
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
	#[serde(default)]
	pub lang: Option<String>,
	#[serde(flatten)]
	pub filter: ListFilter,
}

#[axum::debug_handler]
#[instrument(name = "get_portfolio", skip(state))]
pub async fn get_portfolio(State(state): State<AppState>, Query(query): Query<LangQuery>) -> Json<PortfolioData> {
	let data = state.content.portfolio(query.language()).await;
	Json(data.as_ref().clone())
}

#[axum::debug_handler]
#[instrument(name = "list_posts", skip(state))]
pub async fn list_posts(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<Vec<Post>> {
	let lang = LangQuery { lang: query.lang }.language();
	Json(state.content.posts(lang, &query.filter).await)
}

#[axum::debug_handler]
#[instrument(name = "get_post", skip(state))]
pub async fn get_post(State(state): State<AppState>, Path(slug): Path<String>, Query(query): Query<LangQuery>) -> Result<Json<Post>, PortfolioError> {
	state.content.post(query.language(), &slug).await.map(Json).ok_or(PortfolioError::NotFound)
}

#[axum::debug_handler]
#[instrument(name = "list_projects", skip(state))]
pub async fn list_projects(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<Vec<Project>> {
	let lang = LangQuery { lang: query.lang }.language();
	Json(state.content.projects(lang, &query.filter).await)
}

#[axum::debug_handler]
#[instrument(name = "get_project", skip(state))]
pub async fn get_project(State(state): State<AppState>, Path(id): Path<u32>, Query(query): Query<LangQuery>) -> Result<Json<Project>, PortfolioError> {
	state.content.project(query.language(), id).await.map(Json).ok_or(PortfolioError::NotFound)
}
