use crate::handlers::content as handlers;
use crate::routes::cors_layer;
use crate::{AppState, Config};
use axum::extract::FromRef;
use axum::http::Method;
use axum::routing::get;
use axum::Router;

pub fn get_content<S>(config: &Config) -> Router<S>
where
	S: Clone + Send + Sync + 'static,
	AppState: FromRef<S>,
{
	Router::new()
		.route("/api/v1/portfolio", get(handlers::get_portfolio))
		.route("/api/v1/posts", get(handlers::list_posts))
		.route("/api/v1/posts/:slug", get(handlers::get_post))
		.route("/api/v1/projects", get(handlers::list_projects))
		.route("/api/v1/projects/:id", get(handlers::get_project))
		.layer(cors_layer(config, [Method::GET]))
}
