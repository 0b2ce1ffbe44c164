//! Site server with on-demand post pages, "load more" and periodic
//! regeneration

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::ContentSource;
use crate::content::{PostFeed, PostPage};
use crate::error::{CmsError, FeedError};
use crate::generator::{is_not_found, Generator};
use crate::Blog;

/// Server state
pub struct ServerState {
    blog: Blog,
    generator: Generator,
    source: Arc<dyn ContentSource>,
}

impl ServerState {
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            generator: Generator::new(blog)?,
            source,
        })
    }
}

/// Body of a successful `POST /api/posts/more`
#[derive(Debug, Serialize)]
struct MoreResponse {
    /// The whole list after the load, to be sent back on the next click
    page: PostPage,
    /// List items for the appended posts only
    html: String,
}

/// Build the router serving the generated site
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/posts/more", post(load_more_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server; the site is expected to be generated already
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let source = blog.content_source()?;
    let state = Arc::new(ServerState::new(blog, source)?);

    if blog.config.revalidate > 0 {
        spawn_revalidation(
            state.clone(),
            Duration::from_secs(blog.config.revalidate),
        );
    } else {
        tracing::info!("Revalidation disabled");
    }

    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Regenerate the whole site every `period`, starting one period from now
pub fn spawn_revalidation(state: Arc<ServerState>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            tracing::info!("Revalidating site...");

            match state.generator.generate(state.source.as_ref()).await {
                Ok(report) => tracing::info!(
                    "Revalidated {} post pages ({} failed)",
                    report.posts,
                    report.failed.len()
                ),
                // Keep serving the previous output
                Err(e) => tracing::error!("Revalidation failed: {:#}", e),
            }
        }
    })
}

/// Append the next page to the list the client sends
async fn load_more_handler(
    State(state): State<Arc<ServerState>>,
    Json(page): Json<PostPage>,
) -> Response {
    // Each request gets its own feed, so it never sees InFlight; the page
    // disables its button until the previous request has answered
    let known = page.results.len();
    let feed = PostFeed::new(page);

    let next = match feed.load_more(state.source.as_ref()).await {
        Ok(next) => next,
        Err(e) => {
            let status = match &e {
                FeedError::Exhausted | FeedError::Cms(CmsError::InvalidCursor(_)) => {
                    StatusCode::BAD_REQUEST
                }
                FeedError::InFlight => StatusCode::CONFLICT,
                FeedError::Cms(_) => {
                    tracing::warn!("Failed to load more posts: {}", e);
                    StatusCode::BAD_GATEWAY
                }
            };
            return (status, e.to_string()).into_response();
        }
    };

    match state.generator.render_post_list(&next.results[known..]) {
        Ok(html) => Json(MoreResponse { page: next, html }).into_response(),
        Err(e) => {
            tracing::error!("Failed to render post list: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Serve generated files, building missing post pages first
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    if let Some(uid) = requested_post(request.uri().path()) {
        if !state.generator.post_output_path(&uid).exists() {
            match state
                .generator
                .generate_post(state.source.as_ref(), &uid)
                .await
            {
                Ok(path) => tracing::info!("Generated on demand: {:?}", path),
                Err(e) if is_not_found(&e) => return not_found(&state).await,
                Err(e) => {
                    tracing::error!("Failed to generate post {}: {:#}", uid, e);
                    return (StatusCode::BAD_GATEWAY, "Content source unavailable")
                        .into_response();
                }
            }
        }
    }

    // Serve static file using tower-http
    let mut service = ServeDir::new(&state.blog.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state).await,
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

async fn not_found(state: &ServerState) -> Response {
    let page = match tokio::fs::read_to_string(state.blog.public_dir.join("404.html")).await {
        Ok(page) => page,
        Err(_) => state.generator.render_not_found().unwrap_or_default(),
    };
    (StatusCode::NOT_FOUND, Html(page)).into_response()
}

/// The uid behind `/post/<uid>/`, if it is a well-formed slug
fn requested_post(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/post/")?;
    let rest = rest.strip_suffix("index.html").unwrap_or(rest);
    let uid = rest.trim_end_matches('/');

    if uid.is_empty() || slug::slugify(uid) != uid {
        return None;
    }
    Some(uid.to_string())
}
