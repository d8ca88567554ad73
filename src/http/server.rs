//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID, mount redirect)
//! - Register shared resources and autocomplete behaviors from config
//! - Bind server to listener
//! - Map requests below the filter mount to resources and behaviors
//! - Stream resource bodies; headers leave as soon as they are committed
//! - Apply hot-reloaded resource settings
//! - Observability (metrics, correlation IDs)

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::autocomplete::{self, AutoCompleteBehaviors, SCRIPT_NAME, SCRIPT_SCOPE};
use crate::config::schema::{AppConfig, FileResourceConfig};
use crate::filter::{redirect_middleware, FilterPath};
use crate::http::request::{request_id_layers, WebRequest};
use crate::http::response::{BufferedResponse, StreamingResponse};
use crate::observability::metrics;
use crate::resource::{Attributes, CacheDuration, FileResource, ResourceKey, ResourceSettings, SharedResources};
use crate::routing::{RequestMapper, RequestTarget};

/// Body chunks buffered between a resource writer and the connection.
const BODY_CHUNKS_IN_FLIGHT: usize = 8;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub filter: Arc<FilterPath>,
    pub mapper: Arc<RequestMapper>,
    pub resources: SharedResources,
    pub behaviors: AutoCompleteBehaviors,
    pub settings: Arc<ArcSwap<ResourceSettings>>,
}

/// HTTP server for the resource filter.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let resources = SharedResources::new();
        resources.add(SCRIPT_SCOPE, SCRIPT_NAME, autocomplete::script_resource());
        register_file_resources(&resources, &config.resources.files);

        let state = AppState {
            filter: Arc::new(FilterPath::from_config(&config.filter)),
            mapper: Arc::new(RequestMapper::default()),
            resources,
            behaviors: AutoCompleteBehaviors::from_config(&config.autocomplete),
            settings: Arc::new(ArcSwap::from_pointee(ResourceSettings::from_config(&config.resources))),
        };

        tracing::info!(
            resources = state.resources.len(),
            autocomplete_fields = state.behaviors.len(),
            context_path = %state.filter.context_path(),
            "Application assembled"
        );

        let router = Self::build_router(&config, state.clone());
        Self { router, config, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let (set_request_id, propagate_request_id) = request_id_layers();
        let filter = state.filter.clone();

        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(middleware::from_fn_with_state(filter, redirect_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id)
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id)
    }

    /// The router, for serving or for driving with `oneshot` in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Shared resource registry; resources added here are served immediately.
    pub fn resources(&self) -> &SharedResources {
        &self.state.resources
    }

    pub fn behaviors(&self) -> &AutoCompleteBehaviors {
        &self.state.behaviors
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the resource
    /// settings for subsequent requests; the filter mount stays as it was.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let settings = self.state.settings.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                settings.store(Arc::new(ResourceSettings::from_config(&config.resources)));
                tracing::info!(
                    default_cache_secs = config.resources.default_cache_secs,
                    mime_overrides = config.resources.mime_types.len(),
                    "Resource settings reloaded"
                );
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn register_file_resources(resources: &SharedResources, files: &[FileResourceConfig]) {
    for file in files {
        let mut resource = FileResource::new(&file.path)
            .with_disposition(file.disposition)
            .with_cache_scope(file.cache_scope);
        if let Some(content_type) = &file.content_type {
            resource = resource.with_content_type(content_type.clone());
        }
        if let Some(encoding) = &file.text_encoding {
            resource = resource.with_text_encoding(encoding.clone());
        }
        if let Some(secs) = file.cache_secs {
            resource = resource.with_cache_duration(CacheDuration::from_secs(secs));
        }
        if resources.add(file.scope.clone(), file.name.clone(), resource).is_some() {
            tracing::warn!(scope = %file.scope, name = %file.name, "Resource replaced");
        }
        tracing::debug!(scope = %file.scope, name = %file.name, path = %file.path, "File resource registered");
    }
}

/// Catch-all handler. Maps the mount-relative path and answers it.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, _body) = request.into_parts();
    let request = WebRequest::from_parts(&parts);

    let target = state
        .filter
        .relative_path(request.path())
        .and_then(|relative| state.mapper.map(relative));

    match target {
        Some(RequestTarget::SharedResource { scope, name }) => {
            serve_resource(&state, request, &scope, &name, start).await
        }
        Some(RequestTarget::AutoComplete { component_id }) => {
            serve_autocomplete(&state, &request, &component_id)
        }
        None => {
            tracing::debug!(path = %request.path(), "No target mapped");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

async fn serve_resource(
    state: &AppState,
    request: WebRequest,
    scope: &str,
    name: &str,
    start: Instant,
) -> Response {
    let Some(resource) = state.resources.get(scope, name) else {
        tracing::debug!(scope = %scope, name = %name, "Shared resource not found");
        metrics::record_resource_response(scope, StatusCode::NOT_FOUND, start);
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    let settings = state.settings.load_full();
    let (mut response, receiver) = StreamingResponse::channel(BODY_CHUNKS_IN_FLIGHT);
    let key = ResourceKey::new(scope, name);

    // write callbacks may block on file I/O
    let task = tokio::task::spawn_blocking(move || {
        let outcome = {
            let mut attributes = Attributes::new(&request, &mut response, &settings);
            resource.respond(&mut attributes)
        };
        match outcome {
            Ok(()) => {
                response.commit();
                Ok(())
            }
            Err(e) if response.is_committed() => {
                tracing::error!(
                    scope = %key.scope,
                    name = %key.name,
                    error = %e,
                    "Resource failed after headers were sent, body truncated"
                );
                response.abort(io::Error::other(e.to_string()));
                Ok(())
            }
            Err(e) => Err(e),
        }
    });

    if let Some(response) = receiver.into_response().await {
        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            metrics::record_not_modified(scope);
        }
        metrics::record_resource_response(scope, status, start);
        return response;
    }

    // nothing was committed, so the status can still change
    match task.await {
        Ok(Err(e)) => {
            tracing::error!(scope = %scope, name = %name, error = %e, "Resource failed to respond");
        }
        Ok(Ok(())) => {
            tracing::error!(scope = %scope, name = %name, "Resource finished without a response");
        }
        Err(e) => {
            tracing::error!(scope = %scope, name = %name, error = %e, "Resource task panicked");
        }
    }
    metrics::record_resource_response(scope, StatusCode::INTERNAL_SERVER_ERROR, start);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

fn serve_autocomplete(state: &AppState, request: &WebRequest, component_id: &str) -> Response {
    let Some(behavior) = state.behaviors.get(component_id) else {
        tracing::debug!(component = %component_id, "Unknown autocomplete component");
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };
    metrics::record_autocomplete_request(component_id);

    let mut response = BufferedResponse::new();
    match behavior.respond(request, &mut response) {
        Ok(()) => response.into_response(),
        Err(e) => {
            tracing::error!(component = %component_id, error = %e, "Autocomplete failed to respond");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
