use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::Handle;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use super::payload::{ApiResourceList, ChallengePayload, ChallengeResponse};
use super::tls::load_rustls_config;
use crate::config::Settings;
use crate::solver::{ChallengeAction, ChallengeSolver};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

struct AppState {
    group_name: String,
    solver: Arc<dyn ChallengeSolver>,
}

pub fn router(group_name: &str, solver: Arc<dyn ChallengeSolver>) -> Router {
    let state = Arc::new(AppState {
        group_name: group_name.to_string(),
        solver,
    });

    Router::new()
        .route("/healthz", get(healthz))
        .route("/apis/:group/v1alpha1", get(discovery))
        .route("/apis/:group/v1alpha1/:solver", post(solve))
        .with_state(state)
}

pub async fn run(settings: &Settings, solver: Arc<dyn ChallengeSolver>) -> Result<()> {
    let addr = settings.listen_addr;
    let route = format!("{}/v1alpha1/{}", settings.group_name, solver.name());
    let app = router(&settings.group_name, solver);

    match settings.tls_files() {
        Some((cert, key)) => {
            let tls = load_rustls_config(cert, key)?;
            let handle = Handle::new();
            tokio::spawn(drain_on_shutdown(handle.clone()));

            info!("Webhook listening on {} (TLS) for {}", addr, route);
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("serving webhook over TLS")?;
        }
        None => {
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;

            warn!("No serving certificate configured, webhook speaks plain HTTP");
            info!("Webhook listening on {} for {}", addr, route);
            axum::serve(listener, app)
                .with_graceful_shutdown(wait_for_shutdown())
                .await
                .context("Webhook server failed")?;
        }
    }

    info!("Webhook server stopped");
    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn discovery(State(state): State<Arc<AppState>>, Path(group): Path<String>) -> Response {
    if group != state.group_name {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(ApiResourceList::for_solver(&state.group_name, state.solver.name())).into_response()
}

async fn solve(
    State(state): State<Arc<AppState>>,
    Path((group, solver)): Path<(String, String)>,
    payload: Result<Json<ChallengePayload>, JsonRejection>,
) -> Response {
    if group != state.group_name || solver != state.solver.name() {
        warn!("No solver registered for {}/{}", group, solver);
        return StatusCode::NOT_FOUND.into_response();
    }

    let request = match payload {
        Ok(Json(ChallengePayload {
            request: Some(request),
            ..
        })) => request,
        Ok(_) => return bad_request("request is required".to_string()),
        Err(rejection) => {
            warn!("Rejected challenge payload: {}", rejection.body_text());
            return bad_request(rejection.body_text());
        }
    };

    let result = match request.action {
        ChallengeAction::Present => state.solver.present(&request).await,
        ChallengeAction::CleanUp => state.solver.clean_up(&request).await,
    };

    let response = match result {
        Ok(()) => ChallengeResponse::success(&request.uid),
        Err(e) => {
            error!("{:?} failed for {}: {}", request.action, request.resolved_fqdn, e);
            ChallengeResponse::failure(&request.uid, e.to_string(), 500)
        }
    };

    Json(ChallengePayload::respond(response)).into_response()
}

fn bad_request(message: String) -> Response {
    let response = ChallengeResponse::failure("", message, 400);
    (StatusCode::BAD_REQUEST, Json(ChallengePayload::respond(response))).into_response()
}

async fn drain_on_shutdown(handle: Handle) {
    wait_for_shutdown().await;
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

/// Resolves on SIGTERM or SIGINT (Ctrl+C elsewhere).
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to install signal handlers: {}", e);
                    return std::future::pending().await;
                }
            };

        let received = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        info!("Received {}, shutting down", received);
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return std::future::pending().await;
        }
        info!("Received Ctrl+C, shutting down");
    }
}
