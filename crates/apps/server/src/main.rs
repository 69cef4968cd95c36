use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use charts::ChartOptions;
use clap::Parser;
use panel::{AssemblyOptions, Panel};
use runtime::DependencyGraph;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod dispatch;
mod layout;
mod page;

use dispatch::{dispatch, DispatchRequest};
use layout::LayoutInfo;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Space-time income dashboard for the contiguous US states")]
struct Config {
    /// Listen address
    #[arg(long, env = "ESDA_ADDR", default_value = "127.0.0.1:8050")]
    addr: SocketAddr,

    /// Income table: `Name,STATE_FIPS,<year>...`
    #[arg(long, env = "ESDA_INCOME_CSV", default_value = "data/usjoin.csv")]
    income: PathBuf,

    /// State polygons with `STATE_FIPS` and `STATE_ABBR` properties
    #[arg(long, env = "ESDA_STATES_GEOJSON", default_value = "data/us48.geojson")]
    states: PathBuf,

    /// Serve the built-in synthetic 48-state panel instead of reading files
    #[arg(long, env = "ESDA_DEMO")]
    demo: bool,

    /// Refuse to start when a state has no contiguous neighbor
    #[arg(long, env = "ESDA_STRICT_CONTIGUITY")]
    strict_contiguity: bool,

    /// Random permutations for the LIMA and spatial tau p-values
    #[arg(long, env = "ESDA_PERMUTATIONS", default_value_t = charts::DEFAULT_PERMUTATIONS)]
    permutations: usize,

    /// Points on the density chart's evaluation grid
    #[arg(long, env = "ESDA_DENSITY_GRID", default_value_t = charts::DEFAULT_DENSITY_GRID)]
    density_grid: usize,
}

#[derive(Clone)]
pub(crate) struct AppState {
    panel: Arc<Panel>,
    graph: Arc<DependencyGraph>,
    options: ChartOptions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    if let Err(err) = run(config).await {
        error!("{err:#}");
        return Err(err);
    }
    Ok(())
}

async fn run(config: Config) -> anyhow::Result<()> {
    let panel = load_panel(&config)?;
    let graph = DependencyGraph::dashboard().context("wiring the dashboard")?;

    let state = AppState {
        panel: Arc::new(panel),
        graph: Arc::new(graph),
        options: ChartOptions {
            permutations: config.permutations,
            density_grid: config.density_grid,
            ..ChartOptions::default()
        },
    };

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    info!("dashboard listening on http://{}", config.addr);
    axum::serve(listener, router(state))
        .await
        .context("serving")?;
    Ok(())
}

fn load_panel(config: &Config) -> anyhow::Result<Panel> {
    if config.demo {
        info!("using the built-in demo panel");
        return panel::fixtures::sample_panel().context("building the demo panel");
    }
    Panel::load(
        &config.income,
        &config.states,
        AssemblyOptions {
            strict_contiguity: config.strict_contiguity,
        },
    )
    .with_context(|| {
        format!(
            "loading {} and {} (see data/README.md, or pass --demo)",
            config.income.display(),
            config.states.display()
        )
    })
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/layout", get(get_layout))
        .route("/api/dispatch", post(post_dispatch))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

async fn index() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_layout(State(state): State<AppState>) -> Json<LayoutInfo> {
    Json(LayoutInfo::new(&state.panel))
}

async fn post_dispatch(State(state): State<AppState>, body: Bytes) -> Response {
    let req: DispatchRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(err) => {
            return api_error(StatusCode::BAD_REQUEST, format!("invalid dispatch body: {err}"))
                .into_response()
        }
    };

    match tokio::task::spawn_blocking(move || {
        dispatch(&state.panel, &state.graph, &state.options, req)
    })
    .await
    {
        Ok(resp) => Json(resp).into_response(),
        Err(err) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("dispatch worker join error: {err}"),
        )
        .into_response(),
    }
}
