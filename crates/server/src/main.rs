//! ZeroCost Server
//!
//! Axum presentation layer over zerocost_core: catalog browsing, admin CRUD,
//! the comparison tray, and the AI recommendation endpoint. The server
//! enforces no authentication by design; "admin mode" is a client-side
//! capability flag with no security boundary.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, Response, StatusCode},
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use utoipa::{OpenApi, ToSchema};
use zerocost_core::compare;
use zerocost_core::model::{Category, Platform, StarterPack, Tool};
use zerocost_core::query::{self, QuerySpec, SortBy};
use zerocost_core::recommend::{GeminiAdvisor, Outcome, RecommendationGateway};
use zerocost_core::store::{self, resolve_pack, CatalogDb, CatalogStore};

/// Application state
struct AppState {
    store: CatalogStore,
    gateway: RecommendationGateway,
    /// Comparison tray: transient, never persisted
    compare_tray: RwLock<Vec<Tool>>,
    /// At most one in-flight recommendation request per gateway instance
    recommend_busy: Mutex<()>,
}

type SharedState = Arc<AppState>;

#[derive(Parser, Clone)]
#[command(author, version, about = "ZeroCost - Free alternatives to paid software")]
struct Args {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Start the ZeroCost server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
    /// Create .zerocost/ and persist the built-in default catalog
    Init,
}

// === API Types ===

#[derive(Serialize, ToSchema)]
struct ApiResponse {
    success: bool,
    message: String,
}

#[derive(Deserialize, ToSchema)]
struct ToolQueryParams {
    /// Case-insensitive substring over name, description, paid alternative
    search: Option<String>,
    /// Category display name; absent or unknown means "All"
    category: Option<String>,
    /// Platform display name; absent or unknown means "All"
    platform: Option<String>,
    /// When true, only offline-capable tools
    offline: Option<bool>,
    /// "popular" (default) or "rating"
    sort: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ToolResponse {
    id: String,
    name: String,
    category: String,
    description: String,
    features: Vec<String>,
    pricing_model: String,
    official_link: String,
    offline_available: bool,
    platforms: Vec<String>,
    pros: Vec<String>,
    cons: Vec<String>,
    rating: f64,
    popular: bool,
    paid_alternative_to: Option<String>,
    image_url: Option<String>,
}

impl From<Tool> for ToolResponse {
    fn from(t: Tool) -> Self {
        Self {
            id: t.id,
            name: t.name,
            category: t.category.display_name().to_string(),
            description: t.description,
            features: t.features,
            pricing_model: t.pricing_model,
            official_link: t.official_link,
            offline_available: t.offline_available,
            platforms: t
                .platforms
                .iter()
                .map(|p| p.display_name().to_string())
                .collect(),
            pros: t.pros,
            cons: t.cons,
            rating: t.rating,
            popular: t.popular,
            paid_alternative_to: t.paid_alternative_to,
            image_url: t.image_url,
        }
    }
}

#[derive(Serialize, ToSchema)]
struct ToolListResponse {
    tools: Vec<ToolResponse>,
    total: usize,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct ToolForm {
    /// Absent for a new tool; a fresh id is assigned
    id: Option<String>,
    name: String,
    /// Category display name
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    features: Vec<String>,
    #[serde(default = "default_pricing")]
    pricing_model: String,
    official_link: String,
    #[serde(default)]
    offline_available: bool,
    #[serde(default)]
    platforms: Vec<String>,
    #[serde(default)]
    pros: Vec<String>,
    #[serde(default)]
    cons: Vec<String>,
    #[serde(default = "default_rating")]
    rating: f64,
    #[serde(default)]
    popular: bool,
    paid_alternative_to: Option<String>,
    image_url: Option<String>,
}

fn default_pricing() -> String {
    "Free".to_string()
}

fn default_rating() -> f64 {
    4.0
}

#[derive(Serialize, ToSchema)]
struct SaveToolResponse {
    success: bool,
    message: String,
    /// Id of the saved tool on success
    id: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct PackResponse {
    id: String,
    title: String,
    description: String,
    role: String,
    icon: String,
    /// Member tools in pack order; dangling references are omitted
    tools: Vec<ToolResponse>,
}

#[derive(Serialize, ToSchema)]
struct PackListResponse {
    packs: Vec<PackResponse>,
}

#[derive(Deserialize, ToSchema)]
struct CompareToggleRequest {
    /// Id of a tool currently in the catalog
    id: String,
}

#[derive(Serialize, ToSchema)]
struct CompareResponse {
    success: bool,
    message: String,
    tools: Vec<ToolResponse>,
    limit: usize,
}

#[derive(Deserialize, ToSchema)]
struct RecommendRequest {
    query: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RecommendedToolResponse {
    name: String,
    paid_alternative: String,
    description: String,
    why_recommend: String,
    official_link: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RecommendResponse {
    advice: Option<String>,
    recommended_tools: Vec<RecommendedToolResponse>,
    /// True when the input was blank and no remote call was made
    skipped: bool,
    /// Retry-able fault message; distinct from `skipped`
    error: Option<String>,
}

impl RecommendResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            advice: None,
            recommended_tools: vec![],
            skipped: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize, ToSchema)]
struct FiltersResponse {
    categories: Vec<String>,
    platforms: Vec<String>,
    sorts: Vec<String>,
}

// === String -> enum mapping (unknown values fall back to "All") ===

fn parse_category(s: &str) -> Option<Category> {
    Category::all().into_iter().find(|c| c.display_name() == s)
}

fn parse_platform(s: &str) -> Option<Platform> {
    Platform::all().into_iter().find(|p| p.display_name() == s)
}

fn query_spec_from(params: &ToolQueryParams) -> QuerySpec {
    QuerySpec {
        search: params.search.clone().unwrap_or_default(),
        category: params.category.as_deref().and_then(parse_category),
        platform: params.platform.as_deref().and_then(parse_platform),
        offline_only: params.offline.unwrap_or(false),
        sort: match params.sort.as_deref() {
            Some("rating") => SortBy::Rating,
            _ => SortBy::Popular,
        },
    }
}

// === OpenAPI Definition ===

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ZeroCost API",
        version = "1.0.0",
        description = "Catalog of free/open-source alternatives to paid software"
    ),
    paths(
        list_tools,
        save_tool,
        delete_tool,
        list_packs,
        get_compare,
        toggle_compare,
        clear_compare,
        recommend,
        get_filters
    ),
    components(
        schemas(
            ApiResponse,
            ToolListResponse,
            ToolResponse,
            ToolForm,
            SaveToolResponse,
            PackListResponse,
            PackResponse,
            CompareToggleRequest,
            CompareResponse,
            RecommendRequest,
            RecommendResponse,
            RecommendedToolResponse,
            FiltersResponse
        )
    ),
    tags(
        (name = "tools", description = "Catalog browsing and admin CRUD"),
        (name = "packs", description = "Role-based starter packs"),
        (name = "compare", description = "Comparison tray"),
        (name = "recommend", description = "AI-assisted recommendation lookup"),
        (name = "filters", description = "Filter vocabulary")
    )
)]
struct ApiDoc;

// === Tool Handlers ===

/// List tools matching the active filters, sorted
#[utoipa::path(
    get,
    path = "/api/v1/tools",
    tag = "tools",
    params(
        ("search" = Option<String>, Query, description = "Substring search"),
        ("category" = Option<String>, Query, description = "Category display name"),
        ("platform" = Option<String>, Query, description = "Platform display name"),
        ("offline" = Option<bool>, Query, description = "Offline-capable only"),
        ("sort" = Option<String>, Query, description = "popular | rating")
    ),
    responses(
        (status = 200, description = "Filtered, sorted tools", body = ToolListResponse)
    )
)]
async fn list_tools(
    State(state): State<SharedState>,
    Query(params): Query<ToolQueryParams>,
) -> Json<ToolListResponse> {
    let tools = match state.store.load_tools() {
        Ok(tools) => tools,
        Err(e) => {
            eprintln!("Failed to load catalog: {}", e);
            vec![]
        }
    };

    let results = query::run(&tools, &query_spec_from(&params));
    Json(ToolListResponse {
        total: results.len(),
        tools: results.into_iter().map(ToolResponse::from).collect(),
    })
}

/// Create or update a tool (admin)
#[utoipa::path(
    post,
    path = "/api/v1/tools",
    tag = "tools",
    request_body = ToolForm,
    responses(
        (status = 200, description = "Save result", body = SaveToolResponse)
    )
)]
async fn save_tool(
    State(state): State<SharedState>,
    Json(form): Json<ToolForm>,
) -> Json<SaveToolResponse> {
    let category = match parse_category(&form.category) {
        Some(c) => c,
        None => {
            return Json(SaveToolResponse {
                success: false,
                message: format!("Unknown category: {}", form.category),
                id: None,
            })
        }
    };

    let platforms: Vec<Platform> = form
        .platforms
        .iter()
        .filter_map(|p| parse_platform(p))
        .collect();

    let tool = Tool {
        id: form.id.unwrap_or_else(store::new_tool_id),
        name: form.name,
        category,
        description: form.description,
        features: form.features,
        pricing_model: form.pricing_model,
        official_link: form.official_link,
        offline_available: form.offline_available,
        platforms,
        pros: form.pros,
        cons: form.cons,
        rating: form.rating,
        popular: form.popular,
        paid_alternative_to: form.paid_alternative_to.filter(|s| !s.trim().is_empty()),
        image_url: form.image_url,
    };

    // Boundary validation: no partial record ever reaches the store
    if let Err(e) = tool.validate() {
        return Json(SaveToolResponse {
            success: false,
            message: e.to_string(),
            id: None,
        });
    }

    let id = tool.id.clone();
    match state.store.upsert_tool(tool) {
        Ok(_) => Json(SaveToolResponse {
            success: true,
            message: "Tool saved".to_string(),
            id: Some(id),
        }),
        Err(e) => Json(SaveToolResponse {
            success: false,
            message: e.to_string(),
            id: None,
        }),
    }
}

/// Delete a tool (admin). Irreversible; the client is expected to confirm
/// with the user before calling.
#[utoipa::path(
    delete,
    path = "/api/v1/tools/{id}",
    tag = "tools",
    params(("id" = String, Path, description = "Tool id")),
    responses(
        (status = 200, description = "Delete result", body = ApiResponse)
    )
)]
async fn delete_tool(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Json<ApiResponse> {
    match state.store.delete_tool(&id) {
        Ok(_) => Json(ApiResponse {
            success: true,
            message: format!("Tool {} deleted", id),
        }),
        Err(e) => Json(ApiResponse {
            success: false,
            message: e.to_string(),
        }),
    }
}

// === Starter Pack Handlers ===

/// List starter packs with their member tools resolved
#[utoipa::path(
    get,
    path = "/api/v1/packs",
    tag = "packs",
    responses(
        (status = 200, description = "Starter packs", body = PackListResponse)
    )
)]
async fn list_packs(State(state): State<SharedState>) -> Json<PackListResponse> {
    let (tools, packs) = match state.store.load() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load catalog: {}", e);
            (vec![], vec![])
        }
    };

    let packs = packs
        .into_iter()
        .map(|pack| pack_response(pack, &tools))
        .collect();
    Json(PackListResponse { packs })
}

fn pack_response(pack: StarterPack, tools: &[Tool]) -> PackResponse {
    let members = resolve_pack(&pack, tools);
    PackResponse {
        id: pack.id,
        title: pack.title,
        description: pack.description,
        role: pack.role,
        icon: pack.icon,
        tools: members.into_iter().map(ToolResponse::from).collect(),
    }
}

// === Comparison Tray Handlers ===

fn compare_response(success: bool, message: String, tools: Vec<Tool>) -> Json<CompareResponse> {
    Json(CompareResponse {
        success,
        message,
        tools: tools.into_iter().map(ToolResponse::from).collect(),
        limit: compare::COMPARE_LIMIT,
    })
}

/// Current comparison tray contents
#[utoipa::path(
    get,
    path = "/api/v1/compare",
    tag = "compare",
    responses(
        (status = 200, description = "Comparison tray", body = CompareResponse)
    )
)]
async fn get_compare(State(state): State<SharedState>) -> Json<CompareResponse> {
    let tray = state.compare_tray.read().await.clone();
    compare_response(true, format!("{} in tray", tray.len()), tray)
}

/// Toggle a catalog tool in or out of the comparison tray
#[utoipa::path(
    post,
    path = "/api/v1/compare/toggle",
    tag = "compare",
    request_body = CompareToggleRequest,
    responses(
        (status = 200, description = "Updated tray", body = CompareResponse)
    )
)]
async fn toggle_compare(
    State(state): State<SharedState>,
    Json(req): Json<CompareToggleRequest>,
) -> Json<CompareResponse> {
    let tools = state.store.load_tools().unwrap_or_default();
    let Some(tool) = tools.into_iter().find(|t| t.id == req.id) else {
        let tray = state.compare_tray.read().await.clone();
        return compare_response(false, format!("No tool with id {}", req.id), tray);
    };

    let mut tray = state.compare_tray.write().await;
    let was_present = tray.iter().any(|t| t.id == tool.id);
    let next = compare::toggle(&tray, &tool);
    let message = if !was_present && next.len() == tray.len() {
        "Comparison tray is full".to_string()
    } else {
        "Tray updated".to_string()
    };
    *tray = next.clone();
    drop(tray);

    compare_response(true, message, next)
}

/// Empty the comparison tray
#[utoipa::path(
    post,
    path = "/api/v1/compare/clear",
    tag = "compare",
    responses(
        (status = 200, description = "Emptied tray", body = CompareResponse)
    )
)]
async fn clear_compare(State(state): State<SharedState>) -> Json<CompareResponse> {
    *state.compare_tray.write().await = compare::clear();
    compare_response(true, "Tray cleared".to_string(), vec![])
}

// === Recommendation Handler ===

/// Ask the AI advisor for free alternatives
#[utoipa::path(
    post,
    path = "/api/v1/recommend",
    tag = "recommend",
    request_body = RecommendRequest,
    responses(
        (status = 200, description = "Advisory result, skip marker, or fault", body = RecommendResponse)
    )
)]
async fn recommend(
    State(state): State<SharedState>,
    Json(req): Json<RecommendRequest>,
) -> Json<RecommendResponse> {
    // One in-flight request at a time; concurrent submissions are refused,
    // not queued.
    let Ok(_guard) = state.recommend_busy.try_lock() else {
        return Json(RecommendResponse::error(
            "A recommendation request is already in progress",
        ));
    };

    match state.gateway.recommend(&req.query).await {
        Ok(Outcome::Skipped) => Json(RecommendResponse {
            advice: None,
            recommended_tools: vec![],
            skipped: true,
            error: None,
        }),
        Ok(Outcome::Advice(payload)) => Json(RecommendResponse {
            advice: Some(payload.advice),
            recommended_tools: payload
                .recommended_tools
                .into_iter()
                .map(|t| RecommendedToolResponse {
                    name: t.name,
                    paid_alternative: t.paid_alternative,
                    description: t.description,
                    why_recommend: t.why_recommend,
                    official_link: t.official_link,
                })
                .collect(),
            skipped: false,
            error: None,
        }),
        Err(e) => {
            eprintln!("Recommendation failed: {}", e);
            Json(RecommendResponse::error(
                "Failed to get AI recommendation. Please try again later.",
            ))
        }
    }
}

// === Filter Vocabulary Handler ===

/// Category/platform vocabulary for the filter bar
#[utoipa::path(
    get,
    path = "/api/v1/filters",
    tag = "filters",
    responses(
        (status = 200, description = "Filter vocabulary", body = FiltersResponse)
    )
)]
async fn get_filters() -> Json<FiltersResponse> {
    Json(FiltersResponse {
        categories: Category::all()
            .iter()
            .map(|c| c.display_name().to_string())
            .collect(),
        platforms: Platform::all()
            .iter()
            .map(|p| p.display_name().to_string())
            .collect(),
        sorts: vec!["popular".to_string(), "rating".to_string()],
    })
}

// === OpenAPI Handler ===

async fn serve_openapi() -> impl IntoResponse {
    let spec = ApiDoc::openapi().to_json().unwrap_or_default();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(spec))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

// === Server Entry ===

fn build_router(state: SharedState) -> Router {
    let tool_routes = Router::new()
        .route("/", get(list_tools).post(save_tool))
        .route("/:id", delete(delete_tool));

    let compare_routes = Router::new()
        .route("/", get(get_compare))
        .route("/toggle", post(toggle_compare))
        .route("/clear", post(clear_compare));

    Router::new()
        .nest("/api/v1/tools", tool_routes)
        .nest("/api/v1/compare", compare_routes)
        .route("/api/v1/packs", get(list_packs))
        .route("/api/v1/recommend", post(recommend))
        .route("/api/v1/filters", get(get_filters))
        .route("/api/v1/openapi.json", get(serve_openapi))
        .with_state(state)
}

pub async fn run_server(port: u16) -> anyhow::Result<()> {
    let store = CatalogStore::new(CatalogDb::open()?);
    let gateway = RecommendationGateway::new(Box::new(GeminiAdvisor::from_env()));

    let state: SharedState = Arc::new(AppState {
        store,
        gateway,
        compare_tray: RwLock::new(Vec::new()),
        recommend_busy: Mutex::new(()),
    });

    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("🚀 ZeroCost Server running at http://{}", addr);
    println!("   API v1 Routes:");
    println!("   Tools:     /api/v1/tools (GET, POST), /api/v1/tools/:id (DELETE)");
    println!("   Packs:     /api/v1/packs");
    println!("   Compare:   /api/v1/compare, /toggle, /clear");
    println!("   Recommend: /api/v1/recommend");
    println!("   Filters:   /api/v1/filters");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_catalog() -> anyhow::Result<()> {
    println!("🔧 Initializing ZeroCost catalog...");

    let store = CatalogStore::new(CatalogDb::open()?);
    let (tools, packs) = store.load()?;
    store.save(&tools, &packs)?;

    println!(
        "✅ Catalog ready: {} tools, {} packs",
        tools.len(),
        packs.len()
    );
    println!("\n🚀 Run `zerocost serve` to start the server");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API key for the recommendation gateway, if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    match args.command {
        Some(CliCommand::Init) => init_catalog(),
        Some(CliCommand::Serve { port }) => run_server(port).await,
        None => run_server(8080).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_display_names() {
        assert_eq!(parse_category("Design"), Some(Category::Design));
        assert_eq!(parse_category("Security"), Some(Category::Security));
        assert_eq!(parse_category("design"), None);
    }

    #[test]
    fn test_parse_platform_display_names() {
        assert_eq!(parse_platform("macOS"), Some(Platform::MacOs));
        assert_eq!(parse_platform("iOS"), Some(Platform::Ios));
        assert_eq!(parse_platform("Amiga"), None);
    }

    #[test]
    fn test_query_spec_unknown_values_mean_all() {
        let params = ToolQueryParams {
            search: None,
            category: Some("NotACategory".to_string()),
            platform: Some("NotAPlatform".to_string()),
            offline: None,
            sort: Some("weird".to_string()),
        };
        let spec = query_spec_from(&params);
        assert!(spec.category.is_none());
        assert!(spec.platform.is_none());
        assert_eq!(spec.sort, SortBy::Popular);
        assert!(!spec.offline_only);
    }

    #[test]
    fn test_query_spec_maps_fields() {
        let params = ToolQueryParams {
            search: Some("gimp".to_string()),
            category: Some("Design".to_string()),
            platform: Some("Linux".to_string()),
            offline: Some(true),
            sort: Some("rating".to_string()),
        };
        let spec = query_spec_from(&params);
        assert_eq!(spec.search, "gimp");
        assert_eq!(spec.category, Some(Category::Design));
        assert_eq!(spec.platform, Some(Platform::Linux));
        assert!(spec.offline_only);
        assert_eq!(spec.sort, SortBy::Rating);
    }

    #[test]
    fn test_openapi_document_builds() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("/api/v1/tools"));
        assert!(json.contains("/api/v1/recommend"));
    }
}
