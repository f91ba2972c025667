//! HTTP surface: serves the analyzer page and its JSON endpoints

use crate::grid::Position;
use crate::notify::{
    MemoryNotifier, Notification, MSG_ANALYSIS_DONE, MSG_ANALYSIS_FAILED, MSG_EMPTY_URL,
};
use crate::page::{AnalysisOutcome, AnalyzerPage, PageState};
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// API state
pub struct ApiState {
    pub page: Arc<AnalyzerPage>,
    /// Same notifier the page reports to
    pub notifications: Arc<MemoryNotifier>,
}

/// Request to analyze a link
#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    /// Missing field is treated like an empty input
    #[serde(default)]
    pub telegram_url: String,
}

/// Result of one analysis invocation
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub outcome: AnalysisOutcome,
    pub positions: Vec<Position>,
    pub result_text: String,
    /// Winning flag per cell, index = row * 3 + col
    pub cells: Vec<bool>,
    pub notification: Notification,
}

/// Page state plus recent notifications
#[derive(Debug, Serialize)]
pub struct StateResponse {
    #[serde(flatten)]
    pub state: PageState,
    pub cells: Vec<bool>,
    pub notifications: Vec<Notification>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub endpoint: String,
}

/// Notification the page emits for a given outcome
pub fn notification_for(outcome: AnalysisOutcome) -> Notification {
    match outcome {
        AnalysisOutcome::Rejected => Notification::error(MSG_EMPTY_URL),
        AnalysisOutcome::Succeeded => Notification::success(MSG_ANALYSIS_DONE),
        AnalysisOutcome::Failed => Notification::error(MSG_ANALYSIS_FAILED),
    }
}

/// Create the API router
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health_check))
        .route("/api/analyze", post(analyze))
        .route("/api/state", get(page_state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoint: state.page.provider().endpoint().to_string(),
    })
}

/// Run the analyze action
async fn analyze(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<AnalyzeBody>,
) -> (StatusCode, Json<AnalyzeResponse>) {
    let outcome = state.page.analyze(&body.telegram_url).await;

    let status = match outcome {
        AnalysisOutcome::Succeeded => StatusCode::OK,
        AnalysisOutcome::Rejected => StatusCode::BAD_REQUEST,
        AnalysisOutcome::Failed => StatusCode::BAD_GATEWAY,
    };

    // A concurrent invocation may already have replaced the results;
    // respond with whatever the page shows now
    let snapshot = state.page.snapshot();
    let cells = snapshot.grid().flags().to_vec();

    (
        status,
        Json(AnalyzeResponse {
            outcome,
            positions: snapshot.positions,
            result_text: snapshot.result_text,
            cells,
            notification: notification_for(outcome),
        }),
    )
}

async fn page_state(State(state): State<Arc<ApiState>>) -> Json<StateResponse> {
    let snapshot = state.page.snapshot();
    let cells = snapshot.grid().flags().to_vec();

    Json(StateResponse {
        state: snapshot,
        cells,
        notifications: state.notifications.all(),
    })
}

/// The analyzer page
async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Qalais Analyzer</title>
    <style>
        :root {
            --bg: #0f0a1e;
            --card: #1b1433;
            --primary: #a855f7;
            --accent: #f59e0b;
            --text: #eee;
            --muted: #8b8b9e;
            --success: #4ade80;
            --error: #f87171;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: system-ui, sans-serif;
            background: var(--bg);
            color: var(--text);
            min-height: 100vh;
            padding: 32px 16px;
        }
        .container { max-width: 720px; margin: 0 auto; }
        header { text-align: center; margin-bottom: 32px; }
        header .logo { font-size: 3.5rem; }
        h1 { font-size: 2.5rem; color: var(--primary); }
        header p, .hint { color: var(--muted); }
        .card {
            background: var(--card);
            border: 2px solid rgba(168, 85, 247, 0.2);
            border-radius: 16px;
            padding: 24px;
        }
        label { display: block; font-weight: 600; margin-bottom: 12px; }
        .row { display: flex; gap: 12px; }
        input {
            flex: 1;
            height: 48px;
            background: var(--bg);
            border: 1px solid var(--primary);
            border-radius: 8px;
            padding: 0 12px;
            color: var(--text);
            font-size: 1rem;
        }
        button#analyze {
            height: 48px;
            padding: 0 32px;
            background: var(--primary);
            color: white;
            border: none;
            border-radius: 8px;
            font-weight: 600;
            cursor: pointer;
        }
        button:disabled, input:disabled { opacity: 0.5; cursor: not-allowed; }
        #loading { display: none; text-align: center; padding: 32px 0; color: var(--muted); }
        #results { display: none; margin-top: 24px; }
        .grid {
            display: grid;
            grid-template-columns: repeat(3, 1fr);
            gap: 12px;
            max-width: 360px;
            margin: 0 auto 24px;
        }
        .cell {
            aspect-ratio: 1;
            border-radius: 12px;
            border: 2px solid #333;
            background: rgba(255, 255, 255, 0.04);
            display: flex;
            align-items: center;
            justify-content: center;
            font-size: 2.2rem;
        }
        .cell.win { background: var(--accent); border-color: var(--accent); }
        .summary h3 { margin-bottom: 8px; }
        .hint { text-align: center; margin-top: 24px; font-size: 0.9rem; }
        #toast {
            position: fixed;
            right: 16px;
            bottom: 16px;
            padding: 12px 20px;
            border-radius: 8px;
            display: none;
            color: #000;
            font-weight: 600;
        }
        #toast.success { background: var(--success); }
        #toast.error { background: var(--error); }
    </style>
</head>
<body>
<div class="container">
    <header>
        <div class="logo">🎮</div>
        <h1>Qalais Analyzer</h1>
        <p>Анализатор игровых уровней Telegram бота</p>
    </header>
    <div class="card">
        <label for="url">Ссылка на Telegram сообщение</label>
        <div class="row">
            <input id="url" type="text" placeholder="https://t.me/...">
            <button id="analyze">Анализировать</button>
        </div>
        <div id="loading">Обрабатываю изображение...</div>
        <div id="results">
            <div class="grid" id="grid"></div>
            <div class="summary">
                <h3>Правильные позиции:</h3>
                <p id="summary"></p>
            </div>
        </div>
    </div>
    <p class="hint">Вставьте ссылку на сообщение бота с игровым полем</p>
</div>
<div id="toast"></div>
<script>
const urlInput = document.getElementById('url');
const button = document.getElementById('analyze');
const loading = document.getElementById('loading');
const results = document.getElementById('results');
const grid = document.getElementById('grid');
const summary = document.getElementById('summary');
const toast = document.getElementById('toast');

function showToast(n) {
    toast.textContent = n.message;
    toast.className = n.kind;
    toast.style.display = 'block';
    setTimeout(() => { toast.style.display = 'none'; }, 3000);
}

function setBusy(busy) {
    urlInput.disabled = busy;
    button.disabled = busy;
    button.textContent = busy ? 'Анализирую...' : 'Анализировать';
    loading.style.display = busy ? 'block' : 'none';
}

function render(data) {
    grid.innerHTML = '';
    data.cells.forEach((win) => {
        const cell = document.createElement('div');
        cell.className = win ? 'cell win' : 'cell';
        cell.textContent = win ? '💸' : '';
        grid.appendChild(cell);
    });
    summary.textContent = data.result_text;
    results.style.display = data.positions.length > 0 ? 'block' : 'none';
}

button.addEventListener('click', async () => {
    if (!urlInput.value.trim()) {
        showToast({ kind: 'error', message: 'Введите ссылку на сообщение' });
        return;
    }
    setBusy(true);
    results.style.display = 'none';
    try {
        const resp = await fetch('/api/analyze', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({ telegram_url: urlInput.value })
        });
        const data = await resp.json();
        render(data);
        showToast(data.notification);
    } catch (e) {
        showToast({ kind: 'error', message: 'Ошибка при анализе' });
    } finally {
        setBusy(false);
    }
});
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GRID_CELLS;
    use crate::provider::{AnalysisProvider, AnalysisResult, ProviderError};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    /// Succeeds for links under https://t.me/ok/, fails otherwise
    struct StaticProvider;

    #[async_trait]
    impl AnalysisProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        fn endpoint(&self) -> &str {
            "memory://static"
        }

        async fn analyze(&self, telegram_url: &str) -> Result<AnalysisResult, ProviderError> {
            if telegram_url.starts_with("https://t.me/ok/") {
                Ok(AnalysisResult {
                    positions: vec![Position::new(0, 1)],
                    result_text: None,
                })
            } else {
                Err(ProviderError::Status {
                    status: 500,
                    body: String::new(),
                })
            }
        }
    }

    fn router() -> Router {
        let notifications = Arc::new(MemoryNotifier::default());
        let page = Arc::new(AnalyzerPage::new(
            Arc::new(StaticProvider),
            notifications.clone(),
        ));
        create_router(Arc::new(ApiState {
            page,
            notifications,
        }))
    }

    async fn post_analyze(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/analyze")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let (status, json) =
            post_analyze(router(), r#"{"telegram_url":"https://t.me/ok/1"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["outcome"], "succeeded");
        assert_eq!(json["result_text"], "2 столбик 1 квадрат");
        assert_eq!(json["notification"]["kind"], "success");

        let cells = json["cells"].as_array().unwrap();
        assert_eq!(cells.len(), GRID_CELLS);
        let winners: Vec<usize> = cells
            .iter()
            .enumerate()
            .filter(|(_, v)| v.as_bool() == Some(true))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(winners, vec![1]);
    }

    #[tokio::test]
    async fn test_analyze_rejected() {
        let (status, json) = post_analyze(router(), r#"{"telegram_url":"   "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["notification"]["message"], MSG_EMPTY_URL);

        let (status, _) = post_analyze(router(), "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_failed() {
        let (status, json) =
            post_analyze(router(), r#"{"telegram_url":"https://t.me/broken"}"#).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["outcome"], "failed");
        assert!(json["positions"].as_array().unwrap().is_empty());
        assert_eq!(json["result_text"], "");
        assert_eq!(json["notification"]["kind"], "error");
        assert_eq!(json["notification"]["message"], MSG_ANALYSIS_FAILED);

        let cells = json["cells"].as_array().unwrap();
        assert_eq!(cells.len(), GRID_CELLS);
        assert!(cells.iter().all(|v| v.as_bool() == Some(false)));
    }

    #[tokio::test]
    async fn test_health_and_index() {
        let app = router();
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["endpoint"], "memory://static");

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Qalais Analyzer"));
    }

    #[tokio::test]
    async fn test_state_tracks_notifications() {
        let notifications = Arc::new(MemoryNotifier::default());
        let page = Arc::new(AnalyzerPage::new(
            Arc::new(StaticProvider),
            notifications.clone(),
        ));
        let state = Arc::new(ApiState {
            page: page.clone(),
            notifications,
        });

        page.analyze("https://t.me/ok/2").await;

        let response = create_router(state)
            .oneshot(Request::builder().uri("/api/state").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["url"], "https://t.me/ok/2");
        assert_eq!(json["is_analyzing"], false);
        assert_eq!(json["last_outcome"], "succeeded");
        assert_eq!(json["notifications"][0]["message"], MSG_ANALYSIS_DONE);
    }
}
