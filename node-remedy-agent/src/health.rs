use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use node_remedy_ext::metav1;
use serde::Serialize;

use super::Watchdog;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WatchdogStatus {
    last_food_time: metav1::Time,
}

pub(crate) fn router(watchdog: Arc<dyn Watchdog>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/watchdog", get(watchdog_status))
        .with_state(watchdog)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn watchdog_status(State(watchdog): State<Arc<dyn Watchdog>>) -> Json<WatchdogStatus> {
    Json(WatchdogStatus {
        last_food_time: metav1::Time(watchdog.last_food_time()),
    })
}
