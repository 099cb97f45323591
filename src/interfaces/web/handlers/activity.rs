use serde::Serialize;

use super::{ApiResult, ok};

#[derive(Serialize)]
struct ActivityItem {
    text: &'static str,
    time: &'static str,
}

// Placeholder feed until the CLI exposes an activity source.
const ITEMS: &[ActivityItem] = &[
    ActivityItem {
        text: "Dashboard connected to gateway",
        time: "just now",
    },
    ActivityItem {
        text: "Status and cron data refresh every 30 seconds",
        time: "ongoing",
    },
];

pub async fn get_activity() -> ApiResult {
    ok(serde_json::json!({ "items": ITEMS }))
}
