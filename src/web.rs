use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::display::format_moves_with;
use crate::error::ClearError;
use crate::parser::{LoadReport, LoadedSnapshot, RawSnapshot};
use crate::rebalance::{
    clear_defaults, rebalance, ClearOutcome, Deficit, MoveRecord, Outcome, Snapshot, TierConfig,
};

/// Shared, read-only server state
pub struct AppState {
    pub tiers: TierConfig,
    pub delimiter: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub status: String,
    pub message: String,
    pub sku: String,
    pub moves: Vec<MoveRecord>,
    pub text: String,
    pub unresolved: Vec<Deficit>,
    pub report: LoadReport,
    pub generated_at: String,
}

fn error_json(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({"status": "error", "message": message.into()})
}

/// Normalizes a request body, or None when no SKU can be found in it
fn load_request(raw: RawSnapshot) -> Option<(Snapshot, LoadReport)> {
    let LoadedSnapshot { sku, entries, report } = raw.into_loaded();
    sku.map(|sku| (Snapshot { sku, entries }, report))
}

// Rebalance endpoint
async fn plan(
    req: web::Json<RawSnapshot>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Some((snapshot, report)) = load_request(req.into_inner()) else {
        return Ok(HttpResponse::BadRequest().json(error_json("Missing SKU")));
    };

    let allocation = rebalance(&snapshot, &state.tiers);
    let outcome = allocation.outcome();

    let text = format_moves_with(&allocation.moves, &state.delimiter).text().to_string();
    Ok(HttpResponse::Ok().json(PlanResponse {
        status: status_name(outcome).to_string(),
        message: outcome.notification().to_string(),
        sku: snapshot.sku,
        moves: allocation.moves,
        text,
        unresolved: allocation.unresolved,
        report,
        generated_at: Utc::now().to_rfc3339(),
    }))
}

fn status_name(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::NoMoves => "no_moves",
        Outcome::Resolved => "resolved",
        Outcome::Partial => "partial",
        Outcome::Unresolved => "unresolved",
    }
}

// Default-location clearing endpoint
async fn clear(
    req: web::Json<RawSnapshot>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Some((snapshot, report)) = load_request(req.into_inner()) else {
        return Ok(HttpResponse::BadRequest().json(error_json("Missing SKU")));
    };

    let exact_names = state.tiers.default_exact_names();
    let Snapshot { sku, entries } = snapshot;
    info!(sku = %sku, entries = entries.len(), "Serving clear request");

    match clear_defaults(&entries, &exact_names, &sku) {
        Ok(outcome) => {
            let (status, message) = match &outcome {
                ClearOutcome::Cleared(_) => ("cleared", "Default locations cleared"),
                ClearOutcome::NothingToMove => ("nothing_to_move", "Nothing to clear"),
            };
            let moves = outcome.moves().to_vec();
            let text = format_moves_with(&moves, &state.delimiter).text().to_string();
            Ok(HttpResponse::Ok().json(PlanResponse {
                status: status.to_string(),
                message: message.to_string(),
                sku,
                moves,
                text,
                unresolved: Vec::new(),
                report,
                generated_at: Utc::now().to_rfc3339(),
            }))
        }
        Err(err @ ClearError::NoTarget { .. }) => {
            Ok(HttpResponse::UnprocessableEntity().json(error_json(err.to_string())))
        }
    }
}

async fn get_config(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(&state.tiers))
}

async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "ok"})))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/api/config", web::get().to(get_config))
        .route("/api/plan", web::post().to(plan))
        .route("/api/clear", web::post().to(clear));
}

pub async fn start_server(port: u16, tiers: TierConfig, delimiter: String) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState { tiers, delimiter });

    info!(port, "Starting web server");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState {
            tiers: TierConfig::default(),
            delimiter: ",".to_string(),
        })
    }

    #[actix_web::test]
    async fn test_plan_endpoint() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let body = serde_json::json!({
            "title": "Folding Chair 123456",
            "entries": [
                {"name": "A1", "quantity": "-5", "is_primary": true},
                {"name": "CAMP0000", "quantity": 3},
                {"name": "B2", "quantity": 10},
                {"name": "C3", "quantity": "n/a"}
            ]
        });
        let req = test::TestRequest::post().uri("/api/plan").set_json(&body).to_request();
        let resp: PlanResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.status, "resolved");
        assert_eq!(resp.sku, "123456");
        assert_eq!(resp.text, "123456,CAMP0000,A1,3\n123456,B2,A1,2");
        assert_eq!(resp.report.rows_dropped, 1);
    }

    #[actix_web::test]
    async fn test_plan_requires_sku() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let body = serde_json::json!({"entries": []});
        let req = test::TestRequest::post().uri("/api/plan").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_blank_sku_uses_title() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let body = serde_json::json!({
            "sku": "   ",
            "title": "Trail Lantern 5150",
            "entries": [
                {"name": "A1", "quantity": -1},
                {"name": "BR01", "quantity": 1}
            ]
        });
        let req = test::TestRequest::post().uri("/api/plan").set_json(&body).to_request();
        let resp: PlanResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.sku, "5150");
        assert_eq!(resp.text, "5150,BR01,A1,1");
    }

    #[actix_web::test]
    async fn test_clear_without_target() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let body = serde_json::json!({
            "sku": "9",
            "entries": [{"name": "CAMP0000", "quantity": 4}]
        });
        let req = test::TestRequest::post().uri("/api/clear").set_json(&body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_clear_endpoint() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let body = serde_json::json!({
            "sku": "9",
            "entries": [
                {"name": "CAMP0000", "quantity": 4},
                {"name": "P1", "quantity": 0, "is_primary": true}
            ]
        });
        let req = test::TestRequest::post().uri("/api/clear").set_json(&body).to_request();
        let resp: PlanResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp.status, "cleared");
        assert_eq!(resp.text, "9,CAMP0000,P1,4");
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
