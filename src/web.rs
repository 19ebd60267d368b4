use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use actix_files::Files;
use serde::Deserialize;
use std::sync::Mutex;

use crate::llm::GeminiClient;
use crate::params::{validate_parameters, ScheduleParameters};
use crate::request::{build_brief, build_response_schema};
use crate::timetable::{apply_move, validate_move, MoveOutcome, SlotRef, Timetable};

// In-memory storage for the current generation cycle; nothing is persisted
pub struct AppState {
    pub timetable: Mutex<Option<Timetable>>,
    pub parameters: Mutex<Option<ScheduleParameters>>,
    /// True while a generation call is outstanding; re-entry is refused
    pub generating: Mutex<bool>,
    pub client: GeminiClient,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub class_name: String,
    pub from: SlotRef,
    pub to: SlotRef,
}

/// Holds the generation-in-flight flag for the duration of one generation
/// call. Clearing happens in Drop, which also runs when actix drops the
/// handler future on client disconnect.
struct GeneratingGuard(web::Data<AppState>);

impl GeneratingGuard {
    /// Marks a generation as in flight; None when one already is
    fn try_acquire(state: &web::Data<AppState>) -> Option<Self> {
        let mut generating = state.generating.lock().unwrap();
        if *generating {
            return None;
        }
        *generating = true;
        Some(Self(state.clone()))
    }
}

impl Drop for GeneratingGuard {
    fn drop(&mut self) {
        *self.0.generating.lock().unwrap() = false;
    }
}

// Generation endpoint: validates parameters, asks the model for a timetable,
// and replaces the stored one on success
async fn generate(
    req: web::Json<ScheduleParameters>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let params = req.into_inner();

    if let Err(error) = validate_parameters(&params) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "kind": "parameters",
            "error": error
        })));
    }

    // Only one generation call may be in flight
    let _generating = match GeneratingGuard::try_acquire(&state) {
        Some(guard) => guard,
        None => {
            return Ok(HttpResponse::Conflict().json(serde_json::json!({
                "success": false,
                "kind": "busy",
                "error": "A generation request is already in progress"
            })))
        }
    };

    let brief = build_brief(&params);
    let schema = build_response_schema(&params);
    let result = state.client.generate_timetable(&brief, &schema, &params).await;

    match result {
        Ok(table) => {
            log::info!(
                "Generated timetable with {} classes across {} rooms",
                table.total_class_count(),
                params.room_count
            );
            *state.parameters.lock().unwrap() = Some(params.clone());
            *state.timetable.lock().unwrap() = Some(table.clone());
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "timetable": table,
                "parameters": params
            })))
        }
        // Content failures are distinct from transport/provider failures;
        // in both cases the previous timetable stays untouched
        Err(error) if error.is_content() => {
            log::warn!("Generation response rejected: {}", error);
            Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "success": false,
                "kind": "content",
                "error": error.to_string()
            })))
        }
        Err(error) => {
            log::warn!("Generation request failed: {}", error);
            Ok(HttpResponse::BadGateway().json(serde_json::json!({
                "success": false,
                "kind": "transport",
                "error": error.to_string()
            })))
        }
    }
}

// Current timetable endpoint
async fn get_timetable(state: web::Data<AppState>) -> Result<HttpResponse> {
    let timetable = state.timetable.lock().unwrap();
    let parameters = state.parameters.lock().unwrap();

    match (timetable.as_ref(), parameters.as_ref()) {
        (Some(table), Some(params)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "timetable": table,
            "parameters": params
        }))),
        _ => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "No timetable generated yet"
        }))),
    }
}

// Drag-and-drop move endpoint: validates against capacity and
// grade-exclusion rules, applies as copy-then-replace
async fn post_move(
    req: web::Json<MoveRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let max_concurrent = match state.parameters.lock().unwrap().as_ref() {
        Some(params) => params.max_concurrent,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "error": "No timetable generated yet"
            })))
        }
    };

    let mut timetable = state.timetable.lock().unwrap();
    let table = match timetable.as_ref() {
        Some(table) => table,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "error": "No timetable generated yet"
            })))
        }
    };

    match validate_move(table, max_concurrent, &req.class_name, &req.from, &req.to) {
        MoveOutcome::NoOp => Ok(HttpResponse::Ok().json(serde_json::json!({
            "accepted": true,
            "timetable": table
        }))),
        MoveOutcome::Rejected(rejection) if rejection.is_silent() => {
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "accepted": false
            })))
        }
        MoveOutcome::Rejected(rejection) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "accepted": false,
            "reason": rejection.to_string()
        }))),
        MoveOutcome::Accepted => {
            match apply_move(table, &req.class_name, &req.from, &req.to) {
                Ok(next) => {
                    let response = serde_json::json!({
                        "accepted": true,
                        "timetable": next
                    });
                    *timetable = Some(next);
                    Ok(HttpResponse::Ok().json(response))
                }
                Err(error) => {
                    // Structural inconsistency between client and server
                    // state; nothing was applied
                    log::error!("Move could not be applied: {}", error);
                    Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                        "accepted": false,
                        "reason": error.to_string()
                    })))
                }
            }
        }
    }
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(port: u16, client: GeminiClient) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        timetable: Mutex::new(None),
        parameters: Mutex::new(None),
        generating: Mutex::new(false),
        client,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .route("/", web::get().to(index))
            .route("/api/generate", web::post().to(generate))
            .route("/api/timetable", web::get().to(get_timetable))
            .route("/api/move", web::post().to(post_move))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
