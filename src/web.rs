use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::form::{export_teesheet_to_string, validate_request, RemapRequest};
use crate::parser::load_teesheet_from_str;
use crate::remap::store::PlanExecutor;
use crate::remap::types::{OccupantKind, SourceSlot};
use crate::remap::{plan_remap, AssignmentPlan, SlotCapacity, Teesheet, ValidationResult};

// In-memory storage for the teesheet (in production, use a database)
pub struct AppState {
    pub teesheet: Mutex<Teesheet>,
    pub admin_password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

/// Remap apply body: the same request the preview took, plus the sheet
/// version that preview was computed against.
#[derive(Deserialize)]
pub struct ApplyRequest {
    #[serde(flatten)]
    pub remap: RemapRequest,
    pub expected_version: u64,
    /// Commit even when some groups could not be placed. Off by default:
    /// an apply that silently drops occupants is almost never intended.
    #[serde(default)]
    pub allow_unassigned: bool,
}

#[derive(Serialize)]
pub struct SlotView {
    id: u32,
    time: String,
    capacity: u32,
    occupied: u32,
    remaining: u32,
    occupants: Vec<OccupantView>,
}

#[derive(Serialize)]
pub struct OccupantView {
    id: String,
    kind: String,
    display_name: String,
}

#[derive(Serialize)]
pub struct TeesheetResponse {
    version: u64,
    slots: Vec<SlotView>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    total_slots: u32,
    total_capacity: u32,
    total_occupants: u32,
    open_seats: u32,
    members: u32,
    guests: u32,
    fills: u32,
    full_slots: u32,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    version: u64,
    plan: AssignmentPlan,
    validation: ValidationResult,
}

fn kind_name(kind: &OccupantKind) -> &'static str {
    match kind {
        OccupantKind::Member => "member",
        OccupantKind::Guest { .. } => "guest",
        OccupantKind::Fill { .. } => "fill",
    }
}

fn slot_view(slot: &SourceSlot) -> SlotView {
    let capacity = SlotCapacity::new(slot.capacity, slot.occupants.len() as u32);
    SlotView {
        id: slot.id,
        time: slot.time.clone(),
        capacity: capacity.limit,
        occupied: capacity.occupied,
        remaining: capacity.remaining(),
        occupants: slot
            .occupants
            .iter()
            .map(|o| OccupantView {
                id: o.id.clone(),
                kind: kind_name(&o.kind).to_string(),
                display_name: o.display_name.clone(),
            })
            .collect(),
    }
}

// Admin login endpoint
async fn admin_login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if req.password == state.admin_password {
        Ok(HttpResponse::Ok().json(serde_json::json!({"success": true})))
    } else {
        Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Invalid password"})))
    }
}

// Admin teesheet CSV upload endpoint
async fn admin_upload(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    // Check password from header
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if password != state.admin_password {
        return Ok(HttpResponse::Unauthorized()
            .json(serde_json::json!({"success": false, "error": "Unauthorized"})));
    }

    let csv_text = match std::str::from_utf8(&body) {
        Ok(text) => text,
        Err(_) => {
            return Ok(HttpResponse::BadRequest()
                .json(serde_json::json!({"success": false, "error": "Upload is not valid UTF-8"})))
        }
    };

    match load_teesheet_from_str(csv_text) {
        Ok(slots) => {
            let count = slots.len();
            let mut sheet = state.teesheet.lock().unwrap();
            sheet.replace_all(slots);
            info!(slots = count, version = sheet.version(), "teesheet snapshot replaced");
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "slots": count,
                "version": sheet.version(),
                "loaded_at": chrono::Utc::now().to_rfc3339(),
            })))
        }
        Err(e) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!("Failed to process CSV: {}", e)
        }))),
    }
}

// Current teesheet endpoint
async fn get_teesheet(state: web::Data<AppState>) -> Result<HttpResponse> {
    let sheet = state.teesheet.lock().unwrap();
    let response = TeesheetResponse {
        version: sheet.version(),
        slots: sheet.slots().iter().map(slot_view).collect(),
    };
    Ok(HttpResponse::Ok().json(response))
}

// Teesheet CSV export endpoint
async fn export_teesheet(state: web::Data<AppState>) -> Result<HttpResponse> {
    let sheet = state.teesheet.lock().unwrap();
    match export_teesheet_to_string(sheet.slots()) {
        Ok(csv_text) => Ok(HttpResponse::Ok()
            .content_type("text/csv")
            .body(csv_text)),
        Err(e) => Ok(HttpResponse::InternalServerError()
            .json(serde_json::json!({"success": false, "error": e.to_string()}))),
    }
}

// Occupancy stats endpoint
async fn get_stats(state: web::Data<AppState>) -> Result<HttpResponse> {
    let sheet = state.teesheet.lock().unwrap();

    let mut stats = StatsResponse {
        total_slots: 0,
        total_capacity: 0,
        total_occupants: 0,
        open_seats: 0,
        members: 0,
        guests: 0,
        fills: 0,
        full_slots: 0,
    };

    for slot in sheet.slots() {
        let capacity = SlotCapacity::new(slot.capacity, slot.occupants.len() as u32);
        stats.total_slots += 1;
        stats.total_capacity += capacity.limit;
        stats.total_occupants += capacity.occupied;
        stats.open_seats += capacity.remaining();
        if capacity.is_full() {
            stats.full_slots += 1;
        }

        for occupant in &slot.occupants {
            match occupant.kind {
                OccupantKind::Member => stats.members += 1,
                OccupantKind::Guest { .. } => stats.guests += 1,
                OccupantKind::Fill { .. } => stats.fills += 1,
            }
        }
    }

    Ok(HttpResponse::Ok().json(stats))
}

// Remap preview endpoint: computes a plan without touching the sheet.
// Safe to call repeatedly while the admin tries different settings.
async fn remap_preview(
    req: web::Json<RemapRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let opts = match validate_request(&req) {
        Ok(opts) => opts,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(serde_json::json!({"success": false, "error": e})))
        }
    };

    let sheet = state.teesheet.lock().unwrap();
    match plan_remap(sheet.slots(), &opts) {
        Ok((plan, validation)) => Ok(HttpResponse::Ok().json(PreviewResponse {
            version: sheet.version(),
            plan,
            validation,
        })),
        Err(e) => Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": e.to_string()}))),
    }
}

// Remap apply endpoint: recomputes the plan under the lock and commits it.
async fn remap_apply(
    req: web::Json<ApplyRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let opts = match validate_request(&req.remap) {
        Ok(opts) => opts,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(serde_json::json!({"success": false, "error": e})))
        }
    };

    let mut sheet = state.teesheet.lock().unwrap();

    // The plan the admin previewed was computed against a specific sheet
    // version. If the sheet moved since, they must preview again; a partial
    // retry against fresh state is never attempted here.
    if sheet.version() != req.expected_version {
        warn!(
            expected = req.expected_version,
            actual = sheet.version(),
            "remap apply rejected: stale snapshot"
        );
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "success": false,
            "error": "Teesheet changed since preview; re-run the preview",
            "version": sheet.version(),
        })));
    }

    let (plan, validation) = match plan_remap(sheet.slots(), &opts) {
        Ok(result) => result,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(serde_json::json!({"success": false, "error": e.to_string()})))
        }
    };

    if !plan.unassigned_groups.is_empty() && !req.allow_unassigned {
        let stranded: u32 = plan.unassigned_groups.iter().map(|g| g.size() as u32).sum();
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "success": false,
            "error": format!(
                "{} occupants could not be placed; add capacity or set allow_unassigned",
                stranded
            ),
            "validation": validation,
        })));
    }

    match sheet.apply(&plan.source_range_slot_ids, &plan.target_slots) {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "version": sheet.version(),
            "validation": validation,
            "unassigned_groups": plan.unassigned_groups,
            "applied_at": chrono::Utc::now().to_rfc3339(),
        }))),
        Err(e) => Ok(HttpResponse::BadRequest()
            .json(serde_json::json!({"success": false, "error": e.to_string()}))),
    }
}

pub async fn start_server(
    port: u16,
    admin_password: String,
    initial_sheet: Teesheet,
) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        teesheet: Mutex::new(initial_sheet),
        admin_password,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .route("/api/login", web::post().to(admin_login))
            .route("/api/upload", web::post().to(admin_upload))
            .route("/api/teesheet", web::get().to(get_teesheet))
            .route("/api/teesheet/export", web::get().to(export_teesheet))
            .route("/api/stats", web::get().to(get_stats))
            .route("/api/remap/preview", web::post().to(remap_preview))
            .route("/api/remap/apply", web::post().to(remap_apply))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
