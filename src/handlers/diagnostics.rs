use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::{Arc, Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

use crate::models::{DiagnosticsResponse, RoomDiagnostics};
use crate::AppState;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Report live rooms, connections and process resource usage
pub async fn diagnostics(State(app_state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    let rooms: Vec<RoomDiagnostics> = app_state
        .rooms
        .stats()
        .await
        .into_iter()
        .map(|stats| RoomDiagnostics {
            room_id: stats.room_id,
            n_conn: stats.sessions as u32,
            n_segments: stats.segments as u32,
            n_chars: stats.chars as u64,
            n_names_in_use: stats.names_in_use as u32,
        })
        .collect();
    let n_rooms = rooms.len() as u32;
    let n_conn: u32 = rooms.iter().map(|r| r.n_conn).sum();

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| Mutex::new(System::new_all()));
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0),
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Rooms: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_conn,
        n_rooms
    );

    let now = Utc::now();
    Json(DiagnosticsResponse {
        n_rooms,
        n_conn,
        rooms,
        started_at: app_state.started_at,
        uptime_secs: (now - app_state.started_at).num_seconds(),
        cpu_usage,
        memory_alloc,
        memory_total,
        memory_free,
    })
}
