use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-room figures reported by a live coordinator
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct RoomDiagnostics {
    pub room_id: String,
    pub n_conn: u32,
    pub n_segments: u32,
    pub n_chars: u64,
    pub n_names_in_use: u32,
}

/// Response for diagnostics information
#[derive(Serialize, Deserialize, ToSchema)]
pub struct DiagnosticsResponse {
    pub n_rooms: u32,
    pub n_conn: u32,
    pub rooms: Vec<RoomDiagnostics>,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
    pub cpu_usage: f32,
    pub memory_alloc: u64,
    pub memory_total: u64,
    pub memory_free: u64,
}
