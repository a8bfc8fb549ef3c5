//! Read-only configuration endpoints: version and vendor status

use crate::config::{resolve_api_key, Candidate, Vendor, VendorInfo};
use crate::server::ServerAppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
}

/// Vendor status. Reports whether a key exists, never the key itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersInfo {
    pub active: Vendor,
    pub base_url: String,
    /// Candidate order the sequencer will actually use
    pub candidates: Vec<Candidate>,
    pub vendors: Vec<VendorInfo>,
}

pub async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn providers_handler(State(state): State<ServerAppState>) -> Json<ProvidersInfo> {
    let config = state.dispatcher.config();
    let active = state.dispatcher.vendor();

    let vendors = Vendor::all()
        .iter()
        .map(|vendor| {
            let is_active = *vendor == active;
            let has_key = if is_active {
                state.dispatcher.has_credentials()
            } else {
                resolve_api_key(*vendor, &state.secrets).is_some()
            };
            vendor.preset().to_info(has_key, is_active)
        })
        .collect();

    Json(ProvidersInfo {
        active,
        base_url: config.effective_base_url(),
        candidates: config.effective_candidates(),
        vendors,
    })
}
