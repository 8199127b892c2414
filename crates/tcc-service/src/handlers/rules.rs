//! Reward rule administration handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use tcc_core::{PurchaseCategory, RewardRuleConfig};
use tcc_store::Store;

use crate::auth::ServiceAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Reward configuration response.
#[derive(Debug, Serialize)]
pub struct RulesResponse {
    /// Configuration version.
    pub version: u64,
    /// TCC per euro conversion rate.
    pub tcc_per_euro: i64,
    /// Base multiplier by purchase category.
    pub base_multipliers: HashMap<PurchaseCategory, i64>,
    /// Fallback multiplier.
    pub default_multiplier: i64,
    /// Percentage boost by market area.
    pub area_boosts: HashMap<String, i64>,
    /// Percentage boost by purchase category.
    pub category_boosts: HashMap<PurchaseCategory, i64>,
    /// Flat check-in base reward.
    pub checkin_base: i64,
    /// Flat civic-report reward.
    pub civic_report_reward: i64,
    /// Who last updated the configuration.
    pub updated_by: String,
    /// When the configuration was last updated.
    pub updated_at: String,
}

impl From<&RewardRuleConfig> for RulesResponse {
    fn from(config: &RewardRuleConfig) -> Self {
        Self {
            version: config.version,
            tcc_per_euro: config.tcc_per_euro,
            base_multipliers: config.base_multipliers.clone(),
            default_multiplier: config.default_multiplier,
            area_boosts: config.area_boosts.clone(),
            category_boosts: config.category_boosts.clone(),
            checkin_base: config.checkin_base,
            civic_report_reward: config.civic_report_reward,
            updated_by: config.updated_by.clone(),
            updated_at: config.updated_at.to_rfc3339(),
        }
    }
}

/// Get the active reward configuration.
pub async fn get_rules(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
) -> Result<Json<RulesResponse>, ApiError> {
    let config = state.reward_config()?;
    Ok(Json(RulesResponse::from(&config)))
}

/// Reward configuration update request. Full replacement; the version is
/// assigned server-side.
#[derive(Debug, Deserialize)]
pub struct UpdateRulesRequest {
    /// TCC per euro conversion rate.
    pub tcc_per_euro: i64,
    /// Base multiplier by purchase category.
    pub base_multipliers: HashMap<PurchaseCategory, i64>,
    /// Fallback multiplier.
    pub default_multiplier: i64,
    /// Percentage boost by market area.
    #[serde(default)]
    pub area_boosts: HashMap<String, i64>,
    /// Percentage boost by purchase category.
    #[serde(default)]
    pub category_boosts: HashMap<PurchaseCategory, i64>,
    /// Flat check-in base reward.
    pub checkin_base: i64,
    /// Flat civic-report reward.
    pub civic_report_reward: i64,
    /// Who is making the update.
    pub updated_by: String,
}

/// Replace the active reward configuration.
pub async fn update_rules(
    State(state): State<Arc<AppState>>,
    _auth: ServiceAuth,
    Json(body): Json<UpdateRulesRequest>,
) -> Result<Json<RulesResponse>, ApiError> {
    if body.tcc_per_euro <= 0 {
        return Err(ApiError::BadRequest(
            "tcc_per_euro must be positive".into(),
        ));
    }
    if body.default_multiplier < 0 || body.base_multipliers.values().any(|&m| m < 0) {
        return Err(ApiError::BadRequest(
            "multipliers must be non-negative".into(),
        ));
    }
    if body.checkin_base < 0 || body.civic_report_reward < 0 {
        return Err(ApiError::BadRequest(
            "flat rewards must be non-negative".into(),
        ));
    }

    let current_version = state
        .store
        .get_reward_config()?
        .map_or(0, |config| config.version);

    let config = RewardRuleConfig {
        version: current_version + 1,
        tcc_per_euro: body.tcc_per_euro,
        base_multipliers: body.base_multipliers,
        default_multiplier: body.default_multiplier,
        area_boosts: body.area_boosts,
        category_boosts: body.category_boosts,
        checkin_base: body.checkin_base,
        civic_report_reward: body.civic_report_reward,
        updated_by: body.updated_by,
        updated_at: Utc::now(),
    };
    state.store.put_reward_config(&config)?;

    tracing::info!(
        version = %config.version,
        tcc_per_euro = %config.tcc_per_euro,
        updated_by = %config.updated_by,
        "Reward configuration updated"
    );

    Ok(Json(RulesResponse::from(&config)))
}
