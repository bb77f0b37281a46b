// Controller API response types
//
// Every query endpoint wraps its payload as `{ "response": ... }`. Fields use
// `#[serde(default)]` liberally because controller releases disagree about
// which fields are present; anything unmodelled lands in `extra`.

use serde::{Deserialize, Serialize};

// ── Envelopes ────────────────────────────────────────────────────────

/// Standard response envelope for the intent API.
///
/// ```json
/// { "response": [...], "version": "1.0" }
/// ```
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub response: T,
}

/// Token endpoint payload: `{ "Token": "eyJ..." }`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "Token")]
    pub token: String,
}

/// Health endpoints return a single object on some controllers and a
/// time-series array on others. Only the newest entry matters here.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    /// The single object, or the last (newest) array element.
    pub fn into_latest(self) -> Option<T> {
        match self {
            Self::One(item) => Some(item),
            Self::Many(mut items) => items.pop(),
        }
    }
}

// ── Device ───────────────────────────────────────────────────────────

/// Device object from `network-device`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDevice {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub management_ip_address: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    /// `Reachable`, `Unreachable`, `Ping Reachable`, ...
    #[serde(default)]
    pub reachability_status: Option<String>,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    /// Human-readable uptime, e.g. `"12 days, 3:04:05.00"`.
    #[serde(default)]
    pub up_time: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Health ───────────────────────────────────────────────────────────

/// Network health entry from `network-health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkHealthEntry {
    #[serde(default, alias = "healthScore")]
    pub overall_health_score: Option<f64>,
    #[serde(default)]
    pub connectivity: Option<f64>,
    #[serde(default)]
    pub performance: Option<f64>,
    #[serde(default)]
    pub security: Option<f64>,
    #[serde(default)]
    pub availability: Option<f64>,
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub good_count: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Client health entry from `client-health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientHealthEntry {
    #[serde(default)]
    pub total_clients: Option<u64>,
    #[serde(default)]
    pub healthy_clients: Option<u64>,
    #[serde(default)]
    pub unhealthy_clients: Option<u64>,
    #[serde(default)]
    pub health_score: Option<f64>,
    /// Catalyst Center breakdown by client type and score band.
    #[serde(default)]
    pub score_detail: Option<Vec<ClientScoreDetail>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One node of the `scoreDetail` tree.
///
/// ```json
/// { "scoreCategory": { "scoreCategory": "CLIENT_TYPE", "value": "ALL" },
///   "scoreValue": 93, "clientCount": 15, "scoreList": [...] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientScoreDetail {
    #[serde(default)]
    pub score_category: Option<ScoreCategory>,
    /// `-1` when the controller has no data yet.
    #[serde(default)]
    pub score_value: Option<f64>,
    #[serde(default)]
    pub client_count: Option<u64>,
    #[serde(default)]
    pub score_list: Option<Vec<ClientScoreDetail>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCategory {
    /// `CLIENT_TYPE` or `SCORE_TYPE`.
    #[serde(default)]
    pub score_category: Option<String>,
    /// `ALL`, `WIRED`, `WIRELESS`, `GOOD`, `FAIR`, `POOR`, `IDLE`, ...
    #[serde(default)]
    pub value: Option<String>,
}

impl ClientScoreDetail {
    pub fn category_value(&self) -> Option<&str> {
        self.score_category.as_ref()?.value.as_deref()
    }

    pub fn children(&self) -> &[ClientScoreDetail] {
        self.score_list.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn device_keeps_unknown_fields() {
        let device: NetworkDevice = serde_json::from_value(json!({
            "id": "a1b2",
            "hostname": "HQ-Router",
            "type": "Cisco CSR1000v",
            "managementIpAddress": "203.0.113.2",
            "collectionStatus": "Managed"
        }))
        .unwrap();

        assert_eq!(device.device_type.as_deref(), Some("Cisco CSR1000v"));
        assert_eq!(device.management_ip_address.as_deref(), Some("203.0.113.2"));
        assert!(device.extra.contains_key("collectionStatus"));
    }

    #[test]
    fn health_accepts_object_or_array() {
        let one: OneOrMany<NetworkHealthEntry> =
            serde_json::from_value(json!({ "overallHealthScore": 98.5 })).unwrap();
        assert_eq!(one.into_latest().unwrap().overall_health_score, Some(98.5));

        let many: OneOrMany<NetworkHealthEntry> = serde_json::from_value(json!([
            { "healthScore": 90.0 },
            { "healthScore": 97.0 }
        ]))
        .unwrap();
        assert_eq!(many.into_latest().unwrap().overall_health_score, Some(97.0));
    }

    #[test]
    fn client_score_detail_tolerates_nulls() {
        let entry: ClientHealthEntry = serde_json::from_value(json!({
            "siteId": "global",
            "scoreDetail": [{
                "scoreCategory": { "scoreCategory": "CLIENT_TYPE", "value": "ALL" },
                "scoreValue": -1,
                "clientCount": 0,
                "scoreList": null
            }]
        }))
        .unwrap();
        let detail = entry.score_detail.unwrap();
        assert_eq!(detail[0].category_value(), Some("ALL"));
        assert!(detail[0].children().is_empty());
    }

    #[test]
    fn empty_health_array_has_no_latest() {
        let many: OneOrMany<ClientHealthEntry> = serde_json::from_value(json!([])).unwrap();
        assert!(many.into_latest().is_none());
    }
}
