// ── Health score domain types ──

use serde::{Deserialize, Serialize};
use std::fmt;

/// A percentage guaranteed to lie in `[0, 100]`.
///
/// Controllers report health as bare floats; anything outside the range is
/// rejected at conversion time rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentage(f64);

impl Percentage {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    /// Returns `None` for NaN, infinities and out-of-range values.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (Self::MIN..=Self::MAX).contains(&value)).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Percentage {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("percentage out of range [0, 100]: {value}"))
    }
}

impl From<Percentage> for f64 {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Network-wide health as reported by the controller.
///
/// Catalyst Center reports only the overall score; the component scores
/// are `None` there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkHealthScore {
    pub overall: Percentage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Percentage>,
}

/// Wireless/wired client health as reported by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClientHealthScore {
    pub total_clients: u64,
    pub healthy_clients: u64,
    pub unhealthy_clients: u64,
    pub score: Percentage,
}

impl ClientHealthScore {
    /// Score derived from the client counts, for controllers that report
    /// counts without an explicit score. An empty network scores 100.
    pub fn derived_score(healthy_clients: u64, total_clients: u64) -> Option<Percentage> {
        if total_clients == 0 {
            return Percentage::new(Percentage::MAX);
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = healthy_clients as f64 / total_clients as f64;
        Percentage::new(ratio * 100.0)
    }
}
