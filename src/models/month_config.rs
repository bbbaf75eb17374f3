//! Per-envelope, per-month configuration
//!
//! A `MonthConfig` holds the allocation budgeted to an envelope for one month
//! and the overspend policy that applies to that month. At most one record
//! exists per (envelope, month).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{EnvelopeId, MonthConfigId};
use super::money::Money;
use super::month::Month;

/// What happens to a negative envelope balance at the end of a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverspendMode {
    /// The deficit reduces money available to budget and does not roll over
    #[default]
    AffectAvailable,
    /// The deficit stays on the envelope and carries into the next month
    AffectEnvelope,
}

impl OverspendMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "affectavailable" | "available" => Some(Self::AffectAvailable),
            "affectenvelope" | "envelope" => Some(Self::AffectEnvelope),
            _ => None,
        }
    }
}

impl fmt::Display for OverspendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AffectAvailable => write!(f, "affect available"),
            Self::AffectEnvelope => write!(f, "affect envelope"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthConfig {
    pub id: MonthConfigId,

    pub envelope_id: EnvelopeId,

    pub month: Month,

    /// Money budgeted to the envelope for this month
    #[serde(default)]
    pub allocation: Money,

    #[serde(default)]
    pub overspend_mode: OverspendMode,

    #[serde(default)]
    pub note: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Soft-delete timestamp; a tombstoned config reads as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MonthConfig {
    pub fn new(envelope_id: EnvelopeId, month: Month) -> Self {
        let now = Utc::now();
        Self {
            id: MonthConfigId::new(),
            envelope_id,
            month,
            allocation: Money::ZERO,
            overspend_mode: OverspendMode::default(),
            note: String::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_allocation(envelope_id: EnvelopeId, month: Month, allocation: Money) -> Self {
        let mut config = Self::new(envelope_id, month);
        config.allocation = allocation;
        config
    }

    pub fn set_allocation(&mut self, allocation: Money) {
        self.allocation = allocation;
        self.updated_at = Utc::now();
    }

    pub fn set_overspend_mode(&mut self, mode: OverspendMode) {
        self.overspend_mode = mode;
        self.updated_at = Utc::now();
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

impl fmt::Display for MonthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} allocation: {} ({})",
            self.month, self.allocation, self.overspend_mode
        )
    }
}
