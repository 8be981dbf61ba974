//! Infer the active mode from live hardware readings.
//!
//! Every plan's expected settings are folded once at construction.  A
//! query polls each resource in turn (one bus command at a time), then
//! compares the observed snapshot against each expectation in plan
//! declaration order.  The first match wins; no match is `"custom"`.
//!
//! A stale reading is recorded as unknown, so it can only satisfy a
//! don't-care expectation.

use std::sync::Arc;

use heapless::Vec;
use log::debug;
use serde::{Serialize, Serializer};

use crate::app::ports::BusPort;
use crate::drivers::Equipment;
use crate::plan::{ModeId, PlanTable, Resource, Settings, expected_settings};

/// Reported when no plan's expectations are met.
pub const CUSTOM_MODE: &str = "custom";

/// Live settings plus the resources whose reads failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub settings: Settings,
    pub stale: Vec<Resource, { Resource::COUNT }>,
}

/// Result of a mode query: `{mode, settings, stale?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeCheck {
    #[serde(serialize_with = "mode_or_custom")]
    pub mode: Option<ModeId>,
    pub settings: Settings,
    #[serde(skip_serializing_if = "none_stale")]
    pub stale: Vec<Resource, { Resource::COUNT }>,
}

impl ModeCheck {
    pub fn mode_name(&self) -> &'static str {
        self.mode.map_or(CUSTOM_MODE, ModeId::name)
    }
}

fn none_stale(stale: &Vec<Resource, { Resource::COUNT }>) -> bool {
    stale.is_empty()
}

fn mode_or_custom<S: Serializer>(mode: &Option<ModeId>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(mode.map_or(CUSTOM_MODE, ModeId::name))
}

pub struct Reconciler<B> {
    equipment: Arc<Equipment<B>>,
    expected: std::vec::Vec<(ModeId, Settings)>,
}

impl<B: BusPort> Reconciler<B> {
    pub fn new(equipment: Arc<Equipment<B>>, table: &PlanTable) -> Self {
        let expected = table
            .plans()
            .iter()
            .map(|p| (p.mode, expected_settings(p)))
            .collect();
        Self {
            equipment,
            expected,
        }
    }

    /// Poll every resource, one after the other.
    pub async fn get_settings(&self) -> Snapshot {
        let mut settings = Settings::unset();
        let mut stale = Vec::new();
        for resource in Resource::ALL {
            let obs = self.equipment.get(resource).await;
            if obs.stale {
                // capacity equals the resource count
                let _ = stale.push(resource);
            } else {
                settings.set(resource, obs.value);
            }
        }
        Snapshot { settings, stale }
    }

    /// First mode, in declaration order, whose expectations `observed`
    /// satisfies.
    pub fn match_settings(&self, observed: &Settings) -> Option<ModeId> {
        self.expected
            .iter()
            .find(|(_, expected)| expected.matches(observed))
            .map(|(mode, _)| *mode)
    }

    /// Identify the active mode from live readings.  Never fails.
    pub async fn find_mode(&self) -> ModeCheck {
        let Snapshot { settings, stale } = self.get_settings().await;
        let mode = self.match_settings(&settings);
        debug!(
            "detected mode {} (stale: {})",
            mode.map_or(CUSTOM_MODE, ModeId::name),
            stale.len()
        );
        ModeCheck {
            mode,
            settings,
            stale,
        }
    }
}
