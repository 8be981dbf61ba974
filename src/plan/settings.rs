//! Settings snapshots and the expected post-condition of a plan.
//!
//! A [`Settings`] value maps every [`Resource`] to either a concrete
//! value or `None` ("don't care").  The same type carries both the
//! *expected* snapshot folded from a plan and the *observed* snapshot
//! polled from hardware; an observed `None` means the reading was stale.

use serde::Serialize;
use serde::ser::SerializeMap;

use super::{Instruction, Plan, Resource};

/// Resource name → value, with `None` as don't-care / unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings([Option<u16>; Resource::COUNT]);

impl Settings {
    /// Every resource don't-care.
    pub const fn unset() -> Self {
        Self([None; Resource::COUNT])
    }

    pub fn get(&self, resource: Resource) -> Option<u16> {
        self.0[resource.slot()]
    }

    pub fn set(&mut self, resource: Resource, value: u16) {
        self.0[resource.slot()] = Some(value);
    }

    pub fn clear(&mut self, resource: Resource) {
        self.0[resource.slot()] = None;
    }

    /// `(resource, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, Option<u16>)> + '_ {
        Resource::ALL.into_iter().map(|r| (r, self.get(r)))
    }

    /// Resources with a concrete value.
    pub fn concrete(&self) -> impl Iterator<Item = (Resource, u16)> + '_ {
        self.iter().filter_map(|(r, v)| v.map(|v| (r, v)))
    }

    /// Does `observed` satisfy these expectations?
    ///
    /// Don't-care entries are ignored.  A concrete expectation is only met
    /// by an equal concrete observation, never by an unknown one.
    pub fn matches(&self, observed: &Settings) -> bool {
        self.concrete()
            .all(|(r, expected)| observed.get(r) == Some(expected))
    }
}

impl Serialize for Settings {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut map = s.serialize_map(Some(Resource::COUNT))?;
        for (r, v) in self.iter() {
            map.serialize_entry(r.name(), &v)?;
        }
        map.end()
    }
}

/// The snapshot a fully executed plan should leave behind.
///
/// Pure: folds each assignment over an all-unset accumulator in declared
/// order, so a later assignment to the same resource wins.  Directives
/// contribute nothing.
pub fn expected_settings(plan: &Plan) -> Settings {
    plan.steps
        .iter()
        .fold(Settings::unset(), |mut acc, step| {
            if let Instruction::Set(resource, value) = *step {
                acc.set(resource, value);
            }
            acc
        })
}
