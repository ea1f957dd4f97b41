//! Per-agent records.
//!
//! Records live in a dense `Vec` for cache-friendly iteration; an
//! `FxHashMap` maps entity → slot.  Removal swaps the last record into the
//! vacated slot and fixes its index entry.

use rustc_hash::FxHashMap;
use st_core::{EntityId, Vec2};

use crate::{SteeringRequest, SteeringStatus, StuckTracker, WaypointCache, request::PathJob};

/// Everything the engine knows about one registered agent.
#[derive(Clone, Debug)]
pub struct AgentRecord {
    pub entity:               EntityId,
    pub request:              SteeringRequest,
    pub bucket:               usize,
    /// Status reported by the most recent evaluation.
    pub status:               SteeringStatus,
    /// Seconds until the next unobstructed-range check is allowed.
    pub interaction_cooldown: f32,
    pub waypoints:            WaypointCache,
    pub job:                  Option<PathJob>,
    pub stuck:                StuckTracker,
    /// Where an entity target stood when the current route was planned.
    pub target_anchor:        Option<Vec2>,
}

impl AgentRecord {
    pub fn new(entity: EntityId, request: SteeringRequest, bucket: usize) -> Self {
        Self {
            entity,
            request,
            bucket,
            status:               SteeringStatus::Pending,
            interaction_cooldown: 0.0,
            waypoints:            WaypointCache::default(),
            job:                  None,
            stuck:                StuckTracker::default(),
            target_anchor:        None,
        }
    }
}

/// Dense storage of [`AgentRecord`]s keyed by entity.
#[derive(Default)]
pub struct AgentStore {
    records: Vec<AgentRecord>,
    index:   FxHashMap<EntityId, usize>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.index.contains_key(&entity)
    }

    /// Insert a record for an entity that has none yet.
    pub fn insert(&mut self, record: AgentRecord) {
        debug_assert!(!self.contains(record.entity), "{} already has a record", record.entity);
        self.index.insert(record.entity, self.records.len());
        self.records.push(record);
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<AgentRecord> {
        let slot = self.index.remove(&entity)?;
        let record = self.records.swap_remove(slot);
        if let Some(moved) = self.records.get(slot) {
            self.index.insert(moved.entity, slot);
        }
        Some(record)
    }

    pub fn get(&self, entity: EntityId) -> Option<&AgentRecord> {
        self.index.get(&entity).map(|&slot| &self.records[slot])
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut AgentRecord> {
        self.index.get(&entity).map(|&slot| &mut self.records[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentRecord> + '_ {
        self.records.iter()
    }

    /// Entities assigned to `bucket`, in registration order modulo removals.
    pub fn bucket_members(&self, bucket: usize) -> Vec<EntityId> {
        self.records.iter().filter(|r| r.bucket == bucket).map(|r| r.entity).collect()
    }
}
