use std::collections::HashMap;

use crate::fleet_interface::{TelemetrySample, Vehicle, VehicleId};
use crate::math::{ScenePosition, Vec3};
use crate::scene::renderer::MarkerHandle;

/// Live record for one tracked vehicle.
#[derive(Debug, Clone)]
pub struct TrackedEntity {
    pub vehicle: Vehicle,
    pub latest: TelemetrySample,
    /// The sample replaced by the last update. Heading input only, not history.
    pub previous: Option<TelemetrySample>,
    pub marker: MarkerHandle,
    /// Always `project(latest)`.
    pub position: ScenePosition,
    pub direction: Vec3,
    pub length: f64,
    /// Sequence of the request whose sample is currently applied.
    pub applied_seq: u64,
    /// Sequence handed to the most recently issued request.
    pub issued_seq: u64,
}

impl TrackedEntity {
    pub fn id(&self) -> &VehicleId {
        &self.vehicle.id
    }

    pub fn next_seq(&mut self) -> u64 {
        self.issued_seq += 1;
        self.issued_seq
    }
}

/// In-memory set of tracked entities, iterated in insertion order.
#[derive(Debug, Default)]
pub struct VehicleRegistry {
    entities: Vec<TrackedEntity>,
    index: HashMap<VehicleId, usize>,
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entity`; hands it back if its id is already tracked.
    pub fn insert(&mut self, entity: TrackedEntity) -> Result<(), TrackedEntity> {
        if self.index.contains_key(entity.id()) {
            return Err(entity);
        }
        self.index.insert(entity.id().clone(), self.entities.len());
        self.entities.push(entity);
        Ok(())
    }

    pub fn get(&self, id: &VehicleId) -> Option<&TrackedEntity> {
        self.index.get(id).map(|&slot| &self.entities[slot])
    }

    pub fn get_mut(&mut self, id: &VehicleId) -> Option<&mut TrackedEntity> {
        self.index.get(id).map(|&slot| &mut self.entities[slot])
    }

    pub fn contains(&self, id: &VehicleId) -> bool {
        self.index.contains_key(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &TrackedEntity> {
        self.entities.iter()
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut TrackedEntity> {
        self.entities.iter_mut()
    }

    pub fn first(&self) -> Option<&TrackedEntity> {
        self.entities.first()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Removes every entity, in insertion order.
    pub fn drain(&mut self) -> Vec<TrackedEntity> {
        self.index.clear();
        std::mem::take(&mut self.entities)
    }
}
