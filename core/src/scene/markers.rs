use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

use crate::fleet_interface::{TelemetrySample, Vehicle, VehicleId};
use crate::math::Projector;
use crate::scene::registry::TrackedEntity;
use crate::scene::renderer::{IndicatorSpec, MarkerHandle, MarkerId, MarkerSpec, SceneRenderer};

/// Creates, moves and destroys the marker/indicator pair of each entity and
/// owns the marker-id to vehicle-id dispatch table used for clicks.
pub struct MarkerManager {
    projector: Projector,
    handles: HashMap<VehicleId, MarkerHandle>,
    dispatch: HashMap<MarkerId, VehicleId>,
    rng: StdRng,
}

impl MarkerManager {
    pub fn new(projector: Projector, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            projector,
            handles: HashMap::new(),
            dispatch: HashMap::new(),
            rng,
        }
    }

    /// Allocates the scene objects for `vehicle` placed at its first sample.
    pub fn create<R: SceneRenderer>(
        &mut self,
        renderer: &mut R,
        vehicle: Vehicle,
        sample: TelemetrySample,
    ) -> TrackedEntity {
        let position = self.projector.project(&sample);
        let (direction, length) = self.projector.initial_heading(position);

        let marker = renderer.create_marker(MarkerSpec {
            vehicle: vehicle.id.clone(),
            position,
            hue: self.rng.gen_range(0.0..360.0),
        });
        let indicator = renderer.create_indicator(IndicatorSpec {
            origin: position,
            direction,
            length,
        });
        let handle = MarkerHandle { marker, indicator };

        self.handles.insert(vehicle.id.clone(), handle);
        self.dispatch.insert(marker, vehicle.id.clone());

        TrackedEntity {
            vehicle,
            latest: sample,
            previous: None,
            marker: handle,
            position,
            direction,
            length,
            applied_seq: 0,
            issued_seq: 0,
        }
    }

    /// Moves marker and indicator to `sample` together, then rotates the
    /// entity's samples. A degenerate heading keeps the current direction.
    pub fn update<R: SceneRenderer>(
        &self,
        renderer: &mut R,
        entity: &mut TrackedEntity,
        sample: TelemetrySample,
    ) {
        let position = self.projector.project(&sample);
        let heading = self.projector.heading(Some(&entity.latest), &sample);
        if let Some(direction) = heading.direction {
            entity.direction = direction;
        }
        entity.length = heading.magnitude;
        entity.position = position;

        renderer.place_marker(entity.marker.marker, position);
        renderer.place_indicator(
            entity.marker.indicator,
            IndicatorSpec {
                origin: position,
                direction: entity.direction,
                length: entity.length,
            },
        );

        entity.previous = Some(std::mem::replace(&mut entity.latest, sample));
    }

    pub fn resolve_click(&self, marker: MarkerId) -> Option<&VehicleId> {
        self.dispatch.get(&marker)
    }

    pub fn lookup(&self, vehicle: &VehicleId) -> Option<MarkerHandle> {
        self.handles.get(vehicle).copied()
    }

    pub fn destroy<R: SceneRenderer>(&mut self, renderer: &mut R, entity: &TrackedEntity) {
        renderer.destroy_marker(entity.marker.marker);
        renderer.destroy_indicator(entity.marker.indicator);
        self.dispatch.remove(&entity.marker.marker);
        self.handles.remove(entity.id());
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
