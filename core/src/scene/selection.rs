use crate::fleet_interface::{TelemetrySample, Vehicle, VehicleId};
use crate::scene::renderer::DetailPanel;

/// Content of the detail panel for the focused vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDetail {
    pub name: String,
    pub speed: f64,
    pub battery_level: f64,
    pub cpu_usage: f64,
    pub lat: f64,
    pub lng: f64,
}

impl VehicleDetail {
    pub fn new(vehicle: &Vehicle, sample: &TelemetrySample) -> Self {
        Self {
            name: vehicle.name.clone(),
            speed: sample.speed,
            battery_level: sample.battery_level,
            cpu_usage: sample.cpu_usage,
            lat: sample.lat,
            lng: sample.lng,
        }
    }

    pub fn coordinates(&self) -> String {
        format!("{}, {}", self.lat, self.lng)
    }
}

/// A user request waiting for its telemetry round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    pub vehicle: VehicleId,
    pub generation: u64,
    /// Search-by-id also moves the camera onto the marker.
    pub recenter: bool,
}

/// Tracks FocusState and which pending user request is still current.
///
/// Every select/search bumps the generation; a response only commits if it
/// matches the latest pending request. `close` drops both focus and pending,
/// so a late response cannot reopen the panel.
#[derive(Debug, Default)]
pub struct SelectionController {
    focus: Option<VehicleId>,
    pending: Option<PendingSelection>,
    generation: u64,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Option<&VehicleId> {
        self.focus.as_ref()
    }

    pub fn is_focused(&self, vehicle: &VehicleId) -> bool {
        self.focus.as_ref() == Some(vehicle)
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        self.pending.as_ref()
    }

    /// Registers a new request and returns its generation.
    pub fn begin(&mut self, vehicle: VehicleId, recenter: bool) -> u64 {
        self.generation += 1;
        self.pending = Some(PendingSelection {
            vehicle,
            generation: self.generation,
            recenter,
        });
        self.generation
    }

    /// Commits the pending request if `generation` is still current and it
    /// targets `vehicle`. Returns the committed request.
    pub fn commit(&mut self, generation: u64, vehicle: &VehicleId) -> Option<PendingSelection> {
        let current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation && &pending.vehicle == vehicle);
        if !current {
            return None;
        }
        let pending = self.pending.take()?;
        self.focus = Some(pending.vehicle.clone());
        Some(pending)
    }

    /// Drops the pending request if `generation` is still current. Focus is untouched.
    pub fn abandon(&mut self, generation: u64) -> bool {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation)
        {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn close<P: DetailPanel>(&mut self, panel: &mut P) {
        self.focus = None;
        self.pending = None;
        panel.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample, RecordingPanel};

    #[test]
    fn commit_requires_current_generation() {
        let mut selection = SelectionController::new();
        let a = VehicleId::new("a");
        let b = VehicleId::new("b");
        let first = selection.begin(a.clone(), false);
        let second = selection.begin(b.clone(), true);

        assert!(selection.commit(first, &a).is_none());
        assert!(selection.focus().is_none());

        let committed = selection.commit(second, &b).unwrap();
        assert!(committed.recenter);
        assert!(selection.is_focused(&b));
        assert!(selection.pending().is_none());
    }

    #[test]
    fn close_discards_pending_request() {
        let mut selection = SelectionController::new();
        let mut panel = RecordingPanel::default();
        let a = VehicleId::new("a");
        let generation = selection.begin(a.clone(), false);

        selection.close(&mut panel);

        assert!(selection.commit(generation, &a).is_none());
        assert!(selection.focus().is_none());
        assert!(!panel.visible);
    }

    #[test]
    fn abandon_keeps_existing_focus() {
        let mut selection = SelectionController::new();
        let a = VehicleId::new("a");
        let generation = selection.begin(a.clone(), false);
        selection.commit(generation, &a).unwrap();

        let miss = selection.begin(VehicleId::new("ghost"), true);
        assert!(selection.abandon(miss));
        assert!(!selection.abandon(miss));
        assert!(selection.is_focused(&a));
    }

    #[test]
    fn detail_formats_coordinates() {
        let detail = VehicleDetail::new(
            &Vehicle::new("a", "Alpha"),
            &sample("a", 51.5, -1.25, 27.9),
        );
        assert_eq!(detail.name, "Alpha");
        assert_eq!(detail.coordinates(), "51.5, -1.25");
    }
}
