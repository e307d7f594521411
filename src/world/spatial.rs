//! Spatial query boundary and the snapshot-backed default index
//!
//! The engine only ever reads space through `SpatialQuery`. Queries are
//! fallible: if the collaborator is unavailable, the scheduler skips the
//! faction's tick for this cycle rather than block.

use ahash::AHashMap;

use crate::core::error::{EngineError, Result};
use crate::core::types::{FactionId, ShipId, Vec2};
use crate::world::snapshot::{ShipObservation, TerritoryObservation, WorldSnapshot};

/// A foreign ship observed inside a faction's territory
#[derive(Debug, Clone)]
pub struct Threat {
    pub ship: ShipId,
    pub faction: FactionId,
    pub position: Vec2,
    pub distance: f32,
}

/// Read-only spatial collaborator contract
///
/// `Send + Sync` so context building can fan out across a thread pool.
pub trait SpatialQuery: Send + Sync {
    /// All active ships within `radius` of `point`
    fn units_in_range(&self, point: Vec2, radius: f32) -> Result<Vec<ShipObservation>>;

    /// All active foreign ships inside the territory radius
    fn threats_in_territory(&self, territory: &TerritoryObservation) -> Result<Vec<Threat>>;
}

/// Sparse hash grid over a snapshot, for O(1)-ish radius queries
pub struct GridSpatialIndex {
    cell_size: f32,
    cells: AHashMap<(i32, i32), Vec<usize>>,
    ships: Vec<ShipObservation>,
}

impl GridSpatialIndex {
    /// Build an index over the snapshot's active ships
    pub fn build(snapshot: &WorldSnapshot, cell_size: f32) -> Self {
        let ships: Vec<ShipObservation> = snapshot.active_ships().cloned().collect();
        let mut cells: AHashMap<(i32, i32), Vec<usize>> = AHashMap::new();
        for (idx, ship) in ships.iter().enumerate() {
            cells
                .entry(Self::coord(ship.position, cell_size))
                .or_default()
                .push(idx);
        }
        Self { cell_size, cells, ships }
    }

    #[inline]
    fn coord(pos: Vec2, cell_size: f32) -> (i32, i32) {
        (
            (pos.x / cell_size).floor() as i32,
            (pos.y / cell_size).floor() as i32,
        )
    }

    /// Indices of ships in all cells overlapping the radius around `center`
    fn candidates(&self, center: Vec2, radius: f32) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = Self::coord(center, self.cell_size);
        let span = (radius / self.cell_size).ceil() as i32;

        (-span..=span).flat_map(move |dx| {
            (-span..=span).flat_map(move |dy| {
                self.cells
                    .get(&(cx + dx, cy + dy))
                    .into_iter()
                    .flatten()
                    .copied()
            })
        })
    }
}

impl SpatialQuery for GridSpatialIndex {
    fn units_in_range(&self, point: Vec2, radius: f32) -> Result<Vec<ShipObservation>> {
        Ok(self
            .candidates(point, radius)
            .filter(|&idx| self.ships[idx].position.distance(&point) <= radius)
            .map(|idx| self.ships[idx].clone())
            .collect())
    }

    fn threats_in_territory(&self, territory: &TerritoryObservation) -> Result<Vec<Threat>> {
        Ok(self
            .candidates(territory.center, territory.radius)
            .filter_map(|idx| {
                let ship = &self.ships[idx];
                if ship.faction == territory.faction {
                    return None;
                }
                let distance = ship.position.distance(&territory.center);
                if distance <= territory.radius {
                    Some(Threat {
                        ship: ship.id,
                        faction: ship.faction,
                        position: ship.position,
                        distance,
                    })
                } else {
                    None
                }
            })
            .collect())
    }
}

/// Test double that always fails, for skip-policy coverage
pub struct UnavailableSpatial;

impl SpatialQuery for UnavailableSpatial {
    fn units_in_range(&self, _point: Vec2, _radius: f32) -> Result<Vec<ShipObservation>> {
        Err(EngineError::SpatialUnavailable("query layer offline".into()))
    }

    fn threats_in_territory(&self, _territory: &TerritoryObservation) -> Result<Vec<Threat>> {
        Err(EngineError::SpatialUnavailable("query layer offline".into()))
    }
}
