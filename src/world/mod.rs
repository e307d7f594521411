//! World snapshot and external collaborator boundaries

pub mod services;
pub mod snapshot;
pub mod spatial;

pub use services::{Command, CommandQueue};
pub use snapshot::{ShipObservation, TerritoryObservation, WorldSnapshot};
pub use spatial::{GridSpatialIndex, SpatialQuery, Threat};
