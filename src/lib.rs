//! Facade crate for the roadnet map store.
//!
//! This crate re-exports the in-memory road-network store and its entity
//! types from `roadnet-core` so applications can depend on a single crate.
//! Format conversion (text dumps, vendor JSON) lives in `roadnet-data`.

#![forbid(unsafe_code)]

pub use roadnet_core::{
    EntityId, EntityUpdate, Link, MapData, METERS_PER_DEGREE, NetworkSelection, Node,
    RadiusSelection, Relation, Tags, UpdateError, UpdateKind, planar_distance_m,
};
