//! In-memory road-network map store.
//!
//! [`MapData`] owns three entity collections, keyed by identifier:
//! intersections ([`Node`]), directed road segments ([`Link`]) and turn
//! relations ([`Relation`]). It exposes insert/lookup, validated in-place
//! updates with synchronous change notification, and spatial range
//! queries: nearest node, axis-aligned rectangle, radius, and one-hop
//! network expansion.
//!
//! The store is deliberately simple: linear scans over insertion-ordered
//! collections, no referential integrity between entity kinds, and no
//! persistence. Format conversion lives in the `roadnet-data` crate.

#![forbid(unsafe_code)]

mod entity;
pub mod store;

pub use entity::{EntityId, Link, Node, Relation, Tags};
pub use store::{
    EntityUpdate, METERS_PER_DEGREE, MapData, NetworkSelection, RadiusSelection, UpdateError,
    UpdateKind, planar_distance_m,
};
