//! The `MapData` store: entity CRUD, validated updates, and change
//! notification.
//!
//! Storage is insertion-ordered per entity kind. Overwriting an existing
//! identifier keeps the entity's original position, so iteration order
//! (and with it the nearest-node tie-break) stays reproducible across a
//! store's lifetime.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use geo::Coord;
use thiserror::Error;

use crate::{EntityId, Link, Node, Relation};

mod query;

pub use query::{METERS_PER_DEGREE, NetworkSelection, RadiusSelection, planar_distance_m};

/// The entity kind carried by a change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpdateKind {
    /// A node position changed.
    Node,
    /// A link endpoint changed.
    Link,
    /// A relation pivot or link sequence changed.
    Relation,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Link => "link",
            Self::Relation => "relation",
        })
    }
}

/// Errors returned by the update operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    /// The update targeted an identifier absent from the store.
    ///
    /// This is the only failure mode: updates never validate the values
    /// they write, only that the target exists.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Entity kind the update targeted.
        kind: UpdateKind,
        /// Identifier that was not present.
        id: EntityId,
    },
}

/// One element of a [`MapData::batch_update`] sequence.
///
/// Optional fields model "provided vs not provided" explicitly: a
/// provided value is always applied, including `0`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityUpdate {
    /// Move a node to a new position.
    Node {
        /// Target node identifier.
        id: EntityId,
        /// Replacement position.
        position: Coord<f64>,
    },
    /// Rewire one or both endpoints of a link.
    Link {
        /// Target link identifier.
        id: EntityId,
        /// Replacement start node, if provided.
        from_node: Option<EntityId>,
        /// Replacement end node, if provided.
        to_node: Option<EntityId>,
    },
    /// Repoint a relation's pivot or replace its link sequences.
    Relation {
        /// Target relation identifier.
        id: EntityId,
        /// Replacement for the whole incoming sequence, if provided.
        inlink: Option<EntityId>,
        /// Replacement pivot node, if provided.
        node_id: Option<EntityId>,
        /// Replacement for the whole outgoing sequence, if provided.
        outlink: Option<EntityId>,
    },
}

/// Insertion-ordered entity collection keyed by [`EntityId`].
///
/// Mirrors the behaviour the store contract depends on: duplicate insert
/// overwrites in place, iteration yields entities in first-insert order.
#[derive(Debug, Clone)]
struct EntityMap<T> {
    index: HashMap<EntityId, usize>,
    entries: Vec<T>,
}

impl<T> Default for EntityMap<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<T> EntityMap<T> {
    fn insert(&mut self, id: EntityId, entity: T) {
        match self.index.entry(id) {
            Entry::Occupied(occupied) => {
                if let Some(slot) = self.entries.get_mut(*occupied.get()) {
                    *slot = entity;
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(self.entries.len());
                self.entries.push(entity);
            }
        }
    }

    fn get(&self, id: EntityId) -> Option<&T> {
        self.index.get(&id).and_then(|&slot| self.entries.get(slot))
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.index
            .get(&id)
            .and_then(|&slot| self.entries.get_mut(slot))
    }

    fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

type UpdateCallback = Box<dyn FnMut(UpdateKind, EntityId)>;

/// The in-memory road-network store.
///
/// Single-threaded and synchronous: every operation runs to completion
/// before returning, and the borrow checker rules out mutation during an
/// in-progress scan. Hosts that share a store across threads must wrap it
/// in their own exclusive lock.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use roadnet_core::{MapData, Node};
///
/// let mut map = MapData::new();
/// map.add_node(Node::with_empty_tags(1, Coord { x: 0.0, y: 0.0 }));
///
/// assert!(map.get_node(1).is_some());
/// assert!(map.get_node(2).is_none());
/// ```
#[derive(Default)]
pub struct MapData {
    nodes: EntityMap<Node>,
    links: EntityMap<Link>,
    relations: EntityMap<Relation>,
    update_callbacks: Vec<UpdateCallback>,
}

impl fmt::Debug for MapData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapData")
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .field("relations", &self.relations.len())
            .field("update_callbacks", &self.update_callbacks.len())
            .finish()
    }
}

impl MapData {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, overwriting any existing node with the same id.
    ///
    /// Inserts never fire change notifications and never validate
    /// referenced identifiers.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Insert a link, overwriting any existing link with the same id.
    pub fn add_link(&mut self, link: Link) {
        self.links.insert(link.id, link);
    }

    /// Insert a relation, overwriting any existing relation with the same id.
    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.insert(relation.id, relation);
    }

    /// Look up a node by id. Absence is a valid result, not an error.
    #[must_use]
    pub fn get_node(&self, id: EntityId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up a link by id.
    #[must_use]
    pub fn get_link(&self, id: EntityId) -> Option<&Link> {
        self.links.get(id)
    }

    /// Look up a relation by id.
    #[must_use]
    pub fn get_relation(&self, id: EntityId) -> Option<&Relation> {
        self.relations.get(id)
    }

    /// Iterate over all nodes in insertion order.
    pub fn get_all_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Iterate over all links in insertion order.
    pub fn get_all_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    /// Iterate over all relations in insertion order.
    pub fn get_all_relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    /// Number of stored nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored links.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Number of stored relations.
    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Whether the store holds no entities of any kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.links.is_empty() && self.relations.is_empty()
    }

    /// Register a change observer.
    ///
    /// Observers are invoked synchronously, in registration order, on
    /// every successful update with the mutation kind and the mutated
    /// identifier, not the new value; read current state through the
    /// store once the update call returns. There is no unregister:
    /// observers live for the store's lifetime.
    pub fn add_update_callback<F>(&mut self, callback: F)
    where
        F: FnMut(UpdateKind, EntityId) + 'static,
    {
        self.update_callbacks.push(Box::new(callback));
    }

    fn notify_update(&mut self, kind: UpdateKind, id: EntityId) {
        for callback in &mut self.update_callbacks {
            callback(kind, id);
        }
    }

    /// Move a node to `new_position`, leaving its tags untouched.
    ///
    /// Fires exactly one `node` notification on success. Updating an
    /// absent id is a no-op reported as [`UpdateError::NotFound`]; no
    /// notification fires.
    ///
    /// # Errors
    /// [`UpdateError::NotFound`] when no node with `id` exists.
    pub fn update_node(
        &mut self,
        id: EntityId,
        new_position: Coord<f64>,
    ) -> Result<(), UpdateError> {
        let node = self.nodes.get_mut(id).ok_or(UpdateError::NotFound {
            kind: UpdateKind::Node,
            id,
        })?;
        node.position = new_position;
        self.notify_update(UpdateKind::Node, id);
        Ok(())
    }

    /// Rewire a link's endpoints.
    ///
    /// Each endpoint is replaced only when provided; a provided value is
    /// always applied, including `0`. Fires one `link` notification on
    /// success, even when both fields are `None`.
    ///
    /// # Errors
    /// [`UpdateError::NotFound`] when no link with `id` exists.
    pub fn update_link(
        &mut self,
        id: EntityId,
        new_from: Option<EntityId>,
        new_to: Option<EntityId>,
    ) -> Result<(), UpdateError> {
        let link = self.links.get_mut(id).ok_or(UpdateError::NotFound {
            kind: UpdateKind::Link,
            id,
        })?;
        if let Some(from_node) = new_from {
            link.from_node = from_node;
        }
        if let Some(to_node) = new_to {
            link.to_node = to_node;
        }
        self.notify_update(UpdateKind::Link, id);
        Ok(())
    }

    /// Repoint a relation's pivot or replace its link sequences.
    ///
    /// A provided `new_inlink` REPLACES the entire incoming sequence with
    /// a single-element sequence; it is not an append. `new_outlink`
    /// behaves the same for the outgoing sequence. Fires one `relation`
    /// notification on success.
    ///
    /// # Errors
    /// [`UpdateError::NotFound`] when no relation with `id` exists.
    pub fn update_relation(
        &mut self,
        id: EntityId,
        new_inlink: Option<EntityId>,
        new_node: Option<EntityId>,
        new_outlink: Option<EntityId>,
    ) -> Result<(), UpdateError> {
        let relation = self.relations.get_mut(id).ok_or(UpdateError::NotFound {
            kind: UpdateKind::Relation,
            id,
        })?;
        if let Some(inlink) = new_inlink {
            relation.inlinks = vec![inlink];
        }
        if let Some(node_id) = new_node {
            relation.node_id = node_id;
        }
        if let Some(outlink) = new_outlink {
            relation.outlinks = vec![outlink];
        }
        self.notify_update(UpdateKind::Relation, id);
        Ok(())
    }

    /// Apply a sequence of updates in order, one at a time.
    ///
    /// There is no atomicity: a failure partway through leaves the prior
    /// updates applied and does not roll back. The per-item results are
    /// returned in input order for callers that want to inspect them.
    pub fn batch_update<I>(&mut self, updates: I) -> Vec<Result<(), UpdateError>>
    where
        I: IntoIterator<Item = EntityUpdate>,
    {
        updates
            .into_iter()
            .map(|update| match update {
                EntityUpdate::Node { id, position } => self.update_node(id, position),
                EntityUpdate::Link {
                    id,
                    from_node,
                    to_node,
                } => self.update_link(id, from_node, to_node),
                EntityUpdate::Relation {
                    id,
                    inlink,
                    node_id,
                    outlink,
                } => self.update_relation(id, inlink, node_id, outlink),
            })
            .collect()
    }
}
