use std::collections::HashMap;

use geo::Coord;

/// Identifier shared by all entity kinds.
///
/// Identifiers are opaque: the store never derives meaning from them and
/// never checks that a referenced identifier exists.
pub type EntityId = u64;

/// Free-form string key/value attributes attached to nodes and links.
pub type Tags = HashMap<String, String>;

/// A point entity: an intersection or waypoint in the road network.
///
/// Coordinates are planar with caller-defined units; the shipped
/// converters use WGS84 degrees with `x = longitude` and `y = latitude`.
/// All coordinates within one store must use the same units.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use roadnet_core::{Node, Tags};
///
/// let node = Node::new(
///     1,
///     Coord { x: 116.3, y: 39.9 },
///     Tags::from([("type".into(), "intersection".into())]),
/// );
///
/// assert_eq!(node.id, 1);
/// assert_eq!(node.tags.get("type"), Some(&"intersection".to_owned()));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Unique identifier within the node collection.
    pub id: EntityId,
    /// Planar position; mutable in place via the store's update operation.
    pub position: Coord<f64>,
    /// Open-ended attribute bag.
    pub tags: Tags,
}

impl Node {
    /// Construct a `Node` with the provided tags.
    #[must_use]
    pub fn new(id: EntityId, position: Coord<f64>, tags: Tags) -> Self {
        Self { id, position, tags }
    }

    /// Construct a `Node` without tags.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use roadnet_core::Node;
    ///
    /// let node = Node::with_empty_tags(1, Coord { x: 0.0, y: 0.0 });
    /// assert!(node.tags.is_empty());
    /// ```
    #[must_use]
    pub fn with_empty_tags(id: EntityId, position: Coord<f64>) -> Self {
        Self::new(id, position, Tags::new())
    }
}

/// A directed edge entity connecting two node identifiers.
///
/// Endpoints are plain identifier values; they may reference nodes that
/// are absent from the store. Numeric road attributes (length, lane
/// counts, speed limits, traffic-light flags, junction flag, geometry
/// polyline) are carried in [`Tags`] as strings so the text dump format
/// round-trips them verbatim.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    /// Unique identifier within the link collection.
    pub id: EntityId,
    /// Identifier of the start node.
    pub from_node: EntityId,
    /// Identifier of the end node.
    pub to_node: EntityId,
    /// Open-ended attribute bag, including the flattened numeric fields.
    pub tags: Tags,
}

impl Link {
    /// Construct a `Link` with the provided tags.
    #[must_use]
    pub fn new(id: EntityId, from_node: EntityId, to_node: EntityId, tags: Tags) -> Self {
        Self {
            id,
            from_node,
            to_node,
            tags,
        }
    }

    /// Construct a `Link` without tags.
    #[must_use]
    pub fn with_empty_tags(id: EntityId, from_node: EntityId, to_node: EntityId) -> Self {
        Self::new(id, from_node, to_node, Tags::new())
    }
}

/// A turn/continuation entity at a pivot node.
///
/// The incoming and outgoing sequences are ordered lists of link
/// identifiers expressing legal movements through the pivot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relation {
    /// Unique identifier within the relation collection.
    pub id: EntityId,
    /// Identifier of the pivot node.
    pub node_id: EntityId,
    /// Ordered incoming link identifiers.
    pub inlinks: Vec<EntityId>,
    /// Ordered outgoing link identifiers.
    pub outlinks: Vec<EntityId>,
}

impl Relation {
    /// Construct a `Relation`.
    #[must_use]
    pub fn new(
        id: EntityId,
        node_id: EntityId,
        inlinks: Vec<EntityId>,
        outlinks: Vec<EntityId>,
    ) -> Self {
        Self {
            id,
            node_id,
            inlinks,
            outlinks,
        }
    }
}
