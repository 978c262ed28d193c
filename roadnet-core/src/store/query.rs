//! Spatial queries over the store: nearest node, rectangle, radius, and
//! one-hop network expansion.
//!
//! All queries are linear scans over the insertion-ordered collections.
//! Joins across entity kinds filter by identifier-set membership and
//! never dereference, so dangling references simply fail to match.

use std::collections::HashSet;

use geo::{Coord, Intersects, Rect};

use crate::{EntityId, Link, MapData, Node, Relation};

/// Scale factor turning planar degree distances into approximate metres.
///
/// The radius queries use a deliberately simplified planar Euclidean
/// distance scaled by this constant. It is an approximation, not a
/// geodesic computation, and callers relying on reproducible results
/// depend on this exact value.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

fn euclidean(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Planar Euclidean distance between two coordinates, scaled by
/// [`METERS_PER_DEGREE`] to approximate metres for degree inputs.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use roadnet_core::planar_distance_m;
///
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 0.01, y: 0.0 };
/// assert!((planar_distance_m(a, b) - 1110.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn planar_distance_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    euclidean(a, b) * METERS_PER_DEGREE
}

/// Result of [`MapData::find_within_radius`].
///
/// Links are selected by endpoint membership in the node set and
/// relations by pivot membership, so both may reference identifiers that
/// are not in `nodes`.
#[derive(Debug, Clone)]
pub struct RadiusSelection<'a> {
    /// Nodes within the radius, in insertion order.
    pub nodes: Vec<&'a Node>,
    /// Links with either endpoint in the node set, in insertion order.
    pub links: Vec<&'a Link>,
    /// Relations with their pivot in the node set, in insertion order.
    pub relations: Vec<&'a Relation>,
}

/// Result of [`MapData::network_within_radius`].
#[derive(Debug, Clone)]
pub struct NetworkSelection<'a> {
    /// Nodes within the radius plus the far endpoints of matched links,
    /// in insertion order.
    pub nodes: Vec<&'a Node>,
    /// Links touching at least one in-radius node, in insertion order.
    pub links: Vec<&'a Link>,
}

impl MapData {
    /// Find the node nearest to `point` by planar Euclidean distance in
    /// the stored coordinate units.
    ///
    /// Ties break to the first-inserted node: the scan runs in insertion
    /// order and only a strictly smaller distance replaces the current
    /// winner. Returns `None` only when the store holds zero nodes.
    #[must_use]
    pub fn find_nearest_node(&self, point: Coord<f64>) -> Option<&Node> {
        let mut nearest: Option<(&Node, f64)> = None;
        for node in self.get_all_nodes() {
            let dist = euclidean(point, node.position);
            match nearest {
                Some((_, best)) if dist >= best => {}
                _ => nearest = Some((node, dist)),
            }
        }
        nearest.map(|(node, _)| node)
    }

    /// All nodes whose position falls within `bounds`.
    ///
    /// Containment is boundary-inclusive on all four edges.
    #[must_use]
    pub fn find_nodes_in_rectangle(&self, bounds: &Rect<f64>) -> Vec<&Node> {
        self.get_all_nodes()
            // `Intersects` treats boundary points as inside the rectangle.
            .filter(|node| bounds.intersects(&node.position))
            .collect()
    }

    /// All links with either endpoint id in the set of nodes matched by
    /// `bounds`.
    #[must_use]
    pub fn find_links_in_rectangle(&self, bounds: &Rect<f64>) -> Vec<&Link> {
        let node_ids = self.node_ids_in_rectangle(bounds);
        self.links_touching(&node_ids)
    }

    /// All relations whose pivot id is in the set of nodes matched by
    /// `bounds`.
    ///
    /// Deliberately a separate call from the node+link query: callers
    /// wanting relations alongside [`MapData::elements_in_rectangle`]
    /// issue both.
    #[must_use]
    pub fn find_relations_in_rectangle(&self, bounds: &Rect<f64>) -> Vec<&Relation> {
        let node_ids = self.node_ids_in_rectangle(bounds);
        self.get_all_relations()
            .filter(|relation| node_ids.contains(&relation.node_id))
            .collect()
    }

    /// The `(nodes, links)` pair for a rectangle, computed in one pass
    /// over the node set.
    ///
    /// # Examples
    /// ```
    /// use geo::{Coord, Rect};
    /// use roadnet_core::{Link, MapData, Node};
    ///
    /// let mut map = MapData::new();
    /// map.add_node(Node::with_empty_tags(1, Coord { x: 0.0, y: 0.0 }));
    /// map.add_node(Node::with_empty_tags(2, Coord { x: 100.0, y: 0.0 }));
    /// map.add_link(Link::with_empty_tags(10, 1, 2));
    ///
    /// let bounds = Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 });
    /// let (nodes, links) = map.elements_in_rectangle(&bounds);
    /// assert_eq!(nodes.len(), 1);
    /// // Link 10 matches through its in-rectangle endpoint.
    /// assert_eq!(links.len(), 1);
    /// ```
    #[must_use]
    pub fn elements_in_rectangle(&self, bounds: &Rect<f64>) -> (Vec<&Node>, Vec<&Link>) {
        let nodes = self.find_nodes_in_rectangle(bounds);
        let node_ids: HashSet<EntityId> = nodes.iter().map(|node| node.id).collect();
        let links = self.links_touching(&node_ids);
        (nodes, links)
    }

    /// All nodes within `radius_m` of `center`, plus the links and
    /// relations selected by membership in that node set.
    ///
    /// Distance is [`planar_distance_m`]: planar Euclidean scaled by
    /// [`METERS_PER_DEGREE`], so `radius_m` is approximate metres when
    /// coordinates are degrees. The comparison is inclusive (`<=`).
    #[must_use]
    pub fn find_within_radius(&self, center: Coord<f64>, radius_m: f64) -> RadiusSelection<'_> {
        let nodes: Vec<&Node> = self
            .get_all_nodes()
            .filter(|node| planar_distance_m(center, node.position) <= radius_m)
            .collect();
        let node_ids: HashSet<EntityId> = nodes.iter().map(|node| node.id).collect();
        let links = self.links_touching(&node_ids);
        let relations = self
            .get_all_relations()
            .filter(|relation| node_ids.contains(&relation.node_id))
            .collect();
        RadiusSelection {
            nodes,
            links,
            relations,
        }
    }

    /// The one-hop network closure around `center`.
    ///
    /// Stage one selects nodes within `radius_m` and every link touching
    /// any of them. Stage two re-expands the node set to include BOTH
    /// endpoints of every matched link, so a link's far endpoint is
    /// returned even when it lies outside the radius. Expanded endpoint
    /// ids with no stored node are absent from the result rather than an
    /// error.
    #[must_use]
    pub fn network_within_radius(&self, center: Coord<f64>, radius_m: f64) -> NetworkSelection<'_> {
        let mut node_ids: HashSet<EntityId> = self
            .get_all_nodes()
            .filter(|node| planar_distance_m(center, node.position) <= radius_m)
            .map(|node| node.id)
            .collect();
        let links = self.links_touching(&node_ids);
        for link in &links {
            node_ids.insert(link.from_node);
            node_ids.insert(link.to_node);
        }
        let nodes = self
            .get_all_nodes()
            .filter(|node| node_ids.contains(&node.id))
            .collect();
        NetworkSelection { nodes, links }
    }

    fn node_ids_in_rectangle(&self, bounds: &Rect<f64>) -> HashSet<EntityId> {
        self.get_all_nodes()
            .filter(|node| bounds.intersects(&node.position))
            .map(|node| node.id)
            .collect()
    }

    fn links_touching(&self, node_ids: &HashSet<EntityId>) -> Vec<&Link> {
        self.get_all_links()
            .filter(|link| node_ids.contains(&link.from_node) || node_ids.contains(&link.to_node))
            .collect()
    }
}
