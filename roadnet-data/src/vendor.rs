//! Vendor JSON ingestion.
//!
//! The vendor export is an array of link-centric records: each record
//! embeds its endpoint nodes, a geometry polyline, per-direction lane /
//! speed / traffic-light attributes, and optionally the turn relation at
//! the link's end node. The `position` field of an embedded node is a
//! *stringified* tuple (`"(x, y, z)"`), not a JSON array, a known
//! fragility of the format that requires literal parsing here.
//!
//! The converter's only job is to project these records into the three
//! entity kinds of the store; it is not part of the query engine.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use serde::Deserialize;
use thiserror::Error;

use roadnet_core::{EntityId, Link, MapData, Node, Relation, Tags, planar_distance_m};

use crate::dump::{DumpError, write_dump};
use crate::fs;

/// An endpoint node embedded in a vendor link record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VendorNodeInfo {
    /// Node identifier.
    pub id: EntityId,
    /// Stringified `(x, y, z)` tuple; see [`module docs`](self).
    pub position: String,
}

/// One link-centric record of the vendor export.
///
/// Absent attribute fields take the vendor defaults on conversion:
/// one lane, speed limit 60, no traffic lights, not a junction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VendorRecord {
    /// Link identifier (also used for the derived relation).
    pub id: EntityId,
    /// Start endpoint.
    pub start_node_info: VendorNodeInfo,
    /// End endpoint.
    pub end_node_info: VendorNodeInfo,
    /// Polyline as `[x, y]` points.
    #[serde(default)]
    pub geometry: Vec<[f64; 2]>,
    /// Lane count, start to end.
    #[serde(default)]
    pub lane_num_s2e: Option<u32>,
    /// Lane count, end to start.
    #[serde(default)]
    pub lane_num_e2s: Option<u32>,
    /// Speed limit, start to end.
    #[serde(default)]
    pub speed_limit_s2e: Option<f64>,
    /// Speed limit, end to start.
    #[serde(default)]
    pub speed_limit_e2s: Option<f64>,
    /// Traffic light at the end of the start-to-end direction.
    #[serde(default)]
    pub traffic_light_s2e: Option<bool>,
    /// Traffic light at the end of the end-to-start direction.
    #[serde(default)]
    pub traffic_light_e2s: Option<bool>,
    /// Whether the link is part of a junction.
    #[serde(default)]
    pub junction: Option<bool>,
    /// Pivot node of the turn relation, when the record carries one.
    #[serde(default)]
    pub node_id: Option<EntityId>,
    /// Incoming link ids of the turn relation.
    #[serde(default)]
    pub in_link_ids: Option<Vec<EntityId>>,
    /// Outgoing link ids of the turn relation.
    #[serde(default)]
    pub out_link_ids: Option<Vec<EntityId>>,
}

/// Errors returned by the vendor converter.
#[derive(Debug, Error)]
pub enum VendorError {
    /// The input file could not be read.
    #[error("failed to read vendor export from {path}: {source}")]
    Read {
        /// Location of the vendor export.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The input was not valid JSON for the expected record shape.
    #[error("failed to decode vendor export: {source}")]
    Json {
        /// Decoder error returned by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// A `position` tuple string did not parse.
    #[error("malformed position tuple {value:?}")]
    MalformedPosition {
        /// The tuple string as it appeared in the export.
        value: String,
    },
    /// Writing the converted dump failed.
    #[error(transparent)]
    Dump(#[from] DumpError),
}

/// Decode a vendor export from JSON text.
///
/// # Errors
/// [`VendorError::Json`] when the text is not a valid record array.
pub fn parse_vendor_json(text: &str) -> Result<Vec<VendorRecord>, VendorError> {
    serde_json::from_str(text).map_err(|source| VendorError::Json { source })
}

/// Project vendor records into a fresh [`MapData`].
///
/// Endpoint nodes shared by several records are inserted repeatedly;
/// the store's last-write-wins insert makes that harmless.
///
/// # Errors
/// [`VendorError::MalformedPosition`] when an embedded node's tuple
/// string does not parse.
pub fn convert_vendor_records(records: &[VendorRecord]) -> Result<MapData, VendorError> {
    let mut map = MapData::new();
    for record in records {
        map.add_node(convert_node(&record.start_node_info)?);
        map.add_node(convert_node(&record.end_node_info)?);
        map.add_link(convert_link(record));
        if let Some(node_id) = record.node_id {
            map.add_relation(Relation::new(
                record.id,
                node_id,
                record.in_link_ids.clone().unwrap_or_default(),
                record.out_link_ids.clone().unwrap_or_default(),
            ));
        }
    }
    Ok(map)
}

/// Convert a vendor export file into a text dump file.
///
/// Returns the converted store so callers can report entity counts.
///
/// # Errors
/// Read, decode, position, and write failures, in that order.
pub fn convert_vendor_file(input: &Utf8Path, output: &Utf8Path) -> Result<MapData, VendorError> {
    let text = fs::read_utf8_file(input).map_err(|source| VendorError::Read {
        path: input.to_owned(),
        source,
    })?;
    let records = parse_vendor_json(&text)?;
    let map = convert_vendor_records(&records)?;
    write_dump(&map, output)?;
    Ok(map)
}

fn convert_node(info: &VendorNodeInfo) -> Result<Node, VendorError> {
    let position = parse_position(&info.position)?;
    Ok(Node::with_empty_tags(info.id, position))
}

fn convert_link(record: &VendorRecord) -> Link {
    let mut tags = Tags::new();
    tags.insert("length".to_owned(), polyline_length_m(&record.geometry).to_string());
    tags.insert(
        "lane_num_s2e".to_owned(),
        record.lane_num_s2e.unwrap_or(1).to_string(),
    );
    tags.insert(
        "lane_num_e2s".to_owned(),
        record.lane_num_e2s.unwrap_or(1).to_string(),
    );
    tags.insert(
        "speed_limit_s2e".to_owned(),
        record.speed_limit_s2e.unwrap_or(60.0).to_string(),
    );
    tags.insert(
        "speed_limit_e2s".to_owned(),
        record.speed_limit_e2s.unwrap_or(60.0).to_string(),
    );
    tags.insert(
        "traffic_light_s2e".to_owned(),
        flag(record.traffic_light_s2e.unwrap_or(false)),
    );
    tags.insert(
        "traffic_light_e2s".to_owned(),
        flag(record.traffic_light_e2s.unwrap_or(false)),
    );
    tags.insert("junction".to_owned(), flag(record.junction.unwrap_or(false)));
    if !record.geometry.is_empty() {
        tags.insert("geometry".to_owned(), geometry_string(&record.geometry));
    }
    Link::new(
        record.id,
        record.start_node_info.id,
        record.end_node_info.id,
        tags,
    )
}

/// Parse a stringified `(x, y[, z])` tuple into a planar coordinate.
///
/// Accepts round or square brackets, or none at all. The altitude, when
/// present, is validated and discarded like everywhere else.
fn parse_position(value: &str) -> Result<Coord<f64>, VendorError> {
    let trimmed = value
        .trim()
        .trim_start_matches(['(', '['])
        .trim_end_matches([')', ']']);
    let mut parts = trimmed.split(',').map(|part| part.trim().parse::<f64>());
    let malformed = || VendorError::MalformedPosition {
        value: value.to_owned(),
    };
    let x = parts.next().and_then(Result::ok).ok_or_else(malformed)?;
    let y = parts.next().and_then(Result::ok).ok_or_else(malformed)?;
    for altitude in parts {
        altitude.map_err(|_| malformed())?;
    }
    Ok(Coord { x, y })
}

/// Polyline length: summed planar segment distances in approximate metres.
fn polyline_length_m(geometry: &[[f64; 2]]) -> f64 {
    geometry
        .windows(2)
        .filter_map(|pair| match pair {
            [[x1, y1], [x2, y2]] => Some(planar_distance_m(
                Coord { x: *x1, y: *y1 },
                Coord { x: *x2, y: *y2 },
            )),
            _ => None,
        })
        .sum()
}

fn geometry_string(geometry: &[[f64; 2]]) -> String {
    geometry
        .iter()
        .map(|[x, y]| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(";")
}

fn flag(value: bool) -> String {
    u8::from(value).to_string()
}
