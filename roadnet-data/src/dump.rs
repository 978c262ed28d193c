//! The line-oriented text dump format.
//!
//! One record per line, whitespace-separated fields:
//!
//! ```text
//! N <id> <x> <y> <z> [key=value ...]
//! L <id> <from> <to> <length> <lane_num_s2e> <lane_num_e2s>
//!   <speed_limit_s2e> <speed_limit_e2s> <traffic_light_s2e>
//!   <traffic_light_e2s> <junction> <geometry> [key=value ...]
//! R <id> <node_id> <inlinks_csv> <outlinks_csv>
//! ```
//!
//! Node altitude `<z>` is parsed for validation and then discarded; the
//! store's data model is two-dimensional. Every fixed link field after
//! `<to>` is folded verbatim into the link's tag map under its field
//! name, which is what makes writing and reloading a dump reproduce the
//! numeric field strings bit-for-bit. Blank lines and `#` comments are
//! skipped; unknown leading tokens are ignored.
//!
//! A malformed record aborts the whole load with the first error.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use log::debug;
use thiserror::Error;

use roadnet_core::{EntityId, Link, MapData, Node, Relation, Tags};

use crate::fs;

/// Fixed link fields in line order, with the defaults the writer falls
/// back on when a link was built without the corresponding tag.
const LINK_FIELD_TAGS: [(&str, &str); 9] = [
    ("length", "0"),
    ("lane_num_s2e", "1"),
    ("lane_num_e2s", "1"),
    ("speed_limit_s2e", "60"),
    ("speed_limit_e2s", "60"),
    ("traffic_light_s2e", "0"),
    ("traffic_light_e2s", "0"),
    ("junction", "0"),
    ("geometry", "0,0"),
];

/// Errors returned when loading or writing a text dump.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The dump file could not be read.
    #[error("failed to read map dump from {path}: {source}")]
    Read {
        /// Location of the dump file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The dump file could not be written.
    #[error("failed to write map dump to {path}: {source}")]
    Write {
        /// Destination file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A record had too few fields or a field failed to parse.
    #[error("malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number of the offending record.
        line: usize,
        /// What was wrong with the record.
        reason: String,
    },
    /// A link geometry token did not parse as `;`-separated `x,y` pairs.
    #[error("malformed geometry on line {line}: {value:?}")]
    MalformedGeometry {
        /// 1-based line number of the offending record.
        line: usize,
        /// The geometry token as it appeared in the dump.
        value: String,
    },
}

/// Parse a complete dump into a fresh [`MapData`].
///
/// # Examples
/// ```
/// use roadnet_data::parse_dump;
///
/// let map = parse_dump("N 1 0.0 0.0 12.5\nL 7 1 2 5 1 1 60 60 0 0 0 0.0,0.0;1.0,1.0\n")?;
/// assert_eq!(map.node_count(), 1);
/// assert_eq!(map.link_count(), 1);
/// # Ok::<(), roadnet_data::DumpError>(())
/// ```
///
/// # Errors
/// The first malformed record aborts the load with
/// [`DumpError::MalformedRecord`] or [`DumpError::MalformedGeometry`].
pub fn parse_dump(text: &str) -> Result<MapData, DumpError> {
    let mut map = MapData::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        match fields.first().copied() {
            Some("N") => map.add_node(parse_node_record(&fields, line)?),
            Some("L") => map.add_link(parse_link_record(&fields, line)?),
            Some("R") => map.add_relation(parse_relation_record(&fields, line)?),
            Some(other) => debug!("ignoring unknown record token {other:?} on line {line}"),
            None => {}
        }
    }
    Ok(map)
}

/// Load a dump file from disk.
///
/// # Errors
/// [`DumpError::Read`] on I/O failure, otherwise as [`parse_dump`].
pub fn load_dump(path: &Utf8Path) -> Result<MapData, DumpError> {
    let text = fs::read_utf8_file(path).map_err(|source| DumpError::Read {
        path: path.to_owned(),
        source,
    })?;
    parse_dump(&text)
}

/// Render a store to dump text, the inverse of [`parse_dump`].
///
/// Node lines emit `0` for the altitude the data model discards. Link
/// lines emit the reserved tag values verbatim (or their defaults), then
/// any remaining tags as `key=value` pairs sorted by key so output is
/// deterministic.
#[must_use]
pub fn render_dump(map: &MapData) -> String {
    let mut out = String::new();
    for node in map.get_all_nodes() {
        out.push_str(&format!(
            "N {} {} {} 0",
            node.id, node.position.x, node.position.y
        ));
        push_tag_pairs(&mut out, &node.tags, &[]);
        out.push('\n');
    }
    for link in map.get_all_links() {
        out.push_str(&format!("L {} {} {}", link.id, link.from_node, link.to_node));
        for (key, default) in LINK_FIELD_TAGS {
            let value = link.tags.get(key).map_or(default, String::as_str);
            out.push(' ');
            out.push_str(value);
        }
        push_tag_pairs(&mut out, &link.tags, &LINK_FIELD_TAGS);
        out.push('\n');
    }
    for relation in map.get_all_relations() {
        out.push_str(&format!(
            "R {} {} {} {}\n",
            relation.id,
            relation.node_id,
            join_ids(&relation.inlinks),
            join_ids(&relation.outlinks)
        ));
    }
    out
}

/// Write a store to a dump file on disk.
///
/// # Errors
/// [`DumpError::Write`] on I/O failure.
pub fn write_dump(map: &MapData, path: &Utf8Path) -> Result<(), DumpError> {
    fs::write_utf8_file(path, &render_dump(map)).map_err(|source| DumpError::Write {
        path: path.to_owned(),
        source,
    })
}

fn parse_node_record(fields: &[&str], line: usize) -> Result<Node, DumpError> {
    let id = parse_id(field(fields, 1, line, "id")?, line, "id")?;
    let x = parse_number(field(fields, 2, line, "x")?, line, "x")?;
    let y = parse_number(field(fields, 3, line, "y")?, line, "y")?;
    // Altitude is validated but not retained.
    parse_number(field(fields, 4, line, "z")?, line, "z")?;
    let tags = parse_tag_pairs(fields.get(5..).unwrap_or(&[]), line)?;
    Ok(Node::new(id, Coord { x, y }, tags))
}

fn parse_link_record(fields: &[&str], line: usize) -> Result<Link, DumpError> {
    let id = parse_id(field(fields, 1, line, "id")?, line, "id")?;
    let from_node = parse_id(field(fields, 2, line, "from")?, line, "from")?;
    let to_node = parse_id(field(fields, 3, line, "to")?, line, "to")?;

    let mut tags = Tags::new();
    for (offset, (key, _)) in LINK_FIELD_TAGS.iter().enumerate() {
        let token = field(fields, 4 + offset, line, key)?;
        match *key {
            "length" | "speed_limit_s2e" | "speed_limit_e2s" => {
                parse_number(token, line, key)?;
            }
            "lane_num_s2e" | "lane_num_e2s" => {
                parse_count(token, line, key)?;
            }
            "traffic_light_s2e" | "traffic_light_e2s" | "junction" => {
                parse_flag(token, line, key)?;
            }
            _ => validate_geometry(token, line)?,
        }
        tags.insert((*key).to_owned(), token.to_owned());
    }
    for (key, value) in parse_tag_pairs(fields.get(13..).unwrap_or(&[]), line)? {
        tags.insert(key, value);
    }
    Ok(Link::new(id, from_node, to_node, tags))
}

fn parse_relation_record(fields: &[&str], line: usize) -> Result<Relation, DumpError> {
    let id = parse_id(field(fields, 1, line, "id")?, line, "id")?;
    let node_id = parse_id(field(fields, 2, line, "node_id")?, line, "node_id")?;
    let inlinks = parse_id_list(field(fields, 3, line, "inlinks")?, line, "inlinks")?;
    let outlinks = parse_id_list(field(fields, 4, line, "outlinks")?, line, "outlinks")?;
    // Relations carry no tag map; trailing pairs are accepted and dropped.
    Ok(Relation::new(id, node_id, inlinks, outlinks))
}

fn field<'a>(
    fields: &[&'a str],
    index: usize,
    line: usize,
    name: &str,
) -> Result<&'a str, DumpError> {
    fields
        .get(index)
        .copied()
        .ok_or_else(|| DumpError::MalformedRecord {
            line,
            reason: format!("missing {name} field"),
        })
}

fn parse_id(value: &str, line: usize, name: &str) -> Result<EntityId, DumpError> {
    value.parse().map_err(|_| DumpError::MalformedRecord {
        line,
        reason: format!("{name} {value:?} is not an identifier"),
    })
}

fn parse_number(value: &str, line: usize, name: &str) -> Result<f64, DumpError> {
    value.parse().map_err(|_| DumpError::MalformedRecord {
        line,
        reason: format!("{name} {value:?} is not numeric"),
    })
}

fn parse_count(value: &str, line: usize, name: &str) -> Result<u64, DumpError> {
    value.parse().map_err(|_| DumpError::MalformedRecord {
        line,
        reason: format!("{name} {value:?} is not a count"),
    })
}

fn parse_flag(value: &str, line: usize, name: &str) -> Result<bool, DumpError> {
    match value {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(DumpError::MalformedRecord {
            line,
            reason: format!("{name} {value:?} is not a 0/1 flag"),
        }),
    }
}

fn parse_id_list(value: &str, line: usize, name: &str) -> Result<Vec<EntityId>, DumpError> {
    value
        .split(',')
        .map(|item| parse_id(item, line, name))
        .collect()
}

fn validate_geometry(value: &str, line: usize) -> Result<(), DumpError> {
    for pair in value.split(';') {
        let parsed = pair
            .split_once(',')
            .map(|(x, y)| (x.parse::<f64>(), y.parse::<f64>()));
        match parsed {
            Some((Ok(_), Ok(_))) => {}
            _ => {
                return Err(DumpError::MalformedGeometry {
                    line,
                    value: value.to_owned(),
                });
            }
        }
    }
    Ok(())
}

fn parse_tag_pairs(fields: &[&str], line: usize) -> Result<Tags, DumpError> {
    let mut tags = Tags::new();
    for raw in fields {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| DumpError::MalformedRecord {
                line,
                reason: format!("{raw:?} is not a key=value pair"),
            })?;
        tags.insert(key.to_owned(), value.to_owned());
    }
    Ok(tags)
}

fn push_tag_pairs(out: &mut String, tags: &Tags, reserved: &[(&str, &str)]) {
    let mut pairs: Vec<(&String, &String)> = tags
        .iter()
        .filter(|(key, _)| !reserved.iter().any(|(name, _)| *name == key.as_str()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in pairs {
        out.push_str(&format!(" {key}={value}"));
    }
}

fn join_ids(ids: &[EntityId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const SAMPLE: &str = "\
# road network extract
N 1 116.3 39.9 10.5 type=intersection
N 2 116.4 39.9 0

L 7 1 2 11100 2 1 60 40 1 0 0 116.3,39.9;116.4,39.9 name=ring-road
R 9 2 7 7
X some vendor extension line
";

    #[rstest]
    fn parses_all_three_record_kinds() {
        let map = parse_dump(SAMPLE).expect("sample parses");
        assert_eq!(map.node_count(), 2);
        assert_eq!(map.link_count(), 1);
        assert_eq!(map.relation_count(), 1);
    }

    #[rstest]
    fn node_altitude_is_discarded_and_tags_kept() {
        let map = parse_dump(SAMPLE).expect("sample parses");
        let node = map.get_node(1).expect("node 1 loaded");
        assert_eq!(node.position, Coord { x: 116.3, y: 39.9 });
        assert_eq!(node.tags.get("type"), Some(&"intersection".to_owned()));
    }

    #[rstest]
    fn link_fields_are_flattened_into_tags_verbatim() {
        let map = parse_dump(SAMPLE).expect("sample parses");
        let link = map.get_link(7).expect("link 7 loaded");
        assert_eq!((link.from_node, link.to_node), (1, 2));
        assert_eq!(link.tags.get("length"), Some(&"11100".to_owned()));
        assert_eq!(link.tags.get("lane_num_s2e"), Some(&"2".to_owned()));
        assert_eq!(link.tags.get("speed_limit_e2s"), Some(&"40".to_owned()));
        assert_eq!(link.tags.get("traffic_light_s2e"), Some(&"1".to_owned()));
        assert_eq!(
            link.tags.get("geometry"),
            Some(&"116.3,39.9;116.4,39.9".to_owned())
        );
        assert_eq!(link.tags.get("name"), Some(&"ring-road".to_owned()));
    }

    #[rstest]
    fn relation_lists_preserve_order() {
        let text = "R 9 2 1,2,3 4,5\n";
        let map = parse_dump(text).expect("relation parses");
        let relation = map.get_relation(9).expect("relation 9 loaded");
        assert_eq!(relation.inlinks, vec![1, 2, 3]);
        assert_eq!(relation.outlinks, vec![4, 5]);
    }

    #[rstest]
    fn blank_comment_and_unknown_lines_are_skipped() {
        let text = "\n# comment\nX 1 2 3\n   \n";
        let map = parse_dump(text).expect("nothing to load");
        assert!(map.is_empty());
    }

    #[rstest]
    #[case::missing_fields("N 1 0.0 0.0\n")]
    #[case::bad_coordinate("N 1 east 0.0 0\n")]
    #[case::bad_tag_pair("N 1 0.0 0.0 0 oops\n")]
    #[case::short_link("L 7 1 2 5 1 1 60 60 0 0 0\n")]
    #[case::bad_flag("L 7 1 2 5 1 1 60 60 yes 0 0 0,0\n")]
    #[case::bad_lane_count("L 7 1 2 5 one 1 60 60 0 0 0 0,0\n")]
    #[case::bad_relation_csv("R 9 2 1,x 3\n")]
    fn malformed_records_abort_the_load(#[case] text: &str) {
        let error = parse_dump(text).expect_err("record must be rejected");
        assert!(matches!(error, DumpError::MalformedRecord { line: 1, .. }));
    }

    #[rstest]
    #[case("0.0;1.0,1.0")]
    #[case("x,y")]
    #[case("1.0,2.0;")]
    fn malformed_geometry_is_its_own_error(#[case] geometry: &str) {
        let text = format!("L 7 1 2 5 1 1 60 60 0 0 0 {geometry}\n");
        let error = parse_dump(&text).expect_err("geometry must be rejected");
        assert!(matches!(error, DumpError::MalformedGeometry { line: 1, .. }));
    }

    #[rstest]
    fn error_reports_the_offending_line_number() {
        let text = "N 1 0.0 0.0 0\nN 2 bad 0.0 0\n";
        let error = parse_dump(text).expect_err("second line is malformed");
        assert!(matches!(error, DumpError::MalformedRecord { line: 2, .. }));
    }

    #[rstest]
    fn render_emits_defaults_for_untagged_links() {
        let mut map = MapData::new();
        map.add_link(Link::with_empty_tags(7, 1, 2));
        assert_eq!(render_dump(&map), "L 7 1 2 0 1 1 60 60 0 0 0 0,0\n");
    }

    #[rstest]
    fn render_round_trips_through_parse() {
        let original = parse_dump(SAMPLE).expect("sample parses");
        let rendered = render_dump(&original);
        let reloaded = parse_dump(&rendered).expect("rendered dump parses");

        let positions: Vec<_> = reloaded.get_all_nodes().map(|n| (n.id, n.position)).collect();
        assert_eq!(
            positions,
            original.get_all_nodes().map(|n| (n.id, n.position)).collect::<Vec<_>>()
        );
        assert_eq!(reloaded.get_link(7), original.get_link(7));
        assert_eq!(reloaded.get_relation(9), original.get_relation(9));
    }

    #[rstest]
    fn rendered_dump_is_deterministic() {
        let mut map = MapData::new();
        let mut tags = Tags::new();
        tags.insert("zeta".to_owned(), "1".to_owned());
        tags.insert("alpha".to_owned(), "2".to_owned());
        map.add_node(Node::new(1, Coord { x: 0.0, y: 0.0 }, tags));

        assert_eq!(render_dump(&map), "N 1 0 0 0 alpha=2 zeta=1\n");
    }
}
