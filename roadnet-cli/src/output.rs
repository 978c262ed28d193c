//! Human-readable reporting for CLI results.

use camino::Utf8Path;
use geo::{Coord, Rect};

use roadnet_core::{Link, MapData, Node, Relation};

pub(crate) fn report_conversion(map: &MapData, output: &Utf8Path) {
    println!(
        "wrote {}: {} nodes, {} links, {} relations",
        output,
        map.node_count(),
        map.link_count(),
        map.relation_count()
    );
}

pub(crate) fn report_nearest(map: &MapData, at: Coord<f64>) {
    match map.find_nearest_node(at) {
        Some(node) => println!("nearest node: {}", describe_node(node)),
        None => println!("store has no nodes"),
    }
}

pub(crate) fn report_rectangle(map: &MapData, bounds: &Rect<f64>) {
    let (nodes, links) = map.elements_in_rectangle(bounds);
    let relations = map.find_relations_in_rectangle(bounds);
    println!(
        "{} nodes, {} links, {} relations in rectangle",
        nodes.len(),
        links.len(),
        relations.len()
    );
    for node in nodes {
        println!("  {}", describe_node(node));
    }
    for link in links {
        println!("  {}", describe_link(link));
    }
    for relation in relations {
        println!("  {}", describe_relation(relation));
    }
}

pub(crate) fn report_radius(map: &MapData, at: Coord<f64>, radius: f64) {
    let selection = map.find_within_radius(at, radius);
    println!(
        "{} nodes, {} links, {} relations within {radius} m",
        selection.nodes.len(),
        selection.links.len(),
        selection.relations.len()
    );
    for node in selection.nodes {
        println!("  {}", describe_node(node));
    }
    for link in selection.links {
        println!("  {}", describe_link(link));
    }
    for relation in selection.relations {
        println!("  {}", describe_relation(relation));
    }
}

pub(crate) fn report_network(map: &MapData, at: Coord<f64>, radius: f64) {
    let selection = map.network_within_radius(at, radius);
    println!(
        "{} nodes and {} links in the network within {radius} m",
        selection.nodes.len(),
        selection.links.len()
    );
    for node in selection.nodes {
        println!("  {}", describe_node(node));
    }
    for link in selection.links {
        println!("  {}", describe_link(link));
    }
}

fn describe_node(node: &Node) -> String {
    format!("node {} ({}, {})", node.id, node.position.x, node.position.y)
}

fn describe_link(link: &Link) -> String {
    format!("link {} {} -> {}", link.id, link.from_node, link.to_node)
}

fn describe_relation(relation: &Relation) -> String {
    format!(
        "relation {} at node {} ({} in, {} out)",
        relation.id,
        relation.node_id,
        relation.inlinks.len(),
        relation.outlinks.len()
    )
}
