//! Behaviour tests for the store contract: CRUD, updates, notification.

use std::cell::RefCell;
use std::rc::Rc;

use geo::Coord;
use rstest::{fixture, rstest};
use roadnet_core::{EntityUpdate, Link, MapData, Node, Relation, Tags, UpdateError, UpdateKind};

#[fixture]
fn city_map() -> MapData {
    let mut map = MapData::new();
    map.add_node(Node::new(
        1,
        Coord { x: 0.0, y: 0.0 },
        Tags::from([("type".into(), "intersection".into())]),
    ));
    map.add_node(Node::with_empty_tags(2, Coord { x: 100.0, y: 0.0 }));
    map.add_node(Node::with_empty_tags(3, Coord { x: 100.0, y: 100.0 }));
    map.add_link(Link::with_empty_tags(1, 1, 2));
    map.add_link(Link::with_empty_tags(2, 2, 3));
    map.add_relation(Relation::new(1, 2, vec![1], vec![2]));
    map
}

#[rstest]
fn inserted_node_reads_back_until_overwritten(mut city_map: MapData) {
    let original = city_map.get_node(1).cloned().expect("node 1 inserted");
    assert_eq!(city_map.get_node(1), Some(&original));

    city_map.add_node(Node::with_empty_tags(1, Coord { x: 9.0, y: 9.0 }));
    let replaced = city_map.get_node(1).expect("node 1 still present");
    assert_ne!(replaced, &original);
    assert_eq!(replaced.position, Coord { x: 9.0, y: 9.0 });
}

#[rstest]
fn update_on_present_id_notifies_with_kind_and_id(mut city_map: MapData) {
    let notifications = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&notifications);
    city_map.add_update_callback(move |kind, id| sink.borrow_mut().push((kind, id)));

    city_map
        .update_node(1, Coord { x: 10.0, y: 10.0 })
        .expect("node 1 exists");
    city_map
        .update_link(1, Some(3), None)
        .expect("link 1 exists");
    city_map
        .update_relation(1, Some(2), None, None)
        .expect("relation 1 exists");

    assert_eq!(
        *notifications.borrow(),
        vec![
            (UpdateKind::Node, 1),
            (UpdateKind::Link, 1),
            (UpdateKind::Relation, 1),
        ]
    );
}

#[rstest]
fn update_on_absent_id_fails_without_notification(mut city_map: MapData) {
    let notifications = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&notifications);
    city_map.add_update_callback(move |kind, id| sink.borrow_mut().push((kind, id)));

    assert!(matches!(
        city_map.update_node(42, Coord { x: 0.0, y: 0.0 }),
        Err(UpdateError::NotFound { .. })
    ));
    assert!(notifications.borrow().is_empty());
}

#[rstest]
fn relation_update_replaces_rather_than_appends(mut city_map: MapData) {
    city_map
        .update_relation(1, Some(2), None, None)
        .expect("relation 1 exists");

    let relation = city_map.get_relation(1).expect("relation 1 present");
    assert_eq!(relation.inlinks, vec![2]);
}

#[rstest]
fn batch_update_has_no_rollback(mut city_map: MapData) {
    let results = city_map.batch_update(vec![
        EntityUpdate::Node {
            id: 1,
            position: Coord { x: 10.0, y: 10.0 },
        },
        EntityUpdate::Node {
            id: 42,
            position: Coord { x: 0.0, y: 0.0 },
        },
        EntityUpdate::Link {
            id: 1,
            from_node: Some(3),
            to_node: None,
        },
    ]);

    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert_eq!(
        city_map.get_node(1).map(|n| n.position),
        Some(Coord { x: 10.0, y: 10.0 })
    );
    assert_eq!(city_map.get_link(1).map(|l| l.from_node), Some(3));
}

#[rstest]
fn snapshots_reflect_state_at_call_time(city_map: MapData) {
    let ids: Vec<_> = city_map.get_all_nodes().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let link_ids: Vec<_> = city_map.get_all_links().map(|l| l.id).collect();
    assert_eq!(link_ids, vec![1, 2]);

    let relation_ids: Vec<_> = city_map.get_all_relations().map(|r| r.id).collect();
    assert_eq!(relation_ids, vec![1]);
}
