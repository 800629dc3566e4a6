use lq_core::{Filter, ReadModelSelector};

use crate::desired::DesiredSubscriptions;

#[test]
fn given_inserted_key_then_entry_retrievable() {
    let mut desired = DesiredSubscriptions::new();

    let replaced = desired.insert("op-1", "CartReadModel", ReadModelSelector::all());

    assert!(replaced.is_none());
    assert!(desired.contains("op-1"));
    let entry = desired.get("op-1").unwrap();
    assert_eq!(entry.read_model, "CartReadModel");
    assert_eq!(entry.selector, ReadModelSelector::all());
}

#[test]
fn given_colliding_key_when_inserted_then_newer_wish_wins() {
    let mut desired = DesiredSubscriptions::new();
    desired.insert("op-1", "CartReadModel", ReadModelSelector::all());

    let replaced = desired.insert(
        "op-1",
        "CartReadModel",
        ReadModelSelector::ById("cart-1".to_string()),
    );

    assert_eq!(replaced.unwrap().selector, ReadModelSelector::all());
    assert_eq!(
        desired.get("op-1").unwrap().selector,
        ReadModelSelector::ById("cart-1".to_string())
    );
    assert_eq!(desired.len(), 1);
}

#[test]
fn given_removed_key_then_second_remove_reports_absent() {
    let mut desired = DesiredSubscriptions::new();
    desired.insert("op-1", "CartReadModel", ReadModelSelector::all());

    assert!(desired.remove("op-1"));
    assert!(!desired.remove("op-1"));
    assert!(desired.is_empty());
}

#[test]
fn given_unknown_key_then_remove_reports_absent() {
    let mut desired = DesiredSubscriptions::new();

    assert!(!desired.remove("never-seen"));
}

#[test]
fn given_several_entries_then_keys_and_snapshot_sorted() {
    let mut desired = DesiredSubscriptions::new();
    desired.insert("op-3", "CartReadModel", ReadModelSelector::all());
    desired.insert("op-1", "CartReadModel", ReadModelSelector::all());
    desired.insert(
        "op-2",
        "CartReadModel",
        ReadModelSelector::Matching(Filter::match_all().includes("cartItemsIds", "p-1")),
    );

    assert_eq!(desired.keys(), vec!["op-1", "op-2", "op-3"]);

    let snapshot = desired.snapshot();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot[0].0, "op-1");
    assert_eq!(snapshot[1].0, "op-2");
    assert_eq!(snapshot[2].0, "op-3");
}
