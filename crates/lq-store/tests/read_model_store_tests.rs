use lq_core::CART_READ_MODEL;
use lq_store::{ReadModelStore, StoreError};

use googletest::prelude::*;
use serde_json::json;

#[tokio::test]
async fn given_new_store_then_no_entities_and_sequence_zero() {
    let (store, _commits) = ReadModelStore::new(16);

    assert_that!(store.entity_count(CART_READ_MODEL).await, eq(0));
    assert_that!(store.last_sequence().await, eq(0));
    assert_that!(store.get(CART_READ_MODEL, "demo-cart").await, none());
}

#[tokio::test]
async fn given_change_cart_item_when_committed_then_state_stored_and_change_emitted() {
    // Given
    let (store, mut commits) = ReadModelStore::new(16);

    // When
    let accepted = store.change_cart_item("demo-cart", "product-a", 2).await.unwrap();

    // Then: mutation reports success and the store holds the new state
    assert_that!(accepted, eq(true));
    let entity = store.get(CART_READ_MODEL, "demo-cart").await.unwrap();
    assert_that!(&entity["cartItems"][0]["productId"], eq(&json!("product-a")));
    assert_that!(&entity["cartItemsIds"], eq(&json!(["product-a"])));

    // Then: the commit channel carries the post-mutation state
    let change = commits.recv().await.unwrap();
    assert_that!(change.read_model.as_str(), eq(CART_READ_MODEL));
    assert_that!(change.id.as_str(), eq("demo-cart"));
    assert_that!(change.sequence, eq(1));
    assert_that!(&change.entity, eq(&entity));
}

#[tokio::test]
async fn given_repeated_mutations_then_emission_order_is_commit_order() {
    // Given
    let (store, mut commits) = ReadModelStore::new(16);

    // When
    store.change_cart_item("demo-cart", "product-a", 1).await.unwrap();
    store.change_cart_item("demo-cart", "product-a", 2).await.unwrap();
    store.change_cart_item("demo-cart", "product-b", 7).await.unwrap();

    // Then
    let first = commits.recv().await.unwrap();
    let second = commits.recv().await.unwrap();
    let third = commits.recv().await.unwrap();
    assert_that!(first.sequence, eq(1));
    assert_that!(second.sequence, eq(2));
    assert_that!(third.sequence, eq(3));
    assert_that!(&second.entity["cartItems"][0]["quantity"], eq(&json!(2)));
    assert_that!(store.last_sequence().await, eq(3));
}

#[tokio::test]
async fn given_quantity_zero_then_emitted_state_has_line_removed() {
    // Given
    let (store, mut commits) = ReadModelStore::new(16);
    store.change_cart_item("demo-cart", "product-a", 2).await.unwrap();
    store.change_cart_item("demo-cart", "product-b", 1).await.unwrap();

    // When
    store.change_cart_item("demo-cart", "product-a", 0).await.unwrap();

    // Then
    commits.recv().await.unwrap();
    commits.recv().await.unwrap();
    let change = commits.recv().await.unwrap();
    assert_that!(&change.entity["cartItemsIds"], eq(&json!(["product-b"])));
}

#[tokio::test]
async fn given_generic_commit_then_entity_readable_and_counted() {
    // Given
    let (store, mut commits) = ReadModelStore::new(16);

    // When
    let sequence = store
        .commit("OrderReadModel", "order-1", json!({"id": "order-1", "total": 10}))
        .await
        .unwrap();

    // Then
    assert_that!(sequence, eq(1));
    assert_that!(store.entity_count("OrderReadModel").await, eq(1));
    assert_that!(store.entity_count(CART_READ_MODEL).await, eq(0));
    let change = commits.recv().await.unwrap();
    assert_that!(change.read_model.as_str(), eq("OrderReadModel"));
}

#[tokio::test]
async fn given_dispatcher_gone_when_commit_then_pipeline_closed_error() {
    // Given
    let (store, commits) = ReadModelStore::new(16);
    drop(commits);

    // When
    let result = store.change_cart_item("demo-cart", "product-a", 2).await;

    // Then
    assert_that!(
        result,
        err(matches_pattern!(StoreError::PipelineClosed { .. }))
    );
}

#[tokio::test]
async fn given_concurrent_mutations_then_sequences_form_a_total_order() {
    // Given
    let (store, mut commits) = ReadModelStore::new(64);

    // When: ten tasks mutate ten carts concurrently
    let mut tasks = Vec::new();
    for n in 0..10 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store
                .change_cart_item(&format!("cart-{n}"), "product-a", n + 1)
                .await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // Then: every sequence number appears exactly once, in increasing order
    let mut sequences = Vec::new();
    for _ in 0..10 {
        sequences.push(commits.recv().await.unwrap().sequence);
    }
    let sorted: Vec<u64> = (1..=10).collect();
    assert_that!(sequences, eq(&sorted));
}
