use crate::{ClientMessage, CompleteReason, ErrorCode, SelectorInput, ServerMessage};

use serde_json::json;

// =========================================================================
// Client Frames
// =========================================================================

#[test]
fn given_subscribe_frame_when_decoded_then_fields_preserved() {
    let text = r#"{
        "type": "subscribe",
        "id": "op-1",
        "read_model": "CartReadModel",
        "selector": {"id": "demo-cart"}
    }"#;

    let message = ClientMessage::decode(text).unwrap();

    assert_eq!(
        message,
        ClientMessage::Subscribe {
            id: "op-1".to_string(),
            read_model: "CartReadModel".to_string(),
            selector: SelectorInput::by_id("demo-cart"),
        }
    );
}

#[test]
fn given_subscribe_frame_without_selector_then_defaults_to_match_all() {
    let text = r#"{"type": "subscribe", "id": "op-1", "read_model": "CartReadModel"}"#;

    let message = ClientMessage::decode(text).unwrap();

    match message {
        ClientMessage::Subscribe { selector, .. } => assert_eq!(selector, SelectorInput::all()),
        other => panic!("expected subscribe, got {other:?}"),
    }
}

#[test]
fn given_mutate_frame_when_decoded_then_input_is_raw_json() {
    let text = r#"{
        "type": "mutate",
        "id": "op-2",
        "name": "ChangeCartItem",
        "input": {"cartId": "demo-cart", "productId": "product-a", "quantity": 2}
    }"#;

    let message = ClientMessage::decode(text).unwrap();

    match message {
        ClientMessage::Mutate { id, name, input } => {
            assert_eq!(id, "op-2");
            assert_eq!(name, "ChangeCartItem");
            assert_eq!(input["productId"], "product-a");
        }
        other => panic!("expected mutate, got {other:?}"),
    }
}

#[test]
fn given_ping_frame_then_round_trips_as_bare_tag() {
    let encoded = ClientMessage::Ping.encode().unwrap();

    assert_eq!(encoded, r#"{"type":"ping"}"#);
    assert_eq!(ClientMessage::decode(&encoded).unwrap(), ClientMessage::Ping);
}

#[test]
fn given_unknown_frame_type_when_decoded_then_error() {
    assert!(ClientMessage::decode(r#"{"type": "start", "id": "op-1"}"#).is_err());
}

#[test]
fn given_garbage_when_decoded_then_error() {
    assert!(ClientMessage::decode("not json at all").is_err());
}

#[test]
fn given_client_frames_then_operation_ids_reported() {
    let subscribe = ClientMessage::Subscribe {
        id: "op-1".to_string(),
        read_model: "CartReadModel".to_string(),
        selector: SelectorInput::all(),
    };

    assert_eq!(subscribe.operation_id(), Some("op-1"));
    assert_eq!(ClientMessage::Ping.operation_id(), None);
    assert_eq!(subscribe.kind(), "subscribe");
}

// =========================================================================
// Server Frames
// =========================================================================

#[test]
fn given_subscribe_ack_when_encoded_then_snake_case_tag() {
    let message = ServerMessage::SubscribeAck {
        id: "op-1".to_string(),
        subscription_id: "7d5a0d2c-0000-4000-8000-000000000001".to_string(),
    };

    let encoded = serde_json::to_value(&message).unwrap();

    assert_eq!(
        encoded,
        json!({
            "type": "subscribe_ack",
            "id": "op-1",
            "subscription_id": "7d5a0d2c-0000-4000-8000-000000000001",
        })
    );
}

#[test]
fn given_data_frame_then_payload_is_entity_state() {
    let message = ServerMessage::Data {
        id: "op-1".to_string(),
        payload: json!({"id": "demo-cart", "cartItemsIds": ["product-a"]}),
    };

    let encoded = serde_json::to_value(&message).unwrap();

    assert_eq!(encoded["type"], "data");
    assert_eq!(encoded["payload"]["cartItemsIds"][0], "product-a");
}

#[test]
fn given_complete_frame_then_reason_is_snake_case() {
    let message = ServerMessage::Complete {
        id: "op-1".to_string(),
        reason: CompleteReason::ConnectionClosed,
    };

    let encoded = serde_json::to_value(&message).unwrap();

    assert_eq!(encoded["reason"], "connection_closed");
    assert_eq!(CompleteReason::ConnectionClosed.to_string(), "connection_closed");
}

#[test]
fn given_connection_scoped_error_then_id_field_omitted() {
    let message = ServerMessage::error(None, ErrorCode::DecodeError, "bad frame");

    let encoded = serde_json::to_value(&message).unwrap();

    assert_eq!(encoded["type"], "error");
    assert_eq!(encoded["error"]["code"], "decode_error");
    assert!(encoded.get("id").is_none());
}

#[test]
fn given_operation_scoped_error_then_id_quoted_back() {
    let message = ServerMessage::error(
        Some("op-9".to_string()),
        ErrorCode::UnknownMutation,
        "no such mutation: DropEverything",
    );

    let encoded = serde_json::to_value(&message).unwrap();

    assert_eq!(encoded["id"], "op-9");
    assert_eq!(encoded["error"]["code"], "unknown_mutation");
}

#[test]
fn given_server_frame_when_decoded_then_matches_encoded() {
    let message = ServerMessage::MutationResult {
        id: "op-2".to_string(),
        payload: json!(true),
    };

    let decoded = ServerMessage::decode(&message.encode().unwrap()).unwrap();

    assert_eq!(decoded, message);
    assert_eq!(decoded.kind(), "mutation_result");
}
