#![allow(dead_code)]

use lq_proto::{ClientMessage, SelectorInput, ServerMessage};

use axum_test::{TestServer, TestWebSocket};
use serde_json::{Value, json};

/// WebSocket test client speaking the JSON wire protocol
pub struct WsTestClient {
    ws: TestWebSocket,
}

impl WsTestClient {
    /// Connect to the realtime endpoint
    pub async fn connect(server: &TestServer) -> Self {
        let ws = server.get_websocket("/ws").await.into_websocket().await;
        Self { ws }
    }

    /// Send a client frame
    pub async fn send(&mut self, msg: &ClientMessage) {
        self.ws.send_text(msg.encode().expect("encode frame")).await;
    }

    /// Send a raw text frame (for malformed-input tests)
    pub async fn send_raw(&mut self, text: impl std::fmt::Display) {
        self.ws.send_text(text).await;
    }

    /// Receive and decode the next server frame
    pub async fn receive(&mut self) -> ServerMessage {
        let text = self.ws.receive_text().await;
        ServerMessage::decode(&text).expect("decode frame")
    }

    /// Receive the next `count` server frames
    pub async fn receive_n(&mut self, count: usize) -> Vec<ServerMessage> {
        let mut frames = Vec::with_capacity(count);
        for _ in 0..count {
            frames.push(self.receive().await);
        }
        frames
    }

    /// Subscribe and wait for the ack, returning the subscription id
    pub async fn subscribe(&mut self, key: &str, selector: SelectorInput) -> String {
        self.send(&ClientMessage::Subscribe {
            id: key.to_string(),
            read_model: "CartReadModel".to_string(),
            selector,
        })
        .await;

        match self.receive().await {
            ServerMessage::SubscribeAck {
                id,
                subscription_id,
            } => {
                assert_eq!(id, key);
                subscription_id
            }
            other => panic!("expected subscribe_ack, got {other:?}"),
        }
    }

    /// Subscribe to the whole cart collection
    pub async fn subscribe_all(&mut self, key: &str) -> String {
        self.subscribe(key, SelectorInput::all()).await
    }

    /// Run a ChangeCartItem mutation and wait for its result
    pub async fn change_cart_item(
        &mut self,
        key: &str,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Value {
        self.send(&ClientMessage::Mutate {
            id: key.to_string(),
            name: "ChangeCartItem".to_string(),
            input: json!({
                "cartId": cart_id,
                "productId": product_id,
                "quantity": quantity,
            }),
        })
        .await;

        match self.receive().await {
            ServerMessage::MutationResult { id, payload } => {
                assert_eq!(id, key);
                payload
            }
            other => panic!("expected mutation_result, got {other:?}"),
        }
    }

    /// Close the WebSocket connection
    pub async fn close(self) {
        self.ws.close().await;
    }
}
