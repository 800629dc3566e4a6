pub mod app_state;
pub mod error;
pub mod event_dispatcher;
pub mod handlers;
pub mod ids;
pub mod message_validator;
pub mod metrics;
pub mod shutdown;
pub mod subscription;
pub mod subscription_registry;
pub mod web_socket_connection;

pub use app_state::{AppState, handler};
pub use error::{Result, WsError};
pub use event_dispatcher::EventDispatcher;
pub use handlers::context::{HandlerContext, RequestTrace};
pub use handlers::dispatcher::{build_error_frame, dispatch};
pub use handlers::mutation::{ChangeCartItemInput, handle_mutate};
pub use handlers::subscription::{handle_subscribe, handle_unsubscribe};
pub use ids::{ConnectionId, SubscriptionId};
pub use message_validator::MessageValidator;
pub use metrics::{LatencyTimer, Metrics};
pub use shutdown::{ShutdownCoordinator, ShutdownGuard};
pub use subscription::{Subscription, SubscriptionState};
pub use subscription_registry::{Delivery, SubscriptionRegistry};
pub use web_socket_connection::WebSocketConnection;
