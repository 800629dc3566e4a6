#![allow(unused_imports)]

pub(crate) mod harness_transport;
pub(crate) mod test_client;
pub(crate) mod test_server;

pub use harness_transport::*;
pub use test_client::*;
pub use test_server::*;
