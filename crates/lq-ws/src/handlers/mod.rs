pub mod context;
pub mod dispatcher;
pub mod mutation;
pub mod subscription;
