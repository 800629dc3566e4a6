use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] lq_config::ConfigError),

    #[error("Logger setup failed: {message}")]
    Logger { message: String },

    #[error("Metrics exporter setup failed: {message}")]
    Metrics { message: String },
}

pub type Result<T> = std::result::Result<T, ServerError>;
