use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetOrmError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Sheet '{sheet}' has no records")]
    EmptySheet { sheet: String },

    #[error("Remote service error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Hook failed: {0}")]
    Hook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] yup_oauth2::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, SheetOrmError>;
