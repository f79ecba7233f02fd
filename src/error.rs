use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read image: {0}")]
    ImageRead(std::io::Error),

    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Invalid history record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    InvalidConfig(String),

    #[error("Invalid file ID format: {0:?} is not a version 4 UUID")]
    InvalidFileId(String),

    #[error("A save is already in progress")]
    SaveInFlight,

    #[error("Not authorized, please log in again")]
    Unauthorized,

    #[error("Saving annotations failed: {0}")]
    SaveFailed(String),

    #[error("No image loaded")]
    NoImage,
}

pub type Result<T> = std::result::Result<T, EditorError>;
