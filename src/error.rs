use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemodError {
    #[error("Malformed block: {len} bytes is not a whole number of {frame_bytes}-byte frames")]
    MalformedBlock { len: usize, frame_bytes: usize },

    #[error("Channel length mismatch: left has {left} samples, right has {right}")]
    ChannelMismatch { left: usize, right: usize },

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DemodError>;
