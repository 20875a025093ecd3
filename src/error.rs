use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encode Error: {0}")]
    Encode(#[from] prost::EncodeError),

    #[error("Decode Error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Config Error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("bad magic number: {0:#010x}")]
    BadMagic(u32),

    #[error("broker worker already started")]
    AlreadyStarted,
}
