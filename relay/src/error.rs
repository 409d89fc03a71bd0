use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("envelope codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("unsupported envelope version {found}, expected {expected}")]
    Version { found: u16, expected: u16 },

    #[error("nonce space exhausted")]
    NonceOverflow,
}
