/*
 * Error Module
 *
 * Environment preconditions and configuration failures for the banner.
 * Drawing itself never fails; only mounting and config loading can.
 */

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BannerError {
    #[error("display surface `{0}` was not provided by the host")]
    MissingSurface(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transform graph revisits node {node}")]
    CyclicGraph { node: u32 },
}

pub type Result<T> = std::result::Result<T, BannerError>;

impl From<toml::de::Error> for BannerError {
    fn from(err: toml::de::Error) -> Self {
        BannerError::Config(err.to_string())
    }
}
