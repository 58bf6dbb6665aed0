use thiserror::Error;

use crate::config::ConfigError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] rupee_core::RegistryError),

    #[error(transparent)]
    UnsupportedBank(#[from] rupee_core::IngestError),

    #[error("failed to open observation store: {0}")]
    Warehouse(#[from] rupee_core::WarehouseError),

    #[error("observation store error: {0}")]
    Store(#[from] rupee_core::StoreError),

    #[error("Failed to fetch rates from any bank: {}", .details.join("; "))]
    NothingStored { details: Vec<String> },

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound(_) => 1,
            Self::Config(_) | Self::Registry(_) | Self::UnsupportedBank(_) => 2,
            Self::NothingStored { .. } => 3,
            Self::Serialization(_) => 4,
            Self::Warehouse(_) | Self::Store(_) | Self::Io(_) => 10,
        }
    }
}
