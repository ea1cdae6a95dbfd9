pub mod env;
pub mod error;
pub mod naming;
pub mod origins;
pub mod output;
pub mod policy;
pub mod provision;
pub mod stack;
pub mod topology;

/// Fixed application-scoped prefix for every generated resource name.
pub const APP_PREFIX: &str = "loubie-designs";

/// Minimum length for generated resource names (S3 bucket constraint).
pub const MIN_RESOURCE_NAME_LEN: usize = 3;

/// Maximum length for generated resource names.
///
/// S3 bucket naming is the strictest consumer of the generator, so every
/// resource kind is held to its 63-character window.
pub const MAX_RESOURCE_NAME_LEN: usize = 63;

use crate::{error::ErrorTree, naming::NamingError, policy::PolicyError};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        env::Environment,
        err,
        error::ErrorTree,
        naming::{ResourceIdentity, ResourceKind},
        origins::allowed_origins,
        topology::{IndexDefinition, IndexGroup, index_topology},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("plan validation failed: {0}")]
    Validation(ErrorTree),
}
