use crate::{MAX_RESOURCE_NAME_LEN, MIN_RESOURCE_NAME_LEN, prelude::*};
use derive_more::Display;
use std::fmt;
use thiserror::Error as ThisError;

///
/// ResourceKind
///
/// Closed set of provisioned resource kinds that receive generated
/// names. The kind token is part of the name, so two kinds can never
/// collide inside one environment.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    #[display("photos")]
    Photos,

    #[display("photo-metadata")]
    PhotoMetadata,
}

///
/// Coordinate
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Coordinate {
    #[display("account")]
    Account,

    #[display("region")]
    Region,
}

///
/// NamingError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum NamingError {
    #[error("{coordinate} coordinate is empty")]
    EmptyCoordinate { coordinate: Coordinate },

    #[error("resource name is empty")]
    EmptyName,

    #[error("{coordinate} coordinate `{value}` contains characters outside [a-z0-9-]")]
    InvalidCoordinate { coordinate: Coordinate, value: String },

    #[error("resource name `{name}` violates the [a-z0-9-] naming constraints")]
    InvalidName { name: String },

    #[error("resource name `{name}` is {len} characters, above the {max} limit")]
    NameTooLong { name: String, len: usize, max: usize },
}

/// Normalize and validate an externally supplied deployment coordinate.
///
/// Coordinates flow straight into generated names, so they are held to
/// the same character set as the names themselves.
pub(crate) fn coordinate(which: Coordinate, value: &str) -> Result<String, NamingError> {
    let value = value.trim().to_lowercase();

    if value.is_empty() {
        return Err(NamingError::EmptyCoordinate { coordinate: which });
    }

    let valid_edges = !value.starts_with('-') && !value.ends_with('-');
    if !valid_edges
        || !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(NamingError::InvalidCoordinate {
            coordinate: which,
            value,
        });
    }

    Ok(value)
}

/// Check a name against the strictest consumer's constraints
/// (S3 bucket naming: length window, `[a-z0-9-]`, alphanumeric edges).
pub fn validate_resource_name(name: &str) -> Result<(), NamingError> {
    if name.is_empty() {
        return Err(NamingError::EmptyName);
    }

    if name.len() > MAX_RESOURCE_NAME_LEN {
        return Err(NamingError::NameTooLong {
            name: name.to_string(),
            len: name.len(),
            max: MAX_RESOURCE_NAME_LEN,
        });
    }

    let edges_alphanumeric = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric())
        && name
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric());

    if name.len() < MIN_RESOURCE_NAME_LEN
        || !edges_alphanumeric
        || !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(NamingError::InvalidName {
            name: name.to_string(),
        });
    }

    Ok(())
}

///
/// ResourceIdentity
///
/// Deterministically generated identity for one provisioned resource:
/// the provider-facing name plus the ARN-form identifier policy
/// statements are scoped to. Constructed once at plan time, immutable
/// afterwards.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResourceIdentity {
    pub kind: ResourceKind,
    pub name: String,
    pub arn: String,
}

impl ResourceIdentity {
    /// Derive the identity for one resource kind in one environment.
    ///
    /// Pure: identical inputs always produce identical output. The
    /// environment token is embedded in the name, so distinct
    /// environments can never collide for the same kind even when they
    /// share an account and region.
    pub fn derive(
        kind: ResourceKind,
        env: Environment,
        account: &str,
        region: &str,
    ) -> Result<Self, NamingError> {
        let account = coordinate(Coordinate::Account, account)?;
        let region = coordinate(Coordinate::Region, region)?;

        let name = format!("{}-{kind}-{env}-{account}-{region}", crate::APP_PREFIX);
        validate_resource_name(&name)?;

        let arn = match kind {
            ResourceKind::Photos => format!("arn:aws:s3:::{name}"),
            ResourceKind::PhotoMetadata => {
                format!("arn:aws:dynamodb:{region}:{account}:table/{name}")
            }
        };

        Ok(Self { kind, name, arn })
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
