use crate::{
    naming::{self, NamingError},
    prelude::*,
};
use derive_more::Display;
use thiserror::Error as ThisError;

/// The single service principal allowed to assume the generated role.
pub const TRUSTED_SERVICE: &str = "amplify.amazonaws.com";

/// Read-level actions against the metadata store. Never extended with
/// write, delete, or administrative actions.
pub const TABLE_READ_ACTIONS: &[&str] = &[
    "dynamodb:GetItem",
    "dynamodb:Query",
    "dynamodb:Scan",
    "dynamodb:BatchGetItem",
];

/// Read-level actions against the storage resource.
pub const BUCKET_READ_ACTIONS: &[&str] = &["s3:GetObject", "s3:ListBucket"];

///
/// Effect
///
/// Only `Allow` exists: the builder never emits deny statements, so the
/// type has no arm for them.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Effect {
    Allow,
}

///
/// Slot
///
/// Which identity slot of the builder a precondition failure refers to.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Slot {
    #[display("storage")]
    Storage,

    #[display("index")]
    Index,
}

///
/// PolicyError
///
/// A malformed identifier inside a permission statement can silently
/// widen a grant, so every identity is rejected here before any
/// statement is constructed.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum PolicyError {
    #[error("{slot} identity is empty")]
    EmptyIdentity { slot: Slot },

    #[error("{slot} identity has kind {found}, expected {expected}")]
    KindMismatch {
        slot: Slot,
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("{slot} identity ARN `{arn}` is malformed")]
    MalformedArn { slot: Slot, arn: String },

    #[error("{slot} identity name is malformed: {source}")]
    MalformedName { slot: Slot, source: NamingError },
}

///
/// PermissionStatement
///

#[derive(Clone, Debug, Serialize)]
pub struct PermissionStatement {
    pub effect: Effect,
    pub actions: &'static [&'static str],
    pub resources: Vec<String>,
}

///
/// AccessRole
///
/// Role assumed by the application runtime: one trusted service
/// principal and exactly two permission groups, one per resource it was
/// built from.
///

#[derive(Clone, Debug, Serialize)]
pub struct AccessRole {
    pub trusted_service: &'static str,
    pub description: String,
    pub statements: [PermissionStatement; 2],
}

/// Build the least-privilege access role over the two plan identities.
///
/// The resource lists are derived exclusively from the supplied
/// identities; the only wildcards are the documented sub-resource
/// scopes (`/*` under the bucket, `/index/*` under the table).
pub fn build_role(
    storage: &ResourceIdentity,
    table: &ResourceIdentity,
) -> Result<AccessRole, PolicyError> {
    validate_identity(Slot::Storage, storage, ResourceKind::Photos)?;
    validate_identity(Slot::Index, table, ResourceKind::PhotoMetadata)?;

    let index_access = PermissionStatement {
        effect: Effect::Allow,
        actions: TABLE_READ_ACTIONS,
        resources: vec![table.arn.clone(), format!("{}/index/*", table.arn)],
    };

    let storage_access = PermissionStatement {
        effect: Effect::Allow,
        actions: BUCKET_READ_ACTIONS,
        resources: vec![storage.arn.clone(), format!("{}/*", storage.arn)],
    };

    Ok(AccessRole {
        trusted_service: TRUSTED_SERVICE,
        description: "Execution role for the Loubie Designs portfolio app".to_string(),
        statements: [index_access, storage_access],
    })
}

// Reject anything that does not look like an identity produced by the
// generator: empty or malformed segments in an ARN are how over-broad
// grants slip into policies.
fn validate_identity(
    slot: Slot,
    identity: &ResourceIdentity,
    expected: ResourceKind,
) -> Result<(), PolicyError> {
    if identity.name.is_empty() || identity.arn.is_empty() {
        return Err(PolicyError::EmptyIdentity { slot });
    }

    if identity.kind != expected {
        return Err(PolicyError::KindMismatch {
            slot,
            expected,
            found: identity.kind,
        });
    }

    naming::validate_resource_name(&identity.name)
        .map_err(|source| PolicyError::MalformedName { slot, source })?;

    if !identity.arn.starts_with("arn:")
        || !identity.arn.ends_with(identity.name.as_str())
        || identity.arn.contains('*')
        || identity.arn.contains(char::is_whitespace)
    {
        return Err(PolicyError::MalformedArn {
            slot,
            arn: identity.arn.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identities() -> (ResourceIdentity, ResourceIdentity) {
        let storage = ResourceIdentity::derive(
            ResourceKind::Photos,
            Environment::Dev,
            "123456789012",
            "us-west-2",
        )
        .expect("storage identity should derive");
        let table = ResourceIdentity::derive(
            ResourceKind::PhotoMetadata,
            Environment::Dev,
            "123456789012",
            "us-west-2",
        )
        .expect("table identity should derive");

        (storage, table)
    }

    #[test]
    fn build_role_emits_two_scoped_read_statements() {
        let (storage, table) = identities();
        let role = build_role(&storage, &table).expect("well-formed identities should build");

        assert_eq!(role.trusted_service, TRUSTED_SERVICE);

        let [index_access, storage_access] = &role.statements;
        assert_eq!(index_access.actions, TABLE_READ_ACTIONS);
        assert_eq!(
            index_access.resources,
            [table.arn.clone(), format!("{}/index/*", table.arn)]
        );
        assert_eq!(storage_access.actions, BUCKET_READ_ACTIONS);
        assert_eq!(
            storage_access.resources,
            [storage.arn.clone(), format!("{}/*", storage.arn)]
        );
    }

    #[test]
    fn build_role_grants_nothing_outside_the_supplied_identities() {
        let (storage, table) = identities();
        let role = build_role(&storage, &table).expect("well-formed identities should build");

        for statement in &role.statements {
            assert_eq!(statement.effect, Effect::Allow);
            for resource in &statement.resources {
                assert!(
                    resource.starts_with(&storage.arn) || resource.starts_with(&table.arn),
                    "resource `{resource}` escapes the supplied identities"
                );
            }
        }
    }

    #[test]
    fn build_role_rejects_empty_identity() {
        let (storage, table) = identities();
        let empty = ResourceIdentity {
            kind: ResourceKind::Photos,
            name: String::new(),
            arn: String::new(),
        };

        assert!(matches!(
            build_role(&empty, &table),
            Err(PolicyError::EmptyIdentity {
                slot: Slot::Storage
            })
        ));

        let empty_table = ResourceIdentity {
            kind: ResourceKind::PhotoMetadata,
            name: String::new(),
            arn: String::new(),
        };
        assert!(matches!(
            build_role(&storage, &empty_table),
            Err(PolicyError::EmptyIdentity { slot: Slot::Index })
        ));
    }

    #[test]
    fn build_role_rejects_swapped_kinds() {
        let (storage, table) = identities();

        assert!(matches!(
            build_role(&table, &storage),
            Err(PolicyError::KindMismatch {
                slot: Slot::Storage,
                ..
            })
        ));
    }

    #[test]
    fn build_role_rejects_identities_not_matching_the_generator_format() {
        let (storage, table) = identities();

        let mangled = ResourceIdentity {
            kind: ResourceKind::Photos,
            name: "Not*A-Valid-Name".to_string(),
            arn: storage.arn.clone(),
        };
        assert!(matches!(
            build_role(&mangled, &table),
            Err(PolicyError::MalformedName {
                slot: Slot::Storage,
                ..
            })
        ));

        let wildcard_arn = ResourceIdentity {
            arn: "arn:aws:s3:::*".to_string(),
            ..storage.clone()
        };
        assert!(matches!(
            build_role(&wildcard_arn, &table),
            Err(PolicyError::MalformedArn { .. })
        ));

        let foreign_arn = ResourceIdentity {
            arn: "arn:aws:s3:::some-other-bucket".to_string(),
            ..storage
        };
        assert!(matches!(
            build_role(&foreign_arn, &table),
            Err(PolicyError::MalformedArn { .. })
        ));
    }

    #[test]
    fn action_sets_stay_read_only() {
        for action in TABLE_READ_ACTIONS.iter().chain(BUCKET_READ_ACTIONS) {
            let op = action
                .split(':')
                .nth(1)
                .expect("actions are service:Operation pairs");
            assert!(
                op.starts_with("Get")
                    || op.starts_with("List")
                    || op.starts_with("Query")
                    || op.starts_with("Scan")
                    || op.starts_with("BatchGet"),
                "action `{action}` is not a read-class operation"
            );
        }
    }
}
