use crate::{
    error::ErrorTree,
    policy::AccessRole,
    stack::{BucketSpec, DistributionSpec, StackPlan, TableSpec},
};
use derive_more::Display;
use std::convert::Infallible;
use thiserror::Error as ThisError;
use tracing::info;

///
/// Provider-assigned facts
///
/// Some identifiers only exist once the external provisioning system
/// has created the resource; they are returned here and republished as
/// outputs, never invented at plan time.
///

#[derive(Clone, Debug)]
pub struct ProvisionedDistribution {
    pub domain_name: String,
}

#[derive(Clone, Debug)]
pub struct ProvisionedRole {
    pub arn: String,
}

///
/// Provisioner
///
/// Boundary to the external provisioning system. The core never touches
/// cloud APIs itself; everything effectful flows through this trait.
///

pub trait Provisioner {
    type Error: std::error::Error + 'static;

    fn create_bucket(&mut self, spec: &BucketSpec) -> Result<(), Self::Error>;

    fn create_distribution(
        &mut self,
        spec: &DistributionSpec,
    ) -> Result<ProvisionedDistribution, Self::Error>;

    fn create_table(&mut self, spec: &TableSpec) -> Result<(), Self::Error>;

    fn create_role(&mut self, role: &AccessRole) -> Result<ProvisionedRole, Self::Error>;
}

///
/// Stage
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Stage {
    #[display("bucket")]
    Bucket,

    #[display("distribution")]
    Distribution,

    #[display("table")]
    Table,

    #[display("role")]
    Role,
}

///
/// DeployError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum DeployError<E: std::error::Error> {
    /// Provider failure, surfaced unchanged. Provisioning is not safely
    /// auto-retriable: a blind retry risks duplicate or half-created
    /// infrastructure, so the operator decides what happens next.
    #[error("provisioning {stage} failed: {source}")]
    Provision { stage: Stage, source: E },

    #[error("plan validation failed: {0}")]
    Validation(ErrorTree),
}

///
/// DeployedStack
///

#[derive(Clone, Debug)]
pub struct DeployedStack {
    pub plan: StackPlan,
    pub distribution_domain: String,
    pub role_arn: String,
}

/// Submit the plan to a provisioner, one linear pass in dependency
/// order: bucket, distribution in front of it, table, then the role.
pub fn deploy<P: Provisioner>(
    plan: StackPlan,
    provisioner: &mut P,
) -> Result<DeployedStack, DeployError<P::Error>> {
    plan.validate().map_err(DeployError::Validation)?;

    provisioner
        .create_bucket(&plan.bucket)
        .map_err(|source| DeployError::Provision {
            stage: Stage::Bucket,
            source,
        })?;

    let distribution =
        provisioner
            .create_distribution(&plan.distribution)
            .map_err(|source| DeployError::Provision {
                stage: Stage::Distribution,
                source,
            })?;

    provisioner
        .create_table(&plan.table)
        .map_err(|source| DeployError::Provision {
            stage: Stage::Table,
            source,
        })?;

    let role = provisioner
        .create_role(&plan.role)
        .map_err(|source| DeployError::Provision {
            stage: Stage::Role,
            source,
        })?;

    info!(
        environment = %plan.environment,
        domain = %distribution.domain_name,
        "stack provisioned"
    );

    Ok(DeployedStack {
        plan,
        distribution_domain: distribution.domain_name,
        role_arn: role.arn,
    })
}

///
/// DryRunProvisioner
///
/// Records what would be created and fabricates clearly synthetic
/// provider facts. Used by the CLI's dry-run output path and by tests.
///

#[derive(Debug, Default)]
pub struct DryRunProvisioner {
    pub created: Vec<String>,
}

impl Provisioner for DryRunProvisioner {
    type Error = Infallible;

    fn create_bucket(&mut self, spec: &BucketSpec) -> Result<(), Self::Error> {
        self.created.push(format!("bucket/{}", spec.identity.name));

        Ok(())
    }

    fn create_distribution(
        &mut self,
        spec: &DistributionSpec,
    ) -> Result<ProvisionedDistribution, Self::Error> {
        self.created
            .push(format!("distribution/{}", spec.origin_bucket));

        Ok(ProvisionedDistribution {
            domain_name: format!("{}.dry-run.cloudfront.net", spec.origin_bucket),
        })
    }

    fn create_table(&mut self, spec: &TableSpec) -> Result<(), Self::Error> {
        self.created.push(format!("table/{}", spec.identity.name));

        Ok(())
    }

    fn create_role(&mut self, role: &AccessRole) -> Result<ProvisionedRole, Self::Error> {
        self.created.push(format!("role/{}", role.trusted_service));

        Ok(ProvisionedRole {
            arn: "arn:aws:iam::dry-run:role/loubie-designs-portfolio".to_string(),
        })
    }
}
