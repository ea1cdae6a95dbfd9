use crate::{prelude::*, provision::DeployedStack};

/// Outer scope every export name is published under.
pub const EXPORT_SCOPE: &str = "LoubieDesigns";

///
/// StackOutput
///
/// One named value republished for downstream consumers (e.g. the
/// frontend configuration step). Export names carry the resolved
/// environment so outputs from several environments can land in the
/// same outer scope without colliding.
///

#[derive(Clone, Debug, Serialize)]
pub struct StackOutput {
    pub name: &'static str,
    pub value: String,
    pub description: String,
    pub export_name: String,
}

fn export_name(key: &str, env: Environment) -> String {
    format!("{EXPORT_SCOPE}-{key}-{env}")
}

/// The published output set for a provisioned stack.
#[must_use]
pub fn published_outputs(deployed: &DeployedStack) -> Vec<StackOutput> {
    let plan = &deployed.plan;
    let env = plan.environment;

    vec![
        StackOutput {
            name: "Environment",
            value: env.to_string(),
            description: "Deployment environment".to_string(),
            export_name: export_name("Environment", env),
        },
        StackOutput {
            name: "AllowedOrigins",
            value: plan.allowed_origins.join(", "),
            description: format!("Allowed CORS origins for {env} environment"),
            export_name: export_name("AllowedOrigins", env),
        },
        StackOutput {
            name: "PhotoBucketName",
            value: plan.bucket.identity.name.clone(),
            description: "S3 bucket name for photos".to_string(),
            export_name: export_name("PhotoBucketName", env),
        },
        StackOutput {
            name: "PhotoDistributionDomain",
            value: deployed.distribution_domain.clone(),
            description: "CloudFront distribution domain for photos".to_string(),
            export_name: export_name("PhotoCDN", env),
        },
        StackOutput {
            name: "PhotoMetadataTableName",
            value: plan.table.identity.name.clone(),
            description: "DynamoDB table name for photo metadata".to_string(),
            export_name: export_name("MetadataTableName", env),
        },
        StackOutput {
            name: "AmplifyExecutionRoleArn",
            value: deployed.role_arn.clone(),
            description: "IAM role ARN for the Amplify app".to_string(),
            export_name: export_name("AmplifyRoleArn", env),
        },
        StackOutput {
            name: "Region",
            value: plan.region.clone(),
            description: "AWS region".to_string(),
            export_name: export_name("Region", env),
        },
    ]
}
