use crate::{
    Error,
    naming::{self, Coordinate},
    policy::{self, AccessRole, BUCKET_READ_ACTIONS, TABLE_READ_ACTIONS},
    prelude::*,
    topology::CREATED_AT_ATTR,
};
use tracing::debug;

///
/// DeployContext
///
/// Raw external inputs for one provisioning run: the requested
/// environment identifier (free-form, possibly absent) and the ambient
/// account/region coordinates supplied by the deployment tool.
///

#[derive(Clone, Debug, Deserialize)]
pub struct DeployContext {
    pub environment: Option<String>,
    pub account: String,
    pub region: String,
}

///
/// HttpMethod
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
}

///
/// CorsRule
///

#[derive(Clone, Debug, Serialize)]
pub struct CorsRule {
    pub allowed_origins: &'static [&'static str],
    pub allowed_methods: &'static [HttpMethod],
    pub allowed_headers: &'static [&'static str],
    pub max_age_secs: u32,
}

///
/// LifecycleRule
///

#[derive(Clone, Copy, Debug, Serialize)]
pub struct LifecycleRule {
    pub id: &'static str,
    pub abort_incomplete_multipart_after_days: u32,
}

///
/// RemovalPolicy
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum RemovalPolicy {
    Destroy,
    Retain,
}

///
/// BucketSpec
///
/// Private photo storage: public access fully blocked, reads flow
/// through the distribution, CORS limited to the environment's origin
/// table.
///

#[derive(Clone, Debug, Serialize)]
pub struct BucketSpec {
    pub identity: ResourceIdentity,
    pub block_public_access: bool,
    pub versioned: bool,
    pub cors: CorsRule,
    pub lifecycle: Vec<LifecycleRule>,
    pub removal_policy: RemovalPolicy,
}

impl BucketSpec {
    #[must_use]
    pub fn photos(identity: ResourceIdentity, allowed_origins: &'static [&'static str]) -> Self {
        Self {
            identity,
            block_public_access: true,
            versioned: false,
            cors: CorsRule {
                allowed_origins,
                allowed_methods: &[HttpMethod::Get],
                allowed_headers: &["*"],
                max_age_secs: 3600,
            },
            lifecycle: vec![LifecycleRule {
                id: "DeleteIncompleteMultipartUploads",
                abort_incomplete_multipart_after_days: 7,
            }],
            // Photos outlive any one deployment of the stack.
            removal_policy: RemovalPolicy::Retain,
        }
    }
}

///
/// ViewerProtocolPolicy
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum ViewerProtocolPolicy {
    RedirectToHttps,
}

///
/// CachePolicy
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum CachePolicy {
    CachingOptimized,
}

///
/// PriceClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum PriceClass {
    /// North America and Europe edges only.
    PriceClass100,
}

///
/// DistributionSpec
///
/// CDN fronting the photo bucket through an origin-access identity, so
/// the bucket itself never serves the public internet.
///

#[derive(Clone, Debug, Serialize)]
pub struct DistributionSpec {
    pub origin_bucket: String,
    pub origin_access_comment: String,
    pub viewer_protocol_policy: ViewerProtocolPolicy,
    pub cache_policy: CachePolicy,
    pub compress: bool,
    pub price_class: PriceClass,
    pub ipv6: bool,
    pub comment: String,
}

impl DistributionSpec {
    #[must_use]
    pub fn fronting(bucket: &BucketSpec) -> Self {
        Self {
            origin_bucket: bucket.identity.name.clone(),
            origin_access_comment: "OAI for Loubie Designs photo bucket".to_string(),
            viewer_protocol_policy: ViewerProtocolPolicy::RedirectToHttps,
            cache_policy: CachePolicy::CachingOptimized,
            compress: true,
            price_class: PriceClass::PriceClass100,
            ipv6: true,
            comment: "Loubie Designs Photo CDN".to_string(),
        }
    }
}

///
/// AttributeType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum AttributeType {
    #[serde(rename = "S")]
    String,
}

///
/// KeyAttribute
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct KeyAttribute {
    pub name: &'static str,
    pub attr_type: AttributeType,
}

///
/// BillingMode
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum BillingMode {
    #[serde(rename = "PAY_PER_REQUEST")]
    PayPerRequest,
}

///
/// TableSpec
///
/// Photo metadata store keyed by photo id, with the fixed secondary
/// index topology declared at construction time.
///

#[derive(Clone, Debug, Serialize)]
pub struct TableSpec {
    pub identity: ResourceIdentity,
    pub partition_key: KeyAttribute,
    pub billing_mode: BillingMode,
    pub point_in_time_recovery: bool,
    pub removal_policy: RemovalPolicy,
    pub global_secondary_indexes: [IndexDefinition; 3],
}

impl TableSpec {
    #[must_use]
    pub fn photo_metadata(identity: ResourceIdentity) -> Self {
        Self {
            identity,
            partition_key: KeyAttribute {
                name: "id",
                attr_type: AttributeType::String,
            },
            billing_mode: BillingMode::PayPerRequest,
            point_in_time_recovery: true,
            removal_policy: RemovalPolicy::Retain,
            global_secondary_indexes: index_topology(),
        }
    }
}

///
/// StackPlan
///
/// The assembled declarative plan for one environment: every resource
/// spec plus the access role scoped to the generated identities.
///

#[derive(Clone, Debug, Serialize)]
pub struct StackPlan {
    pub environment: Environment,
    pub account: String,
    pub region: String,
    pub allowed_origins: &'static [&'static str],
    pub bucket: BucketSpec,
    pub distribution: DistributionSpec,
    pub table: TableSpec,
    pub role: AccessRole,
}

impl StackPlan {
    /// Assemble the plan for the given deployment context.
    ///
    /// Two-phase pipeline: phase 1 resolves the environment and derives
    /// every resource identity; phase 2 builds the access role from
    /// those identities. Phase 2 takes the phase-1 values as inputs, so
    /// the ordering is a hard dependency edge, not a declaration-order
    /// accident.
    pub fn assemble(ctx: &DeployContext) -> Result<Self, Error> {
        let environment = Environment::resolve(ctx.environment.as_deref());
        let account = naming::coordinate(Coordinate::Account, &ctx.account)?;
        let region = naming::coordinate(Coordinate::Region, &ctx.region)?;
        let allowed_origins = allowed_origins(environment);

        // Phase 1: identities.
        let storage =
            ResourceIdentity::derive(ResourceKind::Photos, environment, &account, &region)?;
        let metadata =
            ResourceIdentity::derive(ResourceKind::PhotoMetadata, environment, &account, &region)?;

        // Phase 2: policy over the phase-1 identities.
        let role = policy::build_role(&storage, &metadata)?;

        debug!(
            %environment,
            bucket = %storage,
            table = %metadata,
            "assembled stack plan"
        );

        let bucket = BucketSpec::photos(storage, allowed_origins);
        let distribution = DistributionSpec::fronting(&bucket);
        let table = TableSpec::photo_metadata(metadata);

        Ok(Self {
            environment,
            account,
            region,
            allowed_origins,
            bucket,
            distribution,
            table,
            role,
        })
    }

    /// Validate the assembled plan in a staged, deterministic order:
    /// per-resource invariants first, then plan-wide wiring.
    pub fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        self.validate_origins(&mut errs);
        self.validate_storage(&mut errs);
        self.validate_table(&mut errs);
        self.validate_role(&mut errs);

        errs.result()
    }

    fn validate_origins(&self, errs: &mut ErrorTree) {
        if self.allowed_origins.is_empty() {
            err!(errs, "origin set for {} is empty", self.environment);
        }

        for origin in self.allowed_origins {
            if let Err(e) = crate::origins::validate_origin(origin) {
                err!(errs, "{e}");
            }
        }
    }

    fn validate_storage(&self, errs: &mut ErrorTree) {
        if let Err(e) = naming::validate_resource_name(&self.bucket.identity.name) {
            err!(errs, "bucket: {e}");
        }

        if !self.bucket.block_public_access {
            err!(errs, "bucket `{}` must block public access", self.bucket.identity.name);
        }

        if self.bucket.cors.allowed_origins != self.allowed_origins {
            err!(
                errs,
                "bucket CORS origins diverge from the {} origin table",
                self.environment
            );
        }

        if self.bucket.cors.max_age_secs == 0 {
            err!(errs, "bucket CORS max age must be positive");
        }

        for rule in &self.bucket.lifecycle {
            if rule.abort_incomplete_multipart_after_days == 0 {
                err!(errs, "lifecycle rule `{}` must allow at least one day", rule.id);
            }
        }

        if self.distribution.origin_bucket != self.bucket.identity.name {
            err!(
                errs,
                "distribution origin `{}` does not match bucket `{}`",
                self.distribution.origin_bucket,
                self.bucket.identity.name
            );
        }
    }

    fn validate_table(&self, errs: &mut ErrorTree) {
        if let Err(e) = naming::validate_resource_name(&self.table.identity.name) {
            err!(errs, "table: {e}");
        }

        if self.table.global_secondary_indexes != index_topology() {
            err!(
                errs,
                "table `{}` secondary indexes diverge from the fixed topology",
                self.table.identity.name
            );
        }

        for index in &self.table.global_secondary_indexes {
            if index.sort_attr != CREATED_AT_ATTR {
                err!(errs, "index {} must sort on {}", index.name, CREATED_AT_ATTR);
            }
        }
    }

    fn validate_role(&self, errs: &mut ErrorTree) {
        if self.role.trusted_service != policy::TRUSTED_SERVICE {
            err!(
                errs,
                "role trusts `{}`, expected `{}`",
                self.role.trusted_service,
                policy::TRUSTED_SERVICE
            );
        }

        for statement in &self.role.statements {
            if statement.actions.is_empty() || statement.resources.is_empty() {
                err!(errs, "role statement with empty actions or resources");
                continue;
            }

            for action in statement.actions {
                if !TABLE_READ_ACTIONS.contains(action) && !BUCKET_READ_ACTIONS.contains(action) {
                    err!(errs, "role action `{action}` is outside the read-only set");
                }
            }

            for resource in &statement.resources {
                let owned = resource.starts_with(&self.bucket.identity.arn)
                    || resource.starts_with(&self.table.identity.arn);
                if !owned {
                    err!(errs, "role resource `{resource}` is not owned by this plan");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(environment: Option<&str>) -> DeployContext {
        DeployContext {
            environment: environment.map(str::to_string),
            account: "123456789012".to_string(),
            region: "us-west-2".to_string(),
        }
    }

    #[test]
    fn assemble_produces_a_valid_dev_plan() {
        let plan = StackPlan::assemble(&ctx(Some("dev"))).expect("dev plan should assemble");

        assert_eq!(plan.environment, Environment::Dev);
        assert_eq!(plan.bucket.identity.name, "loubie-designs-photos-dev-123456789012-us-west-2");
        assert!(plan.bucket.block_public_access);
        assert_eq!(plan.distribution.origin_bucket, plan.bucket.identity.name);
        assert_eq!(plan.table.global_secondary_indexes, index_topology());

        plan.validate().expect("assembled plan should validate");
    }

    #[test]
    fn assemble_rejects_malformed_coordinates() {
        let bad = DeployContext {
            environment: None,
            account: "12 34".to_string(),
            region: "us-west-2".to_string(),
        };

        assert!(matches!(
            StackPlan::assemble(&bad),
            Err(Error::Naming(_))
        ));
    }

    #[test]
    fn validate_catches_origin_table_divergence() {
        let mut plan = StackPlan::assemble(&ctx(Some("prod"))).expect("prod plan should assemble");
        plan.bucket.cors.allowed_origins = allowed_origins(Environment::Dev);

        let err = plan
            .validate()
            .expect_err("diverged CORS origins must fail validation");
        assert!(
            err.to_string().contains("CORS origins diverge"),
            "unexpected findings: {err}"
        );
    }

    #[test]
    fn validate_catches_topology_tampering() {
        let mut plan = StackPlan::assemble(&ctx(None)).expect("default plan should assemble");
        plan.table.global_secondary_indexes[1] = IndexDefinition {
            name: "FeaturedIndex",
            partition_attr: "featured",
            sort_attr: "uploadedAt",
        };

        let err = plan
            .validate()
            .expect_err("tampered sort attribute must fail validation");
        let rendered = err.to_string();
        assert!(
            rendered.contains("diverge from the fixed topology")
                && rendered.contains("must sort on createdAt"),
            "unexpected findings: {rendered}"
        );
    }

    #[test]
    fn validate_catches_foreign_role_resources() {
        let mut plan = StackPlan::assemble(&ctx(None)).expect("default plan should assemble");
        plan.role.statements[0]
            .resources
            .push("arn:aws:dynamodb:us-east-1:000000000000:table/other".to_string());

        let err = plan
            .validate()
            .expect_err("foreign resource must fail validation");
        assert!(
            err.to_string().contains("not owned by this plan"),
            "unexpected findings: {err}"
        );
    }
}
