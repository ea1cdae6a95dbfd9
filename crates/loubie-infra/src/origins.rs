use crate::prelude::*;
use thiserror::Error as ThisError;
use url::Url;

///
/// Per-environment origin tables
///
/// Origins are a security boundary: they decide which sites may issue
/// cross-origin reads against stored assets. Each declared environment
/// carries its own literal table so a dev deployment never trusts
/// production origins and vice versa. There is no wildcard variant.
///

const DEV_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

const PROD_ORIGINS: &[&str] = &[
    "https://www.loubie-designs.com",
    "https://loubie-designs.com",
    "https://stage.d2qtl7pvprqis4.amplifyapp.com",
];

/// Look up the allowed read origins for a resolved environment.
///
/// The closed [`Environment`] enum makes "undeclared profile" a
/// non-case here; the only fallback point is [`Environment::resolve`],
/// which maps unknown identifiers to `Dev` and therefore to the dev
/// table below.
#[must_use]
pub const fn allowed_origins(env: Environment) -> &'static [&'static str] {
    match env {
        Environment::Dev => DEV_ORIGINS,
        Environment::Prod => PROD_ORIGINS,
    }
}

///
/// OriginError
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum OriginError {
    #[error("origin `{origin}` has no host")]
    MissingHost { origin: String },

    #[error("origin `{origin}` must be scheme + host only, without path, query, or fragment")]
    NotBareOrigin { origin: String },

    #[error("origin `{origin}` is not a valid URL: {source}")]
    Unparseable {
        origin: String,
        source: url::ParseError,
    },

    #[error("origin `{origin}` uses unsupported scheme `{scheme}`")]
    UnsupportedScheme { origin: String, scheme: String },
}

/// Check that an origin is a well-formed scheme + host (+ port) tuple.
pub fn validate_origin(origin: &str) -> Result<(), OriginError> {
    let url = Url::parse(origin).map_err(|source| OriginError::Unparseable {
        origin: origin.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(OriginError::UnsupportedScheme {
                origin: origin.to_string(),
                scheme: scheme.to_string(),
            });
        }
    }

    if url.host_str().is_none() {
        return Err(OriginError::MissingHost {
            origin: origin.to_string(),
        });
    }

    if origin.ends_with('/') || url.path() != "/" || url.query().is_some() || url.fragment().is_some()
    {
        return Err(OriginError::NotBareOrigin {
            origin: origin.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_declared_environment_has_well_formed_origins() {
        for env in Environment::ALL {
            let origins = allowed_origins(env);
            assert!(
                !origins.is_empty(),
                "origin table for {env} must not be empty"
            );
            for origin in origins {
                validate_origin(origin)
                    .unwrap_or_else(|e| panic!("origin table for {env} is malformed: {e}"));
            }
        }
    }

    #[test]
    fn dev_table_contains_local_hosts_only() {
        assert_eq!(
            allowed_origins(Environment::Dev),
            ["http://localhost:5173", "http://localhost:3000"]
        );
    }

    #[test]
    fn prod_table_contains_site_domains_and_preview() {
        assert_eq!(
            allowed_origins(Environment::Prod),
            [
                "https://www.loubie-designs.com",
                "https://loubie-designs.com",
                "https://stage.d2qtl7pvprqis4.amplifyapp.com",
            ]
        );
    }

    #[test]
    fn validate_origin_rejects_non_origin_inputs() {
        assert!(matches!(
            validate_origin("localhost:5173"),
            Err(OriginError::Unparseable { .. }) | Err(OriginError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            validate_origin("ftp://example.com"),
            Err(OriginError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            validate_origin("https://example.com/assets"),
            Err(OriginError::NotBareOrigin { .. })
        ));
        assert!(matches!(
            validate_origin("https://example.com/?x=1"),
            Err(OriginError::NotBareOrigin { .. })
        ));
        assert!(matches!(
            validate_origin("https://example.com/"),
            Err(OriginError::NotBareOrigin { .. })
        ));
    }

    #[test]
    fn validate_origin_accepts_scheme_host_port() {
        validate_origin("http://localhost:3000").expect("host + port origin should be accepted");
        validate_origin("https://www.loubie-designs.com").expect("bare host origin should pass");
    }
}
