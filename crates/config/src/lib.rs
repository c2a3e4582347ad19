//! Environment configuration for certvault.
//!
//! A renewal run is parameterized entirely through environment variables
//! (the invocation environment owns scheduling and secrets injection, so
//! there is no config file). The full surface:
//!
//! | Variable | Required | Effect |
//! |---|---|---|
//! | `DOMAIN_NAME` | yes | primary certificate domain |
//! | `ADDITIONAL_DOMAINS` | no | comma-separated extra SAN domains |
//! | `EMAIL_ADDRESS` | yes | ACME account contact |
//! | `SECRET_NAME` | yes | Secrets Manager record identifier |
//! | `AWS_SERVICES_REGION` | yes | region for the Secrets Manager client |
//! | `IS_STAGING` | no | routes issuance to the CA staging endpoint |
//!
//! Validation happens exactly once, at the start of a run; the resulting
//! [`RenewalConfig`] is immutable from then on. A missing mandatory
//! variable fails the run before any tool installation or network call.

use thiserror::Error;
use tracing::debug;

/// Environment variable names making up the configuration surface.
pub const DOMAIN_NAME: &str = "DOMAIN_NAME";
pub const ADDITIONAL_DOMAINS: &str = "ADDITIONAL_DOMAINS";
pub const EMAIL_ADDRESS: &str = "EMAIL_ADDRESS";
pub const SECRET_NAME: &str = "SECRET_NAME";
pub const AWS_SERVICES_REGION: &str = "AWS_SERVICES_REGION";
pub const IS_STAGING: &str = "IS_STAGING";

/// Errors produced while loading the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mandatory environment variable is absent or empty.
    #[error("Missing required environment variable {0}")]
    MissingVariable(&'static str),
}

/// Validated, immutable configuration for one renewal run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalConfig {
    /// Primary certificate domain.
    pub domain: String,
    /// Additional SAN domains, in the order given, trimmed, no blanks.
    pub additional_domains: Vec<String>,
    /// ACME account contact email.
    pub email: String,
    /// Secret-store record identifier.
    pub secret_name: String,
    /// Region for the secret-store client.
    pub region: String,
    /// Whether issuance targets the CA's staging endpoint.
    pub staging: bool,
}

impl RenewalConfig {
    /// Load and validate the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] naming the first mandatory
    /// variable that is absent or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through an arbitrary lookup function.
    ///
    /// This is the seam tests use to validate behavior without touching
    /// process-wide environment state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            domain: required(&lookup, DOMAIN_NAME)?,
            additional_domains: parse_domain_list(
                lookup(ADDITIONAL_DOMAINS).as_deref().unwrap_or(""),
            ),
            email: required(&lookup, EMAIL_ADDRESS)?,
            secret_name: required(&lookup, SECRET_NAME)?,
            region: required(&lookup, AWS_SERVICES_REGION)?,
            staging: lookup(IS_STAGING)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        debug!(
            domain = %config.domain,
            additional = config.additional_domains.len(),
            staging = config.staging,
            "Loaded renewal configuration"
        );

        Ok(config)
    }

    /// All domains the certificate covers: primary first, then the
    /// additional domains in their configured order.
    pub fn all_domains(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.domain.as_str())
            .chain(self.additional_domains.iter().map(String::as_str))
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVariable(name)),
    }
}

/// Split a comma-separated domain list, trimming whitespace and dropping
/// blank entries. Order is preserved.
fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (DOMAIN_NAME, "example.com"),
            (EMAIL_ADDRESS, "ops@example.com"),
            (SECRET_NAME, "prod/example-cert"),
            (AWS_SERVICES_REGION, "eu-west-1"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<RenewalConfig, ConfigError> {
        RenewalConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_loads_minimal_config() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.domain, "example.com");
        assert_eq!(config.email, "ops@example.com");
        assert_eq!(config.secret_name, "prod/example-cert");
        assert_eq!(config.region, "eu-west-1");
        assert!(config.additional_domains.is_empty());
        assert!(!config.staging);
    }

    #[test]
    fn test_each_mandatory_variable_is_named_when_missing() {
        for missing in [DOMAIN_NAME, EMAIL_ADDRESS, SECRET_NAME, AWS_SERVICES_REGION] {
            let mut env = full_env();
            env.remove(missing);

            let err = load(&env).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("Missing required environment variable {missing}")
            );
            let ConfigError::MissingVariable(name) = err;
            assert_eq!(name, missing);
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut env = full_env();
        env.insert(DOMAIN_NAME, "   ");

        let ConfigError::MissingVariable(name) = load(&env).unwrap_err();
        assert_eq!(name, DOMAIN_NAME);
    }

    #[test]
    fn test_additional_domains_trim_and_skip_blanks() {
        let mut env = full_env();
        env.insert(ADDITIONAL_DOMAINS, "a.com, , b.com ,");

        let config = load(&env).unwrap();
        assert_eq!(config.additional_domains, vec!["a.com", "b.com"]);
        assert_eq!(
            config.all_domains().collect::<Vec<_>>(),
            vec!["example.com", "a.com", "b.com"]
        );
    }

    #[test]
    fn test_staging_flag_parsing() {
        for (value, expected) in [("true", true), ("TRUE", true), ("false", false), ("1", false)] {
            let mut env = full_env();
            env.insert(IS_STAGING, value);
            assert_eq!(load(&env).unwrap().staging, expected, "value {value:?}");
        }

        // Absent defaults to false
        assert!(!load(&full_env()).unwrap().staging);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Whatever the raw list looks like, parsed entries are never
            // empty and never carry surrounding whitespace.
            #[test]
            fn parsed_entries_are_trimmed_and_nonempty(raw in ".{0,64}") {
                for entry in parse_domain_list(&raw) {
                    prop_assert!(!entry.is_empty());
                    prop_assert_eq!(entry.trim(), entry.as_str());
                }
            }

            // Parsing is idempotent: re-joining and re-parsing yields the
            // same list.
            #[test]
            fn parsing_is_idempotent(raw in "[a-z0-9., ]{0,64}") {
                let once = parse_domain_list(&raw);
                let twice = parse_domain_list(&once.join(","));
                prop_assert_eq!(once, twice);
            }
        }
    }
}
