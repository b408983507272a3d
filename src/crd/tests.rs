//! Unit tests for OrchestratorSpec validation
//!
//! Tests the `OrchestratorSpec::validate()` function to ensure it correctly
//! accepts valid configurations and rejects invalid ones.

mod orchestrator_spec_validation {
    use crate::crd::{
        AuthSecretRef, OrchestratorSpec, PlatformConfig, PostgresConfig, ResourceRequirements,
        ResourceSpec,
    };

    /// Helper to create a minimal valid OrchestratorSpec
    fn valid_spec() -> OrchestratorSpec {
        OrchestratorSpec {
            postgres: PostgresConfig {
                service_name: "sonataflow-psql".to_string(),
                service_namespace: "sonataflow-infra".to_string(),
                database_name: "sonataflow".to_string(),
                auth_secret: AuthSecretRef {
                    secret_name: "sonataflow-psql-secret".to_string(),
                    user_key: "postgres-username".to_string(),
                    password_key: "postgres-password".to_string(),
                },
            },
            platform: PlatformConfig::default(),
        }
    }

    #[test]
    fn accepts_valid_spec() {
        assert!(valid_spec().validate().is_ok());
    }

    #[test]
    fn accepts_plain_and_suffixed_quantities() {
        let mut spec = valid_spec();
        spec.platform.resources = ResourceRequirements {
            requests: ResourceSpec {
                cpu: "0.5".to_string(),
                memory: "512Mi".to_string(),
            },
            limits: ResourceSpec {
                cpu: "2".to_string(),
                memory: "4Gi".to_string(),
            },
        };
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_cpu_quantity() {
        let mut spec = valid_spec();
        spec.platform.resources.limits.cpu = "two cores".to_string();
        let err = spec.validate().unwrap_err();
        assert!(err.contains("limits.cpu"), "unexpected error: {}", err);
    }

    #[test]
    fn rejects_empty_and_negative_quantities() {
        let mut spec = valid_spec();
        spec.platform.resources.requests.memory = String::new();
        assert!(spec.validate().is_err());

        let mut spec = valid_spec();
        spec.platform.resources.requests.cpu = "-1".to_string();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn rejects_bare_suffix() {
        let mut spec = valid_spec();
        spec.platform.resources.requests.cpu = "m".to_string();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn rejects_empty_secret_name() {
        let mut spec = valid_spec();
        spec.postgres.auth_secret.secret_name = String::new();
        let err = spec.validate().unwrap_err();
        assert!(err.contains("secretName"));
    }

    #[test]
    fn rejects_empty_service_name() {
        let mut spec = valid_spec();
        spec.postgres.service_name = String::new();
        assert!(spec.validate().is_err());
    }
}

mod quantity_parsing {
    use crate::crd::validate_quantity;

    #[test]
    fn binary_suffix_wins_over_si_prefix() {
        // "1Gi" must parse as 1 + Gi, not fail on a trailing 'i'
        assert!(validate_quantity("1Gi").is_ok());
        assert!(validate_quantity("128Ki").is_ok());
    }

    #[test]
    fn millicpu_and_plain_integers() {
        assert!(validate_quantity("250m").is_ok());
        assert!(validate_quantity("4").is_ok());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(validate_quantity("lots").is_err());
        assert!(validate_quantity("1QQ").is_err());
        assert!(validate_quantity("").is_err());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        // f64's parser accepts these; the quantity grammar does not
        assert!(validate_quantity("inf").is_err());
        assert!(validate_quantity("infinity").is_err());
        assert!(validate_quantity("NaN").is_err());
        assert!(validate_quantity("nan").is_err());
    }
}
