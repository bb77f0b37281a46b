// Layer precedence tests. Each runs inside a figment Jail, which isolates
// the working directory and restores any environment it sets.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use figment::Jail;
use netpulse_config::{Backend, ConfigError, LoadOptions, Overrides, load, load_settings};
use pretty_assertions::assert_eq;

fn options() -> LoadOptions {
    LoadOptions {
        config_file: Some(PathBuf::from("config.toml")),
        env_file: None,
        overrides: Overrides::default(),
    }
}

#[test]
fn test_defaults_without_any_layer() {
    Jail::expect_with(|_jail| {
        let settings = load_settings(&options()).unwrap();
        assert_eq!(settings.controller_url, "https://sandboxdnac2.cisco.com");
        assert_eq!(settings.controller_username, "devnetuser");
        assert_eq!(settings.backend, Backend::Live);
        assert_eq!(settings.hq_local_network, "192.168.1.0/24");
        Ok(())
    });
}

#[test]
fn test_each_layer_overrides_the_one_below() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
                controller_url = "https://toml.example"
                controller_username = "toml-user"
                ping_count = 2
                backend = "simulated"
            "#,
        )?;
        jail.create_file(
            "config.env",
            "CONTROLLER_URL=https://dotenv.example\nCONTROLLER_USERNAME=dotenv-user\n",
        )?;

        let settings = load_settings(&options()).unwrap();
        assert_eq!(settings.controller_url, "https://dotenv.example");
        assert_eq!(settings.controller_username, "dotenv-user");
        assert_eq!(settings.ping_count, 2);
        assert_eq!(settings.backend, Backend::Simulated);

        jail.set_env("CONTROLLER_URL", "https://plain.example");
        let settings = load_settings(&options()).unwrap();
        assert_eq!(settings.controller_url, "https://plain.example");

        jail.set_env("NETPULSE_CONTROLLER_URL", "https://prefixed.example");
        let settings = load_settings(&options()).unwrap();
        assert_eq!(settings.controller_url, "https://prefixed.example");
        assert_eq!(settings.controller_username, "dotenv-user");

        let mut opts = options();
        opts.overrides.controller_url = Some("https://flag.example".into());
        opts.overrides.backend = Some(Backend::Live);
        let settings = load_settings(&opts).unwrap();
        assert_eq!(settings.controller_url, "https://flag.example");
        assert_eq!(settings.backend, Backend::Live);
        Ok(())
    });
}

#[test]
fn test_dotenv_accepts_prefixed_keys_and_typed_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "lab.env",
            "NETPULSE_PING_COUNT=3\nverify_tls=true\nDNAC_URL=https://ignored.example\n",
        )?;
        let mut opts = options();
        opts.env_file = Some(PathBuf::from("lab.env"));

        let settings = load_settings(&opts).unwrap();
        assert_eq!(settings.ping_count, 3);
        assert!(settings.verify_tls);
        assert_eq!(settings.controller_url, "https://sandboxdnac2.cisco.com");

        // The process environment is left alone
        assert!(std::env::var("NETPULSE_PING_COUNT").is_err());
        Ok(())
    });
}

#[test]
fn test_plain_env_is_limited_to_connection_keys() {
    Jail::expect_with(|jail| {
        jail.set_env("BACKEND", "simulated");
        jail.set_env("HQ_ROUTER_IP", "198.51.100.1");
        let settings = load_settings(&options()).unwrap();
        assert_eq!(settings.backend, Backend::Live);
        assert_eq!(settings.hq_router_ip, "198.51.100.1");

        jail.set_env("NETPULSE_BACKEND", "simulated");
        jail.set_env("NETPULSE_CACHE_TTL_SECS", "0");
        let settings = load_settings(&options()).unwrap();
        assert_eq!(settings.backend, Backend::Simulated);
        assert_eq!(settings.cache_ttl_secs, 0);
        Ok(())
    });
}

#[test]
fn test_resolved_config_carries_overrides() {
    Jail::expect_with(|jail| {
        jail.set_env("BRANCH_LOCAL_NETWORK", "172.16.0.0/16");
        jail.set_env("NETPULSE_BRANCH_PROBE_HOST", "172.16.4.20");
        let mut opts = options();
        opts.overrides.timeout_secs = Some(9);
        opts.overrides.results_dir = Some(PathBuf::from("history"));

        let resolved = load(&opts).unwrap();
        assert_eq!(resolved.controller.timeout, Duration::from_secs(9));
        assert_eq!(resolved.results_dir, PathBuf::from("history"));
        assert_eq!(
            resolved.topology.remote.local_network.unwrap().to_string(),
            "172.16.0.0/16"
        );
        assert_eq!(
            resolved.topology.remote.probe_host.to_string(),
            "172.16.4.20"
        );
        Ok(())
    });
}

#[test]
fn test_probe_host_outside_network_is_fatal() {
    Jail::expect_with(|jail| {
        jail.set_env("HQ_LOCAL_NETWORK", "10.20.0.0/16");
        match load(&options()).unwrap_err() {
            ConfigError::Validation { field, reason } => {
                assert_eq!(field, "hq_probe_host");
                assert!(reason.contains("10.20.0.0/16"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    });
}

#[test]
fn test_malformed_values_fail_extraction() {
    Jail::expect_with(|jail| {
        jail.set_env("NETPULSE_PING_COUNT", "plenty");
        assert!(matches!(
            load_settings(&options()).unwrap_err(),
            ConfigError::Figment(_)
        ));
        Ok(())
    });
}

#[test]
fn test_malformed_toml_fails_extraction() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "controller_url = [")?;
        assert!(matches!(
            load_settings(&options()).unwrap_err(),
            ConfigError::Figment(_)
        ));
        Ok(())
    });
}
