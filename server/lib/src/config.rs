//! The server configuration as read from a TOML file.
//!
//! ```toml
//! root_dn = "cn=Directory Manager"
//! default_read_policy = "allow"
//! config_read_policy = "deny"
//! log_level = "info"
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::be::ReadPolicySource;
use crate::entry::EntryScope;
use crate::prelude::*;
use crate::server::identity::Identity;
use crate::utils::normalise_dn;

fn default_root_dn() -> String {
    DEFAULT_ROOT_DN.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// The DN that is treated as the internal identity when bound, bypassing access
    /// controls.
    #[serde(default = "default_root_dn")]
    pub root_dn: String,
    /// The read decision for an attribute that no ACI applies to.
    #[serde(default)]
    pub default_read_policy: ReadPolicy,
    /// Overrides `default_read_policy` for entries in the `cn=config` tree.
    #[serde(default)]
    pub config_read_policy: Option<ReadPolicy>,
    /// A log filter directive, such as `info` or `dirsrvd_lib=trace`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            root_dn: default_root_dn(),
            default_read_policy: ReadPolicy::default(),
            config_read_policy: None,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self, OperationError> {
        let mut f = File::open(config_path.as_ref()).map_err(|e| {
            eprintln!("Unable to open config file [{:?}] 🥺", e);
            OperationError::FsError
        })?;

        let mut contents = String::new();
        f.read_to_string(&mut contents).map_err(|e| {
            eprintln!("unable to read contents {:?}", e);
            OperationError::FsError
        })?;

        Self::from_toml_str(contents.as_str())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, OperationError> {
        let config: ServerConfig = toml::from_str(contents).map_err(|e| {
            eprintln!("unable to parse config {:?}", e);
            OperationError::InvalidConfig(e.to_string())
        })?;

        normalise_dn(&config.root_dn).map_err(|_| {
            eprintln!("root_dn is not a valid dn: {}", config.root_dn);
            OperationError::InvalidConfig(format!("invalid root_dn '{}'", config.root_dn))
        })?;

        Ok(config)
    }

    /// The identity a connection bound as `bind_dn` searches with. No bind, or a bind with
    /// the empty DN, is anonymous.
    pub fn identity_for_bind(&self, bind_dn: Option<&str>) -> Result<Identity, OperationError> {
        let Some(bind_dn) = bind_dn else {
            return Ok(Identity::anonymous());
        };
        let ndn = normalise_dn(bind_dn)?;
        if ndn == normalise_dn(&self.root_dn)? {
            security_info!(%bind_dn, "root dn bound, access controls will be bypassed");
            return Ok(Identity::from_internal());
        }
        Identity::from_dn(bind_dn)
    }

    /// Start logging for a server process at the configured `log_level`.
    pub fn init_logging(&self) -> Result<(), OperationError> {
        sketching::init(&self.log_level).map_err(|e| {
            eprintln!("unable to start logging {:?}", e);
            OperationError::InvalidConfig(e)
        })
    }
}

impl ReadPolicySource for ServerConfig {
    fn default_read_policy(&self, scope: EntryScope) -> ReadPolicy {
        match (scope, self.config_read_policy) {
            (EntryScope::Config, Some(policy)) => policy,
            _ => self.default_read_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.root_dn, "cn=Directory Manager");
        assert_eq!(
            config.default_read_policy(EntryScope::Config),
            ReadPolicy::Allow
        );
    }

    #[test]
    fn test_config_read_policies() {
        let config = ServerConfig::from_toml_str(
            r#"
default_read_policy = "allow"
config_read_policy = "deny"
"#,
        )
        .unwrap();
        assert_eq!(config.default_read_policy(EntryScope::Entry), ReadPolicy::Allow);
        assert_eq!(config.default_read_policy(EntryScope::RootDse), ReadPolicy::Allow);
        assert_eq!(config.default_read_policy(EntryScope::Config), ReadPolicy::Deny);
    }

    #[test]
    fn test_config_invalid() {
        assert!(matches!(
            ServerConfig::from_toml_str("unknown_field = true"),
            Err(OperationError::InvalidConfig(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml_str(r#"default_read_policy = "maybe""#),
            Err(OperationError::InvalidConfig(_))
        ));
        assert!(matches!(
            ServerConfig::from_toml_str(r#"root_dn = "admin""#),
            Err(OperationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"root_dn = "cn=Admin""#).unwrap();
        writeln!(file, r#"log_level = "debug""#).unwrap();

        let config = ServerConfig::new(file.path()).unwrap();
        assert_eq!(config.root_dn, "cn=Admin");
        assert_eq!(config.log_level, "debug");

        assert_eq!(
            ServerConfig::new("/this/path/does/not/exist.toml"),
            Err(OperationError::FsError)
        );
    }

    #[test]
    fn test_config_invalid_log_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = ServerConfig {
            log_level: "dirsrvd_lib=notalevel".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.init_logging(),
            Err(OperationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_identity_for_bind() {
        sketching::test_init();
        let config = ServerConfig::default();
        assert!(config
            .identity_for_bind(Some("CN=directory manager"))
            .unwrap()
            .is_internal());
        assert!(config.identity_for_bind(None).unwrap().is_anonymous());
        assert!(config.identity_for_bind(Some("")).unwrap().is_anonymous());
        let ident = config
            .identity_for_bind(Some("uid=all_attrs_test,ou=people,dc=example,dc=com"))
            .unwrap();
        assert_eq!(
            ident.get_ndn(),
            Some("uid=all_attrs_test,ou=people,dc=example,dc=com")
        );
        assert!(config.identity_for_bind(Some("garbage")).is_err());
    }
}
