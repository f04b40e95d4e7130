use serde::{Deserialize, Serialize};
use std::{fmt, fmt::Display, str::FromStr};

/// The decision made for an attribute when no access control rule applies to it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReadPolicy {
    #[default]
    Allow,
    Deny,
}

impl Display for ReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadPolicy::Allow => f.write_str("allow"),
            ReadPolicy::Deny => f.write_str("deny"),
        }
    }
}

impl FromStr for ReadPolicy {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(ReadPolicy::Allow),
            "deny" => Ok(ReadPolicy::Deny),
            _ => Err("Must be one of allow, deny"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReadPolicy;
    use std::str::FromStr;

    #[test]
    fn test_read_policy_parse() {
        assert_eq!(ReadPolicy::from_str("Allow"), Ok(ReadPolicy::Allow));
        assert_eq!(ReadPolicy::from_str("deny"), Ok(ReadPolicy::Deny));
        assert!(ReadPolicy::from_str("maybe").is_err());
        assert_eq!(ReadPolicy::default(), ReadPolicy::Allow);
    }
}
