//! Engine configuration
//!
//! Loaded from TOML or YAML, every field optional:
//!
//! ```toml
//! orthonormal_tolerance = 1e-9
//! snap_epsilon = 2.220446049250313e-16
//! renormalize_interval = 8
//! name_policy = "strict"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NameKind, WrtError, WrtResult};

/// Which strings are accepted as namespace and frame names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePolicy {
    /// Any non-empty string (case-sensitive)
    #[default]
    Permissive,
    /// Lowercase ASCII letters, digits and dashes only
    Strict,
}

impl NamePolicy {
    pub fn check(&self, kind: NameKind, name: &str) -> WrtResult<()> {
        let ok = match self {
            NamePolicy::Permissive => !name.is_empty(),
            NamePolicy::Strict => {
                !name.is_empty()
                    && name
                        .bytes()
                        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            }
        };
        if ok {
            Ok(())
        } else {
            Err(WrtError::InvalidName {
                kind,
                name: name.to_string(),
            })
        }
    }
}

/// Tunables shared by every namespace of a registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrtConfig {
    /// Accepted deviation of a submitted rotation from SO(3)
    pub orthonormal_tolerance: f64,

    /// Stored components below this magnitude become exact zeros
    pub snap_epsilon: f64,

    /// Re-orthonormalize accumulated rotations every N compositions
    pub renormalize_interval: usize,

    /// Naming rules for namespaces and frames
    pub name_policy: NamePolicy,
}

impl Default for WrtConfig {
    fn default() -> Self {
        Self {
            orthonormal_tolerance: 1e-9,
            snap_epsilon: f64::EPSILON,
            renormalize_interval: 8,
            name_policy: NamePolicy::Permissive,
        }
    }
}

impl WrtConfig {
    /// Any non-empty name, default tolerances
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Lowercase/digit/dash names only
    pub fn strict() -> Self {
        Self {
            name_policy: NamePolicy::Strict,
            ..Self::default()
        }
    }

    /// Load config from a file (format picked by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> WrtResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WrtError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
            _ => Self::from_toml(&contents).or_else(|_| Self::from_yaml(&contents))?,
        };
        log::debug!("Loaded WRT config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> WrtResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> WrtResult<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every write fail or never normalize
    pub fn validate(&self) -> WrtResult<()> {
        if !(self.orthonormal_tolerance.is_finite() && self.orthonormal_tolerance > 0.0) {
            return Err(WrtError::config(format!(
                "orthonormal_tolerance must be a positive number, got {}",
                self.orthonormal_tolerance
            )));
        }
        if !(self.snap_epsilon.is_finite() && self.snap_epsilon >= 0.0) {
            return Err(WrtError::config(format!(
                "snap_epsilon must be a non-negative number, got {}",
                self.snap_epsilon
            )));
        }
        if self.renormalize_interval == 0 {
            return Err(WrtError::config("renormalize_interval must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = WrtConfig::default();
        assert_eq!(config.renormalize_interval, 8);
        assert_eq!(config.name_policy, NamePolicy::Permissive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_name_policy() {
        let strict = NamePolicy::Strict;
        assert!(strict.check(NameKind::Frame, "base-link-2").is_ok());
        assert!(strict.check(NameKind::Frame, "Base").is_err());
        assert!(strict.check(NameKind::Frame, "base_link").is_err());
        assert!(strict.check(NameKind::Namespace, "").is_err());

        let permissive = NamePolicy::Permissive;
        assert!(permissive.check(NameKind::Frame, "Base Link/2").is_ok());
        assert!(matches!(
            permissive.check(NameKind::Frame, ""),
            Err(WrtError::InvalidName {
                kind: NameKind::Frame,
                ..
            })
        ));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = WrtConfig::from_toml("name_policy = \"strict\"\nrenormalize_interval = 4\n")
            .unwrap();
        assert_eq!(config.name_policy, NamePolicy::Strict);
        assert_eq!(config.renormalize_interval, 4);
        assert_eq!(config.orthonormal_tolerance, 1e-9);
    }

    #[test]
    fn test_from_yaml() {
        let config = WrtConfig::from_yaml("orthonormal_tolerance: 1.0e-6\n").unwrap();
        assert_eq!(config.orthonormal_tolerance, 1e-6);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = WrtConfig::from_toml("renormalize_interval = 0").unwrap_err();
        assert!(matches!(err, WrtError::Config(_)));
    }

    #[test]
    fn test_from_file_detects_format() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("wrt.toml");
        let mut f = std::fs::File::create(&toml_path).unwrap();
        writeln!(f, "name_policy = \"strict\"").unwrap();
        assert_eq!(
            WrtConfig::from_file(&toml_path).unwrap().name_policy,
            NamePolicy::Strict
        );

        let yaml_path = dir.path().join("wrt.yaml");
        std::fs::write(&yaml_path, "snap_epsilon: 0.0\n").unwrap();
        assert_eq!(WrtConfig::from_file(&yaml_path).unwrap().snap_epsilon, 0.0);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            WrtConfig::from_file(missing),
            Err(WrtError::Config(_))
        ));
    }
}
