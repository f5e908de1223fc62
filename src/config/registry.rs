use crate::adapters::memory::MemoryDirectory;
use crate::utils::error::{Result, RosterError};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Registry seed file, TOML:
///
/// ```toml
/// [[individuals]]
/// mk = "322397ed782a798ffd9d0bc7e293df4292fe075d"
///
/// [[groups]]
/// name = "Example"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub individuals: Vec<IndividualEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualEntry {
    pub mk: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupEntry {
    pub name: String,
}

impl RegistryConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| RosterError::ConfigError {
            message: format!("cannot read registry file {}: {}", path.display(), e),
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn into_directory(self) -> MemoryDirectory {
        let mut directory = MemoryDirectory::new();
        for individual in &self.individuals {
            directory.add_individual(&individual.mk);
        }
        for group in &self.groups {
            directory.add_group(&group.name);
        }
        directory
    }
}

impl Validate for RegistryConfig {
    fn validate(&self) -> Result<()> {
        let mut seen_mks = HashSet::new();
        for individual in &self.individuals {
            validate_non_empty_string("individuals.mk", &individual.mk)?;
            if !seen_mks.insert(individual.mk.as_str()) {
                return Err(RosterError::ConfigError {
                    message: format!("duplicate individual mk: {}", individual.mk),
                });
            }
        }

        let mut seen_names = HashSet::new();
        for group in &self.groups {
            validate_non_empty_string("groups.name", &group.name)?;
            if !seen_names.insert(group.name.as_str()) {
                return Err(RosterError::ConfigError {
                    message: format!("duplicate group name: {}", group.name),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[[individuals]]
mk = "322397ed782a798ffd9d0bc7e293df4292fe075d"

[[individuals]]
mk = "a9b403e150dd4af8953a52a4bb841051e4b705d9"

[[groups]]
name = "Example"
"#;

    #[test]
    fn test_load_sample() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = RegistryConfig::load(file.path()).unwrap();
        assert_eq!(config.individuals.len(), 2);
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].name, "Example");
    }

    #[test]
    fn test_load_missing_file() {
        let err = RegistryConfig::load("/nonexistent/registry.toml").unwrap_err();
        assert!(matches!(err, RosterError::ConfigError { .. }));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let config: RegistryConfig = toml::from_str(
            r#"
[[individuals]]
mk = "abc"

[[individuals]]
mk = "abc"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let config: RegistryConfig = toml::from_str(
            r#"
[[groups]]
name = "  "
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_into_directory() {
        use crate::domain::ports::IdentityDirectory;

        let config: RegistryConfig = toml::from_str(SAMPLE).unwrap();
        let directory = config.into_directory();

        assert!(directory
            .resolve_individual("322397ed782a798ffd9d0bc7e293df4292fe075d")
            .await
            .is_ok());
        assert!(directory.resolve_group("Example").await.is_ok());
        assert!(directory.resolve_group("Missing").await.is_err());
    }
}
