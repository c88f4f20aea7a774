use crate::config::types::{RulesFile, Target};
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a rule file from the given path
///
/// Files with a `.toml` extension are read as a list of `[[target]]` tables,
/// anything else as a JSON array of targets.
///
/// # Arguments
///
/// * `path` - Path to the rule file
///
/// # Returns
///
/// * `Ok(Vec<Target>)` - Successfully loaded and validated targets
/// * `Err(ConfigError)` - Failed to load, parse, or validate the rules
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use grabber::config::load_rules;
///
/// let targets = load_rules(Path::new("rules.json")).unwrap();
/// println!("{} targets", targets.len());
/// ```
pub fn load_rules(path: &Path) -> Result<Vec<Target>, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let targets = if is_toml {
        parse_toml_rules(&content)?
    } else {
        parse_json_rules(&content)?
    };

    validate(&targets)?;

    Ok(targets)
}

/// Parses a JSON array of targets
pub fn parse_json_rules(content: &str) -> Result<Vec<Target>, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// Parses `[[target]]` tables from TOML
pub fn parse_toml_rules(content: &str) -> Result<Vec<Target>, ConfigError> {
    let rules: RulesFile = toml::from_str(content)?;
    Ok(rules.targets)
}

/// Computes a SHA-256 hash of the rule file content
///
/// Logged at startup so runs can be matched to the rules they used.
pub fn compute_rules_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

/// Loads the rules and returns them together with the file hash
pub fn load_rules_with_hash(path: &Path) -> Result<(Vec<Target>, String), ConfigError> {
    let targets = load_rules(path)?;
    let hash = compute_rules_hash(path)?;
    Ok((targets, hash))
}
