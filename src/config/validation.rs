use crate::config::types::{Action, ActionKind, GrabberConfig, Mode, Target};
use crate::ConfigError;
use url::Url;

/// Upper bound for the download worker count
pub const MAX_WORKERS: usize = 100;

/// Validates the loaded targets
///
/// Only defects that make a rule unusable are rejected. Unknown modes or
/// actions and bad start URLs are reported here but left to fail for their
/// own target when it runs.
pub fn validate(targets: &[Target]) -> Result<(), ConfigError> {
    for target in targets {
        validate_target(target)?;
    }
    Ok(())
}

/// Validates the run options
pub fn validate_grabber_config(config: &GrabberConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "number of downloaders must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_target(target: &Target) -> Result<(), ConfigError> {
    if let Err(e) = Url::parse(&target.url) {
        tracing::warn!("Target '{}' has an invalid url '{}': {}", target.name, target.url, e);
    }

    match &target.action {
        Some(action) => validate_action(&target.name, action),
        None => {
            tracing::warn!("Target '{}' has no actions", target.name);
            Ok(())
        }
    }
}

fn validate_action(target: &str, action: &Action) -> Result<(), ConfigError> {
    // Nested actions are walked iteratively, the chain has no branches
    let mut current = Some(action);
    let mut level = 0;

    while let Some(node) = current {
        if node.query.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "target '{}': action at level {} has an empty query",
                target, level
            )));
        }

        if let Mode::Unknown(mode) = &node.mode {
            tracing::warn!("target '{}': unknown mode '{}' at level {}", target, mode, level);
        }

        if let ActionKind::Unknown(kind) = &node.kind {
            tracing::warn!("target '{}': unknown action '{}' at level {}", target, kind, level);
        }

        current = node.next.as_deref();
        level += 1;
    }

    Ok(())
}
