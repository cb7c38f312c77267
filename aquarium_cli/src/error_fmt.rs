//! Human-readable error descriptions and structured JSON error formatting.

use aquarium_core::AquariumError;

/// Marks a failure that happened while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ConfigError(pub String);

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ConfigError(msg)) = err.downcast_ref::<ConfigError>() {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range or malformed values in the TOML.\nHow to fix: Edit the config file (see `aquarium check-config`), then rerun."
        );
    }

    if let Some(ae) = err.downcast_ref::<AquariumError>() {
        return match ae {
            AquariumError::Validation { field, reason } => format!(
                "What happened: Rejected value for {field}: {reason}.\nHow to fix: Use a value inside the accepted range."
            ),
            AquariumError::Remote(msg) => format!(
                "What happened: Remote call failed ({msg}).\nLikely causes: Network unreachable, wrong token or repository.\nHow to fix: Check AQUARIUM_GITHUB_TOKEN / GITHUB_REPO and connectivity."
            ),
            other => format!(
                "What happened: {other}.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("address in use") || lower.contains("address already in use") {
        return format!(
            "What happened: Could not bind the HTTP listener ({msg}).\nLikely causes: Another process uses the port.\nHow to fix: Stop it or pass --bind with a free address."
        );
    }

    if lower.contains("invalid configuration") {
        return "What happened: Configuration file could not be parsed.\nLikely causes: TOML syntax error or a value of the wrong type.\nHow to fix: Fix the file named above and try again.".to_string();
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Config problems exit with 2, everything else with 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<ConfigError>().is_some() {
        return 2;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = if err.downcast_ref::<ConfigError>().is_some() {
        "ConfigError"
    } else if let Some(ae) = err.downcast_ref::<AquariumError>() {
        match ae {
            AquariumError::Validation { .. } => "ValidationError",
            AquariumError::Remote(_) => "RemoteError",
            AquariumError::Config(_) => "ConfigError",
            AquariumError::State(_) => "StateError",
        }
    } else {
        "Error"
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
