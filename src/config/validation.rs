use crate::client::ClientOptions;
use crate::config::types::{Config, FormFillConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_client_options(&config.client)?;
    validate_form_fill(&config.form_fill)?;
    Ok(())
}

/// Validates client options
///
/// The proxy is deliberately not checked: an unusable proxy is skipped when
/// the client is built.
fn validate_client_options(options: &ClientOptions) -> Result<(), ConfigError> {
    if options.retry_wait_min_ms > options.retry_wait_max_ms {
        return Err(ConfigError::Validation(format!(
            "retry-wait-min ({}ms) must not exceed retry-wait-max ({}ms)",
            options.retry_wait_min_ms, options.retry_wait_max_ms
        )));
    }

    Ok(())
}

/// Validates form fill overrides: anything configured must be usable
fn validate_form_fill(config: &FormFillConfig) -> Result<(), ConfigError> {
    let overrides = [
        ("email", &config.email),
        ("color", &config.color),
        ("password", &config.password),
        ("phone", &config.phone),
        ("placeholder", &config.placeholder),
    ];

    for (key, value) in overrides {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "form-fill {} cannot be empty",
                key
            )));
        }
    }

    if let Some(email) = &config.email {
        validate_email(email)?;
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    Ok(())
}
