use crate::commands::{confirm, prompt};
use crate::config::{parse_base_url, Config};
use crate::error::{CatalogError, Result};

pub fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists()
        && !confirm(&format!(
            "Config file already exists at {}. Overwrite?",
            config_path.display()
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    println!("Catalog Admin Configuration");
    println!("===========================\n");

    let api_url = prompt("API URL [http://localhost:8000/api/]: ")?;
    let api_url = if api_url.is_empty() {
        None
    } else {
        Some(parse_base_url(&api_url)?.to_string())
    };

    let timeout = prompt("Request timeout in seconds [30]: ")?;
    let timeout_secs = parse_timeout(&timeout)?;

    let config = Config {
        api_url,
        timeout_secs,
    };

    let contents = toml::to_string(&config).map_err(|e| CatalogError::ConfigRead {
        path: config_path.clone(),
        source: std::io::Error::other(e),
    })?;

    // Create config directory if it doesn't exist
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CatalogError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    std::fs::write(&config_path, contents).map_err(|e| CatalogError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("Run 'catalog login' to authenticate.");

    Ok(())
}

/// Blank means the default timeout.
fn parse_timeout(input: &str) -> Result<Option<u64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    input
        .parse::<u64>()
        .map(Some)
        .map_err(|_| CatalogError::InvalidInput {
            field: "timeout",
            message: format!("expected a whole number of seconds, got \"{input}\""),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_timeout_keeps_the_default() {
        assert_eq!(parse_timeout("").unwrap(), None);
        assert_eq!(parse_timeout(" 45 ").unwrap(), Some(45));
    }

    #[test]
    fn non_numeric_timeout_is_invalid_input() {
        let err = parse_timeout("soon").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput { field: "timeout", .. }));
        assert_eq!(
            err.to_string(),
            "Invalid timeout: expected a whole number of seconds, got \"soon\""
        );
    }
}
