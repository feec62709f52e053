//! Configuration loader for the station extractor
//!
//! Loads and validates the YAML extraction config. Relative paths are
//! resolved against the directory holding the config file.
//!
//! Supports environment variable substitution using ${VAR} syntax.

use anyhow::{Context, Result};
use extraction::ExtractionConfig;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Loading Functions
// ============================================================================

/// Load and parse an extraction config with environment variable substitution
pub fn load_extraction_config<P: AsRef<Path>>(path: P) -> Result<ExtractionConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read extraction config from {:?}", path))?;

    let mut config = parse_extraction_config(&content)
        .with_context(|| format!("Failed to load extraction config from {:?}", path))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    resolve_paths(&mut config, base);

    Ok(config)
}

/// Parse and validate config text
pub fn parse_extraction_config(content: &str) -> Result<ExtractionConfig> {
    let expanded = expand_env_vars(content)?;

    let config: ExtractionConfig = serde_yaml::from_str(&expanded)
        .with_context(|| "Failed to parse extraction config YAML")?;

    validate_extraction_config(&config)?;

    Ok(config)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Make every configured path absolute relative to `base`
fn resolve_paths(config: &mut ExtractionConfig, base: &Path) {
    config.stations = resolve(base, &config.stations);
    for job in &mut config.jobs {
        job.input_root = resolve(base, &job.input_root);
        job.output_root = resolve(base, &job.output_root);
    }
    if let Some(regrid) = &mut config.regrid {
        regrid.output_root = resolve(base, &regrid.output_root);
    }
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_extraction_config(config: &ExtractionConfig) -> Result<()> {
    anyhow::ensure!(
        !config.stations.as_os_str().is_empty(),
        "Station table path cannot be empty"
    );
    anyhow::ensure!(
        !config.jobs.is_empty() || config.regrid.is_some(),
        "Config must define at least one job or a regrid section"
    );

    config.validate()?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
stations: stations.csv
jobs:
  - name: pm25
    input_root: ${EXTRACTOR_TEST_DATA:-data}/GWRPM25
    output_root: out/GWRPM25
"#;

    #[test]
    fn test_expand_env_vars_simple() {
        std::env::set_var("EXTRACTOR_TEST_VAR", "test_value");
        let result = expand_env_vars("prefix_${EXTRACTOR_TEST_VAR}_suffix").unwrap();
        assert_eq!(result, "prefix_test_value_suffix");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        std::env::remove_var("EXTRACTOR_NONEXISTENT_VAR");
        let result = expand_env_vars("value_${EXTRACTOR_NONEXISTENT_VAR:-default}_end").unwrap();
        assert_eq!(result, "value_default_end");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        std::env::remove_var("EXTRACTOR_REQUIRED_VAR");
        assert!(expand_env_vars("${EXTRACTOR_REQUIRED_VAR}").is_err());
    }

    #[test]
    fn test_expand_env_vars_unclosed() {
        assert!(expand_env_vars("path: ${OPEN").is_err());
    }

    #[test]
    fn test_resolve_var_expr_override_default() {
        std::env::set_var("EXTRACTOR_SET_VAR", "custom");
        assert_eq!(resolve_var_expr("EXTRACTOR_SET_VAR:-default").unwrap(), "custom");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_extraction_config(MINIMAL).unwrap();
        assert_eq!(config.jobs.len(), 1);
        assert_eq!(config.jobs[0].extension, "tif");
    }

    #[test]
    fn test_rejects_config_without_work() {
        let err = parse_extraction_config("stations: s.csv\n").unwrap_err();
        assert!(err.to_string().contains("at least one job"));
    }

    #[test]
    fn test_rejects_invalid_sampler() {
        let yaml = format!("{}sampler:\n  method: kernel_mean\n  kernel:\n    shape: ones\n    side: 0\n", MINIMAL);
        assert!(parse_extraction_config(&yaml).is_err());
        let yaml = format!("{}sampler:\n  method: nearest\n", MINIMAL);
        assert!(parse_extraction_config(&yaml).is_err());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extract.yaml");
        fs::write(&path, MINIMAL.replace("${EXTRACTOR_TEST_DATA:-data}", "/abs")).unwrap();

        let config = load_extraction_config(&path).unwrap();
        assert_eq!(config.stations, dir.path().join("stations.csv"));
        assert_eq!(config.jobs[0].input_root, PathBuf::from("/abs/GWRPM25"));
        assert_eq!(config.jobs[0].output_root, dir.path().join("out/GWRPM25"));
    }
}
