//! `refconf resolve`

use std::path::Path;

use refconf_core::{Config, Mode};

use crate::cli::OutputFormat;
use crate::error::Result;

/// Resolve the document and print it in `format`.
pub fn run_resolve(path: &Path, mode: Mode, format: OutputFormat, compact: bool) -> Result<()> {
    let config = super::load(path, mode)?;
    print!("{}", render(&config, format, compact)?);
    Ok(())
}

/// Render a resolved document. The output always ends with a newline.
pub fn render(config: &Config, format: OutputFormat, compact: bool) -> Result<String> {
    let mut output = match format {
        OutputFormat::Json if compact => serde_json::to_string(config.as_value())?,
        OutputFormat::Json => serde_json::to_string_pretty(config.as_value())?,
        OutputFormat::Yaml => serde_yaml::to_string(config.as_value())?,
    };
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::parse(r#"{"name": "svc", "url": "http://${name}", "n": "{{ 2 * 3 }}"}"#).unwrap()
    }

    #[test]
    fn test_render_compact_json() {
        let output = render(&config(), OutputFormat::Json, true).unwrap();
        assert_eq!(output, "{\"name\":\"svc\",\"url\":\"http://svc\",\"n\":6}\n");
    }

    #[test]
    fn test_render_pretty_json() {
        let output = render(&config(), OutputFormat::Json, false).unwrap();
        assert!(output.starts_with("{\n  \"name\": \"svc\""));
        assert!(output.ends_with("}\n"));
    }

    #[test]
    fn test_render_yaml() {
        let output = render(&config(), OutputFormat::Yaml, false).unwrap();
        assert!(output.contains("name: svc\n"));
        assert!(output.contains("url: http://svc\n"));
        assert!(output.contains("n: 6\n"));
    }
}
