//! `latchkey outputs` — print the aggregated deployment outputs.

use std::path::Path;

use anyhow::{bail, Context};

use latchkey_backend::stack;
use latchkey_core::DeployConfig;

pub fn outputs(config_path: &Path, format: &str) -> anyhow::Result<()> {
    let config = DeployConfig::from_file(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let manifest = stack::synthesize(&config)?;

    match format {
        "text" => {
            for (name, value) in &manifest.outputs {
                println!("{name} = {value}");
            }
        }
        "json" => println!("{}", serde_json::to_string_pretty(&manifest.outputs)?),
        other => bail!("unknown output format: {other} (expected text or json)"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let config = DeployConfig::scaffold("latchkey", "us-east-1", "111122223333");
        let path = dir.path().join("latchkey.toml");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let err = outputs(&path, "yaml").unwrap_err();
        assert!(err.to_string().contains("unknown output format"));
    }
}
