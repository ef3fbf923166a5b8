//! `latchkey init` — scaffold a deploy config.

use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;

use latchkey_core::DeployConfig;

pub fn init(dir: &Path, name: &str, region: &str, account: &str) -> anyhow::Result<()> {
    let path = dir.join("latchkey.toml");
    if path.exists() {
        bail!("{} already exists; refusing to overwrite", path.display());
    }

    let config = DeployConfig::scaffold(name, region, account);
    std::fs::write(&path, config.to_toml_string()?)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "deploy config scaffolded");
    println!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffolds_parseable_config() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path(), "latchkey", "eu-west-1", "111122223333").unwrap();

        let config = DeployConfig::from_file(&dir.path().join("latchkey.toml")).unwrap();
        assert_eq!(config.deployment.region, "eu-west-1");
        assert_eq!(config.bundles.len(), 8);
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path(), "latchkey", "us-east-1", "111122223333").unwrap();
        assert!(init(dir.path(), "latchkey", "us-east-1", "111122223333").is_err());
    }
}
