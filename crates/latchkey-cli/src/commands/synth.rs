//! `latchkey synth` and `latchkey validate`.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use latchkey_backend::stack;
use latchkey_core::DeployConfig;

/// Compose the deployment and emit the manifest.
pub fn synth(config_path: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let config = DeployConfig::from_file(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let manifest = stack::synthesize(&config)?;
    let json = manifest.to_json_pretty()?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "manifest written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Compose the deployment, discard the manifest, report shape.
pub fn validate(config_path: &Path) -> anyhow::Result<()> {
    let config = DeployConfig::from_file(config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let manifest = stack::synthesize(&config)?;

    println!(
        "ok: {} — {} resources, {} routes, {} grants, {} outputs",
        manifest.deployment,
        manifest.resources.len(),
        manifest.routes.len(),
        manifest.grants.len(),
        manifest.outputs.len(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path) -> std::path::PathBuf {
        let config = DeployConfig::scaffold("latchkey", "us-east-1", "111122223333");
        let path = dir.join("latchkey.toml");
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        path
    }

    #[test]
    fn synth_writes_manifest_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        let out = dir.path().join("manifest.json");

        synth(&config_path, Some(&out)).unwrap();

        let json = std::fs::read_to_string(&out).unwrap();
        assert!(json.contains("\"deployment\": \"latchkey\""));
        assert!(json.contains("/api/v1/{proxy+}"));
    }

    #[test]
    fn validate_accepts_scaffold_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path());
        validate(&config_path).unwrap();
    }

    #[test]
    fn missing_config_fails_with_context() {
        let err = validate(Path::new("/nonexistent/latchkey.toml")).unwrap_err();
        assert!(err.to_string().contains("latchkey.toml"));
    }
}
