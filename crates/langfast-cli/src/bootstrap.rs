//! Composition root: turn parsed arguments into a ready [`ProxyState`].

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use langfast_client::{DefaultLangfastClient, LangfastClientConfig};
use langfast_core::ModelCatalog;
use langfast_proxy::{ProxyConfig, ProxyState};
use tracing::info;

use crate::parser::Cli;

/// Client settings taken from the command line.
pub fn client_config(cli: &Cli) -> LangfastClientConfig {
    LangfastClientConfig::new()
        .with_supabase_url(&cli.supabase_url)
        .with_runner_url(&cli.runner_url)
        .with_anon_key(&cli.anon_key)
        .with_max_completion_tokens(cli.max_tokens)
        .with_content_mode(cli.content_mode)
}

/// Load the catalog file, or the built-in list when no file is given.
pub fn load_catalog(path: Option<&Path>) -> anyhow::Result<ModelCatalog> {
    let catalog = match path {
        Some(path) => ModelCatalog::from_path(path)?,
        None => ModelCatalog::builtin().context("Built-in model catalog is invalid")?,
    };
    info!(models = catalog.len(), "Loaded model catalog");
    Ok(catalog)
}

/// Build the shared server state.
pub fn build_state(cli: &Cli) -> anyhow::Result<ProxyState> {
    let client = DefaultLangfastClient::new(client_config(cli))
        .context("Failed to create LangFast client")?;
    let catalog = load_catalog(cli.models.as_deref())?;

    let mut config = ProxyConfig::new();
    if let Some(key) = &cli.api_key {
        config = config.with_api_key(key);
    }
    if config.api_key().is_none() {
        info!("No API key configured, chat completions are open");
    }

    Ok(ProxyState::new(Arc::new(client), catalog, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = load_catalog(None).unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_catalog_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"slug": "m1", "provider": "acme", "created_at": 1000}}]"#
        )
        .unwrap();

        let catalog = load_catalog(Some(file.path())).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].slug, "m1");
    }

    #[test]
    fn test_missing_catalog_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_catalog(Some(dir.path().join("missing.json").as_path()));
        assert!(result.is_err());
    }

    #[test]
    fn test_build_state_from_flags() {
        let cli = Cli::try_parse_from(["langfast", "--api-key", "k", "--max-tokens", "100"]).unwrap();
        assert!(build_state(&cli).is_ok());
    }
}
