use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mexcnode_brokers_common::SimulatedExchange;
use mexcnode_brokers_mexc::{MexcConfig, MexcConnector};
use mexcnode_core::*;
use mexcnode_node::credentials::{API_KEY_FIELD, SECRET_KEY_FIELD};
use mexcnode_node::{LocalExecution, MexcApi, MexcNode, MEXC_API_CREDENTIAL};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "mexcnode")]
#[command(about = "MEXC spot-order workflow node: inspect its schema or run it on local items")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node description as JSON
    Describe,

    /// Print the credential type description as JSON
    Credentials,

    /// Run the node over a JSON file of input items
    Execute {
        /// JSON array of items, either `{"json": {...}}` or bare objects
        #[arg(short, long)]
        items: PathBuf,

        /// Node parameter as name=value (value parsed as JSON, else taken as a string)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// Record failed items in the output instead of aborting
        #[arg(long)]
        continue_on_fail: bool,

        /// Send orders to an in-memory exchange instead of MEXC
        #[arg(long)]
        dry_run: bool,

        /// TOML file with MEXC connection settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the REST base URL
        #[arg(long, env = "MEXC_BASE_URL")]
        base_url: Option<String>,

        /// MEXC API key
        #[arg(long, env = "MEXC_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// MEXC secret key
        #[arg(long, env = "MEXC_SECRET_KEY", hide_env_values = true)]
        secret_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Describe => {
            let node = MexcNode::new(SimulatedExchange::default());
            println!("{}", serde_json::to_string_pretty(&node.description())?);
        }
        Commands::Credentials => {
            println!("{}", serde_json::to_string_pretty(&MexcApi.description())?);
        }
        Commands::Execute {
            items,
            params,
            continue_on_fail,
            dry_run,
            config,
            base_url,
            api_key,
            secret_key,
        } => {
            let mut mexc_config = load_config(config.as_deref())?;
            if let Some(url) = base_url {
                mexc_config.base_url = url;
            }

            let node = if dry_run {
                tracing::info!("Dry run: orders go to the simulated exchange");
                MexcNode::new(SimulatedExchange::default())
            } else {
                MexcNode::new(MexcConnector::new(mexc_config))
            };

            let (api_key, secret_key) = match (api_key, secret_key) {
                (Some(key), Some(secret)) => (key, secret),
                _ if dry_run => ("dry-run".to_string(), "dry-run".to_string()),
                _ => anyhow::bail!("MEXC_API_KEY and MEXC_SECRET_KEY are required unless --dry-run is set"),
            };

            let input = load_items(&items)?;
            tracing::info!(file = %items.display(), items = input.len(), "Loaded input items");

            let mut ctx = LocalExecution::new(node.description(), input)
                .with_continue_on_fail(continue_on_fail)
                .with_credentials(MEXC_API_CREDENTIAL, credential_data(&api_key, &secret_key));
            for param in &params {
                let (name, value) = parse_param(param)?;
                ctx = ctx.with_parameter(&name, value);
            }

            let output = node.execute(&ctx).await.map_err(|e| match e.item_index {
                Some(index) => anyhow::anyhow!("item {}: {}", index, e),
                None => anyhow::Error::new(e),
            })?;

            let failed = output.iter().flatten().filter(|i| i.is_error()).count();
            if failed > 0 {
                tracing::warn!(failed, "Some items failed");
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<MexcConfig> {
    let Some(path) = path else {
        return Ok(MexcConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn load_items(path: &Path) -> Result<Vec<NodeExecutionData>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read items {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Items file {} is not valid JSON", path.display()))?;
    items_from_value(value)
}

fn items_from_value(value: Value) -> Result<Vec<NodeExecutionData>> {
    let Value::Array(entries) = value else {
        anyhow::bail!("Items file must contain a JSON array");
    };
    entries
        .into_iter()
        .map(|entry| -> Result<NodeExecutionData> {
            match entry {
                Value::Object(_) if entry.get("json").map_or(false, Value::is_object) => {
                    Ok(serde_json::from_value(entry)?)
                }
                Value::Object(_) => Ok(NodeExecutionData::new(entry)),
                other => anyhow::bail!("Item must be a JSON object, got {}", other),
            }
        })
        .collect()
}

fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("Parameter '{}' is not name=value", raw))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.trim().to_string(), value))
}

fn credential_data(api_key: &str, secret_key: &str) -> CredentialData {
    let mut data = CredentialData::new();
    data.insert(API_KEY_FIELD.to_string(), json!(api_key));
    data.insert(SECRET_KEY_FIELD.to_string(), json!(secret_key));
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param_values() {
        assert_eq!(parse_param("quantity=2.5").unwrap(), ("quantity".to_string(), json!(2.5)));
        assert_eq!(parse_param("side=SELL").unwrap(), ("side".to_string(), json!("SELL")));
        assert_eq!(parse_param("symbol=\"ethusdt\"").unwrap().1, json!("ethusdt"));
        assert!(parse_param("nonsense").is_err());
    }

    #[test]
    fn test_items_accept_both_shapes() {
        let items = items_from_value(json!([
            { "json": { "symbol": "btcusdt" } },
            { "symbol": "ethusdt" }
        ]))
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].json, json!({ "symbol": "btcusdt" }));
        assert_eq!(items[1].json, json!({ "symbol": "ethusdt" }));
        assert!(items_from_value(json!({ "symbol": "x" })).is_err());
        assert!(items_from_value(json!([1])).is_err());
    }

    #[test]
    fn test_config_toml() {
        let config: MexcConfig = toml::from_str("base_url = \"http://localhost:9000\"\ntimeout_secs = 3\n").unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.recv_window_ms, Some(5000));
    }

    #[tokio::test]
    async fn test_dry_run_execution() {
        let node = MexcNode::new(SimulatedExchange::default());
        let input = items_from_value(json!([{ "symbol": "ethusdt", "price": 2000 }])).unwrap();
        let ctx = LocalExecution::new(node.description(), input)
            .with_credentials(MEXC_API_CREDENTIAL, credential_data("k", "s"));

        let output = node.execute(&ctx).await.unwrap();
        assert_eq!(output[0][0].json["symbol"], "ETHUSDT");
    }
}
