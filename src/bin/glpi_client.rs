//! GLPI transport CLI binary.
//!
//! Talks to a GLPI server the way the agent does.
//!
//! # Commands
//!
//! - `probe` - Show the compression mode this host would use
//! - `json` - Call the JSON protocol with an action and parameters
//! - `xml` - POST a raw XML envelope through the legacy protocol
//! - `prolog` - Send a PROLOG query for a device id
//! - `sniff` - Classify a captured server reply

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use glpi::{
    codec::{sniff, Compression},
    Config, GlpiClient, OutboundMessage, ParamValue, Parameters, VERSION,
};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "glpi-client")]
#[command(version = VERSION)]
#[command(about = "GLPI agent transport client", long_about = None)]
struct Cli {
    /// Config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Force compression mode (auto, zlib, gzip, none)
    #[arg(long, global = true)]
    compression: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the selected compression mode
    Probe,

    /// Call the JSON protocol
    Json {
        /// Server endpoint URL (default: server.url from config)
        #[arg(short, long)]
        url: Option<String>,

        /// Action to perform (e.g. getConfig, getJobs)
        #[arg(short, long)]
        action: String,

        /// Scalar parameter, key=value
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// List element, key=value (repeat to append)
        #[arg(short, long = "list")]
        lists: Vec<String>,

        /// Map entry, key.subkey=value
        #[arg(short, long = "map")]
        maps: Vec<String>,
    },

    /// POST an XML envelope through the legacy protocol
    Xml {
        /// Envelope text (or - for stdin)
        input: Option<String>,

        /// Envelope file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Server endpoint URL (default: server.url from config)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Send a PROLOG query
    Prolog {
        /// Device identifier
        #[arg(short, long)]
        deviceid: String,

        /// Server endpoint URL (default: server.url from config)
        #[arg(short, long)]
        url: Option<String>,
    },

    /// Classify a captured server reply
    Sniff {
        /// Reply file path (default: stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.config, cli.compression)?;

    match cli.command {
        Commands::Probe => cmd_probe(&config),
        Commands::Json {
            url,
            action,
            params,
            lists,
            maps,
        } => cmd_json(&config, url, action, &params, &lists, &maps),
        Commands::Xml { input, file, url } => cmd_xml(&config, input, file, url),
        Commands::Prolog { deviceid, url } => cmd_prolog(&config, &deviceid, url),
        Commands::Sniff { file } => cmd_sniff(file),
    }
}

fn load_config(path: Option<PathBuf>, compression: Option<String>) -> anyhow::Result<Config> {
    let file = match path {
        Some(path) => Config::from_file(path)?,
        None => match Config::default_path().filter(|p| p.exists()) {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        },
    };

    let mut config = file.merge(Config::from_env());
    if let Some(mode) = compression {
        config.compression.mode = mode;
    }
    Ok(config)
}

fn server_url(config: &Config, url: Option<String>) -> anyhow::Result<String> {
    url.or_else(|| Some(config.server.url.clone()).filter(|u| !u.is_empty()))
        .ok_or_else(|| anyhow!("No server URL: pass --url or set server.url / GLPI_SERVER"))
}

fn cmd_probe(config: &Config) -> anyhow::Result<()> {
    let compression: Compression = config.compression.build()?;
    println!("Mode:         {}", compression.mode());
    println!("Content-Type: {}", compression.content_type());
    Ok(())
}

fn cmd_json(
    config: &Config,
    url: Option<String>,
    action: String,
    params: &[String],
    lists: &[String],
    maps: &[String],
) -> anyhow::Result<()> {
    let url = server_url(config, url)?;
    let parameters = build_parameters(action, params, lists, maps)?;

    let client = GlpiClient::from_config(config)?;
    let reply = client
        .send_json(&url, &parameters)
        .with_context(|| format!("{} request failed", parameters.action()))?;

    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

fn build_parameters(
    action: String,
    params: &[String],
    lists: &[String],
    maps: &[String],
) -> anyhow::Result<Parameters> {
    let mut parameters = Parameters::new(action);

    for pair in params {
        let (key, value) = split_pair(pair)?;
        parameters.insert(key, value);
    }

    let mut list_values: Vec<(String, Vec<String>)> = Vec::new();
    for pair in lists {
        let (key, value) = split_pair(pair)?;
        match list_values.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value.to_string()),
            None => list_values.push((key.to_string(), vec![value.to_string()])),
        }
    }
    for (key, values) in list_values {
        parameters.insert(key, ParamValue::List(values));
    }

    let mut map_values: Vec<(String, BTreeMap<String, String>)> = Vec::new();
    for pair in maps {
        let (path, value) = split_pair(pair)?;
        let (key, sub) = path
            .split_once('.')
            .ok_or_else(|| anyhow!("Map entry must look like key.subkey=value: {pair}"))?;
        match map_values.iter_mut().find(|(k, _)| k == key) {
            Some((_, entries)) => {
                entries.insert(sub.to_string(), value.to_string());
            },
            None => map_values.push((
                key.to_string(),
                BTreeMap::from([(sub.to_string(), value.to_string())]),
            )),
        }
    }
    for (key, entries) in map_values {
        parameters.insert(key, ParamValue::Map(entries));
    }

    Ok(parameters)
}

fn split_pair(pair: &str) -> anyhow::Result<(&str, &str)> {
    pair.split_once('=')
        .ok_or_else(|| anyhow!("Parameter must look like key=value: {pair}"))
}

fn cmd_xml(
    config: &Config,
    input: Option<String>,
    file: Option<PathBuf>,
    url: Option<String>,
) -> anyhow::Result<()> {
    let url = server_url(config, url)?;
    let envelope = read_input(input, file)?;

    let client = GlpiClient::from_config(config)?;
    let reply = client.send_xml(&url, &envelope)?;

    print_reply(&reply)
}

fn cmd_prolog(config: &Config, deviceid: &str, url: Option<String>) -> anyhow::Result<()> {
    let url = server_url(config, url)?;
    let envelope = OutboundMessage::prolog(deviceid).to_xml();

    let client = GlpiClient::from_config(config)?;
    let reply = client.send_xml(&url, &envelope)?;

    print_reply(&reply)
}

fn cmd_sniff(file: Option<PathBuf>) -> anyhow::Result<()> {
    let data = match file {
        Some(path) => std::fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            buffer
        },
    };

    let sniffed = sniff(&data);
    println!("Format:  {}", sniffed.format);
    println!("Payload: {} of {} bytes", sniffed.payload.len(), data.len());
    Ok(())
}

fn print_reply(reply: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(reply)?);
    Ok(())
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}
