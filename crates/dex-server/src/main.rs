//! `pokedex` command line: serve the catalog or print the effective config

use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use dex_server::{telemetry, LogFormat, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("pokedex")
        .version(dex_server::VERSION)
        .about("Pokédex catalog service")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .global(true)
                .value_parser(value_parser!(SocketAddr))
                .help("Listen address, e.g. 127.0.0.1:5000"),
        )
        .arg(
            Arg::new("data-file")
                .long("data-file")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON snapshot file; memory only when omitted"),
        )
        .arg(
            Arg::new("upload-dir")
                .long("upload-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory for uploaded images"),
        )
        .arg(
            Arg::new("public-url")
                .long("public-url")
                .global(true)
                .help("Base URL used in returned image links"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .value_parser(["pretty", "json"])
                .help("Log output format"),
        )
        .subcommand(Command::new("serve").about("Run the HTTP server (default)"))
        .subcommand(Command::new("config").about("Print the effective configuration"))
}

fn load_config(args: &ArgMatches) -> anyhow::Result<ServerConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::new(),
    };

    if let Some(bind) = args.get_one::<SocketAddr>("bind") {
        config = config.with_bind(*bind);
    }
    if let Some(path) = args.get_one::<PathBuf>("data-file") {
        config = config.with_data_file(path.clone());
    }
    if let Some(dir) = args.get_one::<PathBuf>("upload-dir") {
        config = config.with_upload_dir(dir.clone());
    }
    if let Some(url) = args.get_one::<String>("public-url") {
        config = config.with_public_base_url(url.clone());
    }
    if let Some(format) = args.get_one::<String>("log-format") {
        config = config.with_log_format(format.parse::<LogFormat>()?);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("config", args)) => {
            let config = load_config(args)?;
            let text = toml::to_string_pretty(&config).context("failed to render config")?;
            println!("{text}");
            Ok(())
        }
        Some(("serve", args)) => serve(args).await,
        _ => serve(&matches).await,
    }
}

async fn serve(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    telemetry::init(config.log_format);
    tracing::info!(
        bind = %config.bind,
        data_file = ?config.data_file,
        identity_policy = ?config.service.identity_policy,
        "starting"
    );
    dex_server::run(config).await
}
