use checkers_client::{
    client,
    gateway::ContractIdentity,
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use std::{
    str::FromStr,
    time::Duration,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::EnvFilter;

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: checkers-client [--mainnet | --testnet | --devnet] [--api-url <url>]\n\
         [--contract <ADDRESS.name>] --game <id> [--interval-ms <ms>]\n\
         \n\
         Flags:\n\
           --mainnet           Watch the mainnet deployment (default API {})\n\
           --testnet           Watch the testnet deployment (default API {})\n\
           --devnet            Watch a local devnet node (default API {})\n\
           --api-url <url>     Override the node API URL for the selected network\n\
           --contract <id>     Contract identity to watch (default {})\n\
           --game <id>         Game id to poll\n\
           --interval-ms <ms>  Poll interval in milliseconds (default {})",
        client::DEFAULT_MAINNET_API_URL,
        client::DEFAULT_TESTNET_API_URL,
        client::DEFAULT_DEVNET_API_URL,
        client::DEFAULT_CONTRACT,
        client::DEFAULT_POLL_INTERVAL_MS,
    );
    std::process::exit(0);
}

fn parse_cli_args() -> Result<client::AppConfig> {
    #[derive(Clone, Copy)]
    enum NetworkFlag {
        Mainnet,
        Testnet,
        Devnet,
    }

    let mut args = std::env::args().skip(1);
    let mut network_flag: Option<NetworkFlag> = None;
    let mut custom_url: Option<String> = None;
    let mut contract: Option<String> = None;
    let mut game_id: Option<u64> = None;
    let mut interval_ms: Option<u64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mainnet" => {
                if network_flag.is_some() {
                    return Err(eyre!(
                        "Multiple network flags provided; choose one of --mainnet/--testnet/--devnet"
                    ));
                }
                network_flag = Some(NetworkFlag::Mainnet);
            }
            "--testnet" => {
                if network_flag.is_some() {
                    return Err(eyre!(
                        "Multiple network flags provided; choose one of --mainnet/--testnet/--devnet"
                    ));
                }
                network_flag = Some(NetworkFlag::Testnet);
            }
            "--devnet" => {
                if network_flag.is_some() {
                    return Err(eyre!(
                        "Multiple network flags provided; choose one of --mainnet/--testnet/--devnet"
                    ));
                }
                network_flag = Some(NetworkFlag::Devnet);
            }
            "--api-url" => {
                let url = args
                    .next()
                    .ok_or_else(|| eyre!("--api-url requires a URL argument"))?;
                if custom_url.is_some() {
                    return Err(eyre!("--api-url may only be specified once"));
                }
                if network_flag.is_none() {
                    return Err(eyre!(
                        "--api-url must follow a network flag (--mainnet/--testnet/--devnet)"
                    ));
                }
                custom_url = Some(url);
            }
            "--contract" => {
                let id = args
                    .next()
                    .ok_or_else(|| eyre!("--contract requires an ADDRESS.name argument"))?;
                if contract.is_some() {
                    return Err(eyre!("--contract may only be specified once"));
                }
                contract = Some(id);
            }
            "--game" => {
                let id = args
                    .next()
                    .ok_or_else(|| eyre!("--game requires a game id argument"))?;
                if game_id.is_some() {
                    return Err(eyre!("--game may only be specified once"));
                }
                game_id = Some(
                    id.parse()
                        .map_err(|_| eyre!("--game expects a non-negative integer"))?,
                );
            }
            "--interval-ms" => {
                let ms = args
                    .next()
                    .ok_or_else(|| eyre!("--interval-ms requires a millisecond argument"))?;
                if interval_ms.is_some() {
                    return Err(eyre!("--interval-ms may only be specified once"));
                }
                interval_ms = Some(
                    ms.parse()
                        .map_err(|_| eyre!("--interval-ms expects a positive integer"))?,
                );
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    let network = match network_flag {
        None => {
            return Err(eyre!(
                "Select a network with --mainnet, --testnet, or --devnet"
            ));
        }
        Some(NetworkFlag::Mainnet) => client::NetworkTarget::Mainnet {
            url: custom_url
                .unwrap_or_else(|| client::DEFAULT_MAINNET_API_URL.to_string()),
        },
        Some(NetworkFlag::Testnet) => client::NetworkTarget::Testnet {
            url: custom_url
                .unwrap_or_else(|| client::DEFAULT_TESTNET_API_URL.to_string()),
        },
        Some(NetworkFlag::Devnet) => client::NetworkTarget::Devnet {
            url: custom_url
                .unwrap_or_else(|| client::DEFAULT_DEVNET_API_URL.to_string()),
        },
    };

    let contract = ContractIdentity::from_str(
        contract.as_deref().unwrap_or(client::DEFAULT_CONTRACT),
    )
    .map_err(|e| eyre!(e))?;
    let game_id = game_id.ok_or_else(|| eyre!("Specify --game <id> to select a game"))?;
    let poll_interval =
        Duration::from_millis(interval_ms.unwrap_or(client::DEFAULT_POLL_INTERVAL_MS));

    Ok(client::AppConfig {
        network,
        contract,
        game_id,
        poll_interval,
    })
}

fn init_tracing() -> WorkerGuard {
    // board output goes to stdout; operational logs go to a rolling file
    let file = rolling::daily("logs", "checkers-client.log");
    let (writer, guard) = tracing_appender::non_blocking(file);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _log_guard = init_tracing();
    let app_config = parse_cli_args()?;
    client::run_app(app_config).await
}
