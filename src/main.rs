use pool_positions::admin::load_overview;
use pool_positions::depositors::pool_depositors;
use pool_positions::{Address, AppError, Config, PositionWatcher, Reconciler};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const USAGE: &str = "usage: pool-positions watch <address> | admin | depositors <pool-id>";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        tracing::error!("{e}");
        print_json(&serde_json::json!({ "error": e }));
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::load()?;
    let ledger = Arc::new(config.connect()?);

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["watch", caller] => {
            let caller: Address = caller.parse()?;
            let reconciler = Reconciler::new(ledger, config.read_limits(), config.decimals);
            watch(PositionWatcher::spawn(reconciler, caller, config.tick())).await;
        }
        ["admin"] => {
            let overview =
                load_overview(ledger.as_ref(), config.read_limits(), config.decimals).await;
            print_json(&overview);
        }
        ["depositors", pool_id] => {
            let pool_id: u64 = pool_id
                .parse()
                .map_err(|_| AppError::Internal(format!("Invalid pool id: {pool_id}")))?;
            let listed = pool_depositors(
                ledger.as_ref(),
                pool_id,
                &config.known_depositors,
                config.read_timeout(),
                config.decimals,
            )
            .await;
            print_json(&listed);
        }
        _ => return Err(AppError::Internal(USAGE.to_string())),
    }

    Ok(())
}

/// Print a report line per update. Any line on stdin triggers a ledger
/// re-read, e.g. after the UI confirms a deposit or withdrawal.
async fn watch(mut watcher: PositionWatcher) {
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            report = watcher.next() => match report {
                Some(report) => print_json(&report),
                None => break,
            },
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(_)) => watcher.refresh(),
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!("stdin closed: {e}");
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watcher");
                break;
            }
        }
    }

    watcher.stop();
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::error!("Failed to serialize output: {e}"),
    }
}
