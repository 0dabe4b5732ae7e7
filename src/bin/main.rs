use std::{env::VarError, io::Write};

use hameg::{Error, Result, config::SupplyConfig, messenger, supply::Supply};
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Reads stdin on a plain thread. A blocking read there never holds up the
/// runtime on exit.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel(1);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        loop {
            print!("Message: ");
            if std::io::stdout().flush().is_err() {
                break;
            }

            let mut line = String::new();
            match stdin.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("stdin: {e}");
                    break;
                }
            }

            let line = line.trim_end_matches(['\r', '\n']).to_string();
            if sender.blocking_send(line).is_err() {
                break;
            }
        }
    });
    receiver
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("HAMEG Serial Messenger");

    let config = match std::env::var("HAMEG_PORT") {
        Ok(port) => SupplyConfig::default().with_port(port),
        Err(VarError::NotPresent) => SupplyConfig::default(),
        Err(e) => return Err(Error::Other(format!("HAMEG_PORT is not usable: `{e}`"))),
    };
    let supply = Supply::connect(&config).await?;

    let lines = spawn_stdin_reader();
    messenger::run(&supply, lines, interrupted()).await?;

    println!();
    println!("Turn Off Messenger");
    Ok(())
}
