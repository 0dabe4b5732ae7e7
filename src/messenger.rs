//! Free-text passthrough to the supply, used by the interactive binary.

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
};

use crate::{Error, Result, supply::Supply};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Interrupted,
    EndOfInput,
}

/// Forwards every line from `lines` to the supply with a `\n` appended, until
/// `shutdown` resolves or the sender side is gone.
///
/// `shutdown` is raced against the whole iteration, so it also ends a write
/// the device is holding off.
pub async fn run<T, S>(
    supply: &Supply<T>,
    mut lines: mpsc::Receiver<String>,
    shutdown: S,
) -> Result<Exit>
where
    T: AsyncRead + AsyncWrite,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let forward = async {
            let Some(line) = lines.recv().await else {
                return Ok::<_, Error>(false);
            };
            supply.send_raw(&format!("{line}\n")).await?;
            Ok(true)
        };

        tokio::select! {
            _ = &mut shutdown => return Ok(Exit::Interrupted),
            forwarded = forward => {
                if !forwarded? {
                    return Ok(Exit::EndOfInput);
                }
            }
        }
    }
}
