use std::sync::Arc;

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::Mutex,
};
use tokio_serial::SerialStream;
use tracing::{info, warn};

use crate::{
    Error, Result,
    channel::Channel,
    commands::{IdentityResponse, SetGeneralOutputRequest, State},
    config::SupplyConfig,
    hameg::{Hameg, IDENTITY_MARKER},
};

pub struct Supply<T = SerialStream> {
    hameg: Arc<Mutex<Hameg<T>>>,
    channels: Vec<Channel<T>>,
    identity: IdentityResponse,
}

impl Supply<SerialStream> {
    /// Opens the configured serial port and runs the start-up handshake.
    pub async fn connect(config: &SupplyConfig) -> Result<Self> {
        let hameg = Hameg::open(&config.port)?;
        Self::from_hameg(hameg, config).await
    }
}

impl<T> Supply<T>
where
    T: AsyncRead + AsyncWrite,
{
    /// Runs the start-up handshake over an already open stream.
    pub async fn new(stream: T, config: &SupplyConfig) -> Result<Self> {
        Self::from_hameg(Hameg::new(stream), config).await
    }

    /// Checks the identity, then creates the channels and loads the initial
    /// setpoints into each. Outputs are left as they are.
    async fn from_hameg(mut hameg: Hameg<T>, config: &SupplyConfig) -> Result<Self> {
        let identity = hameg.get_identity().await?;
        if !identity.contains(IDENTITY_MARKER) {
            warn!(identity = identity.raw.as_str(), "unexpected device");
            return Err(Error::DeviceMismatch {
                expected: IDENTITY_MARKER.to_string(),
                identity: identity.raw,
            });
        }
        info!(
            device = config.device_name.as_str(),
            identity = identity.raw.as_str(),
            "connected"
        );

        let hameg = Arc::new(Mutex::new(hameg));
        let mut channels = Vec::with_capacity(config.channel_count.into());
        for number in 1..=config.channel_count {
            let channel = Channel::new(hameg.clone(), number);
            channel.set_voltage(config.initial_voltage).await?;
            channel.set_current(config.initial_current).await?;
            channels.push(channel);
        }

        Ok(Supply {
            hameg,
            channels,
            identity,
        })
    }

    pub fn identity(&self) -> &IdentityResponse {
        &self.identity
    }

    pub fn channels(&self) -> &[Channel<T>] {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Looks up a channel by its 1-based number.
    pub fn channel(&self, number: usize) -> Result<&Channel<T>> {
        self.channel_at(number, true)
    }

    /// Looks up a channel by number, either 1-based or 0-based.
    ///
    /// A missing channel is reported as [`Error::NoChannel`], which is
    /// recoverable.
    pub fn channel_at(&self, number: usize, one_based: bool) -> Result<&Channel<T>> {
        let index = if one_based {
            number.checked_sub(1)
        } else {
            Some(number)
        };
        index
            .and_then(|index| self.channels.get(index))
            .ok_or(Error::NoChannel {
                index: index.unwrap_or(number),
            })
    }

    /// Writes `text` verbatim, without selecting a channel.
    pub async fn send_raw(&self, text: &str) -> Result<()> {
        self.hameg.lock().await.send_raw(text).await
    }

    pub async fn read_raw(&self) -> Result<String> {
        self.hameg.lock().await.read_raw().await
    }

    /// Applies both setpoints channel by channel. Stops at the first failure,
    /// earlier channels keep their new setpoints.
    pub async fn set_all_voltage_current(&self, voltage: f64, current: f64) -> Result<()> {
        for channel in &self.channels {
            channel.set_voltage_current(voltage, current).await?;
        }
        Ok(())
    }

    pub async fn set_all_outputs(&self, state: impl Into<State>) -> Result<()> {
        let state = state.into();
        for channel in &self.channels {
            channel.set_output(state).await?;
        }
        Ok(())
    }

    pub async fn enable_all(&self) -> Result<()> {
        self.set_all_outputs(State::On).await
    }

    pub async fn disable_all(&self) -> Result<()> {
        self.set_all_outputs(State::Off).await
    }

    pub async fn set_general_output(&self, state: impl Into<State>) -> Result<()> {
        let state = state.into();
        self.hameg
            .lock()
            .await
            .send(SetGeneralOutputRequest { state })
            .await
    }

    pub async fn enable_general_output(&self) -> Result<()> {
        self.set_general_output(State::On).await
    }

    pub async fn disable_general_output(&self) -> Result<()> {
        self.set_general_output(State::Off).await
    }

    /// Returns the numbers of all tripped channels in ascending order.
    pub async fn check_tripped(&self) -> Result<Vec<u8>> {
        let mut tripped = Vec::new();
        for channel in &self.channels {
            if channel.is_tripped().await? {
                tripped.push(channel.number());
            }
        }
        Ok(tripped)
    }

    /// Like [`Self::check_tripped`], but reports any trip as [`Error::Tripped`].
    pub async fn ensure_not_tripped(&self) -> Result<()> {
        let channels = self.check_tripped().await?;
        if channels.is_empty() {
            Ok(())
        } else {
            warn!(?channels, "channels tripped");
            Err(Error::Tripped { channels })
        }
    }
}
