use std::sync::Arc;

use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::Mutex,
};
use tokio_serial::SerialStream;

use crate::{
    Result,
    commands::{
        FuseTripRequest, MeasureRequest, Quantity, SetOutputStateRequest, SetSourceRequest,
        SetVoltageCurrentRequest, State,
    },
    hameg::Hameg,
};

/// One output of the supply.
///
/// Every command first selects this channel with `INST OUT<n>`. The link stays
/// locked from the select until the payload (and any response) is through, so
/// channels sharing a supply never see each other's selection.
pub struct Channel<T = SerialStream> {
    number: u8,
    hameg: Arc<Mutex<Hameg<T>>>,
}

impl<T> Channel<T>
where
    T: AsyncRead + AsyncWrite,
{
    pub(crate) fn new(hameg: Arc<Mutex<Hameg<T>>>, number: u8) -> Self {
        Channel { number, hameg }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// Selects the channel, then writes `text` verbatim.
    pub async fn send(&self, text: &str) -> Result<()> {
        let mut hameg = self.hameg.lock().await;
        hameg.select_channel(self.number).await?;
        hameg.send_raw(text).await
    }

    pub async fn set_voltage(&self, voltage: f64) -> Result<()> {
        self.set_source(Quantity::Voltage, voltage).await
    }

    pub async fn set_current(&self, current: f64) -> Result<()> {
        self.set_source(Quantity::Current, current).await
    }

    async fn set_source(&self, quantity: Quantity, value: f64) -> Result<()> {
        let mut hameg = self.hameg.lock().await;
        hameg.select_channel(self.number).await?;
        hameg.send(SetSourceRequest { quantity, value }).await
    }

    pub async fn set_voltage_current(&self, voltage: f64, current: f64) -> Result<()> {
        let mut hameg = self.hameg.lock().await;
        hameg.select_channel(self.number).await?;
        hameg
            .send(SetVoltageCurrentRequest { voltage, current })
            .await
    }

    pub async fn set_output(&self, state: impl Into<State>) -> Result<()> {
        let state = state.into();
        let mut hameg = self.hameg.lock().await;
        hameg.select_channel(self.number).await?;
        hameg.send(SetOutputStateRequest { state }).await
    }

    pub async fn turn_on(&self) -> Result<()> {
        self.set_output(State::On).await
    }

    pub async fn turn_off(&self) -> Result<()> {
        self.set_output(State::Off).await
    }

    pub async fn measure(&self, quantity: Quantity) -> Result<f64> {
        let mut hameg = self.hameg.lock().await;
        hameg.select_channel(self.number).await?;
        hameg.execute(MeasureRequest { quantity }).await
    }

    pub async fn measure_voltage(&self) -> Result<f64> {
        self.measure(Quantity::Voltage).await
    }

    pub async fn measure_current(&self) -> Result<f64> {
        self.measure(Quantity::Current).await
    }

    /// Queries the overcurrent fuse. Any non-zero answer counts as tripped.
    pub async fn is_tripped(&self) -> Result<bool> {
        let mut hameg = self.hameg.lock().await;
        hameg.select_channel(self.number).await?;
        let response = hameg.execute(FuseTripRequest).await?;
        Ok(response.is_tripped())
    }
}
