use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf,
};
use tokio_serial::{FlowControl, SerialPortBuilderExt, SerialStream};
use tracing::{debug, info};

use crate::{
    EmptyResponse, Error, Result, ScpiDeserialize, ScpiRequest, check_empty,
    commands::{IdentityRequest, IdentityResponse, SelectChannelRequest},
};

pub const BAUD_RATE: u32 = 9600;

/// Every HAMEG supply answers `*IDN?` with this somewhere in the line.
pub const IDENTITY_MARKER: &str = "HAMEG";

/// Line-oriented SCPI link to the supply.
///
/// Every request is written as one line; queries then wait for exactly one
/// response line. There are no timeouts, a silent device blocks the caller.
pub struct Hameg<T = SerialStream> {
    reader: BufReader<ReadHalf<T>>,
    writer: WriteHalf<T>,
}

impl Hameg<SerialStream> {
    /// Opens `port` at 9600 baud with RTS/CTS flow control.
    pub fn open(port: &str) -> Result<Self> {
        let stream = tokio_serial::new(port, BAUD_RATE)
            .flow_control(FlowControl::Hardware)
            .open_native_async()?;
        info!(port, baud = BAUD_RATE, "opened serial port");
        Ok(Self::new(stream))
    }
}

impl<T> Hameg<T>
where
    T: AsyncRead + AsyncWrite,
{
    pub fn new(stream: T) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        let reader = BufReader::new(read_half);

        Hameg {
            reader,
            writer: write_half,
        }
    }

    /// Writes `text` as is. No terminator is appended.
    pub async fn send_raw(&mut self, text: &str) -> Result<()> {
        debug!(text, "write");
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Waits for one line and returns it with its terminator.
    pub async fn read_raw(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            return Err(Error::ConnectionClosed);
        }
        debug!(line = line.as_str(), "read");
        Ok(line)
    }

    async fn write_request<Request>(&mut self, request: Request) -> Result<()>
    where
        Request: ScpiRequest,
    {
        let mut out = String::with_capacity(128);
        request.serialize(&mut out);
        out.push('\n');
        self.send_raw(&out).await
    }

    pub async fn send<Request>(&mut self, request: Request) -> Result<()>
    where
        Request: ScpiRequest<Response = EmptyResponse>,
    {
        self.write_request(request).await
    }

    pub async fn execute<Request, Response>(&mut self, request: Request) -> Result<Response>
    where
        Request: ScpiRequest<Response = Response>,
        Response: ScpiDeserialize,
    {
        self.write_request(request).await?;

        let line = self.read_raw().await?;
        let mut data = line.as_str();
        let response = Response::deserialize(&mut data)?;
        check_empty(&mut data)?;

        Ok(response)
    }

    pub async fn get_identity(&mut self) -> Result<IdentityResponse> {
        self.execute(IdentityRequest).await
    }

    pub async fn select_channel(&mut self, channel: u8) -> Result<()> {
        self.send(SelectChannelRequest { channel }).await
    }
}
