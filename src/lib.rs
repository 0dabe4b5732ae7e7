//! Driver for *HAMEG* multi-channel bench power supplies.
//!
//! The supply speaks a SCPI dialect over a serial line (9600 baud, RTS/CTS flow
//! control, newline terminated). [`supply::Supply`] owns the link and hands out
//! [`channel::Channel`]s, each of which re-selects itself (`INST OUT<n>`) before
//! every command it sends.

use thiserror::Error;

pub mod channel;
pub mod commands;
pub mod config;
pub mod hameg;
pub mod messenger;
pub mod supply;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Device did not identify as {expected}: `{identity}`")]
    DeviceMismatch { expected: String, identity: String },
    #[error("There is no channel at index {index}")]
    NoChannel { index: usize },
    #[error("Channels tripped: {channels:?}")]
    Tripped { channels: Vec<u8> },
    #[error("Received data does not match expected format: {0}")]
    ResponseDecoding(String),
    #[error("Underlying I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
    #[error("Connection closed while waiting for a response")]
    ConnectionClosed,
    #[error("Other: {0}")]
    Other(String),
}

impl Error {
    /// Whether the caller can carry on using the supply after this error.
    ///
    /// Asking for a missing channel or finding tripped channels leaves the link
    /// intact, everything else means the last exchange is in an unknown state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::NoChannel { .. } | Error::Tripped { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ScpiSerialize {
    fn serialize(&self, out: &mut String);
}

pub trait ScpiDeserialize
where
    Self: Sized,
{
    fn deserialize(input: &mut &str) -> Result<Self>;
}

pub trait ScpiRequest: ScpiSerialize {
    type Response: ScpiDeserialize;
}

pub struct EmptyResponse;
impl ScpiDeserialize for EmptyResponse {
    fn deserialize(_input: &mut &str) -> Result<Self> {
        Ok(EmptyResponse)
    }
}

impl ScpiDeserialize for f64 {
    fn deserialize(input: &mut &str) -> crate::Result<Self> {
        let text = read_line(input).trim();
        text.parse()
            .map_err(|_| Error::ResponseDecoding(format!("Float parsing failed: `{text}`")))
    }
}

impl ScpiDeserialize for i64 {
    fn deserialize(input: &mut &str) -> crate::Result<Self> {
        let text = read_line(input).trim();
        text.parse()
            .map_err(|_| Error::ResponseDecoding(format!("Integer parsing failed: `{text}`")))
    }
}

#[macro_export]
macro_rules! impl_scpi_serialize {
    ($type:ty, [ $( $part:tt ),* $(,)? ]) => {
        impl $crate::ScpiSerialize for $type {
            fn serialize(&self, out: &mut String) {
                $(
                    impl_scpi_serialize!(@part self, out, $part);
                )*
            }
        }
    };

    // Handle string literals
    (@part $self:ident, $out:ident, $lit:literal) => {
        $out.push_str($lit);
    };

    // Handle field names
    (@part $self:ident, $out:ident, $field:ident) => {
        $self.$field.serialize($out);
    };
}

#[macro_export]
macro_rules! impl_scpi_request {
    ($request:ty, $response:ty) => {
        impl $crate::ScpiRequest for $request {
            type Response = $response;
        }
    };
}

pub fn match_literal(input: &mut &str, literal: &'static str) -> Result<()> {
    if let Some(rest) = input.strip_prefix(literal) {
        *input = rest;
        Ok(())
    } else {
        Err(Error::ResponseDecoding(format!(
            "Expected literal `{literal}` not matched `{input}`"
        )))
    }
}

/// Consumes one line, including its `\n` if present, and returns it without
/// the terminator. A missing terminator takes the rest of the input.
pub fn read_line<'a>(input: &mut &'a str) -> &'a str {
    match input.find('\n') {
        Some(index) => {
            let (head, tail) = input.split_at(index);
            *input = &tail[1..]; // from 1 to skip delimiter
            head
        }
        None => std::mem::take(input),
    }
}

pub fn check_empty(input: &mut &str) -> Result<()> {
    if input.is_empty() {
        Ok(())
    } else {
        Err(Error::ResponseDecoding(format!(
            "Response should be empty/fully deserialized, but still has content: `{input}`"
        )))
    }
}

#[macro_export]
macro_rules! scpi_enum {
    (
        $(#[$enum_meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $literal:expr
            ),* $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $crate::ScpiDeserialize for $name {
            fn deserialize(input: &mut &str) -> $crate::Result<Self> {
                $(
                    if let Ok(()) = $crate::match_literal(input, $literal) {
                        return Ok(Self::$variant);
                    }
                )*
                Err($crate::Error::ResponseDecoding(format!("Unexpected token for {}: `{}`", stringify!($name), input)))
            }
        }

        impl $crate::ScpiSerialize for $name {
            fn serialize(&self, out: &mut String) {
                match self {
                    $(
                        Self::$variant => out.push_str($literal),
                    )*
                }
            }
        }
    };
}
