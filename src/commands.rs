use crate::{
    EmptyResponse, Error, ScpiDeserialize, ScpiSerialize, impl_scpi_request, impl_scpi_serialize,
    read_line, scpi_enum,
};

impl ScpiSerialize for u8 {
    fn serialize(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }
}

/// Setpoints always go out with 8 decimal digits.
impl ScpiSerialize for f64 {
    fn serialize(&self, out: &mut String) {
        out.push_str(&format!("{self:.8}"));
    }
}

scpi_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum State {
        On => "ON",
        Off => "OFF",
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        if value { State::On } else { State::Off }
    }
}

scpi_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Quantity {
        Voltage => "VOLT",
        Current => "CURR",
    }
}

// *IDN?
// Typical Return HAMEG,HMP4040,012345678,HW50020001/SW2.41
pub struct IdentityRequest;
impl_scpi_serialize!(IdentityRequest, ["*IDN?"]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityResponse {
    pub raw: String,
}

impl IdentityResponse {
    pub fn contains(&self, marker: &str) -> bool {
        self.raw.contains(marker)
    }

    fn field(&self, index: usize) -> Option<&str> {
        self.raw.split(',').nth(index).map(str::trim)
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.field(0)
    }

    pub fn model(&self) -> Option<&str> {
        self.field(1)
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.field(2)
    }

    pub fn firmware_version(&self) -> Option<&str> {
        self.field(3)
    }
}

impl ScpiDeserialize for IdentityResponse {
    fn deserialize(input: &mut &str) -> Result<Self, Error> {
        Ok(IdentityResponse {
            raw: read_line(input).trim().to_string(),
        })
    }
}

impl_scpi_request!(IdentityRequest, IdentityResponse);

// INST OUT{1..n}
// Selects the channel every following channel-scoped command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectChannelRequest {
    pub channel: u8,
}
impl_scpi_serialize!(SelectChannelRequest, ["INST OUT", channel]);
impl_scpi_request!(SelectChannelRequest, EmptyResponse);

// SOUR:VOLT <value> / SOUR:CURR <value>
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetSourceRequest {
    pub quantity: Quantity,
    pub value: f64,
}
impl_scpi_serialize!(SetSourceRequest, ["SOUR:", quantity, " ", value]);
impl_scpi_request!(SetSourceRequest, EmptyResponse);

// Both setpoints in a single write, one command per line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetVoltageCurrentRequest {
    pub voltage: f64,
    pub current: f64,
}
impl_scpi_serialize!(
    SetVoltageCurrentRequest,
    ["SOUR:VOLT ", voltage, "\nSOUR:CURR ", current]
);
impl_scpi_request!(SetVoltageCurrentRequest, EmptyResponse);

// OUTP {ON|OFF}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOutputStateRequest {
    pub state: State,
}
impl_scpi_serialize!(SetOutputStateRequest, ["OUTP ", state]);
impl_scpi_request!(SetOutputStateRequest, EmptyResponse);

// OUTP:GEN {ON|OFF}
// Master switch for all outputs, independent of the per-channel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetGeneralOutputRequest {
    pub state: State,
}
impl_scpi_serialize!(SetGeneralOutputRequest, ["OUTP:GEN ", state]);
impl_scpi_request!(SetGeneralOutputRequest, EmptyResponse);

// MEAS:VOLT? / MEAS:CURR?
// Typical Return 12.000
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureRequest {
    pub quantity: Quantity,
}
impl_scpi_serialize!(MeasureRequest, ["MEAS:", quantity, "?"]);
impl_scpi_request!(MeasureRequest, f64);

// FUSE:TRIP?
// Typical Return 0 (armed) or 1 (tripped)
pub struct FuseTripRequest;
impl_scpi_serialize!(FuseTripRequest, ["FUSE:TRIP?"]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuseTripResponse(pub i64);

impl FuseTripResponse {
    pub fn is_tripped(&self) -> bool {
        self.0 != 0
    }
}

impl ScpiDeserialize for FuseTripResponse {
    fn deserialize(input: &mut &str) -> Result<Self, Error> {
        Ok(FuseTripResponse(i64::deserialize(input)?))
    }
}

impl_scpi_request!(FuseTripRequest, FuseTripResponse);
