use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("{expected:?} codec received a {received} frame")]
    FrameKind {
        expected: WireFormat,
        received: &'static str,
    },
}

/// A single WebSocket payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

impl Frame {
    fn kind(&self) -> &'static str {
        match self {
            Frame::Text(_) => "text",
            Frame::Binary(_) => "binary",
        }
    }
}

/// Per-connection wire encoding. JSON travels in text frames, bincode in binary frames.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    Json,
    Bincode,
}

impl WireFormat {
    pub fn encode<T: Serialize>(&self, message: &T) -> Result<Frame, CodecError> {
        Ok(match self {
            WireFormat::Json => Frame::Text(serde_json::to_string(message)?),
            WireFormat::Bincode => Frame::Binary(bincode::serialize(message)?),
        })
    }

    pub fn decode<T: DeserializeOwned>(&self, frame: &Frame) -> Result<T, CodecError> {
        match (self, frame) {
            (WireFormat::Json, Frame::Text(text)) => Ok(serde_json::from_str(text)?),
            (WireFormat::Bincode, Frame::Binary(bytes)) => Ok(bincode::deserialize(bytes)?),
            (expected, frame) => Err(CodecError::FrameKind {
                expected: *expected,
                received: frame.kind(),
            }),
        }
    }

    /// Decodes by frame kind, whatever this connection's outbound format is.
    pub fn decode_any<T: DeserializeOwned>(frame: &Frame) -> Result<T, CodecError> {
        match frame {
            Frame::Text(_) => WireFormat::Json.decode(frame),
            Frame::Binary(_) => WireFormat::Bincode.decode(frame),
        }
    }
}

impl std::default::Default for WireFormat {
    fn default() -> Self {
        WireFormat::Json
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(WireFormat::Json),
            "bincode" => Ok(WireFormat::Bincode),
            other => Err(format!("unknown codec: {}", other)),
        }
    }
}
