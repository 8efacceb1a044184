//! Instrument cameras: channel x spectrograph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instrument channel (wavelength arm)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    B,
    R,
    Z,
}

impl Channel {
    /// Single-letter form used in camera names
    pub fn letter(&self) -> char {
        match self {
            Channel::B => 'b',
            Channel::R => 'r',
            Channel::Z => 'z',
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "b" => Ok(Channel::B),
            "r" => Ok(Channel::R),
            "z" => Ok(Channel::Z),
            other => Err(format!("unknown channel '{other}' (expected b, r or z)")),
        }
    }
}

/// One camera: a channel mounted on a spectrograph (`b0` .. `z9`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Camera {
    pub channel: Channel,
    pub spectrograph: u8,
}

impl Camera {
    /// Enumerate every camera for the given channels and spectrograph count,
    /// in channel-major order. This is the deterministic output-artifact set
    /// checked by the skip-if-complete test.
    pub fn enumerate(channels: &[Channel], spectrographs: u8) -> Vec<Camera> {
        let mut cameras = Vec::with_capacity(channels.len() * spectrographs as usize);
        for &channel in channels {
            for spectrograph in 0..spectrographs {
                cameras.push(Camera {
                    channel,
                    spectrograph,
                });
            }
        }
        cameras
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.channel, self.spectrograph)
    }
}
