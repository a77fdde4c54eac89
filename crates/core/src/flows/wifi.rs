//! Wi-Fi credentials screen. Display only: nothing is submitted.

use std::fmt;

use crate::error::{Error, Result};
use crate::request::ServiceType;
use crate::tenant::{HotelConfig, WifiCredentials};

const MASK: &str = "••••••••";

/// A copyable credential field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiField {
    Ssid,
    Password,
}

pub struct WifiScreen {
    credentials: WifiCredentials,
    revealed: bool,
}

impl WifiScreen {
    /// Fails with `ServiceNotEnabled` when the hotel has no Wi-Fi to show.
    pub fn for_hotel(hotel: &HotelConfig) -> Result<Self> {
        if !hotel.is_enabled(ServiceType::Wifi) {
            return Err(Error::ServiceNotEnabled(ServiceType::Wifi));
        }
        let credentials = hotel
            .wifi
            .clone()
            .ok_or(Error::ServiceNotEnabled(ServiceType::Wifi))?;
        Ok(Self {
            credentials,
            revealed: false,
        })
    }

    pub fn ssid(&self) -> &str {
        &self.credentials.ssid
    }

    /// The password as displayed: masked with a fixed-width mask until revealed.
    pub fn password_display(&self) -> &str {
        if self.revealed {
            &self.credentials.password
        } else {
            MASK
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Flips visibility and returns the new state.
    pub fn toggle_reveal(&mut self) -> bool {
        self.revealed = !self.revealed;
        self.revealed
    }

    /// Raw value for the clipboard, independent of the reveal toggle.
    pub fn copy_text(&self, field: WifiField) -> &str {
        match field {
            WifiField::Ssid => &self.credentials.ssid,
            WifiField::Password => &self.credentials.password,
        }
    }
}

impl fmt::Debug for WifiScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiScreen")
            .field("ssid", &self.credentials.ssid)
            .field("revealed", &self.revealed)
            .finish_non_exhaustive()
    }
}
