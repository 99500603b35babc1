//! Persisted simulator state.
//!
//! The simulated kit keeps its provisioning state in a JSON file with
//! string keys, mirroring what the real board stores in its secure
//! element, and a separate file holding the device signing key seed as
//! hex. Both are created on first use and survive across runs.

use std::fs;
use std::path::Path;

use ed25519_dalek::SigningKey;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Serial number assigned to a freshly created simulated device.
pub const DEFAULT_SERIAL_NUMBER: &str = "0123112233445566A5";

/// Provisioning state persisted across simulator runs.
///
/// Only the serial number is always present; the credential and Wi-Fi
/// fields appear once the matching commands have stored them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitState {
    /// Secure element serial number as hex.
    pub sn: String,
    /// Cloud endpoint host name.
    #[serde(rename = "hostName", skip_serializing_if = "Option::is_none", default)]
    pub host_name: Option<String>,
    /// Device certificate as hex-encoded DER.
    #[serde(rename = "deviceCert", skip_serializing_if = "Option::is_none", default)]
    pub device_cert: Option<String>,
    /// Signer certificate as hex-encoded DER.
    #[serde(rename = "signerCert", skip_serializing_if = "Option::is_none", default)]
    pub signer_cert: Option<String>,
    /// Signer CA public key as hex.
    #[serde(
        rename = "signerCaPublicKey",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub signer_ca_public_key: Option<String>,
    /// Wi-Fi network name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ssid: Option<String>,
    /// Wi-Fi pre-shared key.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub psk: Option<String>,
}

impl KitState {
    fn new() -> Self {
        KitState {
            sn: DEFAULT_SERIAL_NUMBER.to_string(),
            host_name: None,
            device_cert: None,
            signer_cert: None,
            signer_ca_public_key: None,
            ssid: None,
            psk: None,
        }
    }

    /// Load state from `path`, creating and persisting defaults if the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> SimResult<KitState> {
        if path.is_file() {
            let text = fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&text)?);
        }
        debug!("no state file at {}, creating defaults", path.display());
        let state = KitState::new();
        state.save(path)?;
        Ok(state)
    }

    /// Persist state as a whole-file replace.
    ///
    /// Writes a sibling temp file first and renames it over `path` so a
    /// reader never observes a half-written file.
    pub fn save(&self, path: &Path) -> SimResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Whether all four credential fields have been stored.
    pub fn is_provisioned(&self) -> bool {
        self.host_name.is_some()
            && self.device_cert.is_some()
            && self.signer_cert.is_some()
            && self.signer_ca_public_key.is_some()
    }

    /// Whether Wi-Fi credentials have been stored.
    pub fn has_wifi(&self) -> bool {
        self.ssid.is_some() && self.psk.is_some()
    }

    /// Drop everything a factory reset erases, keeping the serial number.
    pub fn clear_provisioning(&mut self) {
        self.host_name = None;
        self.device_cert = None;
        self.signer_cert = None;
        self.signer_ca_public_key = None;
        self.ssid = None;
        self.psk = None;
    }
}

/// Load the device signing key from `path`, generating and persisting a
/// fresh one if the file does not exist.
pub fn load_or_create_key(path: &Path) -> SimResult<SigningKey> {
    if path.is_file() {
        let text = fs::read_to_string(path)?;
        let bytes = hex::decode(text.trim())
            .map_err(|e| SimError::Key(format!("invalid key file {}: {}", path.display(), e)))?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SimError::Key(format!("key file {} is not 32 bytes", path.display())))?;
        return Ok(SigningKey::from_bytes(&seed));
    }
    debug!("no key file at {}, generating new device key", path.display());
    let key = SigningKey::generate(&mut rand::rngs::OsRng);
    fs::write(path, hex::encode(key.to_bytes()))?;
    Ok(key)
}
