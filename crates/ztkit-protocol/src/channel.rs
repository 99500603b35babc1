//! Command channel for application commands.
//!
//! The channel assigns monotonically increasing command ids, frames
//! JSON-encoded commands to the board application target, and correlates
//! replies back to the issuing id. Replies may arrive in any order
//! relative to the ids being awaited: a reply for a different id is held
//! in the response cache until that id is claimed.

use std::collections::HashMap;
use std::time::Duration;

use log::{debug, trace};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::constants::{APP_TARGET, DEFAULT_READ_TIMEOUT_MS};
use crate::error::{KitError, KitResult};
use crate::frame::{encode_frame, FrameBuffer, KitReply};
use crate::transport::{ReportDevice, ReportTransport};
use crate::types::{AppCommand, AppResponse, CsrInfo, InitInfo, KitStatusInfo};

/// Host-side command channel over a report device.
///
/// The channel owns its device exclusively for its lifetime. Command ids
/// start at 0 and increment by one per command; they are never reused
/// within a session. Unclaimed cached responses accumulate for the life
/// of the channel, so callers are expected to claim every id they issue.
pub struct KitChannel<D> {
    transport: ReportTransport<D>,
    next_cmd_id: u64,
    responses: HashMap<u64, AppResponse>,
    read_timeout: Duration,
}

impl<D: ReportDevice> KitChannel<D> {
    /// Create a channel owning the given device.
    pub fn new(device: D) -> Self {
        KitChannel {
            transport: ReportTransport::new(device),
            next_cmd_id: 0,
            responses: HashMap::new(),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
        }
    }

    /// Set the per-report read timeout.
    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    /// Open the device, discarding any responses from a previous session.
    pub fn open(&mut self) -> KitResult<()> {
        self.responses.clear();
        self.transport.open()
    }

    /// Access the underlying device.
    pub fn device(&self) -> &D {
        self.transport.device()
    }

    /// Mutably access the underlying device.
    pub fn device_mut(&mut self) -> &mut D {
        self.transport.device_mut()
    }

    /// Write a raw kit command frame to the given target.
    pub fn write_frame(&mut self, target: &str, payload: &[u8]) -> KitResult<()> {
        self.transport.write(&encode_frame(target, payload))
    }

    /// Read the next complete reply frame as text.
    pub fn read_frame(&mut self) -> KitResult<String> {
        let mut frame = FrameBuffer::new();
        loop {
            let report = self.transport.read(self.read_timeout)?;
            frame.push(&report);
            if let Some(text) = frame.take_frame() {
                trace!("kit frame received: {}", text.trim_end());
                return Ok(text);
            }
        }
    }

    /// Send an application command, returning its assigned id.
    ///
    /// Fire-and-forget at this layer: pair the returned id with
    /// [`KitChannel::receive_response`] to claim the reply.
    pub fn send_command(&mut self, method: &str, params: Value) -> KitResult<u64> {
        let cmd = AppCommand {
            method: method.to_string(),
            params,
            id: self.next_cmd_id,
        };
        self.next_cmd_id += 1;
        debug!("sending app command {} (id {})", cmd.method, cmd.id);
        let body = serde_json::to_vec(&cmd)?;
        self.write_frame(APP_TARGET, &body)?;
        Ok(cmd.id)
    }

    /// Wait for the application response with the given id.
    ///
    /// Responses for other ids read along the way are cached under their
    /// own id and handed out when claimed. A non-zero reply status fails
    /// the whole call; the cache is left untouched on error.
    pub fn receive_response(&mut self, id: u64) -> KitResult<AppResponse> {
        loop {
            if let Some(resp) = self.responses.remove(&id) {
                return Ok(resp);
            }
            let text = self.read_frame()?;
            let reply = KitReply::parse(&text)?;
            if reply.status != 0 {
                return Err(KitError::Status {
                    status: reply.status,
                    frame: text,
                });
            }
            let resp: AppResponse = serde_json::from_slice(&reply.payload()?)?;
            trace!("app response received (id {})", resp.id);
            self.responses.insert(resp.id, resp);
        }
    }

    /// Wait for a response and fail if it carries an error object.
    pub fn receive_result(&mut self, id: u64) -> KitResult<Option<Value>> {
        let resp = self.receive_response(id)?;
        if let Some(err) = resp.error {
            return Err(KitError::App {
                error_code: err.error_code,
                error_msg: err.error_msg,
            });
        }
        Ok(resp.result)
    }

    /// Send a command and decode its checked result.
    fn request<T: DeserializeOwned>(&mut self, method: &str, params: Value) -> KitResult<T> {
        let id = self.send_command(method, params)?;
        let result = self.receive_result(id)?.unwrap_or_default();
        Ok(serde_json::from_value(result)?)
    }

    /// Initialize the board for a provisioning session.
    pub fn init(&mut self, kit_version: &str) -> KitResult<InitInfo> {
        self.request("init", json!({ "version": kit_version }))
    }

    /// Request a certification request from the board.
    ///
    /// Returns the DER encoding as hex.
    pub fn gen_csr(&mut self) -> KitResult<String> {
        let info: CsrInfo = self.request("genCsr", json!({}))?;
        Ok(info.csr)
    }

    /// Save credentials and connection information to the board.
    pub fn save_credentials(
        &mut self,
        host_name: &str,
        device_cert: &[u8],
        signer_cert: &[u8],
        signer_ca_public_key: &[u8],
    ) -> KitResult<()> {
        let id = self.send_command(
            "saveCredentials",
            json!({
                "hostName": host_name,
                "deviceCert": hex::encode(device_cert),
                "signerCert": hex::encode(signer_cert),
                "signerCaPublicKey": hex::encode(signer_ca_public_key),
            }),
        )?;
        self.receive_result(id)?;
        Ok(())
    }

    /// Save Wi-Fi settings to the board.
    pub fn set_wifi(&mut self, ssid: &str, psk: &str) -> KitResult<()> {
        let id = self.send_command("setWifi", json!({ "ssid": ssid, "psk": psk }))?;
        self.receive_result(id)?;
        Ok(())
    }

    /// Reset the board to an unprovisioned state.
    pub fn reset_kit(&mut self) -> KitResult<()> {
        let id = self.send_command("resetKit", json!({}))?;
        self.receive_result(id)?;
        Ok(())
    }

    /// Get the current provisioning status of the board.
    pub fn get_status(&mut self) -> KitResult<KitStatusInfo> {
        self.request("getStatus", json!({}))
    }
}
