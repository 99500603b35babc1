//! In-process simulated kit device.
//!
//! [`SimKitDevice`] speaks the same report framing and application
//! command set as the real board, behind the same [`ReportDevice`]
//! trait. Incoming reports accumulate in a command buffer until a
//! newline completes the frame; replies queue as fixed-size reports the
//! host drains with timed reads.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use ed25519_dalek::SigningKey;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use ztkit_protocol::{
    AppCommand, AppError, AppResponse, KitError, KitResult, ReportDevice, ERR_CODE_BAD_VERSION,
    ERR_CODE_INVALID_PARAMS, ERR_CODE_UNKNOWN_METHOD, APP_TARGET, KIT_VERSION, REPORT_SIZE,
    STATUS_OK, STATUS_UNKNOWN_TARGET,
};

use crate::csr::build_csr;
use crate::error::SimResult;
use crate::state::{load_or_create_key, KitState};

/// File name used for the persisted device state.
pub const STATE_FILE_NAME: &str = "sim-device.json";
/// File name used for the persisted device key seed.
pub const KEY_FILE_NAME: &str = "sim-device.key";

/// Parameters of the `saveCredentials` command.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialParams {
    host_name: String,
    device_cert: String,
    signer_cert: String,
    signer_ca_public_key: String,
}

/// Parameters of the `setWifi` command.
#[derive(Debug, Deserialize)]
struct WifiParams {
    ssid: String,
    psk: String,
}

/// Software stand-in for the Zero Touch kit board.
///
/// A passive responder: it only ever emits reports in reaction to a
/// completed command frame, and a read with nothing queued waits out the
/// timeout and delivers an empty buffer, mirroring real hardware with
/// nothing to say.
pub struct SimKitDevice {
    state: KitState,
    state_path: PathBuf,
    key: SigningKey,
    cmd_buf: Vec<u8>,
    outbound: VecDeque<Vec<u8>>,
}

impl SimKitDevice {
    /// Create a simulator persisting its state under `dir`.
    ///
    /// Loads state and key material from previous runs when present,
    /// otherwise initializes a fresh device with the default serial
    /// number and persists it immediately.
    pub fn new(dir: &Path) -> SimResult<SimKitDevice> {
        let state_path = dir.join(STATE_FILE_NAME);
        let state = KitState::load_or_create(&state_path)?;
        let key = load_or_create_key(&dir.join(KEY_FILE_NAME))?;
        Ok(SimKitDevice {
            state,
            state_path,
            key,
            cmd_buf: Vec::new(),
            outbound: VecDeque::new(),
        })
    }

    /// Current in-memory state.
    pub fn state(&self) -> &KitState {
        &self.state
    }

    /// Queue a reply as a series of fixed-size, null-padded reports.
    fn send_reply(&mut self, text: &str) {
        for chunk in text.as_bytes().chunks(REPORT_SIZE) {
            let mut report = chunk.to_vec();
            report.resize(REPORT_SIZE, 0x00);
            self.outbound.push_back(report);
        }
    }

    /// Queue a kit reply frame with the given status and raw payload.
    fn send_kit_reply(&mut self, status: u8, body: &[u8]) {
        self.send_reply(&format!("{:02x}({})\n", status, hex::encode(body)));
    }

    fn send_app_response(&mut self, id: u64, result: Value) {
        self.send_app_reply(&AppResponse {
            id,
            result: Some(result),
            error: None,
        });
    }

    fn send_app_error(&mut self, id: u64, error_code: u32, error_msg: &str) {
        self.send_app_reply(&AppResponse {
            id,
            result: None,
            error: Some(AppError {
                error_code,
                error_msg: error_msg.to_string(),
            }),
        });
    }

    fn send_app_reply(&mut self, resp: &AppResponse) {
        match serde_json::to_vec(resp) {
            Ok(body) => self.send_kit_reply(STATUS_OK, &body),
            Err(e) => warn!("dropping unserializable response for id {}: {}", resp.id, e),
        }
    }

    /// Decode and dispatch one complete command frame.
    fn process_frame(&mut self, text: &str) -> SimResult<()> {
        let Some((target, payload)) = split_command_frame(text) else {
            warn!("malformed command frame: {}", text.trim_end());
            self.send_kit_reply(STATUS_UNKNOWN_TARGET, &[]);
            return Ok(());
        };
        if target != APP_TARGET {
            debug!("unknown command target: {}", target);
            self.send_kit_reply(STATUS_UNKNOWN_TARGET, &[]);
            return Ok(());
        }
        self.process_app_command(payload)
    }

    fn process_app_command(&mut self, payload: &str) -> SimResult<()> {
        let decoded = hex::decode(payload)
            .ok()
            .and_then(|body| serde_json::from_slice::<AppCommand>(&body).ok());
        let Some(cmd) = decoded else {
            warn!("undecodable app command payload");
            self.send_kit_reply(STATUS_UNKNOWN_TARGET, &[]);
            return Ok(());
        };

        debug!("app command {} (id {})", cmd.method, cmd.id);
        match cmd.method.as_str() {
            "init" => self.handle_init(&cmd),
            "genCsr" => self.handle_gen_csr(&cmd),
            "saveCredentials" => return self.handle_save_credentials(&cmd),
            "setWifi" => return self.handle_set_wifi(&cmd),
            "resetKit" => return self.handle_reset_kit(&cmd),
            "getStatus" => self.handle_get_status(&cmd),
            _ => self.send_app_error(cmd.id, ERR_CODE_UNKNOWN_METHOD, "Unknown command"),
        }
        Ok(())
    }

    fn handle_init(&mut self, cmd: &AppCommand) {
        let version = cmd.params.get("version").and_then(Value::as_str);
        if version != Some(KIT_VERSION) {
            self.send_app_error(cmd.id, ERR_CODE_BAD_VERSION, "Unsupported version");
            return;
        }
        let result = json!({
            "deviceSn": self.state.sn,
            "devicePublicKey": hex::encode(self.key.verifying_key().as_bytes()),
        });
        self.send_app_response(cmd.id, result);
    }

    fn handle_gen_csr(&mut self, cmd: &AppCommand) {
        let csr = build_csr(&self.key);
        self.send_app_response(cmd.id, json!({ "csr": hex::encode(csr) }));
    }

    fn handle_save_credentials(&mut self, cmd: &AppCommand) -> SimResult<()> {
        let params: CredentialParams = match serde_json::from_value(cmd.params.clone()) {
            Ok(params) => params,
            Err(e) => {
                self.send_app_error(
                    cmd.id,
                    ERR_CODE_INVALID_PARAMS,
                    &format!("Invalid params: {}", e),
                );
                return Ok(());
            }
        };
        self.state.host_name = Some(params.host_name);
        self.state.device_cert = Some(params.device_cert);
        self.state.signer_cert = Some(params.signer_cert);
        self.state.signer_ca_public_key = Some(params.signer_ca_public_key);
        self.state.save(&self.state_path)?;
        self.send_app_response(cmd.id, json!({}));
        Ok(())
    }

    fn handle_set_wifi(&mut self, cmd: &AppCommand) -> SimResult<()> {
        let params: WifiParams = match serde_json::from_value(cmd.params.clone()) {
            Ok(params) => params,
            Err(e) => {
                self.send_app_error(
                    cmd.id,
                    ERR_CODE_INVALID_PARAMS,
                    &format!("Invalid params: {}", e),
                );
                return Ok(());
            }
        };
        self.state.ssid = Some(params.ssid);
        self.state.psk = Some(params.psk);
        self.state.save(&self.state_path)?;
        self.send_app_response(cmd.id, json!({}));
        Ok(())
    }

    fn handle_reset_kit(&mut self, cmd: &AppCommand) -> SimResult<()> {
        self.state.clear_provisioning();
        self.state.save(&self.state_path)?;
        self.send_app_response(cmd.id, json!({}));
        Ok(())
    }

    fn handle_get_status(&mut self, cmd: &AppCommand) {
        let result = json!({
            "deviceSn": self.state.sn,
            "provisioned": self.state.is_provisioned(),
            "wifiConfigured": self.state.has_wifi(),
        });
        self.send_app_response(cmd.id, result);
    }
}

impl ReportDevice for SimKitDevice {
    fn open(&mut self) -> KitResult<()> {
        Ok(())
    }

    fn write_report(&mut self, report: &[u8]) -> KitResult<()> {
        // First byte is the report-id tag; the rest is frame text.
        if report.len() > 1 {
            self.cmd_buf.extend_from_slice(&report[1..]);
        }
        if let Some(pos) = self.cmd_buf.iter().position(|&b| b == b'\n') {
            let text = String::from_utf8_lossy(&self.cmd_buf[..=pos]).into_owned();
            self.cmd_buf.clear();
            self.process_frame(&text)
                .map_err(|e| KitError::Device(e.to_string()))?;
        }
        Ok(())
    }

    fn read_report(&mut self, timeout: Duration) -> KitResult<Vec<u8>> {
        match self.outbound.pop_front() {
            Some(report) => Ok(report),
            None => {
                // Nothing to say: wait out the timeout like real
                // hardware, then deliver an empty read.
                thread::sleep(timeout);
                Ok(Vec::new())
            }
        }
    }
}

/// Split a command frame into its target and payload text.
fn split_command_frame(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let target = &text[..open];
    if target.is_empty() {
        return None;
    }
    let rest = &text[open + 1..];
    let close = rest.find(')')?;
    Some((target, &rest[..close]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn device(dir: &TempDir) -> SimKitDevice {
        SimKitDevice::new(dir.path()).expect("simulator should initialize")
    }

    /// Feed a raw frame to the device the way the transport would.
    fn write_text(device: &mut SimKitDevice, text: &str) {
        for chunk in text.as_bytes().chunks(REPORT_SIZE - 1) {
            let mut report = vec![0x00];
            report.extend_from_slice(chunk);
            report.resize(REPORT_SIZE, 0x04);
            device.write_report(&report).expect("write should succeed");
        }
    }

    /// Drain queued reports into the reply frame text.
    fn read_text(device: &mut SimKitDevice) -> String {
        let mut bytes = Vec::new();
        while let Some(report) = device.outbound.pop_front() {
            bytes.extend_from_slice(&report);
        }
        let end = bytes.iter().position(|&b| b == b'\n').expect("newline");
        String::from_utf8_lossy(&bytes[..=end]).into_owned()
    }

    #[test]
    fn test_unknown_target_gets_c0_reply() {
        let dir = TempDir::new().unwrap();
        let mut device = device(&dir);

        write_text(&mut device, "board:other(00)\n");
        assert_eq!(read_text(&mut device), "c0()\n");
    }

    #[test]
    fn test_command_buffer_spans_reports() {
        let dir = TempDir::new().unwrap();
        let mut device = device(&dir);

        // A frame long enough to need two reports only dispatches once
        // the newline arrives.
        let cmd = AppCommand {
            method: "getStatus".to_string(),
            params: json!({ "padding": "x".repeat(80) }),
            id: 0,
        };
        let frame = format!(
            "board:app({})\n",
            hex::encode(serde_json::to_vec(&cmd).unwrap())
        );
        let bytes = frame.as_bytes();
        let split = REPORT_SIZE - 1;

        let mut first = vec![0x00];
        first.extend_from_slice(&bytes[..split]);
        device.write_report(&first).unwrap();
        assert!(device.outbound.is_empty());

        write_text(&mut device, &frame[split..]);
        assert!(!device.outbound.is_empty());
    }

    #[test]
    fn test_read_report_empty_after_timeout() {
        let dir = TempDir::new().unwrap();
        let mut device = device(&dir);

        let report = device.read_report(Duration::from_millis(1)).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_split_command_frame_round_trips_encode() {
        let payload = [0x00, 0x41, 0xFF];
        let frame = ztkit_protocol::encode_frame("board:app", &payload);
        let text = String::from_utf8(frame).unwrap();

        let (target, data) = split_command_frame(&text).expect("should split");
        assert_eq!(target, "board:app");
        assert_eq!(hex::decode(data).unwrap(), payload);
    }

    #[test]
    fn test_split_command_frame() {
        assert_eq!(
            split_command_frame("board:app(aabb)\n"),
            Some(("board:app", "aabb"))
        );
        assert_eq!(split_command_frame("board:app()\n"), Some(("board:app", "")));
        assert_eq!(split_command_frame("(aabb)\n"), None);
        assert_eq!(split_command_frame("no parens\n"), None);
    }
}
