use base64::{URL_SAFE, decode_config};
use tracing::warn;

use crate::error::ServerKeyError;

/// Length of an uncompressed P-256 public key.
pub(crate) const SERVER_KEY_LEN: usize = 65;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ServerKeyStatus {
    Missing,
    Invalid(ServerKeyError),
    Ready(Vec<u8>),
}

pub(crate) fn load_server_key(key: Option<&str>) -> ServerKeyStatus {
    let Some(key) = key.map(str::trim).filter(|key| !key.is_empty()) else {
        return ServerKeyStatus::Missing;
    };
    match decode_server_key(key).and_then(|bytes| check_server_key(&bytes).map(|()| bytes)) {
        Ok(bytes) => ServerKeyStatus::Ready(bytes),
        Err(err) => {
            warn!(error = %err, "ignoring application server key");
            ServerKeyStatus::Invalid(err)
        }
    }
}

/// Decodes a base64url key, adding the padding browsers strip.
pub fn decode_server_key(key: &str) -> Result<Vec<u8>, ServerKeyError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ServerKeyError::Empty);
    }
    let padding = "=".repeat((4 - key.len() % 4) % 4);
    decode_config(format!("{key}{padding}"), URL_SAFE)
        .map_err(|err| ServerKeyError::Encoding(err.to_string()))
}

/// Checks the decoded key is an uncompressed P-256 point.
pub(crate) fn check_server_key(bytes: &[u8]) -> Result<(), ServerKeyError> {
    if bytes.len() == SERVER_KEY_LEN && bytes[0] == 0x04 {
        Ok(())
    } else {
        Err(ServerKeyError::Length(bytes.len()))
    }
}

#[cfg(test)]
pub(crate) const TEST_SERVER_KEY: &str =
    "BCRweRf_U5iQM4pKNucGRzM6OuLp8Hisa8yX0N2ePIf1oxKitvFT6qvuGgYoTxlMatMDaytXbZR3rVClc2w_p6U";
