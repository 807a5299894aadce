//! Local session status display model

use serde::Serialize;
use tabled::Tabled;

/// Snapshot of the locally stored session, for `jobtrack status`
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SessionStatusDisplay {
    #[tabled(rename = "SESSION")]
    pub state: String,

    #[tabled(rename = "USER")]
    pub user: String,

    #[tabled(rename = "ACCESS TOKEN")]
    pub access_token: String,

    #[tabled(rename = "EXPIRES")]
    pub expires: String,

    #[tabled(rename = "REFRESH TOKEN")]
    pub refresh_token: String,

    /// When the proactive renewal would fire for this token
    #[tabled(rename = "RENEWAL")]
    pub renewal: String,

    #[tabled(rename = "API")]
    pub api_url: String,

    #[tabled(rename = "DATA DIR")]
    pub data_dir: String,
}
