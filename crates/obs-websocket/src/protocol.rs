use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RPC_VERSION: u32 = 1;

/// Message op codes of the v5 protocol
pub mod op {
	pub const HELLO: u8 = 0;
	pub const IDENTIFY: u8 = 1;
	pub const IDENTIFIED: u8 = 2;
	pub const EVENT: u8 = 5;
	pub const REQUEST: u8 = 6;
	pub const REQUEST_RESPONSE: u8 = 7;
}

/// Every non high-volume event category, media inputs included
pub const EVENT_SUBSCRIPTIONS: u32 = 0x7FF;

/// Outer frame of every message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
	pub op: u8,
	#[serde(default)]
	pub d: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
	#[serde(default)]
	pub obs_web_socket_version: String,
	pub rpc_version: u32,
	pub authentication: Option<AuthChallenge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthChallenge {
	pub challenge: String,
	pub salt: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identified {
	pub negotiated_rpc_version: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestStatus {
	pub result: bool,
	pub code: u16,
	#[serde(default)]
	pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
	pub request_type: String,
	pub request_id: String,
	pub request_status: RequestStatus,
	#[serde(default)]
	pub response_data: Option<Value>,
}
