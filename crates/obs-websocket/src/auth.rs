use crate::error::{ObsWebsocketError, Result};
use crate::protocol::{op, Envelope, Hello, Identified, EVENT_SUBSCRIPTIONS, RPC_VERSION};
use base64::engine::Engine;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio_tungstenite::tungstenite::{self, protocol::Message};
use tracing::{info, warn};

fn sha256_base64(parts: &[&[u8]]) -> String {
	let mut hasher = Sha256::new();
	for part in parts {
		hasher.update(part);
	}
	base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
}

/// `base64(sha256(base64(sha256(password + salt)) + challenge))`
pub fn auth_string(password: &str, salt: &str, challenge: &str) -> String {
	let secret = sha256_base64(&[password.as_bytes(), salt.as_bytes()]);
	sha256_base64(&[secret.as_bytes(), challenge.as_bytes()])
}

/// Identify payload answering `hello`, authenticated when the server asks for it
pub fn identify_message(hello: &Hello, password: Option<&str>) -> Result<Value> {
	let mut d = json!({
		"rpcVersion": RPC_VERSION,
		"eventSubscriptions": EVENT_SUBSCRIPTIONS,
	});

	if let Some(auth) = &hello.authentication {
		let password = password.ok_or_else(|| ObsWebsocketError::Authentication("server requires a password but none is configured".to_string()))?;
		d["authentication"] = Value::String(auth_string(password, &auth.salt, &auth.challenge));
	} else if password.is_some() {
		warn!("Password configured but OBS does not require authentication");
	}

	Ok(json!({ "op": op::IDENTIFY, "d": d }))
}

async fn next_envelope<S>(stream: &mut S) -> Result<Envelope>
where
	S: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
	while let Some(message) = stream.next().await {
		match message? {
			Message::Text(text) => return Ok(serde_json::from_str(&text)?),
			Message::Close(frame) => {
				let reason = frame.map_or_else(|| "no reason given".to_string(), |f| format!("{} ({})", &*f.reason, u16::from(f.code)));
				return Err(ObsWebsocketError::Authentication(format!("connection closed during handshake: {reason}")));
			}
			_ => {}
		}
	}
	Err(ObsWebsocketError::Handshake("connection closed before hello".to_string()))
}

/// Run the Hello, Identify, Identified exchange on a fresh socket
pub async fn handshake<K, S>(sink: &mut K, stream: &mut S, password: Option<&str>) -> Result<Hello>
where
	K: Sink<Message, Error = tungstenite::Error> + Unpin,
	S: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
	let envelope = next_envelope(stream).await?;
	if envelope.op != op::HELLO {
		return Err(ObsWebsocketError::Handshake(format!("expected hello, got op {}", envelope.op)));
	}
	let hello: Hello = serde_json::from_value(envelope.d)?;

	let identify = identify_message(&hello, password)?;
	sink.send(Message::Text(identify.to_string().into())).await?;

	let envelope = next_envelope(stream).await?;
	if envelope.op != op::IDENTIFIED {
		return Err(ObsWebsocketError::Authentication(format!("expected identified, got op {}", envelope.op)));
	}
	let identified: Identified = serde_json::from_value(envelope.d)?;

	info!("Identified with OBS WebSocket {} (rpc version {})", hello.obs_web_socket_version, identified.negotiated_rpc_version);
	Ok(hello)
}
