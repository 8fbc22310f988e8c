use crate::auth::handshake;
use crate::config::ObsConfig;
use crate::error::{ObsWebsocketError, Result};
use crate::events::ObsEvent;
use crate::protocol::{op, Envelope, RequestResponse};
use crate::requests::{MediaAction, ObsRequest};
use async_broadcast::{InactiveReceiver, Receiver, Sender};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
type Pending = Arc<Mutex<HashMap<String, oneshot::Sender<RequestResponse>>>>;

const EVENT_CAPACITY: usize = 64;

/// Request/response client for one OBS WebSocket connection.
///
/// Responses are matched to callers by request id; events are fanned out to every
/// subscriber. The client can be reconnected after the socket drops.
pub struct ObsClient {
	config: ObsConfig,
	sink: Mutex<Option<WsSink>>,
	pending: Pending,
	connected: Arc<watch::Sender<bool>>,
	events: Sender<ObsEvent>,
	_events_keepalive: InactiveReceiver<ObsEvent>,
	reader: Mutex<Option<JoinHandle<()>>>,
}

impl ObsClient {
	pub fn new(config: ObsConfig) -> Self {
		let (mut events, receiver) = async_broadcast::broadcast(EVENT_CAPACITY);
		events.set_overflow(true);
		events.set_await_active(false);
		let (connected, _) = watch::channel(false);

		Self {
			config,
			sink: Mutex::new(None),
			pending: Arc::new(Mutex::new(HashMap::new())),
			connected: Arc::new(connected),
			events,
			_events_keepalive: receiver.deactivate(),
			reader: Mutex::new(None),
		}
	}

	pub const fn config(&self) -> &ObsConfig {
		&self.config
	}

	pub fn is_connected(&self) -> bool {
		*self.connected.borrow()
	}

	/// Connection state changes, `true` once identified
	pub fn watch_connection(&self) -> watch::Receiver<bool> {
		self.connected.subscribe()
	}

	pub fn subscribe(&self) -> Receiver<ObsEvent> {
		self.events.new_receiver()
	}

	/// Open the socket, identify, and start routing incoming messages
	pub async fn connect(&self) -> Result<()> {
		let url = self.config.url();
		info!("Connecting to OBS WebSocket at {}", url);

		let (socket, _) = timeout(self.config.connect_timeout, connect_async(&url)).await.map_err(|_| ObsWebsocketError::Timeout {
			operation: format!("connect {url}"),
			timeout: self.config.connect_timeout,
		})??;
		let (mut sink, mut stream) = socket.split();

		timeout(self.config.connect_timeout, handshake(&mut sink, &mut stream, self.config.password.as_deref()))
			.await
			.map_err(|_| ObsWebsocketError::Timeout {
				operation: "handshake".to_string(),
				timeout: self.config.connect_timeout,
			})??;

		let mut reader = self.reader.lock().await;
		if let Some(previous) = reader.take() {
			previous.abort();
		}
		*self.sink.lock().await = Some(sink);
		self.connected.send_replace(true);
		*reader = Some(tokio::spawn(read_loop(stream, Arc::clone(&self.pending), self.events.clone(), Arc::clone(&self.connected))));

		info!("Connected to OBS WebSocket");
		Ok(())
	}

	/// Resolves once the socket is gone
	pub async fn closed(&self) {
		let mut connected = self.connected.subscribe();
		let _ = connected.wait_for(|up| !*up).await;
	}

	pub async fn disconnect(&self) {
		if let Some(mut sink) = self.sink.lock().await.take() {
			if let Err(e) = sink.close().await {
				debug!("Error closing OBS socket: {}", e);
			}
		}
		if let Some(reader) = self.reader.lock().await.take() {
			reader.abort();
		}
		self.pending.lock().await.clear();
		self.connected.send_replace(false);
		info!("Disconnected from OBS WebSocket");
	}

	/// Send a request and wait for its response data
	pub async fn request(&self, request: ObsRequest) -> Result<Value> {
		if !self.is_connected() {
			return Err(ObsWebsocketError::NotConnected);
		}

		let request_id = Uuid::new_v4().to_string();
		let (tx, rx) = oneshot::channel();
		self.pending.lock().await.insert(request_id.clone(), tx);

		if let Err(e) = self.send(request.to_message(&request_id)).await {
			self.pending.lock().await.remove(&request_id);
			return Err(e);
		}

		let response = match timeout(self.config.request_timeout, rx).await {
			Ok(Ok(response)) => response,
			Ok(Err(_)) => return Err(ObsWebsocketError::Closed),
			Err(_) => {
				self.pending.lock().await.remove(&request_id);
				return Err(ObsWebsocketError::Timeout {
					operation: request.request_type.to_string(),
					timeout: self.config.request_timeout,
				});
			}
		};

		if !response.request_status.result {
			return Err(ObsWebsocketError::RequestFailed {
				request_type: response.request_type,
				code: response.request_status.code,
				comment: response.request_status.comment.unwrap_or_default(),
			});
		}
		Ok(response.response_data.unwrap_or(Value::Null))
	}

	async fn send(&self, message: Value) -> Result<()> {
		let mut sink = self.sink.lock().await;
		let sink = sink.as_mut().ok_or(ObsWebsocketError::NotConnected)?;
		sink.send(Message::Text(message.to_string().into())).await?;
		Ok(())
	}

	// Typed requests used by the relay

	pub async fn set_current_program_scene(&self, scene_name: &str) -> Result<()> {
		self.request(ObsRequest::set_current_program_scene(scene_name)).await?;
		Ok(())
	}

	pub async fn current_program_scene(&self) -> Result<String> {
		let data = self.request(ObsRequest::get_current_program_scene()).await?;
		data.get("currentProgramSceneName")
			.or_else(|| data.get("sceneName"))
			.and_then(Value::as_str)
			.map(str::to_string)
			.ok_or_else(|| ObsWebsocketError::UnexpectedResponse("GetCurrentProgramScene returned no scene name".to_string()))
	}

	pub async fn set_input_text(&self, input_name: &str, text: &str) -> Result<()> {
		self.request(ObsRequest::set_input_text(input_name, text)).await?;
		Ok(())
	}

	pub async fn set_input_media_file(&self, input_name: &str, path: &str) -> Result<()> {
		self.request(ObsRequest::set_input_media_file(input_name, path)).await?;
		Ok(())
	}

	/// Scene item id of `source_name` in `scene_name`, `None` when the source is not in the scene
	pub async fn scene_item_id(&self, scene_name: &str, source_name: &str) -> Result<Option<i64>> {
		match self.request(ObsRequest::get_scene_item_id(scene_name, source_name)).await {
			Ok(data) => Ok(data.get("sceneItemId").and_then(Value::as_i64)),
			Err(ObsWebsocketError::RequestFailed { code: 600, .. }) => Ok(None),
			Err(e) => Err(e),
		}
	}

	pub async fn set_scene_item_enabled(&self, scene_name: &str, scene_item_id: i64, enabled: bool) -> Result<()> {
		self.request(ObsRequest::set_scene_item_enabled(scene_name, scene_item_id, enabled)).await?;
		Ok(())
	}

	pub async fn set_input_volume_db(&self, input_name: &str, volume_db: f64) -> Result<()> {
		self.request(ObsRequest::set_input_volume_db(input_name, volume_db)).await?;
		Ok(())
	}

	pub async fn set_input_mute(&self, input_name: &str, muted: bool) -> Result<()> {
		self.request(ObsRequest::set_input_mute(input_name, muted)).await?;
		Ok(())
	}

	pub async fn trigger_media_input_action(&self, input_name: &str, action: MediaAction) -> Result<()> {
		self.request(ObsRequest::trigger_media_input_action(input_name, action)).await?;
		Ok(())
	}
}

/// Route responses to their callers and events to subscribers until the socket ends
async fn read_loop(mut stream: WsStream, pending: Pending, events: Sender<ObsEvent>, connected: Arc<watch::Sender<bool>>) {
	while let Some(message) = stream.next().await {
		match message {
			Ok(Message::Text(text)) => match serde_json::from_str::<Envelope>(&text) {
				Ok(envelope) => route(envelope, &pending, &events).await,
				Err(e) => warn!("Ignoring malformed OBS message: {}", e),
			},
			Ok(Message::Close(frame)) => {
				info!("OBS closed the connection: {:?}", frame);
				break;
			}
			Ok(_) => {}
			Err(e) => {
				error!("OBS WebSocket error: {}", e);
				break;
			}
		}
	}

	connected.send_replace(false);
	// Dropping the senders wakes every waiting request with `Closed`
	pending.lock().await.clear();
	warn!("OBS WebSocket connection lost");
}

async fn route(envelope: Envelope, pending: &Pending, events: &Sender<ObsEvent>) {
	match envelope.op {
		op::EVENT => {
			let event = ObsEvent::from_event_data(&envelope.d);
			if events.try_broadcast(event).is_err() {
				debug!("No active OBS event subscribers");
			}
		}
		op::REQUEST_RESPONSE => match serde_json::from_value::<RequestResponse>(envelope.d) {
			Ok(response) => match pending.lock().await.remove(&response.request_id) {
				Some(waiter) => {
					let _ = waiter.send(response);
				}
				None => debug!("Response for unknown request {}", response.request_id),
			},
			Err(e) => warn!("Malformed request response: {}", e),
		},
		other => debug!("Ignoring OBS message with op {}", other),
	}
}
