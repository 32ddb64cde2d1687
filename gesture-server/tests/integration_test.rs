use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures_util::{SinkExt, StreamExt};
use gesture_core::{
    landmarks::index, ClassifierSettings, LandmarkProvider, Position, ProviderError, RawHand,
    RgbFrame, LANDMARK_COUNT,
};
use gesture_server::{serve, AppState, BoxedProvider};
use gesture_shared::{ClientMessage, Direction, FramePayload, LivenessResponse, ServerMessage};
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::VecDeque;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Script = Arc<Mutex<VecDeque<Result<Vec<RawHand>, ProviderError>>>>;

/// Replays canned detections from a queue shared with the test
struct ScriptedProvider {
    script: Script,
}

impl LandmarkProvider for ScriptedProvider {
    fn detect(&mut self, _frame: &RgbFrame) -> Result<Vec<RawHand>, ProviderError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

struct TestServer {
    addr: SocketAddr,
    script: Script,
    acquired: Arc<AtomicUsize>,
}

impl TestServer {
    async fn start() -> Result<Self> {
        let script: Script = Arc::new(Mutex::new(VecDeque::new()));
        let acquired = Arc::new(AtomicUsize::new(0));

        let factory_script = script.clone();
        let factory_count = acquired.clone();
        let state = AppState::new(
            ClassifierSettings::default(),
            Arc::new(move || {
                factory_count.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ProviderError>(Box::new(ScriptedProvider {
                    script: factory_script.clone(),
                }) as BoxedProvider)
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(serve(listener, state));

        Ok(Self {
            addr,
            script,
            acquired,
        })
    }

    fn push(&self, detection: Result<Vec<RawHand>, ProviderError>) {
        self.script.lock().unwrap().push_back(detection);
    }

    fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Connect and consume the greeting
    async fn connect(&self) -> Result<Client> {
        let (mut client, _) = connect_async(format!("ws://{}/ws", self.addr)).await?;
        let greeting = recv(&mut client).await?;
        assert_eq!(greeting, ServerMessage::response("Connected to server"));
        Ok(client)
    }
}

fn hand(wrist: (f32, f32), index_mcp: (f32, f32), index_tip: (f32, f32)) -> RawHand {
    let mut points = vec![Position::new(wrist.0, wrist.1 - 0.1); LANDMARK_COUNT];
    points[index::WRIST] = Position::new(wrist.0, wrist.1);
    points[index::INDEX_MCP] = Position::new(index_mcp.0, index_mcp.1);
    points[index::INDEX_TIP] = Position::new(index_tip.0, index_tip.1);
    points[index::MIDDLE_MCP] = Position::new(wrist.0 + 0.02, wrist.1 - 0.12);
    points
}

fn pointing_up_at(wrist_x: f32) -> RawHand {
    hand((wrist_x, 0.5), (wrist_x, 0.42), (wrist_x, 0.3))
}

/// A small PNG as a browser would send it
fn png_data_url(width: u32, height: u32) -> String {
    let img = RgbImage::from_pixel(width, height, Rgb([40, 40, 40]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

fn frame(image: String) -> ClientMessage {
    ClientMessage::Frame(FramePayload { image })
}

async fn send(client: &mut Client, message: &ClientMessage) -> Result<()> {
    client
        .send(Message::Text(serde_json::to_string(message)?))
        .await?;
    Ok(())
}

async fn recv(client: &mut Client) -> Result<ServerMessage> {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("connection closed"))??;
        if let Message::Text(text) = next {
            return Ok(serde_json::from_str(&text)?);
        }
    }
}

#[tokio::test]
async fn test_liveness_endpoint() -> Result<()> {
    let server = TestServer::start().await?;

    let body: LivenessResponse = reqwest::get(format!("http://{}/", server.addr))
        .await?
        .json()
        .await?;
    assert_eq!(body, LivenessResponse::ready());

    Ok(())
}

#[tokio::test]
async fn test_tracking_lifecycle_acks() -> Result<()> {
    let server = TestServer::start().await?;
    let mut client = server.connect().await?;

    for _ in 0..2 {
        send(&mut client, &ClientMessage::StartTracking).await?;
        assert_eq!(
            recv(&mut client).await?,
            ServerMessage::response("Hand tracking started")
        );
    }
    assert_eq!(server.acquired(), 1);

    for _ in 0..2 {
        send(&mut client, &ClientMessage::StopTracking).await?;
        assert_eq!(
            recv(&mut client).await?,
            ServerMessage::response("Hand tracking stopped")
        );
    }

    send(&mut client, &ClientMessage::StartTracking).await?;
    recv(&mut client).await?;
    assert_eq!(server.acquired(), 2);

    Ok(())
}

#[tokio::test]
async fn test_frame_sequence_emits_commands_and_motion() -> Result<()> {
    let server = TestServer::start().await?;
    let mut client = server.connect().await?;

    send(&mut client, &ClientMessage::StartTracking).await?;
    recv(&mut client).await?;

    server.push(Ok(Vec::new()));
    server.push(Ok(vec![pointing_up_at(0.5)]));
    server.push(Ok(vec![pointing_up_at(0.52)]));

    // no hand: nothing comes back, so the next message belongs to frame 2
    send(&mut client, &frame(png_data_url(64, 48))).await?;

    send(&mut client, &frame(png_data_url(64, 48))).await?;
    match recv(&mut client).await? {
        ServerMessage::GestureCommand(cmd) => assert_eq!(cmd.direction, Direction::Up),
        other => panic!("expected gesture_command, got {:?}", other),
    }
    match recv(&mut client).await? {
        ServerMessage::HandData(overlay) => {
            assert!(!overlay.has_previous_position);
            assert_eq!((overlay.frame_width, overlay.frame_height), (64, 48));
            assert_eq!((overlay.wrist_x, overlay.wrist_y), (32, 24));
            assert_eq!(overlay.joints.len(), 10);
        }
        other => panic!("expected hand_data, got {:?}", other),
    }

    send(&mut client, &frame(png_data_url(64, 48))).await?;
    assert_eq!(recv(&mut client).await?.event_name(), "gesture_command");
    match recv(&mut client).await? {
        ServerMessage::HandData(overlay) => {
            assert!(overlay.has_previous_position);
            assert!((overlay.movement_dx - 0.02).abs() < 1e-6);
        }
        other => panic!("expected hand_data, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_bad_payload_keeps_motion_history() -> Result<()> {
    let server = TestServer::start().await?;
    let mut client = server.connect().await?;

    server.push(Ok(vec![pointing_up_at(0.5)]));
    server.push(Ok(vec![pointing_up_at(0.52)]));

    send(&mut client, &frame(png_data_url(32, 32))).await?;
    recv(&mut client).await?;
    recv(&mut client).await?;

    send(&mut client, &frame("data:image/jpeg;base64,@@@@".into())).await?;
    assert_eq!(recv(&mut client).await?.event_name(), "error");

    send(&mut client, &frame(png_data_url(32, 32))).await?;
    assert_eq!(recv(&mut client).await?.event_name(), "gesture_command");
    match recv(&mut client).await? {
        ServerMessage::HandData(overlay) => {
            assert!(overlay.has_previous_position);
            assert!((overlay.movement_dx - 0.02).abs() < 1e-6);
        }
        other => panic!("expected hand_data, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_invalid_json_reports_error_and_continues() -> Result<()> {
    let server = TestServer::start().await?;
    let mut client = server.connect().await?;

    client.send(Message::Text("this is not json".into())).await?;
    assert_eq!(recv(&mut client).await?.event_name(), "error");

    client
        .send(Message::Text(r#"{"event":"wave","data":{}}"#.into()))
        .await?;
    assert_eq!(recv(&mut client).await?.event_name(), "error");

    send(&mut client, &ClientMessage::StartTracking).await?;
    assert_eq!(
        recv(&mut client).await?,
        ServerMessage::response("Hand tracking started")
    );

    Ok(())
}

#[tokio::test]
async fn test_empty_image_is_ignored() -> Result<()> {
    let server = TestServer::start().await?;
    let mut client = server.connect().await?;

    server.push(Ok(vec![pointing_up_at(0.5)]));

    send(&mut client, &frame(String::new())).await?;
    client
        .send(Message::Text(r#"{"event":"frame","data":{}}"#.into()))
        .await?;
    send(&mut client, &ClientMessage::StartTracking).await?;
    assert_eq!(
        recv(&mut client).await?,
        ServerMessage::response("Hand tracking started")
    );

    // the scripted hand is still queued, so no frame reached the provider
    send(&mut client, &frame(png_data_url(16, 16))).await?;
    assert_eq!(recv(&mut client).await?.event_name(), "gesture_command");

    Ok(())
}

#[tokio::test]
async fn test_provider_failure_closes_connection() -> Result<()> {
    let server = TestServer::start().await?;
    let mut client = server.connect().await?;

    send(&mut client, &ClientMessage::StartTracking).await?;
    recv(&mut client).await?;

    server.push(Err(ProviderError::new("model crashed")));
    send(&mut client, &frame(png_data_url(16, 16))).await?;

    match recv(&mut client).await? {
        ServerMessage::Error(payload) => assert!(payload.message.contains("model crashed")),
        other => panic!("expected error, got {:?}", other),
    }

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match client.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return true,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await?;
    assert!(closed);

    Ok(())
}

#[tokio::test]
async fn test_clients_do_not_share_motion_state() -> Result<()> {
    let server = TestServer::start().await?;
    let mut first = server.connect().await?;
    let mut second = server.connect().await?;

    server.push(Ok(vec![pointing_up_at(0.5)]));
    send(&mut first, &frame(png_data_url(16, 16))).await?;
    recv(&mut first).await?;
    recv(&mut first).await?;

    server.push(Ok(vec![pointing_up_at(0.6)]));
    send(&mut second, &frame(png_data_url(16, 16))).await?;
    recv(&mut second).await?;
    match recv(&mut second).await? {
        ServerMessage::HandData(overlay) => {
            assert!(!overlay.has_previous_position);
            assert_eq!(overlay.movement_dx, 0.0);
        }
        other => panic!("expected hand_data, got {:?}", other),
    }

    assert_eq!(server.acquired(), 2);

    Ok(())
}
