use axum::extract::ws::{CloseFrame, Message, WebSocket};
use gesture_core::{FrameEvents, FrameSession, GestureError, ProviderError, ProviderSource};
use gesture_shared::{ClientMessage, ServerMessage};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::codec::decode_frame;
use crate::server::{AppState, BoxedProvider};

/// Close code sent when the landmark provider goes away (1011: internal error)
const CLOSE_PROVIDER_FAILED: u16 = 1011;

/// Drive one client connection until it closes.
///
/// Every connection owns its own [`FrameSession`]; frames are processed in
/// arrival order, one at a time, on the blocking pool.
pub async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let factory = state.providers.clone();
    let source = move || -> Result<BoxedProvider, ProviderError> { (*factory)() };
    let mut session = Some(FrameSession::new(source, state.settings.clone()));

    log::info!("Client connected");
    if !send(&mut socket, &ServerMessage::response("Connected to server")).await {
        return;
    }

    while let Some(received) = socket.recv().await {
        let text = match received {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                if !send(&mut socket, &ServerMessage::error("binary messages are not supported")).await {
                    break;
                }
                continue;
            }
            Ok(_) => continue,
            Err(e) => {
                log::debug!("Socket error: {}", e);
                break;
            }
        };

        let message = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("Invalid client message: {}", e);
                if !send(&mut socket, &ServerMessage::error(format!("invalid message: {}", e))).await {
                    break;
                }
                continue;
            }
        };

        let Some(mut current) = session.take() else {
            break;
        };

        match message {
            ClientMessage::StartTracking => match current.start() {
                Ok(()) => {
                    log::info!("Hand tracking started");
                    session = Some(current);
                    if !send(&mut socket, &ServerMessage::response("Hand tracking started")).await {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Could not start tracking: {}", e);
                    session = Some(current);
                    close_with_error(&mut socket, &e).await;
                    break;
                }
            },
            ClientMessage::StopTracking => {
                current.stop();
                log::info!("Hand tracking stopped");
                session = Some(current);
                if !send(&mut socket, &ServerMessage::response("Hand tracking stopped")).await {
                    break;
                }
            }
            ClientMessage::Frame(payload) => {
                if payload.image.is_empty() {
                    log::debug!("Ignoring frame without image data");
                    session = Some(current);
                    continue;
                }

                let timestamp = now_ms();
                let joined = tokio::task::spawn_blocking(move || {
                    let result = run_frame(&mut current, &payload.image, timestamp);
                    (current, result)
                })
                .await;

                let (returned, result) = match joined {
                    Ok(pair) => pair,
                    Err(e) => {
                        log::error!("Frame task failed: {}", e);
                        let err = GestureError::ProviderUnavailable(e.to_string());
                        close_with_error(&mut socket, &err).await;
                        break;
                    }
                };
                session = Some(returned);

                match result {
                    Ok(events) => {
                        if !send_events(&mut socket, events).await {
                            break;
                        }
                    }
                    Err(err @ GestureError::ProviderUnavailable(_)) => {
                        log::error!("{}", err);
                        close_with_error(&mut socket, &err).await;
                        break;
                    }
                    Err(err) => {
                        log::warn!("Dropping frame: {}", err);
                        if !send(&mut socket, &ServerMessage::error(err.to_string())).await {
                            break;
                        }
                    }
                }
            }
        }
    }

    if let Some(mut session) = session {
        log::debug!("Session processed {} frames", session.frames_processed());
        session.stop();
    }
    log::info!("Client disconnected");
}

fn run_frame<S: ProviderSource>(
    session: &mut FrameSession<S>,
    image: &str,
    timestamp: u64,
) -> Result<FrameEvents, GestureError> {
    let frame = decode_frame(image)?;
    let events = session.process_frame(&frame, timestamp)?;
    if let Some(gesture) = &events.gesture {
        log::debug!(
            "Direction {} (stable for {} frames)",
            gesture.direction,
            session.stable_frames()
        );
    }
    Ok(events)
}

async fn send_events(socket: &mut WebSocket, events: FrameEvents) -> bool {
    for message in events.into_messages() {
        if !send(socket, &message).await {
            return false;
        }
    }
    true
}

/// Returns false once the client is gone
async fn send(socket: &mut WebSocket, message: &ServerMessage) -> bool {
    let text = match message.to_json() {
        Ok(text) => text,
        Err(e) => {
            log::error!("Failed to encode {}: {}", message.event_name(), e);
            return true;
        }
    };
    socket.send(Message::Text(text)).await.is_ok()
}

async fn close_with_error(socket: &mut WebSocket, err: &GestureError) {
    send(socket, &ServerMessage::error(err.to_string())).await;
    let frame = CloseFrame {
        code: CLOSE_PROVIDER_FAILED,
        reason: "landmark provider unavailable".into(),
    };
    let _ = socket.send(Message::Close(Some(frame))).await;
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
