//! Shared dashboard state and the display that feeds it.

use crate::error::{Result, SamplerError};
use crate::report::{FieldDisplay, FieldTable, UNKNOWN};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Frames buffered per WebSocket client before it starts lagging.
const FRAME_BUFFER: usize = 16;

/// One field as shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameField {
    pub key: String,
    pub label: String,
    pub text: String,
}

/// The whole field table at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldFrame {
    pub updated_at: DateTime<Utc>,
    pub fields: Vec<FrameField>,
}

impl FieldFrame {
    /// Frame with every field unknown.
    pub fn empty(table: &FieldTable) -> Self {
        Self {
            updated_at: Utc::now(),
            fields: table
                .fields()
                .iter()
                .map(|field| FrameField {
                    key: field.key.clone(),
                    label: field.label.clone(),
                    text: UNKNOWN.to_string(),
                })
                .collect(),
        }
    }
}

/// State shared between the display loop and the HTTP handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    latest: Arc<RwLock<FieldFrame>>,
    frames: broadcast::Sender<FieldFrame>,
    clients: Arc<AtomicUsize>,
    title: Arc<str>,
}

impl DashboardState {
    pub fn new(table: &FieldTable, title: &str) -> Self {
        let (frames, _) = broadcast::channel(FRAME_BUFFER);
        Self {
            latest: Arc::new(RwLock::new(FieldFrame::empty(table))),
            frames,
            clients: Arc::new(AtomicUsize::new(0)),
            title: Arc::from(title),
        }
    }

    /// Most recently published frame.
    pub fn latest(&self) -> FieldFrame {
        self.latest
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Store `frame` and hand it to every connected client.
    pub fn publish(&self, frame: FieldFrame) {
        *self.latest.write().unwrap_or_else(|e| e.into_inner()) = frame.clone();
        if self.frames.receiver_count() > 0 {
            if let Err(e) = self.frames.send(frame) {
                tracing::debug!("No dashboard clients to receive frame: {}", e);
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FieldFrame> {
        self.frames.subscribe()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    pub(crate) fn client_connected(&self) {
        self.clients.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn client_disconnected(&self) {
        self.clients.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Display that publishes the field table to the dashboard once per cycle.
pub struct WebDisplay {
    state: DashboardState,
    frame: FieldFrame,
    dirty: bool,
}

impl WebDisplay {
    pub fn new(state: DashboardState) -> Self {
        let frame = state.latest();
        Self {
            state,
            frame,
            dirty: true,
        }
    }
}

impl FieldDisplay for WebDisplay {
    fn set_field(&mut self, key: &str, text: &str) -> Result<()> {
        let field = self
            .frame
            .fields
            .iter_mut()
            .find(|f| f.key == key)
            .ok_or_else(|| SamplerError::config_error(format!("No dashboard field '{}'", key)))?;
        if field.text != text {
            field.text = text.to_string();
            self.dirty = true;
        }
        Ok(())
    }

    fn pump_events(&mut self) -> Result<()> {
        if self.dirty {
            self.frame.updated_at = Utc::now();
            self.state.publish(self.frame.clone());
            self.dirty = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorLayout;

    fn state() -> DashboardState {
        DashboardState::new(&FieldTable::for_layout(&SensorLayout::default()), "test")
    }

    #[test]
    fn test_empty_frame_is_unknown() {
        let frame = state().latest();
        assert_eq!(frame.fields.len(), 7);
        assert!(frame.fields.iter().all(|f| f.text == UNKNOWN));
    }

    #[tokio::test]
    async fn test_display_publishes_changes() {
        let state = state();
        let mut rx = state.subscribe();
        let mut display = WebDisplay::new(state.clone());

        display.set_field("T0", "21.500").unwrap();
        display.pump_events().unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.fields[0].text, "21.500");
        assert_eq!(state.latest().fields[0].text, "21.500");

        // unchanged frame is not sent again
        display.set_field("T0", "21.500").unwrap();
        display.pump_events().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut display = WebDisplay::new(state());
        assert!(display.set_field("humidity", "1").is_err());
    }
}
