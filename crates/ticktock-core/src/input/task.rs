//! The dedicated input thread.
//!
//! Blocking reads live on their own OS thread so they never stall the
//! async runtime. The command loop sends an [`InputRequest`] and awaits
//! the matching [`InputEvent`]. Dropping the [`InputHandle`] closes the
//! request channel; the thread exits at its next request boundary.

use std::io::{self, Read};
use std::sync::mpsc;
use std::thread;

use tokio::sync::mpsc as async_mpsc;
use tracing::debug;

use super::reader::KeyReader;
use crate::error::InputError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRequest {
    /// Read one key from the accepted set.
    Key(Vec<char>),
    /// Read one cooked line.
    Line,
}

#[derive(Debug)]
pub enum InputEvent {
    Key(char),
    Line(String),
    Failed(InputError),
}

pub struct InputHandle {
    requests: mpsc::Sender<InputRequest>,
    events: async_mpsc::UnboundedReceiver<InputEvent>,
}

impl InputHandle {
    /// Move `reader` onto a new input thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn<R>(mut reader: KeyReader<R>) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<InputRequest>();
        let (event_tx, event_rx) = async_mpsc::unbounded_channel();

        thread::Builder::new()
            .name("ticktock-input".into())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let event = match request {
                        InputRequest::Key(accepted) => match reader.read_key(&accepted) {
                            Ok(key) => InputEvent::Key(key),
                            Err(e) => InputEvent::Failed(e),
                        },
                        InputRequest::Line => match reader.read_line() {
                            Ok(line) => InputEvent::Line(line),
                            Err(e) => InputEvent::Failed(e),
                        },
                    };
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
                debug!("input thread finished");
            })?;

        Ok(Self {
            requests: request_tx,
            events: event_rx,
        })
    }

    /// Wait for one key from `accepted`.
    pub async fn key(&mut self, accepted: &[char]) -> Result<char, InputError> {
        match self.request(InputRequest::Key(accepted.to_vec())).await? {
            InputEvent::Key(key) => Ok(key),
            InputEvent::Line(_) => Err(InputError::Closed),
            InputEvent::Failed(e) => Err(e),
        }
    }

    /// Wait for one line.
    pub async fn line(&mut self) -> Result<String, InputError> {
        match self.request(InputRequest::Line).await? {
            InputEvent::Line(line) => Ok(line),
            InputEvent::Key(_) => Err(InputError::Closed),
            InputEvent::Failed(e) => Err(e),
        }
    }

    async fn request(&mut self, request: InputRequest) -> Result<InputEvent, InputError> {
        self.requests
            .send(request)
            .map_err(|_| InputError::Closed)?;
        self.events.recv().await.ok_or(InputError::Closed)
    }
}
