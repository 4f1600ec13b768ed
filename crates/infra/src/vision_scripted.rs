//! Scripted vision collaborator for tests/dev.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use scanventory_recognition::{ImageData, ShelfObservation, VisionClient, VisionError};

/// One canned answer for the scripted client.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Analysis text for a `describe_item` call.
    Text(String),
    /// Observations for a `scan_shelf` call.
    Shelf(Vec<ShelfObservation>),
    /// Fail the call, whichever kind it is.
    Fail(VisionError),
}

/// Vision double that replays a queue of canned responses in order.
///
/// A call that finds the wrong response kind at the head of the queue fails
/// as malformed, so a test that scripts the wrong sequence fails loudly
/// instead of recognizing garbage.
#[derive(Debug, Default)]
pub struct ScriptedVisionClient {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    calls: AtomicUsize,
}

impl ScriptedVisionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(ScriptedResponse::Text(text.into()));
    }

    pub fn push_shelf(&self, observations: Vec<ShelfObservation>) {
        self.push(ScriptedResponse::Shelf(observations));
    }

    pub fn push_failure(&self, error: VisionError) {
        self.push(ScriptedResponse::Fail(error));
    }

    pub fn push(&self, response: ScriptedResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// How many calls the client has served (including failed ones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<ScriptedResponse, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| VisionError::Transport("no scripted response left".into()))
    }
}

#[async_trait]
impl VisionClient for ScriptedVisionClient {
    async fn describe_item(&self, _image: &ImageData) -> Result<String, VisionError> {
        match self.next_response()? {
            ScriptedResponse::Text(text) => Ok(text),
            ScriptedResponse::Fail(error) => Err(error),
            ScriptedResponse::Shelf(_) => Err(VisionError::Malformed(
                "scripted a shelf response for a describe call".into(),
            )),
        }
    }

    async fn scan_shelf(&self, _image: &ImageData) -> Result<Vec<ShelfObservation>, VisionError> {
        match self.next_response()? {
            ScriptedResponse::Shelf(observations) => Ok(observations),
            ScriptedResponse::Fail(error) => Err(error),
            ScriptedResponse::Text(_) => Err(VisionError::Malformed(
                "scripted a describe response for a shelf call".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageData {
        ImageData::new("AAAA")
    }

    #[tokio::test]
    async fn responses_replay_in_order() {
        let vision = ScriptedVisionClient::new();
        vision.push_text("Item 1: Ketchup");
        vision.push_shelf(vec![ShelfObservation::new("Mustard")]);

        assert_eq!(vision.describe_item(&image()).await.unwrap(), "Item 1: Ketchup");
        let shelf = vision.scan_shelf(&image()).await.unwrap();
        assert_eq!(shelf[0].name, "Mustard");
        assert_eq!(vision.calls(), 2);
    }

    #[tokio::test]
    async fn scripted_failures_surface_as_is() {
        let vision = ScriptedVisionClient::new();
        vision.push_failure(VisionError::RateLimited);
        assert_eq!(
            vision.describe_item(&image()).await.unwrap_err(),
            VisionError::RateLimited
        );
    }

    #[tokio::test]
    async fn an_exhausted_script_fails_the_call() {
        let vision = ScriptedVisionClient::new();
        let err = vision.scan_shelf(&image()).await.unwrap_err();
        assert!(matches!(err, VisionError::Transport(_)));
        assert_eq!(vision.calls(), 1);
    }

    #[tokio::test]
    async fn a_mismatched_response_kind_is_malformed() {
        let vision = ScriptedVisionClient::new();
        vision.push_text("Item 1: Ketchup");
        let err = vision.scan_shelf(&image()).await.unwrap_err();
        assert!(matches!(err, VisionError::Malformed(_)));
    }
}
