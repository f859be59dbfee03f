//! Scripted stand-ins for the provider and the clock.

use std::{
    collections::VecDeque,
    pin::Pin,
    sync::{Arc, Mutex},
    time::Duration,
};

use crate::{
    config::SubmitMode,
    error::{GenerationError, Result},
    image_model::{ApiFuture, CreatePrediction, Prediction, PredictionApi},
    job::Clock,
};

pub fn prediction(id: &str, status: &str) -> Prediction {
    serde_json::from_value(serde_json::json!({ "id": id, "status": status })).unwrap()
}

pub fn succeeded(id: &str, urls: &[&str]) -> Prediction {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "status": "succeeded",
        "output": urls,
    }))
    .unwrap()
}

pub fn failed(id: &str, reason: &str) -> Prediction {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "status": "failed",
        "error": reason,
    }))
    .unwrap()
}

pub fn http_error(status: u16) -> GenerationError {
    GenerationError::ProviderError {
        status,
        message: "Internal Server Error".into(),
    }
}

#[derive(Default)]
pub struct ScriptedApi {
    creates: Mutex<VecDeque<Result<Prediction>>>,
    gets: Mutex<VecDeque<Result<Prediction>>>,
    pub created: Mutex<Vec<(CreatePrediction, SubmitMode)>>,
    pub queried: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_create(self: &Arc<Self>, resp: Result<Prediction>) -> Arc<Self> {
        self.creates.lock().unwrap().push_back(resp);
        self.clone()
    }

    pub fn on_get(self: &Arc<Self>, resp: Result<Prediction>) -> Arc<Self> {
        self.gets.lock().unwrap().push_back(resp);
        self.clone()
    }

    pub fn on_get_repeated(self: &Arc<Self>, n: usize, status: &str) -> Arc<Self> {
        for _ in 0..n {
            self.on_get(Ok(prediction("abc123", status)));
        }
        self.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> usize {
        self.queried.lock().unwrap().len()
    }
}

impl PredictionApi for ScriptedApi {
    fn create<'a>(
        &'a self,
        request: &'a CreatePrediction,
        mode: SubmitMode,
    ) -> ApiFuture<'a, Prediction> {
        self.created.lock().unwrap().push((request.clone(), mode));
        let resp = self
            .creates
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected create call");
        Box::pin(async move { resp })
    }

    fn get<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Prediction> {
        self.queried.lock().unwrap().push(id.to_string());
        let resp = self
            .gets
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected status query");
        Box::pin(async move { resp })
    }
}

/// Returns immediately and remembers every requested wait.
#[derive(Default)]
pub struct RecordingClock {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for RecordingClock {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.sleeps.lock().unwrap().push(duration);
        Box::pin(async {})
    }
}
