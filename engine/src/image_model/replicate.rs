use log::debug;
use reqwest::Client;

use crate::{
    config::{ReplicateConfig, SubmitMode},
    error::{GenerationError, Result},
};

use super::{ApiFuture, CreatePrediction, Prediction, PredictionApi};

#[derive(Clone)]
pub struct ReplicateApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ReplicateApi {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(cfg: &ReplicateConfig) -> Result<Self> {
        let key = cfg
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey("Replicate"))?;
        Ok(Self::new(key, cfg.base_url.clone()))
    }

    fn predictions_url(&self) -> String {
        format!("{}/predictions", self.base_url)
    }

    async fn read_prediction(resp: reqwest::Response) -> Result<Prediction> {
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(GenerationError::from_response(status, body));
        }
        let prediction = serde_json::from_str::<Prediction>(&body)?;
        debug!("Prediction {}: {}", prediction.id, prediction.status);
        Ok(prediction)
    }
}

impl PredictionApi for ReplicateApi {
    fn create<'a>(
        &'a self,
        request: &'a CreatePrediction,
        mode: SubmitMode,
    ) -> ApiFuture<'a, Prediction> {
        Box::pin(async move {
            let mut req = self
                .client
                .post(self.predictions_url())
                .bearer_auth(&self.api_key)
                .json(request);
            if let Some(prefer) = mode.prefer_header() {
                req = req.header("Prefer", prefer);
            }

            let resp = req.send().await?;
            Self::read_prediction(resp).await
        })
    }

    fn get<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Prediction> {
        Box::pin(async move {
            let resp = self
                .client
                .get(format!("{}/{id}", self.predictions_url()))
                .bearer_auth(&self.api_key)
                .send()
                .await?;
            Self::read_prediction(resp).await
        })
    }
}
