//! Summaries of recent report trends from a text-generation service.
//!
//! The bridge only formats weekly aggregates into a prompt and hands the
//! service's answer back unchanged. Aggregation itself lives in
//! [`crate::views::trends`].

pub mod client;

pub use client::{ChatCompletionsClient, ClientConfig};

use crate::error::WatchResult;
use crate::models::{Report, WeeklyAggregate};
use crate::views::trends;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Message in the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One text-generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// A service that turns a request into free text.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> WatchResult<String>;
}

/// Settings applied to every summary request.
#[derive(Debug, Clone)]
pub struct SummarySettings {
    /// How many of the most recent weekly buckets to include.
    pub recent_weeks: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            recent_weeks: 12,
            max_tokens: 300,
            temperature: 0.2,
        }
    }
}

/// Forwards aggregated report data to a [`TextGenerator`].
pub struct SummarizerBridge<G> {
    generator: G,
    settings: SummarySettings,
}

impl<G: TextGenerator> SummarizerBridge<G> {
    pub fn new(generator: G, settings: SummarySettings) -> Self {
        Self {
            generator,
            settings,
        }
    }

    /// Summarize the most recent weeks of reports for `zipcode`.
    ///
    /// A zip code with no data still produces a request, with an empty data
    /// section. Service failures come back as upstream or configuration
    /// errors and are never retried.
    pub async fn summarize(&self, reports: &[Report], zipcode: &str) -> WatchResult<String> {
        let view = trends(reports, 0);
        let recent = view.recent(zipcode, self.settings.recent_weeks);
        info!(
            "Requesting summary for zip {} over {} weekly buckets",
            zipcode,
            recent.len()
        );

        let request = self.build_request(zipcode, &recent)?;
        self.generator.generate(&request).await
    }

    /// Build the request for `zipcode` from its weekly buckets.
    pub fn build_request(
        &self,
        zipcode: &str,
        buckets: &[WeeklyAggregate],
    ) -> WatchResult<GenerationRequest> {
        let instruction = format!(
            "You are analyzing water quality reports for ZIP code {}.\n\
             Summarize the major issues, repeated trends, and any areas of concern.",
            zipcode
        );
        let data = format!("Report data: {}", serde_json::to_string(buckets)?);

        Ok(GenerationRequest {
            messages: vec![ChatMessage::system(instruction), ChatMessage::user(data)],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        })
    }
}
