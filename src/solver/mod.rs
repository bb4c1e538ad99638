//! The AI gateway: sends a packaged image and the solve prompt to a
//! generative model and hands back its free-text answer.
//!
//! The remote model is reached through the [`GenerativeModel`] trait so the
//! HTTP client is constructed explicitly by the caller (credential included)
//! and can be swapped for an in-process model in tests.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use crate::error::GatewayError;
use crate::models::gemini::{Content, GenerateContentRequest, GenerateContentResponse, Part};
use crate::vision::ImagePart;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Instruction sent after the image on every solve request.
pub const SOLVE_PROMPT: &str = "Please solve this math image and provide:
1. Step-by-step breakdown
2. Solution

Format like this:
Step-by-step breakdown:
1. [calculation] = [result]
2. [calculation] = [result]

Solution: [Number]
";

/// A remote model that accepts multimodal parts and returns generated content.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Model identifier, for logs and health reporting.
    fn model_name(&self) -> &str;

    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError>;
}

/// Stateless gateway over one generative model.
#[derive(Clone)]
pub struct Solver {
    model: Arc<dyn GenerativeModel>,
}

impl Solver {
    pub fn new(model: impl GenerativeModel + 'static) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Send `[image[0], prompt]` to the model and return its text verbatim.
    pub async fn solve(&self, image: &[ImagePart], prompt: &str) -> Result<String, GatewayError> {
        let first = image
            .first()
            .ok_or_else(|| GatewayError::unknown("no image supplied"))?;

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::InlineData {
                    inline_data: first.to_inline_data(),
                },
                Part::text(prompt),
            ])],
        };

        debug!(
            "Sending {} byte {} image to {}",
            first.data.len(),
            first.mime_type,
            self.model.model_name()
        );

        let response = self.model.generate_content(request).await?;

        match response.text() {
            Some(text) => {
                info!("Received answer ({} chars)", text.len());
                Ok(text)
            }
            None => Err(GatewayError::unknown(response.missing_text_reason())),
        }
    }

    /// Like [`Solver::solve`], but every failure becomes `Error: <message>`.
    pub async fn solve_to_text(&self, image: &[ImagePart], prompt: &str) -> String {
        match self.solve(image, prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Solve failed ({}): {}", e.kind.as_str(), e);
                e.display_text()
            }
        }
    }
}
