use std::sync::Arc;

use crate::models::{MealSubmission, SubmissionOutcome, UploadedImage};
use crate::services::{prompt, InferenceService};

/// Runs one submit: check input, build the request, call the model.
pub struct SubmissionHandler {
    inference: Arc<dyn InferenceService>,
}

impl SubmissionHandler {
    pub fn new(inference: Arc<dyn InferenceService>) -> Self {
        Self { inference }
    }

    pub async fn submit(&self, submission: &MealSubmission) -> SubmissionOutcome {
        let Some(image) = submission.image.as_ref() else {
            log::info!("🚫 Submit without an image, skipping inference");
            return SubmissionOutcome::MissingImage;
        };

        log::info!("🍽️ Calculating calories for {}", summary(image, &submission.context));
        log::debug!("📝 User context: '{}'", submission.context);

        let request = prompt::assemble(image, &submission.context);

        match self.inference.generate(&request).await {
            Ok(text) => SubmissionOutcome::Success(text),
            Err(e) => {
                log::error!("❌ Inference failed: {:#}", e);
                SubmissionOutcome::Failed(format!("{:#}", e))
            }
        }
    }
}

/// Info-level description of a submit. Sizes only, never the user's text.
fn summary(image: &UploadedImage, context: &str) -> String {
    format!(
        "{} ({}, {} bytes, {} context chars)",
        image.file_name.as_deref().unwrap_or("unnamed upload"),
        image.media_type,
        image.bytes.len(),
        context.chars().count()
    )
}
