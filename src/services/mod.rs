pub mod gemini; // Google Gemini generateContent client
pub mod inference;
pub mod prompt;

pub use gemini::GeminiClient;
pub use inference::InferenceService;
