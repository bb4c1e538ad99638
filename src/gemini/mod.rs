// Gemini API client module
// Author: kelexine (https://github.com/kelexine)

mod client;

pub use client::{classify_error, GeminiClient};
