//! Data models for the Gemini Generative Language API.
//!
//! Only the subset needed to send one image plus a text prompt and read the
//! answer back is modelled here.

// Author: kelexine (https://github.com/kelexine)

pub mod gemini;

pub use gemini::{
    Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part,
};
