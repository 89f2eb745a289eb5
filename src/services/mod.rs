// src/services/mod.rs

pub mod extraction;
pub mod profiler;
pub mod settings;

pub use extraction::{ExtractedDocument, ExtractionError, PdfTextExtractor, TextExtractor};
pub use profiler::{
    JobContext, OpenAiProfiler, ProfilerError, ResumeProfile, ResumeProfiler, PLACEHOLDER_EMAIL,
};
pub use settings::SettingsService;
