pub mod annotator;
pub mod app;
