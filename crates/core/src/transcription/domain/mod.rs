pub mod transcription_provider;
pub mod transliterator;
pub mod word;
