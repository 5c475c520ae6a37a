pub mod devanagari_transliterator;
pub mod elevenlabs_provider;
pub mod whisper_provider;
