pub mod alignment_config;
pub mod even_distributor;
pub mod lyrics_aligner;
pub mod text_normalizer;
pub mod transcript_segmenter;
