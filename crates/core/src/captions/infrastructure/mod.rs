pub mod webvtt;
