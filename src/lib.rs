//! Detoxa - quality-gated rewrite selection for text detoxification
//!
//! Rewrites toxic text through LLM generators, validates every candidate
//! against a content-preservation gate, and selects the best rewrite per
//! sample by lexicon residue and a composite quality score.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod ensemble;
pub mod gate;
pub mod generators;
pub mod lexicon;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod refine;
pub mod reporters;
pub mod scoring;
pub mod textutil;
