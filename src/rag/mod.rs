//! Client for the external RAG HTTP API

mod client;

pub use client::{AskRequest, AskResponse, RagClient};
