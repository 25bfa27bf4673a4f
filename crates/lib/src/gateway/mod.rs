//! Gateway: HTTP endpoints in front of the completion and image providers.
//!
//! Stateless per request: the caller sends the history it wants used as context.
//! `POST /api/chat` runs a completion turn with model fallback; `POST /api/image`
//! proxies one image generation.

mod error;
mod protocol;
mod server;

pub use error::GatewayError;
pub use protocol::{CompletionRequest, CompletionResponse, ErrorResponse, ImageRequest, ImageResponse};
pub use server::{router, run_gateway, serve, GatewayState};
