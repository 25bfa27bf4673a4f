//! Komorebi core library: conversation store, command routing, and the completion
//! gateway with model fallback, shared by the gateway server and chat front ends.

pub mod chat;
pub mod client;
pub mod command;
pub mod completion;
pub mod config;
pub mod conversation;
pub mod gateway;
pub mod init;
pub mod llm;
