pub mod chat_log;
pub mod commands;
pub mod render;
