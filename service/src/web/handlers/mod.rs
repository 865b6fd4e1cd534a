// stagecoach_service/src/web/handlers/mod.rs

pub mod metrics_handlers;
pub mod webhook_handlers;
