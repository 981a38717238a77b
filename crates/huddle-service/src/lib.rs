//! # huddle-service
//!
//! Application layer: request context, ports, DTOs and use-case services.

pub mod dto;
pub mod ports;
pub mod request_context;
pub mod services;

pub use request_context::{CancellationToken, ContextError, RequestContext};
pub use services::{
    tag_pipeline, InviteService, MessageService, ReactionService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, TagQueue, TagWorker, WorkspaceService,
};
