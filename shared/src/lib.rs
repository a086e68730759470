//! Shared types for the queue management system
//!
//! Data models and DTOs used by both the server and any in-process
//! clients (kiosk, counter dashboard, display screens):
//!
//! - **模型** (`models`): Category, Ticket, Settings, User
//! - **请求/响应** (`client`): login and user DTOs
//! - **工具** (`util`): timestamp helpers

pub mod client;
pub mod models;
pub mod util;

// Re-export the models used on nearly every API surface
pub use models::{
    Category, CategoryCreate, CategoryDeleteResult, CategoryUpdate, CurrentTickets, Ticket,
    TicketCall, TicketCreate, TicketStatus, User, UserRole,
};
