//! Data models shared between server and clients

pub mod category;
pub mod settings;
pub mod ticket;
pub mod user;

// Re-exports
pub use category::{Category, CategoryCreate, CategoryDeleteResult, CategoryUpdate};
pub use settings::{AppSettings, SettingRow, overlay_defaults};
pub use ticket::{
    CurrentTickets, ResetResult, Ticket, TicketCall, TicketCreate, TicketRow, TicketStatus,
};
pub use user::{User, UserCreate, UserInfo, UserRole, UserUpdate};
