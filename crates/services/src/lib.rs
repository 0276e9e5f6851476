//! Side-effecting services behind the chat window: host metadata, ticket
//! rendering, file export, screenshots and email delivery.

pub mod email;
pub mod error;
pub mod export;
pub mod screenshot;
pub mod system_info;
pub mod ticket;

pub use email::EmailSender;
pub use error::{Result, ServiceError};
pub use export::{export_file_name, write_export, ExportKind};
pub use ticket::{format_ticket, ticket_id, TicketDraft};
