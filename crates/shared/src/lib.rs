//! Types shared by every AskForHelp crate: the chat transcript, the host
//! metadata embedded in tickets, and the settings surface.

pub mod metadata;
pub mod settings;
pub mod transcript;

pub use metadata::SystemMetadata;
pub use transcript::{Message, Sender, Transcript};
