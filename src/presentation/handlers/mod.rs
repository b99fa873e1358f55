mod document;
mod error;
mod evaluate;
mod extract;
mod health;
mod messages;
mod sessions;
mod summary;

pub use document::upload_document_handler;
pub use error::ErrorResponse;
pub use evaluate::evaluate_handler;
pub use health::health_handler;
pub use messages::{ask_handler, history_handler};
pub use sessions::{create_session_handler, delete_session_handler, get_session_handler};
pub use summary::summarize_handler;
