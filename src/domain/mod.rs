mod chat_session;
mod chunk;
mod document;
mod message;
mod message_id;
mod message_role;
mod session_id;

pub use chat_session::{ChatSession, DocumentOverview, SessionDocument, SessionOverview};
pub use chunk::Chunk;
pub use document::{ContentType, Document, DocumentId};
pub use message::Message;
pub use message_id::MessageId;
pub use message_role::MessageRole;
pub use session_id::SessionId;
