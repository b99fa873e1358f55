use crate::domain::SessionId;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error("session {0} already exists")]
    AlreadyExists(SessionId),
}
