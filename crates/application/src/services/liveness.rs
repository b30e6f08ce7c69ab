use crate::ports::DoqSession;

/// True unless the session's lifetime has already ended. Never waits.
pub fn is_active<S: DoqSession>(session: &S) -> bool {
    !session.is_closed()
}
