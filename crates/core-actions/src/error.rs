use thiserror::Error;

/// Input-driven failures. None of these cross the host boundary; the engine turns
/// them into a status message (when user visible) and a reset.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VimError {
    #[error("conflicting action in pending command")]
    ConflictingAction,
    #[error("text object requires an operator")]
    OperatorRequired,
    #[error("register must be selected before the action")]
    RegisterAfterAction,
    #[error("invalid register name: {0}")]
    InvalidRegister(char),
    #[error("no previous find to repeat")]
    NoFindToRepeat,
    #[error("target not found")]
    TargetNotFound,
    #[error("no room to move")]
    NoRoom,
    #[error("nothing in register {0}")]
    EmptyRegister(char),
}

impl VimError {
    /// Malformed commands are reported to the user; resolution failures are silent no-ops.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            VimError::ConflictingAction
                | VimError::OperatorRequired
                | VimError::RegisterAfterAction
                | VimError::InvalidRegister(_)
        )
    }
}
