use thiserror::Error;

/// Pacte rule violations returned to the caller of a store operation.
///
/// None of these corrupt state; the caller can retry once the precondition holds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacteError {
    #[error("Objective must be between 3 and 10 wins, got {0}")]
    InvalidObjective(i32),

    #[error("A pacte needs between 1 and 5 participants, got {0}")]
    InvalidParticipantCount(usize),

    #[error("User {0} is not registered")]
    UserNotRegistered(String),

    #[error("User {0} is already registered")]
    AlreadyRegistered(String),

    #[error("This game account is already linked to another user")]
    AccountAlreadyLinked,

    #[error("Riot ID '{0}' was not found")]
    AccountNotFound(String),

    #[error("User {0} already has a pacte in progress")]
    AlreadyInPacte(String),

    #[error("You are not in any pacte")]
    NotInPacte,

    #[error("Pacte #{0} does not exist")]
    PacteNotFound(i32),

    #[error("You are not a participant of this pacte")]
    NotAParticipant,

    #[error("You have already signed this pacte")]
    AlreadySigned,

    #[error("Pacte #{0} is already over")]
    PacteClosed(i32),

    #[error("You are already a member of this pacte")]
    AlreadyMember,

    #[error("This pacte already has 5 participants")]
    PacteFull,

    #[error("Cannot join a pacte once its streak has started")]
    StreakInProgress,

    #[error("User {0} is not an active participant of this pacte")]
    NotActiveParticipant(String),

    #[error("You cannot exclude yourself, leave the pacte instead")]
    CannotKickSelf,

    #[error("User {0} was not excluded from this pacte")]
    NotKicked(String),

    #[error("Pacte #{0} is not active")]
    NotActive(i32),

    #[error("Pacte #{0} is already finished")]
    AlreadyTerminal(i32),

    #[error("Pacte #{pacte_id} update rejected: {reason}")]
    InvariantViolation { pacte_id: i32, reason: String },
}
