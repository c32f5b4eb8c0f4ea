//! Custom error codes

use anchor_lang::prelude::*;
use registry_logic::DenyReason;

#[error_code]
pub enum RegistryError {
    // Deny reasons: expected, user-facing, safe to display verbatim.
    #[msg("Account is frozen by an administrator")]
    AccountFrozen = 6000,

    #[msg("Email and phone verification required")]
    VerificationRequired = 6001,

    #[msg("You must belong to the team you register with")]
    TeamRequired = 6002,

    #[msg("You or your team are banned by this organization")]
    OrganizationBanned = 6003,

    #[msg("This team is already registered for the tournament")]
    AlreadyRegistered = 6004,

    #[msg("Tournament is not accepting registrations")]
    RegistrationClosed = 6005,

    #[msg("Tournament has reached its team limit")]
    TournamentFull = 6006,

    #[msg("Team roster is below the minimum for this game mode")]
    InsufficientTeamMembers = 6007,

    #[msg("Wallet balance does not cover the entry fee")]
    InsufficientBalance = 6008,

    // Validation and authorization.
    #[msg("Not authorized to perform this action")]
    Unauthorized = 6009,

    #[msg("Amount must be greater than zero")]
    InvalidAmount = 6010,

    #[msg("Amount is below the configured minimum")]
    AmountBelowMinimum = 6011,

    #[msg("Insufficient funds for operation")]
    InsufficientFunds = 6012,

    #[msg("Invalid tournament state for this action")]
    InvalidState = 6013,

    #[msg("Arithmetic overflow")]
    Overflow = 6014,

    // Team management.
    #[msg("Name is empty or too long")]
    InvalidName = 6015,

    #[msg("Team roster is full")]
    RosterFull = 6016,

    #[msg("User already belongs to the maximum number of teams")]
    TooManyTeams = 6017,

    #[msg("User is already on this roster")]
    AlreadyMember = 6018,

    #[msg("User is not on this roster")]
    NotTeamMember = 6019,

    #[msg("Team leader cannot be removed from the roster")]
    LeaderCannotLeave = 6020,

    // Ledger contract surface.
    #[msg("Ledger entry is not pending")]
    CreditNotPending = 6021,

    #[msg("Gateway order id is empty or too long")]
    InvalidExternalRef = 6022,

    #[msg("Prize pool does not cover this payout")]
    InsufficientPrizePool = 6023,

    #[msg("Derived account address mismatch")]
    AccountMismatch = 6024,
}

/// Map an evaluator deny reason onto the program error surface. The specific
/// reason is preserved end to end; nothing collapses into a generic failure.
pub fn deny_to_error(reason: DenyReason) -> RegistryError {
    match reason {
        DenyReason::AccountFrozen => RegistryError::AccountFrozen,
        DenyReason::VerificationRequired => RegistryError::VerificationRequired,
        DenyReason::TeamRequired => RegistryError::TeamRequired,
        DenyReason::OrganizationBanned => RegistryError::OrganizationBanned,
        DenyReason::AlreadyRegistered => RegistryError::AlreadyRegistered,
        DenyReason::RegistrationClosed => RegistryError::RegistrationClosed,
        DenyReason::TournamentFull => RegistryError::TournamentFull,
        DenyReason::InsufficientTeamMembers => RegistryError::InsufficientTeamMembers,
        DenyReason::InsufficientBalance => RegistryError::InsufficientBalance,
    }
}
