//! Registration eligibility rules
//!
//! Pure decision function: given snapshots of the user, the chosen team and
//! the tournament, return allow/deny with a typed reason. No side effects, so
//! the same function serves the on-chain register instruction and off-chain
//! preflight (UI "Join" button state).

use serde::{Deserialize, Serialize};

/// Game mode of a tournament
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    /// Single player per team
    Solo,
    /// Two players minimum
    Duo,
    /// Four players minimum
    Squad,
}

impl GameType {
    /// Smallest roster a team needs to enter this mode.
    pub fn min_roster(self) -> u8 {
        match self {
            GameType::Solo => 1,
            GameType::Duo => 2,
            GameType::Squad => 4,
        }
    }
}

/// Identity-provider snapshot of the requesting user, resolved once per
/// request by the caller. Never read from ambient state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// Administrative hold
    pub frozen: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    /// Number of teams the user currently leads or belongs to
    pub team_count: u8,
    /// Spendable wallet balance in minor units
    pub balance: u64,
}

/// Snapshot of the team the user is joining with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    /// Members currently on the roster (leader included)
    pub roster_size: u8,
    /// Whether the requesting user is on this roster
    pub user_is_member: bool,
}

/// Snapshot of the target tournament
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub game_type: GameType,
    /// Entry fee in minor units
    pub entry_fee: u64,
    /// Tournament is accepting registrations (status gate)
    pub open_for_registration: bool,
    pub registered_teams: u32,
    pub max_teams: u32,
}

/// Complete input to one eligibility evaluation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityInput {
    pub user: UserSnapshot,
    pub team: TeamSnapshot,
    pub tournament: TournamentSnapshot,
    /// Ban registry hit for the user against the tournament's organization
    pub user_banned: bool,
    /// Ban registry hit for the chosen team
    pub team_banned: bool,
    /// A registration for (tournament, team) already exists
    pub already_registered: bool,
}

/// Closed set of deny reasons, safe to display verbatim
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenyReason {
    AccountFrozen,
    VerificationRequired,
    TeamRequired,
    OrganizationBanned,
    AlreadyRegistered,
    RegistrationClosed,
    TournamentFull,
    InsufficientTeamMembers,
    InsufficientBalance,
}

impl DenyReason {
    /// User-facing message for this reason.
    pub fn message(self) -> &'static str {
        match self {
            DenyReason::AccountFrozen => "Account is frozen by an administrator",
            DenyReason::VerificationRequired => "Email and phone verification required",
            DenyReason::TeamRequired => "You must belong to the team you register with",
            DenyReason::OrganizationBanned => "You or your team are banned by this organization",
            DenyReason::AlreadyRegistered => "This team is already registered for the tournament",
            DenyReason::RegistrationClosed => "Tournament is not accepting registrations",
            DenyReason::TournamentFull => "Tournament has reached its team limit",
            DenyReason::InsufficientTeamMembers => "Team roster is below the minimum for this game mode",
            DenyReason::InsufficientBalance => "Wallet balance does not cover the entry fee",
        }
    }
}

/// Outcome of one evaluation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// Evaluate a registration attempt.
///
/// Checks run in a fixed order and the first failing check wins, so callers
/// always see the same reason for the same state. Read-only: does not reserve
/// funds and is safe to call repeatedly.
pub fn evaluate(input: &EligibilityInput) -> Decision {
    let user = &input.user;
    let team = &input.team;
    let tournament = &input.tournament;

    if user.frozen {
        return Decision::Deny(DenyReason::AccountFrozen);
    }

    if !user.email_verified || !user.phone_verified {
        return Decision::Deny(DenyReason::VerificationRequired);
    }

    if user.team_count == 0 || !team.user_is_member {
        return Decision::Deny(DenyReason::TeamRequired);
    }

    if input.user_banned || input.team_banned {
        return Decision::Deny(DenyReason::OrganizationBanned);
    }

    if input.already_registered {
        return Decision::Deny(DenyReason::AlreadyRegistered);
    }

    if !tournament.open_for_registration {
        return Decision::Deny(DenyReason::RegistrationClosed);
    }

    if tournament.registered_teams >= tournament.max_teams {
        return Decision::Deny(DenyReason::TournamentFull);
    }

    if team.roster_size < tournament.game_type.min_roster() {
        return Decision::Deny(DenyReason::InsufficientTeamMembers);
    }

    if user.balance < tournament.entry_fee {
        return Decision::Deny(DenyReason::InsufficientBalance);
    }

    Decision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verified, unfrozen user with balance 500 and a squad of 4 joining a
    /// squad tournament with entry fee 50.
    fn passing_input() -> EligibilityInput {
        EligibilityInput {
            user: UserSnapshot {
                frozen: false,
                email_verified: true,
                phone_verified: true,
                team_count: 1,
                balance: 500,
            },
            team: TeamSnapshot {
                roster_size: 4,
                user_is_member: true,
            },
            tournament: TournamentSnapshot {
                game_type: GameType::Squad,
                entry_fee: 50,
                open_for_registration: true,
                registered_teams: 3,
                max_teams: 16,
            },
            user_banned: false,
            team_banned: false,
            already_registered: false,
        }
    }

    #[test]
    fn test_roster_minimums() {
        assert_eq!(GameType::Solo.min_roster(), 1);
        assert_eq!(GameType::Duo.min_roster(), 2);
        assert_eq!(GameType::Squad.min_roster(), 4);
    }

    #[test]
    fn test_happy_path_allows() {
        assert_eq!(evaluate(&passing_input()), Decision::Allow);
        assert!(evaluate(&passing_input()).is_allowed());
    }

    #[test]
    fn test_frozen_account_denied() {
        let mut input = passing_input();
        input.user.frozen = true;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::AccountFrozen));
    }

    #[test]
    fn test_verification_required() {
        let mut input = passing_input();
        input.user.email_verified = false;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::VerificationRequired));

        let mut input = passing_input();
        input.user.phone_verified = false;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::VerificationRequired));
    }

    #[test]
    fn test_team_required() {
        let mut input = passing_input();
        input.user.team_count = 0;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::TeamRequired));

        let mut input = passing_input();
        input.team.user_is_member = false;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::TeamRequired));
    }

    #[test]
    fn test_banned_user_denied() {
        let mut input = passing_input();
        input.user_banned = true;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::OrganizationBanned));
    }

    #[test]
    fn test_banned_team_denied() {
        let mut input = passing_input();
        input.team_banned = true;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::OrganizationBanned));
    }

    #[test]
    fn test_ban_precedence_over_later_checks() {
        // Ban wins even when roster and balance checks would also fail.
        let mut input = passing_input();
        input.team_banned = true;
        input.team.roster_size = 1;
        input.user.balance = 0;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::OrganizationBanned));
    }

    #[test]
    fn test_already_registered() {
        let mut input = passing_input();
        input.already_registered = true;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::AlreadyRegistered));
    }

    #[test]
    fn test_registration_closed() {
        let mut input = passing_input();
        input.tournament.open_for_registration = false;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::RegistrationClosed));
    }

    #[test]
    fn test_tournament_full() {
        let mut input = passing_input();
        input.tournament.registered_teams = input.tournament.max_teams;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::TournamentFull));
    }

    #[test]
    fn test_duo_with_one_member_denied() {
        let mut input = passing_input();
        input.tournament.game_type = GameType::Duo;
        input.team.roster_size = 1;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::InsufficientTeamMembers));
    }

    #[test]
    fn test_squad_with_three_denied_four_allowed() {
        let mut input = passing_input();
        input.team.roster_size = 3;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::InsufficientTeamMembers));

        input.team.roster_size = 4;
        assert_eq!(evaluate(&input), Decision::Allow);
    }

    #[test]
    fn test_insufficient_balance() {
        let mut input = passing_input();
        input.user.balance = 49;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::InsufficientBalance));
    }

    #[test]
    fn test_exact_balance_allowed() {
        let mut input = passing_input();
        input.user.balance = input.tournament.entry_fee;
        assert_eq!(evaluate(&input), Decision::Allow);
    }

    #[test]
    fn test_check_order_is_deterministic() {
        // Everything fails at once; the first check in the fixed order wins.
        let mut input = passing_input();
        input.user.frozen = true;
        input.user.email_verified = false;
        input.user.team_count = 0;
        input.user_banned = true;
        input.already_registered = true;
        input.team.roster_size = 1;
        input.user.balance = 0;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::AccountFrozen));

        input.user.frozen = false;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::VerificationRequired));

        input.user.email_verified = true;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::TeamRequired));

        input.user.team_count = 1;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::OrganizationBanned));

        input.user_banned = false;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::AlreadyRegistered));

        input.already_registered = false;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::InsufficientTeamMembers));

        input.team.roster_size = 4;
        assert_eq!(evaluate(&input), Decision::Deny(DenyReason::InsufficientBalance));
    }

    #[test]
    fn test_evaluate_has_no_side_effects() {
        let input = passing_input();
        let first = evaluate(&input);
        let second = evaluate(&input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_deny_messages_nonempty() {
        let reasons = [
            DenyReason::AccountFrozen,
            DenyReason::VerificationRequired,
            DenyReason::TeamRequired,
            DenyReason::OrganizationBanned,
            DenyReason::AlreadyRegistered,
            DenyReason::RegistrationClosed,
            DenyReason::TournamentFull,
            DenyReason::InsufficientTeamMembers,
            DenyReason::InsufficientBalance,
        ];
        for reason in reasons {
            assert!(!reason.message().is_empty());
        }
    }
}
