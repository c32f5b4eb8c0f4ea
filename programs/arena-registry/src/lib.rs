//! Arena Registry - Tournament Registration & Wallet Ledger
//!
//! A Solana smart contract for paid e-sports tournaments: custodial wallet
//! balances backed by an append-only ledger, gateway deposit reconciliation,
//! organization bans and atomic register-and-pay.

use anchor_lang::prelude::*;

mod error;
mod events;
mod instructions;
mod state;

use instructions::*;
pub use state::{BanSubject, GameType, LedgerKind, LedgerStatus, TournamentStatus};

#[cfg(not(feature = "no-entrypoint"))]
use solana_security_txt::security_txt;

#[cfg(not(feature = "no-entrypoint"))]
security_txt! {
    name: "Arena Registry",
    project_url: "https://arenaregistry.gg",
    contacts: "email:security@arenaregistry.gg",
    policy: "https://arenaregistry.gg/security",
    preferred_languages: "en"
}

declare_id!("8RegKQy61r1K8dLY1Z1fsJLu3PBN5tTLfZFoEAhejDYa");

#[program]
pub mod arena_registry {
    use super::*;

    /// Initialize the global config (one-time setup)
    pub fn initialize_config(
        ctx: Context<InitializeConfig>,
        params: InitializeConfigParams,
    ) -> Result<()> {
        instructions::admin::initialize_config(ctx, params)
    }

    /// Update config parameters (admin only)
    pub fn update_config(ctx: Context<UpdateConfig>, params: UpdateConfigParams) -> Result<()> {
        instructions::admin::update_config(ctx, params)
    }

    /// Freeze or unfreeze a user account (admin only)
    pub fn set_account_frozen(ctx: Context<SetAccountFrozen>, frozen: bool) -> Result<()> {
        instructions::admin::set_account_frozen(ctx, frozen)
    }

    /// Record identity-provider verification flags (operator only)
    pub fn set_verification(
        ctx: Context<SetVerification>,
        email_verified: bool,
        phone_verified: bool,
    ) -> Result<()> {
        instructions::admin::set_verification(ctx, email_verified, phone_verified)
    }

    /// Ban a user or team from an organization's tournaments (operator only)
    pub fn place_ban(
        ctx: Context<PlaceBan>,
        organization: String,
        subject: Pubkey,
        kind: BanSubject,
    ) -> Result<()> {
        instructions::admin::place_ban(ctx, organization, subject, kind)
    }

    /// Lift an organization ban (operator only)
    pub fn lift_ban(ctx: Context<LiftBan>) -> Result<()> {
        instructions::admin::lift_ban(ctx)
    }

    /// Remove a registration and refund the entry fee (admin only)
    pub fn admin_remove_registration(ctx: Context<AdminRemoveRegistration>) -> Result<()> {
        instructions::admin::admin_remove_registration(ctx)
    }

    /// Create the identity profile and wallet for the signer
    pub fn init_user(ctx: Context<InitUser>) -> Result<()> {
        instructions::wallet::init_user(ctx)
    }

    /// Record a gateway deposit order as a pending credit
    pub fn create_deposit_order(
        ctx: Context<CreateDepositOrder>,
        amount: u64,
        external_ref: String,
    ) -> Result<()> {
        instructions::wallet::create_deposit_order(ctx, amount, external_ref)
    }

    /// Complete a pending credit after gateway verification (gateway only)
    pub fn complete_credit(ctx: Context<CompleteCredit>, external_ref: String) -> Result<()> {
        instructions::wallet::complete_credit(ctx, external_ref)
    }

    /// Mark a pending credit as failed (gateway only)
    pub fn fail_credit(ctx: Context<FailCredit>, external_ref: String) -> Result<()> {
        instructions::wallet::fail_credit(ctx, external_ref)
    }

    /// Debit the wallet for an external payout
    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        instructions::wallet::withdraw(ctx, amount)
    }

    /// Create a team led by the signer
    pub fn create_team(ctx: Context<CreateTeam>, name: String) -> Result<()> {
        instructions::team::create_team(ctx, name)
    }

    /// Add a member to the roster (leader only)
    pub fn add_team_member(ctx: Context<AddTeamMember>, member: Pubkey) -> Result<()> {
        instructions::team::add_team_member(ctx, member)
    }

    /// Remove a member from the roster (leader only)
    pub fn remove_team_member(ctx: Context<RemoveTeamMember>, member: Pubkey) -> Result<()> {
        instructions::team::remove_team_member(ctx, member)
    }

    /// Create a tournament (operator only)
    pub fn create_tournament(
        ctx: Context<CreateTournament>,
        params: CreateTournamentParams,
    ) -> Result<()> {
        instructions::tournament::create_tournament(ctx, params)
    }

    /// Advance tournament status (operator only)
    pub fn set_tournament_status(
        ctx: Context<SetTournamentStatus>,
        status: TournamentStatus,
    ) -> Result<()> {
        instructions::tournament::set_tournament_status(ctx, status)
    }

    /// Register a team: eligibility check, registration write and entry-fee
    /// debit as one transaction
    pub fn register_team(ctx: Context<RegisterTeam>) -> Result<()> {
        instructions::tournament::register_team(ctx)
    }

    /// Pay a prize from the tournament pool to a winner's wallet (operator only)
    pub fn pay_prize(ctx: Context<PayPrize>, amount: u64, external_ref: String) -> Result<()> {
        instructions::tournament::pay_prize(ctx, amount, external_ref)
    }
}
