//! Admin and operator instructions
//!
//! Configuration, identity-snapshot maintenance (the identity provider and
//! administrative tooling boundary) and the ban registry. The core only reads
//! what these write.

use anchor_lang::prelude::*;

use crate::error::RegistryError;
use crate::events::{BalanceChanged, BanLifted, BanPlaced};
use crate::state::{
    organization_hash, BanSubject, Config, LedgerEntry, LedgerKind, LedgerStatus, OrganizationBan,
    Registration, Team, Tournament, UserProfile, WalletAccount, DEFAULT_MIN_DEPOSIT,
    DEFAULT_MIN_WITHDRAWAL, MAX_NAME_LEN,
};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeConfigParams {
    pub operator: Pubkey,
    pub gateway_authority: Pubkey,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct UpdateConfigParams {
    pub operator: Option<Pubkey>,
    pub gateway_authority: Option<Pubkey>,
    pub min_deposit: Option<u64>,
    pub min_withdrawal: Option<u64>,
}

/// Initialize global config (one-time setup)
#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = Config::LEN,
        seeds = [b"config"],
        bump
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_config(
    ctx: Context<InitializeConfig>,
    params: InitializeConfigParams,
) -> Result<()> {
    let config = &mut ctx.accounts.config;

    config.admin = ctx.accounts.admin.key();
    config.operator = params.operator;
    config.gateway_authority = params.gateway_authority;
    config.min_deposit = DEFAULT_MIN_DEPOSIT;
    config.min_withdrawal = DEFAULT_MIN_WITHDRAWAL;
    config.next_tournament_id = 0;
    config.bump = ctx.bumps.config;

    msg!(
        "Config initialized by {}, operator = {}, gateway = {}",
        config.admin,
        config.operator,
        config.gateway_authority
    );

    Ok(())
}

/// Update config parameters
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        has_one = admin @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

pub fn update_config(ctx: Context<UpdateConfig>, params: UpdateConfigParams) -> Result<()> {
    let UpdateConfigParams {
        operator,
        gateway_authority,
        min_deposit,
        min_withdrawal,
    } = params;

    let config = &mut ctx.accounts.config;

    if let Some(op) = operator {
        config.operator = op;
    }

    if let Some(gateway) = gateway_authority {
        config.gateway_authority = gateway;
    }

    if let Some(min) = min_deposit {
        require!(min > 0, RegistryError::InvalidAmount);
        config.min_deposit = min;
    }

    if let Some(min) = min_withdrawal {
        require!(min > 0, RegistryError::InvalidAmount);
        config.min_withdrawal = min;
    }

    msg!("Config updated");
    Ok(())
}

/// Freeze or unfreeze a user account (administrative hold)
#[derive(Accounts)]
pub struct SetAccountFrozen<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = admin @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"profile", profile.user.as_ref()],
        bump = profile.bump
    )]
    pub profile: Account<'info, UserProfile>,

    pub admin: Signer<'info>,
}

pub fn set_account_frozen(ctx: Context<SetAccountFrozen>, frozen: bool) -> Result<()> {
    let profile = &mut ctx.accounts.profile;
    profile.frozen = frozen;

    msg!("User {} frozen = {}", profile.user, frozen);
    Ok(())
}

/// Record identity-provider verification flags for a user
#[derive(Accounts)]
pub struct SetVerification<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"profile", profile.user.as_ref()],
        bump = profile.bump
    )]
    pub profile: Account<'info, UserProfile>,

    pub operator: Signer<'info>,
}

pub fn set_verification(
    ctx: Context<SetVerification>,
    email_verified: bool,
    phone_verified: bool,
) -> Result<()> {
    let profile = &mut ctx.accounts.profile;
    profile.email_verified = email_verified;
    profile.phone_verified = phone_verified;

    msg!(
        "User {} verification: email = {}, phone = {}",
        profile.user,
        email_verified,
        phone_verified
    );
    Ok(())
}

/// Place an organization-level ban on a user or team
#[derive(Accounts)]
#[instruction(organization: String, subject: Pubkey)]
pub struct PlaceBan<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = operator,
        space = OrganizationBan::LEN,
        seeds = [b"ban", organization_hash(&organization).as_ref(), subject.as_ref()],
        bump
    )]
    pub ban: Account<'info, OrganizationBan>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn place_ban(
    ctx: Context<PlaceBan>,
    organization: String,
    subject: Pubkey,
    kind: BanSubject,
) -> Result<()> {
    require!(
        !organization.is_empty() && organization.len() <= MAX_NAME_LEN,
        RegistryError::InvalidName
    );

    let ban = &mut ctx.accounts.ban;
    let clock = Clock::get()?;

    ban.organization_hash = organization_hash(&organization);
    ban.subject = subject;
    ban.kind = kind;
    ban.placed_by = ctx.accounts.operator.key();
    ban.created_at = clock.unix_timestamp;
    ban.bump = ctx.bumps.ban;

    emit!(BanPlaced {
        organization_hash: ban.organization_hash,
        subject,
        kind,
        slot: clock.slot,
    });

    msg!("Ban placed by {} on {:?} {} for organization '{}'", ban.placed_by, kind, subject, organization);
    Ok(())
}

/// Lift an organization-level ban
#[derive(Accounts)]
pub struct LiftBan<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"ban", ban.organization_hash.as_ref(), ban.subject.as_ref()],
        bump = ban.bump,
        close = operator
    )]
    pub ban: Account<'info, OrganizationBan>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn lift_ban(ctx: Context<LiftBan>) -> Result<()> {
    let ban = &ctx.accounts.ban;
    let clock = Clock::get()?;

    emit!(BanLifted {
        organization_hash: ban.organization_hash,
        subject: ban.subject,
        slot: clock.slot,
    });

    msg!("Ban lifted from {}", ban.subject);
    Ok(())
}

/// Remove a registration (the only deletion path), refunding the entry fee
/// to the registrant's wallet as a reversal ledger entry.
#[derive(Accounts)]
pub struct AdminRemoveRegistration<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = admin @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"tournament", tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, Tournament>,

    pub team: Account<'info, Team>,

    #[account(
        mut,
        seeds = [b"registration", tournament.key().as_ref(), team.key().as_ref()],
        bump = registration.bump,
        has_one = tournament,
        has_one = team,
        close = registrant
    )]
    pub registration: Account<'info, Registration>,

    /// Registrant receives the closed account's rent
    /// CHECK: Validated via registration.user
    #[account(mut, address = registration.user @ RegistryError::AccountMismatch)]
    pub registrant: AccountInfo<'info>,

    /// Registrant's wallet, credited with the refund
    #[account(
        mut,
        seeds = [b"wallet", registration.user.as_ref()],
        bump = wallet.bump
    )]
    pub wallet: Account<'info, WalletAccount>,

    /// Reversal ledger entry backing the refund
    #[account(
        init,
        payer = admin,
        space = LedgerEntry::LEN,
        seeds = [b"ledger", wallet.key().as_ref(), wallet.entry_count.to_le_bytes().as_ref()],
        bump
    )]
    pub refund_entry: Account<'info, LedgerEntry>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn admin_remove_registration(ctx: Context<AdminRemoveRegistration>) -> Result<()> {
    let tournament = &mut ctx.accounts.tournament;
    let registration = &ctx.accounts.registration;
    let wallet = &mut ctx.accounts.wallet;
    let entry = &mut ctx.accounts.refund_entry;
    let clock = Clock::get()?;

    tournament.registered_teams = tournament
        .registered_teams
        .checked_sub(1)
        .ok_or(RegistryError::Overflow)?;

    // Reversal: the fee moves back from the prize pool to the wallet. The
    // original entry-fee debit stays in the history; the refund is its own
    // completed entry, keeping balance == sum of completed amounts.
    tournament.prize_pool = tournament
        .prize_pool
        .checked_sub(registration.paid_fee)
        .ok_or(RegistryError::InsufficientPrizePool)?;
    wallet.balance = wallet
        .balance
        .checked_add(registration.paid_fee)
        .ok_or(RegistryError::Overflow)?;
    wallet.entry_count = wallet
        .entry_count
        .checked_add(1)
        .ok_or(RegistryError::Overflow)?;
    wallet.updated_at = clock.unix_timestamp;

    entry.user = registration.user;
    entry.kind = LedgerKind::EntryFee;
    entry.amount = registration.paid_fee as i64;
    entry.status = LedgerStatus::Completed;
    entry.created_at = clock.unix_timestamp;
    entry.bump = ctx.bumps.refund_entry;

    emit!(BalanceChanged {
        user: registration.user,
        wallet: wallet.key(),
        entry: entry.key(),
        kind: entry.kind,
        amount: entry.amount,
        balance_after: wallet.balance,
        slot: clock.slot,
    });

    msg!(
        "Registration of team {} in tournament {} removed, {} refunded to {}",
        registration.team,
        tournament.id,
        registration.paid_fee,
        registration.user
    );
    Ok(())
}
