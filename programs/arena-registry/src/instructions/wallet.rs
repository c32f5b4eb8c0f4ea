//! Wallet and ledger instructions
//!
//! The wallet balance is mutated in exactly two places: the debit path
//! (`withdraw`, the entry-fee debit in `register_team`, refunds/payouts) and
//! the first successful `complete_credit` for a gateway order. Everything is
//! backed by an immutable `LedgerEntry`, so the balance always equals the
//! signed sum of completed entries.

use anchor_lang::prelude::*;

use registry_logic::order_ref_hash;

use crate::error::RegistryError;
use crate::events::BalanceChanged;
use crate::state::{Config, LedgerEntry, LedgerKind, LedgerStatus, UserProfile, WalletAccount};

/// Create the identity-snapshot profile and the wallet for a user
#[derive(Accounts)]
pub struct InitUser<'info> {
    #[account(
        init,
        payer = user,
        space = UserProfile::LEN,
        seeds = [b"profile", user.key().as_ref()],
        bump
    )]
    pub profile: Account<'info, UserProfile>,

    #[account(
        init,
        payer = user,
        space = WalletAccount::LEN,
        seeds = [b"wallet", user.key().as_ref()],
        bump
    )]
    pub wallet: Account<'info, WalletAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn init_user(ctx: Context<InitUser>) -> Result<()> {
    let profile = &mut ctx.accounts.profile;
    let wallet = &mut ctx.accounts.wallet;
    let clock = Clock::get()?;

    profile.user = ctx.accounts.user.key();
    profile.frozen = false;
    profile.email_verified = false;
    profile.phone_verified = false;
    profile.team_count = 0;
    profile.created_at = clock.unix_timestamp;
    profile.bump = ctx.bumps.profile;

    wallet.user = ctx.accounts.user.key();
    wallet.balance = 0;
    wallet.entry_count = 0;
    wallet.updated_at = clock.unix_timestamp;
    wallet.bump = ctx.bumps.wallet;

    msg!("Profile and wallet created for {}", wallet.user);
    Ok(())
}

/// Record a gateway deposit order as a pending credit.
///
/// The credit entry PDA is seeded by the sha256 of the order id, so creating
/// the same order twice fails at init: the order id is the idempotency key
/// for the whole deposit flow. No balance effect until the gateway confirms.
#[derive(Accounts)]
#[instruction(amount: u64, external_ref: String)]
pub struct CreateDepositOrder<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [b"wallet", user.key().as_ref()],
        bump = wallet.bump
    )]
    pub wallet: Account<'info, WalletAccount>,

    #[account(
        init,
        payer = user,
        space = LedgerEntry::LEN,
        seeds = [b"credit", order_ref_hash(&external_ref).as_ref()],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn create_deposit_order(
    ctx: Context<CreateDepositOrder>,
    amount: u64,
    external_ref: String,
) -> Result<()> {
    let config = &ctx.accounts.config;
    let entry = &mut ctx.accounts.entry;
    let clock = Clock::get()?;

    require!(
        amount > 0 && amount <= i64::MAX as u64,
        RegistryError::InvalidAmount
    );
    require!(amount >= config.min_deposit, RegistryError::AmountBelowMinimum);

    entry.user = ctx.accounts.user.key();
    entry.kind = LedgerKind::Deposit;
    entry.amount = amount as i64;
    entry.status = LedgerStatus::Pending;
    entry.set_external_ref(&external_ref)?;
    entry.created_at = clock.unix_timestamp;
    entry.bump = ctx.bumps.entry;

    msg!(
        "Deposit order '{}' for {} created: {} pending",
        external_ref,
        entry.user,
        amount
    );
    Ok(())
}

/// Complete a pending gateway credit. Gateway-authority signed.
#[derive(Accounts)]
#[instruction(external_ref: String)]
pub struct CompleteCredit<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = gateway_authority @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"wallet", entry.user.as_ref()],
        bump = wallet.bump
    )]
    pub wallet: Account<'info, WalletAccount>,

    #[account(
        mut,
        seeds = [b"credit", order_ref_hash(&external_ref).as_ref()],
        bump = entry.bump
    )]
    pub entry: Account<'info, LedgerEntry>,

    pub gateway_authority: Signer<'info>,
}

pub fn complete_credit(ctx: Context<CompleteCredit>, external_ref: String) -> Result<()> {
    let wallet = &mut ctx.accounts.wallet;
    let entry = &mut ctx.accounts.entry;
    let clock = Clock::get()?;

    match entry.status {
        LedgerStatus::Completed => {
            // Replayed webhook or a verification call racing it. Credited
            // exactly once already; an audit line, not an error.
            msg!("Credit '{}' already completed, no-op", external_ref);
            Ok(())
        }
        LedgerStatus::Failed => Err(RegistryError::CreditNotPending.into()),
        LedgerStatus::Pending => {
            entry.status = LedgerStatus::Completed;
            wallet.balance = wallet
                .balance
                .checked_add(entry.amount as u64)
                .ok_or(RegistryError::Overflow)?;
            wallet.updated_at = clock.unix_timestamp;

            emit!(BalanceChanged {
                user: entry.user,
                wallet: wallet.key(),
                entry: entry.key(),
                kind: entry.kind,
                amount: entry.amount,
                balance_after: wallet.balance,
                slot: clock.slot,
            });

            msg!(
                "Credit '{}' completed: {} to {}, balance {}",
                external_ref,
                entry.amount,
                entry.user,
                wallet.balance
            );
            Ok(())
        }
    }
}

/// Mark a pending gateway credit as failed. Gateway-authority signed.
#[derive(Accounts)]
#[instruction(external_ref: String)]
pub struct FailCredit<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = gateway_authority @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"credit", order_ref_hash(&external_ref).as_ref()],
        bump = entry.bump
    )]
    pub entry: Account<'info, LedgerEntry>,

    pub gateway_authority: Signer<'info>,
}

pub fn fail_credit(ctx: Context<FailCredit>, external_ref: String) -> Result<()> {
    let entry = &mut ctx.accounts.entry;

    match entry.status {
        LedgerStatus::Completed => Err(RegistryError::CreditNotPending.into()),
        LedgerStatus::Failed => {
            msg!("Credit '{}' already failed, no-op", external_ref);
            Ok(())
        }
        LedgerStatus::Pending => {
            entry.status = LedgerStatus::Failed;
            msg!("Credit '{}' marked failed, no balance effect", external_ref);
            Ok(())
        }
    }
}

/// Withdraw from the wallet balance.
///
/// The atomic reserve-and-debit: the balance check, the decrement and the
/// completed withdrawal entry land in one transaction. The off-chain operator
/// pays out externally against the emitted event.
#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump
    )]
    pub config: Account<'info, Config>,

    #[account(
        seeds = [b"profile", user.key().as_ref()],
        bump = profile.bump
    )]
    pub profile: Account<'info, UserProfile>,

    #[account(
        mut,
        seeds = [b"wallet", user.key().as_ref()],
        bump = wallet.bump
    )]
    pub wallet: Account<'info, WalletAccount>,

    #[account(
        init,
        payer = user,
        space = LedgerEntry::LEN,
        seeds = [b"ledger", wallet.key().as_ref(), wallet.entry_count.to_le_bytes().as_ref()],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
    let config = &ctx.accounts.config;
    let profile = &ctx.accounts.profile;
    let wallet = &mut ctx.accounts.wallet;
    let entry = &mut ctx.accounts.entry;
    let clock = Clock::get()?;

    require!(!profile.frozen, RegistryError::AccountFrozen);
    require!(amount > 0, RegistryError::InvalidAmount);
    require!(amount >= config.min_withdrawal, RegistryError::AmountBelowMinimum);
    require!(wallet.balance >= amount, RegistryError::InsufficientFunds);

    wallet.balance -= amount;
    wallet.entry_count = wallet
        .entry_count
        .checked_add(1)
        .ok_or(RegistryError::Overflow)?;
    wallet.updated_at = clock.unix_timestamp;

    entry.user = ctx.accounts.user.key();
    entry.kind = LedgerKind::Withdrawal;
    entry.amount = -(amount as i64);
    entry.status = LedgerStatus::Completed;
    entry.created_at = clock.unix_timestamp;
    entry.bump = ctx.bumps.entry;

    emit!(BalanceChanged {
        user: entry.user,
        wallet: wallet.key(),
        entry: entry.key(),
        kind: entry.kind,
        amount: entry.amount,
        balance_after: wallet.balance,
        slot: clock.slot,
    });

    msg!(
        "Withdrew {} from {}, balance {}",
        amount,
        entry.user,
        wallet.balance
    );
    Ok(())
}
