//! Tournament lifecycle and registration instructions

use anchor_lang::prelude::*;
use anchor_lang::system_program::{
    allocate, assign, create_account, transfer, Allocate, Assign, CreateAccount, Transfer,
};

use registry_logic::{
    evaluate, Decision, EligibilityInput, TeamSnapshot, TournamentSnapshot, UserSnapshot,
};

use crate::error::{deny_to_error, RegistryError};
use crate::events::{BalanceChanged, RegistrationCreated};
use crate::state::{
    organization_hash, to_rules_game_type, Config, GameType, LedgerEntry, LedgerKind,
    LedgerStatus, Registration, Team, Tournament, TournamentStatus, UserProfile, WalletAccount,
    MAX_NAME_LEN,
};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct CreateTournamentParams {
    pub organization: String,
    pub game_type: GameType,
    /// Entry fee per team, minor units
    pub entry_fee: u64,
    pub max_teams: u32,
}

/// Create a tournament (operator only)
#[derive(Accounts)]
pub struct CreateTournament<'info> {
    #[account(
        mut,
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        init,
        payer = operator,
        space = Tournament::LEN,
        seeds = [b"tournament", config.next_tournament_id.to_le_bytes().as_ref()],
        bump
    )]
    pub tournament: Account<'info, Tournament>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn create_tournament(
    ctx: Context<CreateTournament>,
    params: CreateTournamentParams,
) -> Result<()> {
    let config = &mut ctx.accounts.config;
    let tournament = &mut ctx.accounts.tournament;
    let clock = Clock::get()?;

    require!(
        !params.organization.is_empty() && params.organization.len() <= MAX_NAME_LEN,
        RegistryError::InvalidName
    );
    require!(params.entry_fee > 0, RegistryError::InvalidAmount);
    require!(params.max_teams > 0, RegistryError::InvalidAmount);

    tournament.id = config.next_tournament_id;
    tournament.organization_hash = organization_hash(&params.organization);
    tournament.organization = params.organization;
    tournament.game_type = params.game_type;
    tournament.entry_fee = params.entry_fee;
    tournament.max_teams = params.max_teams;
    tournament.registered_teams = 0;
    tournament.prize_pool = 0;
    tournament.status = TournamentStatus::Upcoming;
    tournament.created_at = clock.unix_timestamp;
    tournament.bump = ctx.bumps.tournament;

    config.next_tournament_id = config
        .next_tournament_id
        .checked_add(1)
        .ok_or(RegistryError::Overflow)?;

    msg!(
        "Tournament {} created by '{}': {:?}, fee {}, max {} teams",
        tournament.id,
        tournament.organization,
        tournament.game_type,
        tournament.entry_fee,
        tournament.max_teams
    );
    Ok(())
}

/// Advance tournament status (operator only, forward transitions)
#[derive(Accounts)]
pub struct SetTournamentStatus<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"tournament", tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, Tournament>,

    pub operator: Signer<'info>,
}

pub fn set_tournament_status(
    ctx: Context<SetTournamentStatus>,
    status: TournamentStatus,
) -> Result<()> {
    let tournament = &mut ctx.accounts.tournament;

    let valid = matches!(
        (tournament.status, status),
        (TournamentStatus::Upcoming, TournamentStatus::Active)
            | (TournamentStatus::Active, TournamentStatus::Completed)
    );
    require!(valid, RegistryError::InvalidState);

    tournament.status = status;

    msg!("Tournament {} is now {:?}", tournament.id, status);
    Ok(())
}

/// Register a team for a tournament: eligibility check, registration write
/// and entry-fee debit as one transaction.
#[derive(Accounts)]
pub struct RegisterTeam<'info> {
    #[account(
        mut,
        seeds = [b"tournament", tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, Tournament>,

    pub team: Account<'info, Team>,

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

    /// Entry-fee debit backing the registration
    #[account(
        init,
        payer = user,
        space = LedgerEntry::LEN,
        seeds = [b"ledger", wallet.key().as_ref(), wallet.entry_count.to_le_bytes().as_ref()],
        bump
    )]
    pub fee_entry: Account<'info, LedgerEntry>,

    /// Registration PDA, created manually so a duplicate join surfaces the
    /// typed AlreadyRegistered reason instead of a raw init failure
    /// CHECK: Address derived and verified in the handler
    #[account(mut)]
    pub registration: UncheckedAccount<'info>,

    /// Ban-registry slot for the user under this organization
    /// CHECK: Address derived and verified in the handler; existence = banned
    pub user_ban: UncheckedAccount<'info>,

    /// Ban-registry slot for the team under this organization
    /// CHECK: Address derived and verified in the handler; existence = banned
    pub team_ban: UncheckedAccount<'info>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub system_program: Program<'info, System>,
}

/// A ban or registration PDA "exists" when it is initialized and owned by
/// this program.
fn pda_exists(info: &AccountInfo) -> bool {
    info.owner == &crate::ID && !info.data_is_empty()
}

pub fn register_team(ctx: Context<RegisterTeam>) -> Result<()> {
    let tournament = &mut ctx.accounts.tournament;
    let team = &ctx.accounts.team;
    let profile = &ctx.accounts.profile;
    let wallet = &mut ctx.accounts.wallet;
    let user_key = ctx.accounts.user.key();
    let clock = Clock::get()?;

    let tournament_key = tournament.key();
    let team_key = team.key();

    // Strong-consistency ban lookup: the derived PDAs are inspected in the
    // same transaction as the write, so a ban placed after listing still
    // blocks the join.
    let (user_ban_key, _) = Pubkey::find_program_address(
        &[b"ban", tournament.organization_hash.as_ref(), user_key.as_ref()],
        &crate::ID,
    );
    let (team_ban_key, _) = Pubkey::find_program_address(
        &[b"ban", tournament.organization_hash.as_ref(), team_key.as_ref()],
        &crate::ID,
    );
    require_keys_eq!(
        ctx.accounts.user_ban.key(),
        user_ban_key,
        RegistryError::AccountMismatch
    );
    require_keys_eq!(
        ctx.accounts.team_ban.key(),
        team_ban_key,
        RegistryError::AccountMismatch
    );

    let (registration_key, registration_bump) = Pubkey::find_program_address(
        &[b"registration", tournament_key.as_ref(), team_key.as_ref()],
        &crate::ID,
    );
    require_keys_eq!(
        ctx.accounts.registration.key(),
        registration_key,
        RegistryError::AccountMismatch
    );

    let input = EligibilityInput {
        user: UserSnapshot {
            frozen: profile.frozen,
            email_verified: profile.email_verified,
            phone_verified: profile.phone_verified,
            team_count: profile.team_count,
            balance: wallet.balance,
        },
        team: TeamSnapshot {
            roster_size: team.roster_size(),
            user_is_member: team.is_member(&user_key),
        },
        tournament: TournamentSnapshot {
            game_type: to_rules_game_type(tournament.game_type),
            entry_fee: tournament.entry_fee,
            open_for_registration: tournament.open_for_registration(),
            registered_teams: tournament.registered_teams,
            max_teams: tournament.max_teams,
        },
        user_banned: pda_exists(&ctx.accounts.user_ban),
        team_banned: pda_exists(&ctx.accounts.team_ban),
        already_registered: pda_exists(&ctx.accounts.registration),
    };

    // Same evaluator the UI preflights with; a deny writes nothing.
    if let Decision::Deny(reason) = evaluate(&input) {
        msg!("Registration denied: {:?}", reason);
        return Err(deny_to_error(reason).into());
    }

    let fee = tournament.entry_fee;

    // Create the registration at its derived address. Under a concurrent
    // duplicate join the loser fails here and the whole transaction (debit
    // included) rolls back.
    let rent = Rent::get()?;
    let required_lamports = rent.minimum_balance(Registration::LEN);
    let signer_seeds: &[&[u8]] = &[
        b"registration",
        tournament_key.as_ref(),
        team_key.as_ref(),
        &[registration_bump],
    ];
    let registration_info = ctx.accounts.registration.to_account_info();
    if registration_info.lamports() == 0 {
        create_account(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                CreateAccount {
                    from: ctx.accounts.user.to_account_info(),
                    to: registration_info.clone(),
                },
            )
            .with_signer(&[signer_seeds]),
            required_lamports,
            Registration::LEN as u64,
            &crate::ID,
        )?;
    } else {
        // The address already holds lamports (anyone can transfer to a
        // derived address before it exists), which makes CreateAccount
        // fail. Top up to rent exemption, then allocate and assign.
        let shortfall = required_lamports.saturating_sub(registration_info.lamports());
        if shortfall > 0 {
            transfer(
                CpiContext::new(
                    ctx.accounts.system_program.to_account_info(),
                    Transfer {
                        from: ctx.accounts.user.to_account_info(),
                        to: registration_info.clone(),
                    },
                ),
                shortfall,
            )?;
        }
        allocate(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                Allocate {
                    account_to_allocate: registration_info.clone(),
                },
            )
            .with_signer(&[signer_seeds]),
            Registration::LEN as u64,
        )?;
        assign(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                Assign {
                    account_to_assign: registration_info.clone(),
                },
            )
            .with_signer(&[signer_seeds]),
            &crate::ID,
        )?;
    }

    let registration = Registration {
        tournament: tournament_key,
        team: team_key,
        user: user_key,
        paid_fee: fee,
        created_at: clock.unix_timestamp,
        bump: registration_bump,
    };
    {
        let mut data = ctx.accounts.registration.try_borrow_mut_data()?;
        let mut cursor = std::io::Cursor::new(&mut data[..]);
        registration.try_serialize(&mut cursor)?;
    }

    // Reserve-and-debit: balance was checked by the evaluator against this
    // same wallet account in this transaction; the write lock on the wallet
    // serializes concurrent debits.
    wallet.balance = wallet.balance.checked_sub(fee).ok_or(RegistryError::InsufficientBalance)?;
    wallet.entry_count = wallet
        .entry_count
        .checked_add(1)
        .ok_or(RegistryError::Overflow)?;
    wallet.updated_at = clock.unix_timestamp;

    let fee_entry = &mut ctx.accounts.fee_entry;
    fee_entry.user = user_key;
    fee_entry.kind = LedgerKind::EntryFee;
    fee_entry.amount = -(fee as i64);
    fee_entry.status = LedgerStatus::Completed;
    fee_entry.created_at = clock.unix_timestamp;
    fee_entry.bump = ctx.bumps.fee_entry;

    tournament.prize_pool = tournament
        .prize_pool
        .checked_add(fee)
        .ok_or(RegistryError::Overflow)?;
    tournament.registered_teams = tournament
        .registered_teams
        .checked_add(1)
        .ok_or(RegistryError::Overflow)?;

    emit!(RegistrationCreated {
        tournament: tournament_key,
        team: team_key,
        user: user_key,
        fee_paid: fee,
        slot: clock.slot,
    });
    emit!(BalanceChanged {
        user: user_key,
        wallet: wallet.key(),
        entry: fee_entry.key(),
        kind: fee_entry.kind,
        amount: fee_entry.amount,
        balance_after: wallet.balance,
        slot: clock.slot,
    });

    msg!(
        "Team {} registered for tournament {}, fee {} debited from {}",
        team_key,
        tournament.id,
        fee,
        user_key
    );
    Ok(())
}

/// Pay a prize from the tournament pool to a winner's wallet (operator only)
#[derive(Accounts)]
#[instruction(amount: u64, external_ref: String)]
pub struct PayPrize<'info> {
    #[account(
        seeds = [b"config"],
        bump = config.bump,
        has_one = operator @ RegistryError::Unauthorized
    )]
    pub config: Account<'info, Config>,

    #[account(
        mut,
        seeds = [b"tournament", tournament.id.to_le_bytes().as_ref()],
        bump = tournament.bump
    )]
    pub tournament: Account<'info, Tournament>,

    #[account(
        mut,
        seeds = [b"wallet", wallet.user.as_ref()],
        bump = wallet.bump
    )]
    pub wallet: Account<'info, WalletAccount>,

    /// Payout credit entry, keyed like gateway credits so a payout reference
    /// can be applied at most once
    #[account(
        init,
        payer = operator,
        space = LedgerEntry::LEN,
        seeds = [b"credit", registry_logic::order_ref_hash(&external_ref).as_ref()],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn pay_prize(ctx: Context<PayPrize>, amount: u64, external_ref: String) -> Result<()> {
    let tournament = &mut ctx.accounts.tournament;
    let wallet = &mut ctx.accounts.wallet;
    let entry = &mut ctx.accounts.entry;
    let clock = Clock::get()?;

    require!(
        amount > 0 && amount <= i64::MAX as u64,
        RegistryError::InvalidAmount
    );
    require!(
        tournament.status == TournamentStatus::Completed,
        RegistryError::InvalidState
    );
    require!(
        tournament.prize_pool >= amount,
        RegistryError::InsufficientPrizePool
    );

    tournament.prize_pool -= amount;
    wallet.balance = wallet
        .balance
        .checked_add(amount)
        .ok_or(RegistryError::Overflow)?;
    wallet.updated_at = clock.unix_timestamp;

    entry.user = wallet.user;
    entry.kind = LedgerKind::PrizePayout;
    entry.amount = amount as i64;
    entry.status = LedgerStatus::Completed;
    entry.set_external_ref(&external_ref)?;
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
        "Prize {} paid to {} from tournament {}, pool {}",
        amount,
        entry.user,
        tournament.id,
        tournament.prize_pool
    );
    Ok(())
}
