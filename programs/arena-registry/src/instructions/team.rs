//! Team roster instructions
//!
//! Rosters hold 1..=5 members including the leader; a user is on at most two
//! rosters at once, tracked through `UserProfile.team_count`.

use anchor_lang::prelude::*;

use crate::error::RegistryError;
use crate::state::{Team, UserProfile, MAX_NAME_LEN, MAX_ROSTER, MAX_TEAMS_PER_USER};

/// Create a team led by the signer
#[derive(Accounts)]
#[instruction(name: String)]
pub struct CreateTeam<'info> {
    #[account(
        init,
        payer = leader,
        space = Team::LEN,
        seeds = [b"team", leader.key().as_ref(), solana_sha256_hasher::hash(name.as_bytes()).to_bytes().as_ref()],
        bump
    )]
    pub team: Account<'info, Team>,

    #[account(
        mut,
        seeds = [b"profile", leader.key().as_ref()],
        bump = profile.bump
    )]
    pub profile: Account<'info, UserProfile>,

    #[account(mut)]
    pub leader: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn create_team(ctx: Context<CreateTeam>, name: String) -> Result<()> {
    let team = &mut ctx.accounts.team;
    let profile = &mut ctx.accounts.profile;
    let clock = Clock::get()?;

    require!(
        !name.is_empty() && name.len() <= MAX_NAME_LEN,
        RegistryError::InvalidName
    );
    require!(
        profile.team_count < MAX_TEAMS_PER_USER,
        RegistryError::TooManyTeams
    );

    profile.team_count += 1;

    team.leader = ctx.accounts.leader.key();
    team.name = name;
    team.members = vec![team.leader];
    team.created_at = clock.unix_timestamp;
    team.bump = ctx.bumps.team;

    msg!("Team '{}' created by {}", team.name, team.leader);
    Ok(())
}

/// Add a member to the roster (leader only)
#[derive(Accounts)]
#[instruction(member: Pubkey)]
pub struct AddTeamMember<'info> {
    #[account(
        mut,
        has_one = leader @ RegistryError::Unauthorized
    )]
    pub team: Account<'info, Team>,

    #[account(
        mut,
        seeds = [b"profile", member.as_ref()],
        bump = member_profile.bump
    )]
    pub member_profile: Account<'info, UserProfile>,

    pub leader: Signer<'info>,
}

pub fn add_team_member(ctx: Context<AddTeamMember>, member: Pubkey) -> Result<()> {
    let team = &mut ctx.accounts.team;
    let member_profile = &mut ctx.accounts.member_profile;

    require!(team.members.len() < MAX_ROSTER, RegistryError::RosterFull);
    require!(!team.is_member(&member), RegistryError::AlreadyMember);
    require!(
        member_profile.team_count < MAX_TEAMS_PER_USER,
        RegistryError::TooManyTeams
    );

    member_profile.team_count += 1;
    team.members.push(member);

    msg!("{} added to team '{}' ({} members)", member, team.name, team.members.len());
    Ok(())
}

/// Remove a member from the roster (leader only; leaders cannot be removed)
#[derive(Accounts)]
#[instruction(member: Pubkey)]
pub struct RemoveTeamMember<'info> {
    #[account(
        mut,
        has_one = leader @ RegistryError::Unauthorized
    )]
    pub team: Account<'info, Team>,

    #[account(
        mut,
        seeds = [b"profile", member.as_ref()],
        bump = member_profile.bump
    )]
    pub member_profile: Account<'info, UserProfile>,

    pub leader: Signer<'info>,
}

pub fn remove_team_member(ctx: Context<RemoveTeamMember>, member: Pubkey) -> Result<()> {
    let team = &mut ctx.accounts.team;
    let member_profile = &mut ctx.accounts.member_profile;

    require!(member != team.leader, RegistryError::LeaderCannotLeave);
    require!(team.is_member(&member), RegistryError::NotTeamMember);

    team.members.retain(|m| *m != member);
    member_profile.team_count = member_profile
        .team_count
        .checked_sub(1)
        .ok_or(RegistryError::Overflow)?;

    msg!("{} removed from team '{}' ({} members)", member, team.name, team.members.len());
    Ok(())
}
