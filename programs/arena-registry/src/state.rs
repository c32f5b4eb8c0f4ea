//! Account state definitions

use anchor_lang::prelude::*;

/// Default minimum deposit order in minor units (100.00 in paise; 1 in testing)
#[cfg(not(feature = "testing"))]
pub const DEFAULT_MIN_DEPOSIT: u64 = 10_000;
#[cfg(feature = "testing")]
pub const DEFAULT_MIN_DEPOSIT: u64 = 1;

/// Default minimum withdrawal in minor units (500.00 in paise; 1 in testing)
#[cfg(not(feature = "testing"))]
pub const DEFAULT_MIN_WITHDRAWAL: u64 = 50_000;
#[cfg(feature = "testing")]
pub const DEFAULT_MIN_WITHDRAWAL: u64 = 1;

/// A user may lead or belong to at most this many teams concurrently
pub const MAX_TEAMS_PER_USER: u8 = 2;

/// Roster bounds per team
pub const MAX_ROSTER: usize = 5;

/// Team and organization names are capped for account sizing
pub const MAX_NAME_LEN: usize = 32;

/// Gateway order ids are capped for account sizing
pub const MAX_EXTERNAL_REF_LEN: usize = 64;

/// Global configuration account
#[account]
#[derive(Default)]
pub struct Config {
    /// Admin who can update config, freeze accounts and remove registrations
    pub admin: Pubkey,
    /// Operator who runs tournament lifecycle, bans and identity updates
    pub operator: Pubkey,
    /// Key the gateway operator signs credit completions with
    pub gateway_authority: Pubkey,
    /// Minimum deposit order amount (minor units), enforced in the ledger path
    pub min_deposit: u64,
    /// Minimum withdrawal amount (minor units), enforced in the ledger path
    pub min_withdrawal: u64,
    /// Next tournament id (increments on creation)
    pub next_tournament_id: u32,
    /// PDA bump seed
    pub bump: u8,
}

impl Config {
    pub const LEN: usize = 8 + // discriminator
        32 +  // admin
        32 +  // operator
        32 +  // gateway_authority
        8 +   // min_deposit
        8 +   // min_withdrawal
        4 +   // next_tournament_id
        1 +   // bump
        16;   // padding for future fields
}

/// Identity-provider snapshot for one user, written only by admin/operator
/// instructions and read by eligibility.
#[account]
#[derive(Default)]
pub struct UserProfile {
    pub user: Pubkey,
    /// Administrative hold; blocks registration and withdrawal
    pub frozen: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    /// Teams the user currently leads or belongs to (<= MAX_TEAMS_PER_USER)
    pub team_count: u8,
    pub created_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl UserProfile {
    pub const LEN: usize = 8 + // discriminator
        32 +  // user
        1 +   // frozen
        1 +   // email_verified
        1 +   // phone_verified
        1 +   // team_count
        8 +   // created_at
        1 +   // bump
        8;    // padding
}

/// Custodial wallet for one user.
///
/// `balance` equals the signed sum of completed ledger entries for the user
/// at all times. Mutated only by the wallet/registration instructions, never
/// by feature code elsewhere.
#[account]
#[derive(Default)]
pub struct WalletAccount {
    pub user: Pubkey,
    /// Spendable balance in minor units
    pub balance: u64,
    /// Debit sequence number, used as the debit ledger-entry seed
    pub entry_count: u64,
    pub updated_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl WalletAccount {
    pub const LEN: usize = 8 + // discriminator
        32 +  // user
        8 +   // balance
        8 +   // entry_count
        8 +   // updated_at
        1 +   // bump
        8;    // padding
}

/// Typed movement of funds into or out of a wallet
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LedgerKind {
    #[default]
    Deposit,
    Withdrawal,
    EntryFee,
    PrizePayout,
}

/// Entry lifecycle; immutable once Completed
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LedgerStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// One immutable ledger entry.
///
/// Gateway credits are keyed by the sha256 of the order id
/// (`seeds = [b"credit", order_ref_hash]`), which makes the order id the
/// idempotency key: a second creation for the same ref fails at init, and
/// completion checks `status` before touching the balance. Debits and refund
/// reversals are keyed by the wallet's entry sequence
/// (`seeds = [b"ledger", wallet, seq]`).
#[account]
pub struct LedgerEntry {
    pub user: Pubkey,
    pub kind: LedgerKind,
    /// Signed minor units: positive credit, negative debit
    pub amount: i64,
    pub status: LedgerStatus,
    /// Gateway order id (empty for debits)
    pub external_ref: [u8; MAX_EXTERNAL_REF_LEN],
    pub external_ref_len: u8,
    pub created_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl Default for LedgerEntry {
    fn default() -> Self {
        Self {
            user: Pubkey::default(),
            kind: LedgerKind::default(),
            amount: 0,
            status: LedgerStatus::default(),
            external_ref: [0u8; MAX_EXTERNAL_REF_LEN],
            external_ref_len: 0,
            created_at: 0,
            bump: 0,
        }
    }
}

impl LedgerEntry {
    pub const LEN: usize = 8 + // discriminator
        32 +  // user
        1 +   // kind
        8 +   // amount
        1 +   // status
        64 +  // external_ref
        1 +   // external_ref_len
        8 +   // created_at
        1 +   // bump
        8;    // padding

    /// Store a gateway order id, validating its length.
    pub fn set_external_ref(&mut self, external_ref: &str) -> Result<()> {
        let bytes = external_ref.as_bytes();
        require!(
            !bytes.is_empty() && bytes.len() <= MAX_EXTERNAL_REF_LEN,
            crate::error::RegistryError::InvalidExternalRef
        );
        self.external_ref[..bytes.len()].copy_from_slice(bytes);
        self.external_ref_len = bytes.len() as u8;
        Ok(())
    }

    pub fn external_ref(&self) -> &str {
        core::str::from_utf8(&self.external_ref[..self.external_ref_len as usize]).unwrap_or("")
    }
}

/// A team: leader plus roster (leader included in `members`)
#[account]
#[derive(Default)]
pub struct Team {
    pub leader: Pubkey,
    pub name: String,
    /// 1..=MAX_ROSTER members, leader always present
    pub members: Vec<Pubkey>,
    pub created_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl Team {
    pub const LEN: usize = 8 + // discriminator
        32 +  // leader
        4 + MAX_NAME_LEN +          // name
        4 + 32 * MAX_ROSTER +       // members
        8 +   // created_at
        1 +   // bump
        8;    // padding

    pub fn is_member(&self, key: &Pubkey) -> bool {
        self.members.contains(key)
    }

    pub fn roster_size(&self) -> u8 {
        self.members.len() as u8
    }
}

/// Game mode, determines the roster minimum (solo=1, duo=2, squad=4)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GameType {
    #[default]
    Solo,
    Duo,
    Squad,
}

/// Tournament lifecycle
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TournamentStatus {
    #[default]
    Upcoming,
    Active,
    Completed,
}

/// Tournament account
#[account]
#[derive(Default)]
pub struct Tournament {
    pub id: u32,
    /// Organization running the tournament (display name)
    pub organization: String,
    /// sha256 of the organization name; the ban-registry seed
    pub organization_hash: [u8; 32],
    pub game_type: GameType,
    /// Entry fee per team in minor units
    pub entry_fee: u64,
    pub max_teams: u32,
    pub registered_teams: u32,
    /// Entry fees collected, paid out as prizes after completion
    pub prize_pool: u64,
    pub status: TournamentStatus,
    pub created_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl Tournament {
    pub const LEN: usize = 8 + // discriminator
        4 +   // id
        4 + MAX_NAME_LEN +  // organization
        32 +  // organization_hash
        1 +   // game_type
        8 +   // entry_fee
        4 +   // max_teams
        4 +   // registered_teams
        8 +   // prize_pool
        1 +   // status
        8 +   // created_at
        1 +   // bump
        16;   // padding

    /// Teams can join only while the tournament is upcoming.
    pub fn open_for_registration(&self) -> bool {
        self.status == TournamentStatus::Upcoming
    }
}

/// Registration of a team in a tournament.
///
/// The PDA seed `[b"registration", tournament, team]` is the uniqueness
/// constraint: exactly one registration per pair can ever exist. Created only
/// by `register_team`, deleted only by `admin_remove_registration`.
#[account]
#[derive(Default)]
pub struct Registration {
    pub tournament: Pubkey,
    pub team: Pubkey,
    /// User who registered and paid the fee
    pub user: Pubkey,
    /// Fee debited at registration (minor units)
    pub paid_fee: u64,
    pub created_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl Registration {
    pub const LEN: usize = 8 + // discriminator
        32 +  // tournament
        32 +  // team
        32 +  // user
        8 +   // paid_fee
        8 +   // created_at
        1 +   // bump
        8;    // padding
}

/// Whether a ban names a user or a team
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BanSubject {
    #[default]
    User,
    Team,
}

/// Organization-level ban. Account existence at
/// `[b"ban", organization_hash, subject]` is the registry lookup: present
/// means banned. Placed and lifted by the operator.
#[account]
#[derive(Default)]
pub struct OrganizationBan {
    pub organization_hash: [u8; 32],
    /// Banned user or team address
    pub subject: Pubkey,
    pub kind: BanSubject,
    pub placed_by: Pubkey,
    pub created_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl OrganizationBan {
    pub const LEN: usize = 8 + // discriminator
        32 +  // organization_hash
        32 +  // subject
        1 +   // kind
        32 +  // placed_by
        8 +   // created_at
        1 +   // bump
        8;    // padding
}

/// Digest used in ban and tournament seeds for an organization name.
pub fn organization_hash(name: &str) -> [u8; 32] {
    solana_sha256_hasher::hash(name.as_bytes()).to_bytes()
}

/// Convert the on-chain game type to the rules-crate type.
pub fn to_rules_game_type(game_type: GameType) -> registry_logic::GameType {
    match game_type {
        GameType::Solo => registry_logic::GameType::Solo,
        GameType::Duo => registry_logic::GameType::Duo,
        GameType::Squad => registry_logic::GameType::Squad,
    }
}
