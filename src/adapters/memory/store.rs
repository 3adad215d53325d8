//! In-memory store implementing every store port.
//!
//! Mirrors the constraints of the PostgreSQL schema (one profile per
//! identity, one active code per user, one referral per referred user,
//! one ledger per user). Failures can be injected per operation and every
//! call is counted, so handlers can be tested against store outages.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::referral::{
    Referral, ReferralCode, ReferralHistoryRecord, ReferralStatus, RewardTier, UserRewards,
};
use crate::domain::user::{ProfileDraft, UserProfile};
use crate::ports::{
    ProcedureOutcome, ProfileStore, PublicCodeValidation, ReferralCodeStore, ReferralRepository,
    RewardsStore,
};

/// Store operations that can be counted and failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    CreateProfileAtomic,
    GetOrCreateProfile,
    FindProfile,
    InsertProfile,
    UpsertProfile,
    FindActiveCode,
    GenerateCode,
    InsertCode,
    ValidateCodePublic,
    ActiveCodeExists,
    FindReferralByReferred,
    SaveReferral,
    ActivateAndCredit,
    ListReferralHistory,
    FindRewards,
    UpsertRewards,
    IncrementReferrals,
    RefreshTier,
    InitializeRewards,
    ListTiers,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    error: DomainError,
    /// `None` fails forever.
    remaining: Option<usize>,
}

#[derive(Debug, Clone)]
struct CodeRow {
    user_id: UserId,
    code: ReferralCode,
    is_active: bool,
}

#[derive(Debug, Default)]
struct State {
    profiles: HashMap<UserId, UserProfile>,
    codes: Vec<CodeRow>,
    referrals: Vec<Referral>,
    rewards: HashMap<UserId, UserRewards>,
    tiers: Vec<RewardTier>,
}

#[derive(Debug, Default)]
struct Controls {
    failures: HashMap<StoreOp, InjectedFailure>,
    calls: HashMap<StoreOp, usize>,
    atomic_rejection: Option<String>,
    ensure_returns_empty: bool,
    scripted_codes: Vec<ReferralCode>,
    code_race: Option<(UserId, ReferralCode)>,
    profile_race: Option<ProfileDraft>,
}

/// In-memory store for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
    controls: Mutex<Controls>,
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with the default tier ladder.
    pub fn with_default_tiers() -> Self {
        let store = Self::new();
        store.seed_tiers(default_tiers());
        store
    }

    // ─── Failure injection ──────────────────────────────────────────────

    /// Every call to `op` fails with a database error.
    pub fn fail(&self, op: StoreOp) {
        self.fail_with(op, DomainError::database(format!("injected failure: {:?}", op)));
    }

    /// The next `times` calls to `op` fail, later calls succeed.
    pub fn fail_times(&self, op: StoreOp, times: usize) {
        relock(&self.controls).failures.insert(
            op,
            InjectedFailure {
                error: DomainError::database(format!("injected failure: {:?}", op)),
                remaining: Some(times),
            },
        );
    }

    /// Every call to `op` fails with `error`.
    pub fn fail_with(&self, op: StoreOp, error: DomainError) {
        relock(&self.controls).failures.insert(
            op,
            InjectedFailure {
                error,
                remaining: None,
            },
        );
    }

    pub fn clear_failures(&self) {
        relock(&self.controls).failures.clear();
    }

    /// The atomic creation procedure reports `success=false` without writing.
    pub fn reject_atomic_create(&self, message: impl Into<String>) {
        relock(&self.controls).atomic_rejection = Some(message.into());
    }

    /// The ensure-and-fetch procedure returns no rows.
    pub fn ensure_returns_empty(&self, empty: bool) {
        relock(&self.controls).ensure_returns_empty = empty;
    }

    /// Queues a code for the generator to return next.
    pub fn script_generated_code(&self, code: ReferralCode) {
        relock(&self.controls).scripted_codes.push(code);
    }

    /// Another writer stores `code` for `user_id` just before the next
    /// `insert_code`.
    pub fn race_code_insert(&self, user_id: UserId, code: ReferralCode) {
        relock(&self.controls).code_race = Some((user_id, code));
    }

    /// Another writer creates `draft` just before the next `insert_profile`.
    pub fn race_profile_insert(&self, draft: ProfileDraft) {
        relock(&self.controls).profile_race = Some(draft);
    }

    // ─── Inspection ─────────────────────────────────────────────────────

    pub fn calls(&self, op: StoreOp) -> usize {
        relock(&self.controls).calls.get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        relock(&self.controls).calls.values().sum()
    }

    pub fn profile(&self, user_id: &UserId) -> Option<UserProfile> {
        relock(&self.state).profiles.get(user_id).cloned()
    }

    pub fn profile_count(&self) -> usize {
        relock(&self.state).profiles.len()
    }

    pub fn rewards(&self, user_id: &UserId) -> Option<UserRewards> {
        relock(&self.state).rewards.get(user_id).cloned()
    }

    pub fn active_codes(&self, user_id: &UserId) -> Vec<ReferralCode> {
        relock(&self.state)
            .codes
            .iter()
            .filter(|row| row.is_active && &row.user_id == user_id)
            .map(|row| row.code.clone())
            .collect()
    }

    pub fn referrals(&self) -> Vec<Referral> {
        relock(&self.state).referrals.clone()
    }

    // ─── Seeding ────────────────────────────────────────────────────────

    pub fn seed_profile(&self, draft: ProfileDraft) {
        let profile = draft.into_profile(Timestamp::now());
        relock(&self.state)
            .profiles
            .insert(profile.id.clone(), profile);
    }

    pub fn seed_code(&self, user_id: UserId, code: ReferralCode) {
        relock(&self.state).codes.push(CodeRow {
            user_id,
            code,
            is_active: true,
        });
    }

    pub fn deactivate_codes(&self, user_id: &UserId) {
        for row in relock(&self.state).codes.iter_mut() {
            if &row.user_id == user_id {
                row.is_active = false;
            }
        }
    }

    pub fn seed_rewards(&self, rewards: UserRewards) {
        relock(&self.state)
            .rewards
            .insert(rewards.user_id.clone(), rewards);
    }

    pub fn seed_referral(&self, referral: Referral) {
        relock(&self.state).referrals.push(referral);
    }

    pub fn seed_tiers(&self, mut tiers: Vec<RewardTier>) {
        tiers.sort_by_key(|t| t.min_referrals);
        relock(&self.state).tiers = tiers;
    }

    // ─── Internals ──────────────────────────────────────────────────────

    /// Counts the call and applies any injected failure.
    fn enter(&self, op: StoreOp) -> Result<(), DomainError> {
        let mut controls = relock(&self.controls);
        *controls.calls.entry(op).or_insert(0) += 1;

        let Some(failure) = controls.failures.get(&op).cloned() else {
            return Ok(());
        };
        match failure.remaining {
            None => Err(failure.error),
            Some(0) => {
                controls.failures.remove(&op);
                Ok(())
            }
            Some(1) => {
                controls.failures.remove(&op);
                Err(failure.error)
            }
            Some(n) => {
                if let Some(entry) = controls.failures.get_mut(&op) {
                    entry.remaining = Some(n - 1);
                }
                Err(failure.error)
            }
        }
    }

    fn write_profile(state: &mut State, draft: &ProfileDraft) {
        let now = Timestamp::now();
        let created_at = state
            .profiles
            .get(&draft.user_id)
            .map(|p| p.created_at)
            .unwrap_or(now);
        let mut profile = draft.clone().into_profile(now);
        profile.created_at = created_at;
        state.profiles.insert(profile.id.clone(), profile);
    }
}

/// Tier ladder seeded by the initial migration.
pub fn default_tiers() -> Vec<RewardTier> {
    vec![
        RewardTier::new("Dream Starter", 0),
        RewardTier::new("Dream Advocate", 3),
        RewardTier::new("Dream Champion", 10),
        RewardTier::new("Dream Legend", 25),
    ]
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn create_profile_atomic(
        &self,
        draft: &ProfileDraft,
    ) -> Result<ProcedureOutcome, DomainError> {
        self.enter(StoreOp::CreateProfileAtomic)?;
        if let Some(message) = relock(&self.controls).atomic_rejection.clone() {
            return Ok(ProcedureOutcome::failed(message));
        }
        Self::write_profile(&mut relock(&self.state), draft);
        Ok(ProcedureOutcome::succeeded())
    }

    async fn get_or_create_profile(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserProfile>, DomainError> {
        self.enter(StoreOp::GetOrCreateProfile)?;
        if relock(&self.controls).ensure_returns_empty {
            return Ok(Vec::new());
        }
        let mut state = relock(&self.state);
        let profile = state
            .profiles
            .entry(user_id.clone())
            .or_insert_with(|| ProfileDraft::minimal(user_id.clone()).into_profile(Timestamp::now()))
            .clone();
        Ok(vec![profile])
    }

    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        self.enter(StoreOp::FindProfile)?;
        Ok(relock(&self.state).profiles.get(user_id).cloned())
    }

    async fn insert_profile(&self, draft: &ProfileDraft) -> Result<(), DomainError> {
        self.enter(StoreOp::InsertProfile)?;
        let race = relock(&self.controls).profile_race.take();
        let mut state = relock(&self.state);
        if let Some(winner) = race {
            Self::write_profile(&mut state, &winner);
        }
        if state.profiles.contains_key(&draft.user_id) {
            return Err(DomainError::new(
                ErrorCode::ProfileExists,
                "Profile already exists for this user",
            ));
        }
        Self::write_profile(&mut state, draft);
        Ok(())
    }

    async fn upsert_profile(&self, draft: &ProfileDraft) -> Result<(), DomainError> {
        self.enter(StoreOp::UpsertProfile)?;
        Self::write_profile(&mut relock(&self.state), draft);
        Ok(())
    }
}

#[async_trait]
impl ReferralCodeStore for InMemoryStore {
    async fn find_active_code(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ReferralCode>, DomainError> {
        self.enter(StoreOp::FindActiveCode)?;
        Ok(relock(&self.state)
            .codes
            .iter()
            .find(|row| row.is_active && &row.user_id == user_id)
            .map(|row| row.code.clone()))
    }

    async fn generate_code(&self, user_name: &str) -> Result<Option<ReferralCode>, DomainError> {
        self.enter(StoreOp::GenerateCode)?;
        {
            let mut controls = relock(&self.controls);
            if !controls.scripted_codes.is_empty() {
                return Ok(Some(controls.scripted_codes.remove(0)));
            }
        }
        let state = relock(&self.state);
        for _ in 0..10 {
            let candidate = ReferralCode::generate(user_name);
            if !state.codes.iter().any(|row| row.code == candidate) {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    async fn insert_code(&self, user_id: &UserId, code: &ReferralCode) -> Result<(), DomainError> {
        self.enter(StoreOp::InsertCode)?;
        let race = relock(&self.controls).code_race.take();
        let mut state = relock(&self.state);
        if let Some((winner, winning_code)) = race {
            state.codes.push(CodeRow {
                user_id: winner,
                code: winning_code,
                is_active: true,
            });
        }
        if state
            .codes
            .iter()
            .any(|row| row.is_active && &row.user_id == user_id)
        {
            return Err(DomainError::new(
                ErrorCode::ReferralCodeExists,
                "User already has an active referral code",
            ));
        }
        if state.codes.iter().any(|row| &row.code == code) {
            return Err(DomainError::new(
                ErrorCode::ReferralCodeTaken,
                "Referral code already in use",
            ));
        }
        state.codes.push(CodeRow {
            user_id: user_id.clone(),
            code: code.clone(),
            is_active: true,
        });
        Ok(())
    }

    async fn validate_code_public(
        &self,
        code: &ReferralCode,
    ) -> Result<Vec<PublicCodeValidation>, DomainError> {
        self.enter(StoreOp::ValidateCodePublic)?;
        let state = relock(&self.state);
        let row = state
            .codes
            .iter()
            .find(|row| row.is_active && &row.code == code);
        let validation = match row {
            Some(row) => PublicCodeValidation {
                is_valid: true,
                referrer_name: state.profiles.get(&row.user_id).map(|p| p.name.clone()),
                referrer_id: Some(row.user_id.clone()),
                message: Some("Valid referral code".to_string()),
            },
            None => PublicCodeValidation {
                is_valid: false,
                referrer_name: None,
                referrer_id: None,
                message: Some("Referral code not found or inactive".to_string()),
            },
        };
        Ok(vec![validation])
    }

    async fn active_code_exists(&self, code: &ReferralCode) -> Result<bool, DomainError> {
        self.enter(StoreOp::ActiveCodeExists)?;
        Ok(relock(&self.state)
            .codes
            .iter()
            .any(|row| row.is_active && &row.code == code))
    }
}

#[async_trait]
impl ReferralRepository for InMemoryStore {
    async fn find_by_referred(
        &self,
        referred_id: &UserId,
    ) -> Result<Option<Referral>, DomainError> {
        self.enter(StoreOp::FindReferralByReferred)?;
        Ok(relock(&self.state)
            .referrals
            .iter()
            .find(|r| &r.referred_id == referred_id)
            .cloned())
    }

    async fn save(&self, referral: &Referral) -> Result<(), DomainError> {
        self.enter(StoreOp::SaveReferral)?;
        let mut state = relock(&self.state);
        if state
            .referrals
            .iter()
            .any(|r| r.referred_id == referral.referred_id)
        {
            return Err(DomainError::new(
                ErrorCode::ReferralExists,
                "User has already been referred",
            ));
        }
        state.referrals.push(referral.clone());
        Ok(())
    }

    async fn activate_and_credit(
        &self,
        referral: &Referral,
    ) -> Result<Option<UserRewards>, DomainError> {
        self.enter(StoreOp::ActivateAndCredit)?;
        let mut state = relock(&self.state);
        let stored = state
            .referrals
            .iter_mut()
            .find(|r| r.id == referral.id)
            .ok_or_else(|| DomainError::new(ErrorCode::ReferralNotFound, "Referral not found"))?;
        if stored.status != ReferralStatus::Pending {
            return Ok(None);
        }
        stored.status = ReferralStatus::Active;

        let ledger = state
            .rewards
            .entry(referral.referrer_id.clone())
            .or_insert_with(|| UserRewards::new(referral.referrer_id.clone()));
        ledger.credit_successful_referral(referral.reward_points);
        Ok(Some(ledger.clone()))
    }

    async fn list_history(
        &self,
        referrer_id: &UserId,
    ) -> Result<Vec<ReferralHistoryRecord>, DomainError> {
        self.enter(StoreOp::ListReferralHistory)?;
        let state = relock(&self.state);
        let mut records: Vec<ReferralHistoryRecord> = state
            .referrals
            .iter()
            .filter(|r| &r.referrer_id == referrer_id)
            .map(|r| ReferralHistoryRecord {
                referral: r.clone(),
                referred_name: state.profiles.get(&r.referred_id).map(|p| p.name.clone()),
            })
            .collect();
        records.sort_by(|a, b| b.referral.created_at.cmp(&a.referral.created_at));
        Ok(records)
    }
}

#[async_trait]
impl RewardsStore for InMemoryStore {
    async fn find_rewards(&self, user_id: &UserId) -> Result<Option<UserRewards>, DomainError> {
        self.enter(StoreOp::FindRewards)?;
        Ok(relock(&self.state).rewards.get(user_id).cloned())
    }

    async fn upsert_rewards(&self, rewards: &UserRewards) -> Result<(), DomainError> {
        self.enter(StoreOp::UpsertRewards)?;
        relock(&self.state)
            .rewards
            .insert(rewards.user_id.clone(), rewards.clone());
        Ok(())
    }

    async fn increment_total_referrals(
        &self,
        user_id: &UserId,
    ) -> Result<UserRewards, DomainError> {
        self.enter(StoreOp::IncrementReferrals)?;
        let mut state = relock(&self.state);
        let ledger = state
            .rewards
            .entry(user_id.clone())
            .or_insert_with(|| UserRewards::new(user_id.clone()));
        ledger.record_referral();
        Ok(ledger.clone())
    }

    async fn refresh_tier(
        &self,
        user_id: &UserId,
        tier: &str,
        successful_referrals: i64,
    ) -> Result<bool, DomainError> {
        self.enter(StoreOp::RefreshTier)?;
        let mut state = relock(&self.state);
        match state.rewards.get_mut(user_id) {
            Some(ledger) if ledger.successful_referrals == successful_referrals => {
                ledger.current_tier = tier.to_string();
                ledger.updated_at = Timestamp::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn initialize_rewards(&self, rewards: &UserRewards) -> Result<bool, DomainError> {
        self.enter(StoreOp::InitializeRewards)?;
        let mut state = relock(&self.state);
        if state.rewards.contains_key(&rewards.user_id) {
            return Ok(false);
        }
        state
            .rewards
            .insert(rewards.user_id.clone(), rewards.clone());
        Ok(true)
    }

    async fn list_tiers(&self) -> Result<Vec<RewardTier>, DomainError> {
        self.enter(StoreOp::ListTiers)?;
        Ok(relock(&self.state).tiers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[tokio::test]
    async fn insert_code_enforces_one_active_code_per_user() {
        let store = InMemoryStore::new();
        let user = uid("u1");
        store
            .insert_code(&user, &ReferralCode::parse("DREAMAAA11111").unwrap())
            .await
            .unwrap();

        let err = store
            .insert_code(&user, &ReferralCode::parse("DREAMAAA22222").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ReferralCodeExists);
        assert_eq!(store.active_codes(&user).len(), 1);
    }

    #[tokio::test]
    async fn insert_code_rejects_taken_code() {
        let store = InMemoryStore::new();
        let code = ReferralCode::parse("DREAMAAA11111").unwrap();
        store.insert_code(&uid("u1"), &code).await.unwrap();
        let err = store.insert_code(&uid("u2"), &code).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReferralCodeTaken);
        assert!(store.active_codes(&uid("u2")).is_empty());
    }

    #[tokio::test]
    async fn fail_times_recovers_after_count() {
        let store = InMemoryStore::new();
        store.fail_times(StoreOp::FindProfile, 2);

        assert!(store.find_profile(&uid("u")).await.is_err());
        assert!(store.find_profile(&uid("u")).await.is_err());
        assert!(store.find_profile(&uid("u")).await.is_ok());
        assert_eq!(store.calls(StoreOp::FindProfile), 3);
    }

    #[tokio::test]
    async fn injected_failure_has_custom_error() {
        let store = InMemoryStore::new();
        store.fail_with(
            StoreOp::InsertCode,
            DomainError::new(ErrorCode::ReferralCodeExists, "dup"),
        );
        let err = store
            .insert_code(&uid("u"), &ReferralCode::parse("X").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn get_or_create_inserts_minimal_profile_once() {
        let store = InMemoryStore::new();
        let user = uid("u");
        let first = store.get_or_create_profile(&user).await.unwrap();
        let second = store.get_or_create_profile(&user).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.profile_count(), 1);
        assert_eq!(first[0].name, "User");
    }

    #[tokio::test]
    async fn insert_profile_conflicts_after_race() {
        let store = InMemoryStore::new();
        let user = uid("u");
        store.race_profile_insert(ProfileDraft::minimal(user.clone()));

        let err = store
            .insert_profile(&ProfileDraft::minimal(user.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ProfileExists);
        assert_eq!(store.profile_count(), 1);
    }

    #[tokio::test]
    async fn initialize_rewards_never_overwrites() {
        let store = InMemoryStore::new();
        let user = uid("u");
        store.seed_rewards(UserRewards::with_welcome_bonus(user.clone(), 10));

        let created = store
            .initialize_rewards(&UserRewards::new(user.clone()))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(store.rewards(&user).unwrap().total_points, 10);
    }

    #[tokio::test]
    async fn activate_and_credit_applies_once() {
        let store = InMemoryStore::new();
        let referral = Referral::pending(uid("alice"), uid("bob")).unwrap();
        store.seed_referral(referral.clone());

        let ledger = store.activate_and_credit(&referral).await.unwrap().unwrap();
        assert_eq!(ledger.successful_referrals, 1);
        assert_eq!(ledger.total_points, 30);
        assert_eq!(store.referrals()[0].status, ReferralStatus::Active);

        assert!(store.activate_and_credit(&referral).await.unwrap().is_none());
        assert_eq!(store.rewards(&uid("alice")).unwrap().total_points, 30);
    }

    #[tokio::test]
    async fn refresh_tier_skips_when_count_moved() {
        let store = InMemoryStore::new();
        let mut ledger = UserRewards::new(uid("alice"));
        ledger.successful_referrals = 2;
        ledger.total_referrals = 2;
        store.seed_rewards(ledger);

        assert!(!store
            .refresh_tier(&uid("alice"), "Dream Advocate", 1)
            .await
            .unwrap());
        assert_eq!(store.rewards(&uid("alice")).unwrap().current_tier, "Dream Starter");

        assert!(store
            .refresh_tier(&uid("alice"), "Dream Advocate", 2)
            .await
            .unwrap());
        assert_eq!(store.rewards(&uid("alice")).unwrap().current_tier, "Dream Advocate");
    }

    #[tokio::test]
    async fn history_is_newest_first_with_names() {
        let store = InMemoryStore::new();
        let referrer = uid("ref");
        let mut older = Referral::pending(referrer.clone(), uid("a")).unwrap();
        older.created_at = Timestamp::now().minus_days(3);
        let newer = Referral::pending(referrer.clone(), uid("b")).unwrap();
        store.seed_referral(older);
        store.seed_referral(newer);
        let mut draft = ProfileDraft::minimal(uid("b"));
        draft.name = "Bea".into();
        store.seed_profile(draft);

        let history = store.list_history(&referrer).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].referral.referred_id, uid("b"));
        assert_eq!(history[0].referred_name.as_deref(), Some("Bea"));
        assert_eq!(history[1].referred_name, None);
    }

    #[tokio::test]
    async fn public_validation_reports_referrer() {
        let store = InMemoryStore::new();
        let owner = uid("owner");
        let mut draft = ProfileDraft::minimal(owner.clone());
        draft.name = "Olive".into();
        store.seed_profile(draft);
        let code = ReferralCode::parse("DREAMOLI12345").unwrap();
        store.seed_code(owner.clone(), code.clone());

        let rows = store.validate_code_public(&code).await.unwrap();
        assert!(rows[0].is_valid);
        assert_eq!(rows[0].referrer_id.as_ref(), Some(&owner));
        assert_eq!(rows[0].referrer_name.as_deref(), Some("Olive"));

        store.deactivate_codes(&owner);
        let rows = store.validate_code_public(&code).await.unwrap();
        assert!(!rows[0].is_valid);
        assert!(rows[0].referrer_id.is_none());
    }
}
