use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::session::WalletSession;
use crate::wallet::{generate_wallet, WalletData};

pub const GENERATE_DELAY: Duration = Duration::from_millis(2000);
pub const VERIFY_DELAY: Duration = Duration::from_millis(1000);
pub const COPY_DELAY: Duration = Duration::from_millis(1000);

/// 0-indexed phrase positions the learner must confirm
pub const VERIFY_POSITIONS: [usize; 3] = [2, 6, 10];
pub const OPTION_POOL_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum WalletStep {
    Welcome,
    Generate,
    Backup,
    Verify,
    Address,
    SecurityTips,
    Complete,
}

impl WalletStep {
    pub const COUNT: usize = 7;
    pub const TERMINAL: usize = Self::COUNT - 1;

    pub fn from_index(idx: usize) -> Option<Self> {
        use WalletStep::*;
        [Welcome, Generate, Backup, Verify, Address, SecurityTips, Complete]
            .get(idx)
            .copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Generating,
    Verified,
    Copied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub kind: PendingKind,
    pub remaining: Duration,
}

/// What an action or tick did to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced(WalletStep),
    /// a delayed transition was scheduled
    Pending(PendingKind),
    /// state changed without moving to another step
    Updated,
    /// action does not apply right now
    Ignored,
    /// verification mismatch or incomplete selection
    Rejected,
    Finished,
}

/// Shuffled word pool plus the learner's pick for each verify position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyChallenge {
    pub pool: Vec<String>,
    pub selections: [Option<String>; 3],
}

impl VerifyChallenge {
    /// The distinct target words plus the first other words of a shuffle, shuffled again.
    /// No word appears twice, even when the phrase repeats one.
    pub fn new(phrase: &[String], rng: &mut StdRng) -> Self {
        let targets = VERIFY_POSITIONS.iter().filter_map(|&pos| phrase.get(pos));

        let mut shuffled: Vec<&String> = phrase.iter().collect();
        shuffled.shuffle(rng);

        let mut pool: Vec<String> = Vec::with_capacity(OPTION_POOL_SIZE);
        for word in targets.chain(shuffled) {
            if pool.len() >= OPTION_POOL_SIZE {
                break;
            }
            if !pool.contains(word) {
                pool.push(word.clone());
            }
        }
        pool.shuffle(rng);

        Self {
            pool,
            selections: Default::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.selections.iter().all(Option::is_some)
    }

    pub fn matches(&self, phrase: &[String]) -> bool {
        VERIFY_POSITIONS
            .iter()
            .zip(self.selections.iter())
            .all(|(&pos, sel)| match (phrase.get(pos), sel) {
                (Some(expected), Some(chosen)) => expected == chosen,
                _ => false,
            })
    }
}

/// The wallet-creation walkthrough: seven steps, terminal at [`WalletStep::Complete`]
#[derive(Debug)]
pub struct WalletSimulation {
    pub session: WalletSession,
    pub pending: Option<Pending>,
    pub challenge: Option<VerifyChallenge>,
    pub phrase_revealed: bool,
    pub hint_visible: bool,
    pub finished: bool,
    rng: StdRng,
}

impl Default for WalletSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletSimulation {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic wallet and shuffles, for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            session: WalletSession::new(),
            pending: None,
            challenge: None,
            phrase_revealed: false,
            hint_visible: false,
            finished: false,
            rng,
        }
    }

    pub fn step(&self) -> WalletStep {
        WalletStep::from_index(self.session.current_step).unwrap_or(WalletStep::Complete)
    }

    pub fn wallet(&self) -> &WalletData {
        &self.session.collected
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn at(&self, step: WalletStep) -> bool {
        self.step() == step && self.pending.is_none() && !self.finished
    }

    fn advance(&mut self) -> Transition {
        if !self.session.advance(WalletStep::TERMINAL) {
            return Transition::Ignored;
        }
        self.hint_visible = false;
        let step = self.step();
        if step == WalletStep::Verify {
            self.challenge = Some(VerifyChallenge::new(
                &self.session.collected.seed_phrase,
                &mut self.rng,
            ));
        }
        info!(step = %step, index = step.index(), "wallet simulation advanced");
        Transition::Advanced(step)
    }

    fn schedule(&mut self, kind: PendingKind, delay: Duration) -> Transition {
        self.pending = Some(Pending {
            kind,
            remaining: delay,
        });
        debug!(?kind, ?delay, "transition scheduled");
        Transition::Pending(kind)
    }

    /// Enter on the welcome screen
    pub fn confirm(&mut self) -> Transition {
        if !self.at(WalletStep::Welcome) {
            return Transition::Ignored;
        }
        self.session.record_action("start");
        self.advance()
    }

    /// Starts the generate delay; repeated presses while it runs are ignored
    pub fn generate(&mut self) -> Transition {
        if !self.at(WalletStep::Generate) {
            return Transition::Ignored;
        }
        self.session.record_action("generate");
        self.schedule(PendingKind::Generating, GENERATE_DELAY)
    }

    pub fn toggle_phrase(&mut self) -> Transition {
        if !self.at(WalletStep::Backup) {
            return Transition::Ignored;
        }
        self.phrase_revealed = !self.phrase_revealed;
        Transition::Updated
    }

    pub fn acknowledge_backup(&mut self) -> Transition {
        if !self.at(WalletStep::Backup) {
            return Transition::Ignored;
        }
        self.phrase_revealed = true;
        self.session.record_action("backup");
        self.advance()
    }

    /// Pick `pool[pool_idx]` for verify slot `slot` (0..3); re-picking replaces
    pub fn select_word(&mut self, slot: usize, pool_idx: usize) -> Transition {
        if !self.at(WalletStep::Verify) {
            return Transition::Ignored;
        }
        let Some(challenge) = self.challenge.as_mut() else {
            return Transition::Ignored;
        };
        match (challenge.selections.get_mut(slot), challenge.pool.get(pool_idx)) {
            (Some(sel), Some(word)) => {
                *sel = Some(word.clone());
                Transition::Updated
            }
            _ => Transition::Ignored,
        }
    }

    /// All three picks must match; a mismatch keeps the step and the picks
    pub fn verify(&mut self) -> Transition {
        if !self.at(WalletStep::Verify) {
            return Transition::Ignored;
        }
        let Some(challenge) = self.challenge.as_ref() else {
            return Transition::Ignored;
        };
        if !challenge.is_complete() {
            return Transition::Rejected;
        }
        if !challenge.matches(&self.session.collected.seed_phrase) {
            self.session.record_action("verify-failed");
            info!("phrase verification failed");
            return Transition::Rejected;
        }
        self.session.record_action("verify");
        self.schedule(PendingKind::Verified, VERIFY_DELAY)
    }

    pub fn copy_address(&mut self) -> Transition {
        if !self.at(WalletStep::Address) {
            return Transition::Ignored;
        }
        self.session.record_action("copy-address");
        self.schedule(PendingKind::Copied, COPY_DELAY)
    }

    pub fn acknowledge_tips(&mut self) -> Transition {
        if !self.at(WalletStep::SecurityTips) {
            return Transition::Ignored;
        }
        self.session.record_action("tips");
        self.advance()
    }

    pub fn complete(&mut self) -> Transition {
        if !self.at(WalletStep::Complete) {
            return Transition::Ignored;
        }
        self.finished = true;
        self.session.record_action("complete");
        info!(
            hints_viewed = self.session.hints_viewed.len(),
            "wallet simulation finished"
        );
        Transition::Finished
    }

    /// The Enter key: whatever the primary action of the current step is
    pub fn primary_action(&mut self) -> Transition {
        match self.step() {
            WalletStep::Welcome => self.confirm(),
            WalletStep::Generate => self.generate(),
            WalletStep::Backup => self.acknowledge_backup(),
            WalletStep::Verify => self.verify(),
            WalletStep::Address => self.copy_address(),
            WalletStep::SecurityTips => self.acknowledge_tips(),
            WalletStep::Complete => self.complete(),
        }
    }

    /// Shows or hides the current step's hint; showing it counts as viewed
    pub fn toggle_hint(&mut self) -> bool {
        self.hint_visible = !self.hint_visible;
        if self.hint_visible {
            self.session.mark_hint_viewed(self.session.current_step);
        }
        self.hint_visible
    }

    pub fn on_tick(&mut self, elapsed: Duration) -> Transition {
        let Some(pending) = self.pending.as_mut() else {
            return Transition::Ignored;
        };
        if elapsed < pending.remaining {
            pending.remaining -= elapsed;
            return Transition::Updated;
        }
        let kind = pending.kind;
        self.pending = None;

        if kind == PendingKind::Generating {
            self.session.collected = generate_wallet(&mut self.rng);
            debug!(address = %self.session.collected.address, "wallet generated");
        }
        self.advance()
    }

    /// Back to the welcome screen with nothing collected
    pub fn restart(&mut self) {
        self.session.restart();
        self.pending = None;
        self.challenge = None;
        self.phrase_revealed = false;
        self.hint_visible = false;
        self.finished = false;
        info!("wallet simulation restarted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{ADDRESS_HEX_LEN, SEED_PHRASE_LEN, WORD_LIST};
    use assert_matches::assert_matches;

    fn run_until(sim: &mut WalletSimulation, step: WalletStep) {
        while sim.step() != step {
            let before = sim.session.current_step;
            match sim.step() {
                WalletStep::Verify => solve_verify(sim),
                _ => {
                    sim.primary_action();
                }
            }
            while sim.is_pending() {
                sim.on_tick(Duration::from_millis(500));
            }
            assert_eq!(sim.session.current_step, before + 1);
        }
    }

    fn solve_verify(sim: &mut WalletSimulation) {
        let phrase = sim.wallet().seed_phrase.clone();
        for (slot, &pos) in VERIFY_POSITIONS.iter().enumerate() {
            let pool_idx = sim
                .challenge
                .as_ref()
                .unwrap()
                .pool
                .iter()
                .position(|w| *w == phrase[pos])
                .unwrap();
            sim.select_word(slot, pool_idx);
        }
        assert_matches!(sim.verify(), Transition::Pending(PendingKind::Verified));
    }

    #[test]
    fn test_welcome_confirm_advances() {
        let mut sim = WalletSimulation::with_seed(1);
        assert_eq!(sim.step(), WalletStep::Welcome);
        assert_matches!(sim.confirm(), Transition::Advanced(WalletStep::Generate));
    }

    #[test]
    fn test_generate_waits_for_delay() {
        let mut sim = WalletSimulation::with_seed(2);
        sim.confirm();
        assert_matches!(sim.generate(), Transition::Pending(PendingKind::Generating));
        assert_matches!(sim.generate(), Transition::Ignored);

        assert_matches!(sim.on_tick(Duration::from_millis(1500)), Transition::Updated);
        assert_eq!(sim.step(), WalletStep::Generate);
        assert!(sim.wallet().is_empty());

        assert_matches!(
            sim.on_tick(Duration::from_millis(500)),
            Transition::Advanced(WalletStep::Backup)
        );
        let wallet = sim.wallet();
        assert_eq!(wallet.seed_phrase.len(), SEED_PHRASE_LEN);
        assert!(wallet.seed_phrase.iter().all(|w| WORD_LIST.contains(&w.as_str())));
        assert_eq!(wallet.address.len(), ADDRESS_HEX_LEN + 2);
        assert!(wallet.address.starts_with("0x"));
        assert!(wallet.private_key.is_empty());
    }

    #[test]
    fn test_backup_reveals_phrase() {
        let mut sim = WalletSimulation::with_seed(3);
        run_until(&mut sim, WalletStep::Backup);
        assert!(!sim.phrase_revealed);
        sim.toggle_phrase();
        assert!(sim.phrase_revealed);
        sim.toggle_phrase();
        assert!(!sim.phrase_revealed);
        assert_matches!(
            sim.acknowledge_backup(),
            Transition::Advanced(WalletStep::Verify)
        );
        assert!(sim.phrase_revealed);
    }

    #[test]
    fn test_pool_contains_targets() {
        for seed in 0..50 {
            let mut sim = WalletSimulation::with_seed(seed);
            run_until(&mut sim, WalletStep::Verify);
            let phrase = sim.wallet().seed_phrase.clone();
            let pool = &sim.challenge.as_ref().unwrap().pool;
            assert!(pool.len() <= OPTION_POOL_SIZE);
            for pos in VERIFY_POSITIONS {
                assert!(pool.contains(&phrase[pos]), "seed {seed}");
            }
        }
    }

    #[test]
    fn test_pool_has_no_duplicate_words() {
        let mut phrase: Vec<String> = WORD_LIST[..SEED_PHRASE_LEN]
            .iter()
            .map(|w| w.to_string())
            .collect();
        phrase[VERIFY_POSITIONS[1]] = phrase[VERIFY_POSITIONS[0]].clone();
        phrase[4] = phrase[VERIFY_POSITIONS[0]].clone();

        for seed in 0..20 {
            let challenge = VerifyChallenge::new(&phrase, &mut StdRng::seed_from_u64(seed));
            assert_eq!(challenge.pool.len(), OPTION_POOL_SIZE);
            let mut distinct = challenge.pool.clone();
            distinct.sort();
            distinct.dedup();
            assert_eq!(distinct.len(), challenge.pool.len(), "seed {seed}");
            assert!(challenge.pool.contains(&phrase[VERIFY_POSITIONS[0]]));
            assert!(challenge.pool.contains(&phrase[VERIFY_POSITIONS[2]]));
        }
    }

    #[test]
    fn test_verify_mismatch_keeps_step() {
        let mut sim = WalletSimulation::with_seed(4);
        run_until(&mut sim, WalletStep::Verify);
        let phrase = sim.wallet().seed_phrase.clone();
        let pool = sim.challenge.as_ref().unwrap().pool.clone();

        assert_matches!(sim.verify(), Transition::Rejected);

        let wrong = pool.iter().position(|w| *w != phrase[VERIFY_POSITIONS[0]]);
        let Some(wrong) = wrong else { return };
        for slot in 0..3 {
            sim.select_word(slot, wrong);
        }
        assert_matches!(sim.verify(), Transition::Rejected);
        assert_eq!(sim.step(), WalletStep::Verify);
        assert!(sim.pending.is_none());

        // unlimited retries
        solve_verify(&mut sim);
        assert_matches!(
            sim.on_tick(VERIFY_DELAY),
            Transition::Advanced(WalletStep::Address)
        );
    }

    #[test]
    fn test_select_word_out_of_range_ignored() {
        let mut sim = WalletSimulation::with_seed(5);
        run_until(&mut sim, WalletStep::Verify);
        assert_matches!(sim.select_word(3, 0), Transition::Ignored);
        assert_matches!(sim.select_word(0, OPTION_POOL_SIZE + 1), Transition::Ignored);
    }

    #[test]
    fn test_actions_for_other_steps_are_ignored() {
        let mut sim = WalletSimulation::with_seed(6);
        assert_matches!(sim.copy_address(), Transition::Ignored);
        assert_matches!(sim.verify(), Transition::Ignored);
        assert_matches!(sim.complete(), Transition::Ignored);
        assert_matches!(sim.on_tick(Duration::from_secs(5)), Transition::Ignored);
        assert_eq!(sim.session.current_step, 0);
    }

    #[test]
    fn test_full_run_is_monotonic_and_bounded() {
        let mut sim = WalletSimulation::with_seed(7);
        run_until(&mut sim, WalletStep::Complete);
        assert_eq!(sim.session.current_step, WalletStep::TERMINAL);

        assert_matches!(sim.complete(), Transition::Finished);
        assert!(sim.finished);
        assert_matches!(sim.primary_action(), Transition::Ignored);
        assert_eq!(sim.session.current_step, WalletStep::TERMINAL);
    }

    #[test]
    fn test_hint_toggle_marks_viewed() {
        let mut sim = WalletSimulation::with_seed(8);
        assert!(sim.toggle_hint());
        assert!(!sim.toggle_hint());
        sim.confirm();
        assert!(!sim.hint_visible);
        sim.toggle_hint();
        assert_eq!(sim.session.hints_viewed.len(), 2);
    }

    #[test]
    fn test_restart_clears_run() {
        let mut sim = WalletSimulation::with_seed(9);
        run_until(&mut sim, WalletStep::Address);
        sim.copy_address();
        sim.restart();

        assert_eq!(sim.session.current_step, 0);
        assert!(sim.wallet().is_empty());
        assert!(sim.pending.is_none());
        assert!(sim.challenge.is_none());
        assert!(sim.session.user_actions.is_empty());
    }

    #[test]
    fn test_step_index_round_trip() {
        for idx in 0..WalletStep::COUNT {
            assert_eq!(WalletStep::from_index(idx).unwrap().index(), idx);
        }
        assert_eq!(WalletStep::from_index(WalletStep::COUNT), None);
    }
}
