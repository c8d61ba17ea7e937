//! Session generation.
//!
//! Picks questions for a [`TestMode`] without repeating anything the user has
//! already been served, until the mode's pool runs out of fresh questions;
//! after that, sessions top up from the whole pool and repeats are allowed.

use std::collections::HashSet;

use rand::Rng;

use crate::bank::QuestionBank;
use crate::history::{HistoryStore, Ledger, UserHistory};
use crate::model::{ModeDefaults, Question, TestMode, TestSession};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 5;

/// Uniform in-place Fisher–Yates shuffle, last element first.
pub fn shuffle_in_place<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// `test-<unix millis>-<5 base-36 chars>`.
pub fn new_test_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("test-{}-{suffix}", chrono::Utc::now().timestamp_millis())
}

/// How much of a mode's pool a user has already been served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub seen: usize,
    pub pool: usize,
}

impl Coverage {
    pub fn fresh(&self) -> usize {
        self.pool - self.seen
    }
}

/// Generates sessions from a bank, recording what it serves in a ledger.
pub struct Selector<S> {
    bank: QuestionBank,
    ledger: Ledger<S>,
    defaults: ModeDefaults,
}

impl<S: HistoryStore> Selector<S> {
    pub fn new(bank: QuestionBank, store: S) -> Self {
        Self {
            bank,
            ledger: Ledger::new(store),
            defaults: ModeDefaults::default(),
        }
    }

    /// Override the per-mode default counts.
    pub fn with_defaults(mut self, defaults: ModeDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub fn defaults(&self) -> &ModeDefaults {
        &self.defaults
    }

    /// Candidate questions for `mode`, in bank order.
    pub fn pool(&self, mode: &TestMode) -> Vec<&Question> {
        let questions = self.bank.questions().iter();
        match mode {
            TestMode::Full { .. } => questions.collect(),
            TestMode::Subject { subject, .. } => {
                questions.filter(|q| &q.subject == subject).collect()
            }
            TestMode::Topic { topic, .. } => {
                let needle = topic.to_lowercase();
                questions
                    .filter(|q| q.topic.to_lowercase().contains(&needle))
                    .collect()
            }
        }
    }

    /// Build a session for `user_id` and record its questions as served.
    ///
    /// Returns `min(count, pool size)` distinct questions in random order.
    /// An empty pool or a non-positive count gives an empty session.
    pub fn generate_session<R: Rng + ?Sized>(
        &self,
        mode: &TestMode,
        user_id: &str,
        rng: &mut R,
    ) -> TestSession {
        let pool = self.pool(mode);
        let count = mode.target_count(&self.defaults);

        if pool.is_empty() {
            tracing::warn!("no questions match {mode}; returning an empty session");
        }

        let entry = self.ledger.entry(user_id);
        let mut chosen = choose_without_repeats(&pool, entry.history(), count, rng);
        entry.commit(chosen.iter().map(|q| q.id.as_str()));

        shuffle_in_place(&mut chosen, rng);

        let test_id = new_test_id(rng);
        tracing::debug!(
            "generated {test_id} for '{user_id}': {} of {} requested from a pool of {} ({mode})",
            chosen.len(),
            count,
            pool.len()
        );

        TestSession {
            test_id,
            questions: chosen.into_iter().cloned().collect(),
            mode_config: mode.clone(),
        }
    }

    /// How much of `mode`'s pool `user_id` has been served so far.
    pub fn coverage(&self, mode: &TestMode, user_id: &str) -> Coverage {
        let history = self.ledger.user_history(user_id);
        let used = history.used_set();
        let pool = self.pool(mode);
        let seen = pool.iter().filter(|q| used.contains(q.id.as_str())).count();
        Coverage {
            seen,
            pool: pool.len(),
        }
    }
}

/// Fresh questions first; once those run short, top up from a shuffle of
/// the whole pool, skipping anything already picked.
fn choose_without_repeats<'q, R: Rng + ?Sized>(
    pool: &[&'q Question],
    history: &UserHistory,
    count: usize,
    rng: &mut R,
) -> Vec<&'q Question> {
    let used = history.used_set();
    let mut fresh: Vec<&Question> = pool
        .iter()
        .copied()
        .filter(|q| !used.contains(q.id.as_str()))
        .collect();

    if fresh.len() >= count {
        shuffle_in_place(&mut fresh, rng);
        fresh.truncate(count);
        return fresh;
    }

    let mut chosen = fresh;
    let mut picked: HashSet<&str> = chosen.iter().map(|q| q.id.as_str()).collect();

    let mut refill: Vec<&Question> = pool.to_vec();
    shuffle_in_place(&mut refill, rng);
    for q in refill {
        if chosen.len() >= count {
            break;
        }
        if picked.insert(q.id.as_str()) {
            chosen.push(q);
        }
    }

    chosen
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::error::StorageError;
    use crate::history::{HistoryMap, MemoryHistoryStore};
    use crate::model::Difficulty;

    /// Every read and write fails.
    struct UnavailableStore;

    impl HistoryStore for UnavailableStore {
        fn load(&self) -> Result<HistoryMap, StorageError> {
            Err(StorageError::Unavailable("read-only volume".into()))
        }

        fn save(&self, _: &HistoryMap) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only volume".into()))
        }
    }

    fn question(id: &str, subject: &str, topic: &str) -> Question {
        Question {
            id: id.into(),
            subject: subject.into(),
            topic: topic.into(),
            text: format!("Prompt for {id}"),
            options: ["A".into(), "B".into(), "C".into(), "D".into()],
            correct_index: 0,
            difficulty: Difficulty::Medium,
            explanation: String::new(),
            source: String::new(),
        }
    }

    fn make_bank(n: usize) -> QuestionBank {
        let questions = (1..=n)
            .map(|i| question(&format!("q{i}"), "Psychology", "General"))
            .collect();
        QuestionBank::from_questions(questions).bank
    }

    fn selector(bank: QuestionBank) -> Selector<MemoryHistoryStore> {
        Selector::new(bank, MemoryHistoryStore::new())
    }

    fn ids(session: &TestSession) -> Vec<String> {
        session.questions.iter().map(|q| q.id.clone()).collect()
    }

    fn assert_distinct(session: &TestSession) {
        let unique: HashSet<&str> = session.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(unique.len(), session.questions.len(), "duplicate ids in session");
    }

    #[test]
    fn shuffle_is_uniform_over_permutations() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<[u8; 3], u32> = HashMap::new();
        let trials = 60_000;
        for _ in 0..trials {
            let mut items = [0u8, 1, 2];
            shuffle_in_place(&mut items, &mut rng);
            *counts.entry(items).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        let expected = trials / 6;
        for (perm, n) in &counts {
            let deviation = (*n as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.05, "{perm:?} drawn {n} times");
        }
    }

    #[test]
    fn shuffle_handles_tiny_slices() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: [u8; 0] = [];
        shuffle_in_place(&mut empty, &mut rng);
        let mut one = [42];
        shuffle_in_place(&mut one, &mut rng);
        assert_eq!(one, [42]);
    }

    #[test]
    fn test_id_format() {
        let mut rng = StdRng::seed_from_u64(3);
        let id = new_test_id(&mut rng);
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "test");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 5);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(id, new_test_id(&mut rng));
    }

    #[test]
    fn session_has_requested_count_and_no_duplicates() {
        let sel = selector(make_bank(50));
        let mut rng = StdRng::seed_from_u64(11);
        let session = sel.generate_session(&TestMode::full().with_count(20), "u", &mut rng);
        assert_eq!(session.questions.len(), 20);
        assert_distinct(&session);
        assert!(session.test_id.starts_with("test-"));
        assert_eq!(session.mode_config, TestMode::full().with_count(20));
    }

    #[test]
    fn default_count_applies_and_is_capped_by_pool() {
        let sel = selector(make_bank(30));
        let mut rng = StdRng::seed_from_u64(5);
        let session = sel.generate_session(&TestMode::full(), "u", &mut rng);
        assert_eq!(session.questions.len(), 30);
        assert_distinct(&session);
    }

    #[test]
    fn configured_defaults_are_used() {
        let sel = selector(make_bank(30)).with_defaults(ModeDefaults {
            full: 4,
            subject: 3,
            topic: 2,
        });
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(sel.generate_session(&TestMode::full(), "u", &mut rng).questions.len(), 4);
        assert_eq!(
            sel.generate_session(&TestMode::topic("gen"), "u", &mut rng).questions.len(),
            2
        );
    }

    #[test]
    fn next_session_avoids_previous_questions_while_fresh_remain() {
        let sel = selector(make_bank(30));
        let mut rng = StdRng::seed_from_u64(42);
        let mode = TestMode::full().with_count(10);

        let mut seen = HashSet::new();
        for _ in 0..3 {
            let session = sel.generate_session(&mode, "alice", &mut rng);
            assert_eq!(session.questions.len(), 10);
            for id in ids(&session) {
                assert!(seen.insert(id), "question repeated before pool exhausted");
            }
        }
        assert_eq!(seen.len(), 30);
    }

    #[test]
    fn wraparound_still_fills_the_session() {
        let sel = selector(make_bank(12));
        let mut rng = StdRng::seed_from_u64(9);
        let mode = TestMode::full().with_count(5);

        for _ in 0..6 {
            let session = sel.generate_session(&mode, "bob", &mut rng);
            assert_eq!(session.questions.len(), 5);
            assert_distinct(&session);
        }
        assert_eq!(sel.ledger().used_ids("bob").len(), 12);
    }

    #[test]
    fn partial_fresh_pool_takes_all_fresh_then_tops_up() {
        let sel = selector(make_bank(10));
        let mut rng = StdRng::seed_from_u64(21);
        let mode = TestMode::full().with_count(4);

        let first = sel.generate_session(&mode, "carol", &mut rng);
        let second = sel.generate_session(&mode, "carol", &mut rng);
        let served: HashSet<String> = ids(&first).into_iter().chain(ids(&second)).collect();
        assert_eq!(served.len(), 8);

        let third = sel.generate_session(&mode, "carol", &mut rng);
        assert_eq!(third.questions.len(), 4);
        assert_distinct(&third);
        let fresh_in_third = ids(&third)
            .into_iter()
            .filter(|id| !served.contains(id))
            .count();
        assert_eq!(fresh_in_third, 2);
        assert_eq!(sel.coverage(&mode, "carol"), Coverage { seen: 10, pool: 10 });
    }

    #[test]
    fn history_is_per_user() {
        let sel = selector(make_bank(6));
        let mut rng = StdRng::seed_from_u64(2);
        let mode = TestMode::full().with_count(6);
        sel.generate_session(&mode, "alice", &mut rng);
        assert_eq!(sel.coverage(&mode, "alice").fresh(), 0);
        assert_eq!(sel.coverage(&mode, "dave").fresh(), 6);
    }

    #[test]
    fn non_positive_count_gives_empty_session() {
        let sel = selector(make_bank(10));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sel
            .generate_session(&TestMode::full().with_count(0), "u", &mut rng)
            .questions
            .is_empty());
        assert!(sel
            .generate_session(&TestMode::full().with_count(-5), "u", &mut rng)
            .questions
            .is_empty());
        assert!(sel.ledger().used_ids("u").is_empty());
    }

    #[test]
    fn unavailable_storage_still_yields_full_sessions() {
        let sel = Selector::new(make_bank(15), UnavailableStore);
        let mut rng = StdRng::seed_from_u64(13);
        let mode = TestMode::full().with_count(10);

        for _ in 0..2 {
            let session = sel.generate_session(&mode, "erin", &mut rng);
            assert_eq!(session.questions.len(), 10);
            assert_distinct(&session);
        }
        assert!(sel.ledger().used_ids("erin").is_empty());
        assert_eq!(sel.coverage(&mode, "erin"), Coverage { seen: 0, pool: 15 });
    }

    #[test]
    fn empty_pool_gives_empty_session() {
        let sel = selector(make_bank(10));
        let mut rng = StdRng::seed_from_u64(1);
        let session = sel.generate_session(&TestMode::subject("Astronomy"), "u", &mut rng);
        assert!(session.questions.is_empty());

        let empty = selector(QuestionBank::default());
        assert!(empty
            .generate_session(&TestMode::full(), "u", &mut rng)
            .questions
            .is_empty());
    }

    #[test]
    fn topic_filter_is_case_insensitive_substring() {
        let bank = QuestionBank::from_questions(vec![
            question("g1", "Social Psychology", "Group Processes"),
            question("n1", "Social Psychology", "Norms"),
            question("g2", "Social Psychology", "Group Processes"),
            question("n2", "Social Psychology", "Norms"),
        ])
        .bank;
        let sel = selector(bank);
        let mut rng = StdRng::seed_from_u64(4);

        for needle in ["group", "GROUP", "Group"] {
            let session =
                sel.generate_session(&TestMode::topic(needle).with_count(10), "u", &mut rng);
            assert_eq!(session.questions.len(), 2);
            assert!(session.questions.iter().all(|q| q.topic == "Group Processes"));
        }
    }

    #[test]
    fn subject_filter_is_exact() {
        let bank = QuestionBank::from_questions(vec![
            question("s1", "Social Psychology", "Norms"),
            question("a1", "Abnormal Psychology", "Disorders"),
        ])
        .bank;
        let sel = selector(bank);
        assert_eq!(sel.pool(&TestMode::subject("Social Psychology")).len(), 1);
        assert!(sel.pool(&TestMode::subject("social psychology")).is_empty());
        assert!(sel.pool(&TestMode::subject("Social")).is_empty());
    }

    #[test]
    fn same_seed_gives_same_selection() {
        let mode = TestMode::full().with_count(8);
        let a = selector(make_bank(40)).generate_session(&mode, "u", &mut StdRng::seed_from_u64(99));
        let b = selector(make_bank(40)).generate_session(&mode, "u", &mut StdRng::seed_from_u64(99));
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn choose_prefers_fresh_questions() {
        let bank = make_bank(6);
        let pool: Vec<&Question> = bank.questions().iter().collect();
        let history = UserHistory {
            used_ids: vec!["q1".into(), "q2".into(), "q3".into(), "q4".into()],
        };
        let mut rng = StdRng::seed_from_u64(8);
        let chosen = choose_without_repeats(&pool, &history, 3, &mut rng);
        assert_eq!(chosen.len(), 3);
        // Fresh ones come first, in pool order, before any top-up
        assert_eq!(chosen[0].id, "q5");
        assert_eq!(chosen[1].id, "q6");
        assert!(["q1", "q2", "q3", "q4"].contains(&chosen[2].id.as_str()));
    }
}
