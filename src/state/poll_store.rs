//! Poll collection and voting

use super::models::{new_id, Poll, PollOption};
use crate::persistence::Snapshot;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Owns every poll, in creation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollStore {
    polls: Vec<Poll>,
}

impl Snapshot for PollStore {
    const KEY: &'static str = "poll";
}

impl PollStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polls(&self) -> &[Poll] {
        &self.polls
    }

    pub fn get(&self, id: &str) -> Option<&Poll> {
        self.polls.iter().find(|p| p.id == id)
    }

    /// Create a poll with one zero-count option per text, in the given order.
    /// Returns the new poll's id.
    pub fn create_poll<I, S>(&mut self, question: impl Into<String>, option_texts: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let poll = Poll {
            id: new_id(),
            question: question.into(),
            options: option_texts.into_iter().map(PollOption::new).collect(),
            total_votes: 0,
            created_at: Utc::now(),
        };
        let id = poll.id.clone();
        tracing::debug!(poll_id = %id, options = poll.options.len(), "created poll");
        self.polls.push(poll);
        id
    }

    /// Count one vote. Unknown polls or options are ignored; returns whether a vote was counted.
    pub fn vote(&mut self, poll_id: &str, option_id: &str) -> bool {
        let Some(poll) = self.polls.iter_mut().find(|p| p.id == poll_id) else {
            return false;
        };
        let Some(option) = poll.options.iter_mut().find(|o| o.id == option_id) else {
            return false;
        };

        option.count += 1;
        poll.total_votes += 1;
        tracing::debug!(poll_id, option_id, total = poll.total_votes, "vote counted");
        true
    }

    /// Remove a poll; returns whether one was removed
    pub fn delete_poll(&mut self, poll_id: &str) -> bool {
        let Some(index) = self.polls.iter().position(|p| p.id == poll_id) else {
            return false;
        };
        self.polls.remove(index);
        tracing::debug!(poll_id, "deleted poll");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_totals_consistent(store: &PollStore) {
        for poll in store.polls() {
            let sum: u32 = poll.options.iter().map(|o| o.count).sum();
            assert_eq!(poll.total_votes, sum, "poll {}", poll.id);
        }
    }

    mod create {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_new_poll_has_zero_counts() {
            let mut store = PollStore::new();
            let id = store.create_poll("Favorite color?", ["Red", "Blue"]);

            let poll = store.get(&id).unwrap();
            assert_eq!(poll.question, "Favorite color?");
            let texts: Vec<&str> = poll.options.iter().map(|o| o.text.as_str()).collect();
            assert_eq!(texts, vec!["Red", "Blue"]);
            assert!(poll.options.iter().all(|o| o.count == 0));
            assert_eq!(poll.total_votes, 0);
            assert_ne!(poll.options[0].id, poll.options[1].id);
        }

        #[test]
        fn test_accepts_no_options() {
            let mut store = PollStore::new();
            let id = store.create_poll("Empty?", Vec::<String>::new());
            assert!(store.get(&id).unwrap().options.is_empty());
        }

        #[test]
        fn test_appends_in_creation_order() {
            let mut store = PollStore::new();
            let first = store.create_poll("One", ["a"]);
            let second = store.create_poll("Two", ["b"]);
            let ids: Vec<&str> = store.polls().iter().map(|p| p.id.as_str()).collect();
            assert_eq!(ids, vec![first.as_str(), second.as_str()]);
        }
    }

    mod vote {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_color_scenario() {
            let mut store = PollStore::new();
            let id = store.create_poll("Favorite color?", ["Red", "Blue"]);
            let blue = store.get(&id).unwrap().options[1].id.clone();

            assert!(store.vote(&id, &blue));

            let poll = store.get(&id).unwrap();
            assert_eq!(poll.options[1].count, 1);
            assert_eq!(poll.options[0].count, 0);
            assert_eq!(poll.total_votes, 1);

            assert!(store.delete_poll(&id));
            assert!(store.get(&id).is_none());
        }

        #[test]
        fn test_unknown_poll_or_option_changes_nothing() {
            let mut store = PollStore::new();
            let id = store.create_poll("Q", ["a", "b"]);
            let option = store.get(&id).unwrap().options[0].id.clone();
            let before = store.clone();

            assert!(!store.vote("missing", &option));
            assert!(!store.vote(&id, "missing"));

            assert_eq!(store, before);
        }

        #[test]
        fn test_option_ids_are_scoped_to_their_poll() {
            let mut store = PollStore::new();
            let first = store.create_poll("One", ["a"]);
            let second = store.create_poll("Two", ["b"]);
            let foreign = store.get(&second).unwrap().options[0].id.clone();

            assert!(!store.vote(&first, &foreign));
            assert_eq!(store.get(&second).unwrap().total_votes, 0);
        }

        #[test]
        fn test_totals_stay_consistent() {
            let mut store = PollStore::new();
            let a = store.create_poll("A", ["x", "y", "z"]);
            let b = store.create_poll("B", ["p", "q"]);
            let a_options: Vec<String> =
                store.get(&a).unwrap().options.iter().map(|o| o.id.clone()).collect();
            let b_options: Vec<String> =
                store.get(&b).unwrap().options.iter().map(|o| o.id.clone()).collect();

            for i in 0..25 {
                store.vote(&a, &a_options[i % a_options.len()]);
                store.vote(&b, &b_options[(i * 7) % b_options.len()]);
                store.vote(&b, "bogus");
                assert_totals_consistent(&store);
            }
            assert_eq!(store.get(&a).unwrap().total_votes, 25);
        }
    }

    mod delete {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_delete_unknown_is_noop() {
            let mut store = PollStore::new();
            store.create_poll("Q", ["a"]);
            assert!(!store.delete_poll("missing"));
            assert_eq!(store.polls().len(), 1);
        }

        #[test]
        fn test_delete_leaves_other_polls() {
            let mut store = PollStore::new();
            let keep = store.create_poll("Keep", ["a"]);
            let drop = store.create_poll("Drop", ["b"]);

            store.delete_poll(&drop);

            assert_eq!(store.polls().len(), 1);
            assert!(store.get(&keep).is_some());
        }
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut store = PollStore::new();
        store.create_poll("Q", ["a"]);
        let value = serde_json::to_value(&store).unwrap();
        assert!(value["polls"][0]["options"][0]["count"].is_u64());
        assert!(value["polls"][0]["createdAt"].is_string());
    }
}
