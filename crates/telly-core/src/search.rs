//! Search-as-you-type state machine.
//!
//! The coordinator never sleeps itself. [`SearchCoordinator::input_changed`]
//! hands back a [`DebounceTicket`] whenever a quiet-period timer should be
//! armed, and the owner calls [`SearchCoordinator::timer_expired`] with that
//! ticket once the period elapses. A ticket from an earlier keystroke is
//! simply ignored, which is how a newer keystroke "restarts" the timer.

use crate::error::CoreError;

pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Where the text box currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    /// A timer is armed for `query`.
    Pending { query: String, generation: u64 },
    /// The trimmed text is too short to search.
    Suppressed,
}

/// Identifies one armed quiet-period timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceTicket {
    generation: u64,
    query: String,
}

impl DebounceTicket {
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone)]
pub struct SearchCoordinator {
    min_len: usize,
    text: String,
    generation: u64,
    state: SearchState,
    confirmed: Option<String>,
}

impl Default for SearchCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_QUERY_LEN)
    }
}

impl SearchCoordinator {
    pub fn new(min_len: usize) -> Self {
        Self {
            min_len,
            text: String::new(),
            generation: 0,
            state: SearchState::Idle,
            confirmed: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// The query whose results are currently allowed to land.
    pub fn confirmed(&self) -> Option<&str> {
        self.confirmed.as_deref()
    }

    /// Record a change to the text box.
    ///
    /// Returns a ticket when a timer should be armed. Editing the text away
    /// from the confirmed query supersedes that query, so its in-flight
    /// results will be discarded.
    pub fn input_changed(&mut self, text: impl Into<String>) -> Option<DebounceTicket> {
        self.text = text.into();
        self.generation += 1;

        let trimmed = self.text.trim();
        if self.confirmed.as_deref() != Some(trimmed) {
            self.confirmed = None;
        }

        if trimmed.chars().count() < self.min_len {
            self.state = SearchState::Suppressed;
            return None;
        }

        let query = trimmed.to_string();
        self.state = SearchState::Pending {
            query: query.clone(),
            generation: self.generation,
        };
        Some(DebounceTicket {
            generation: self.generation,
            query,
        })
    }

    /// The quiet period for `ticket` has elapsed.
    ///
    /// Returns the query to search for if the text has not changed since the
    /// ticket was issued.
    pub fn timer_expired(&mut self, ticket: &DebounceTicket) -> Option<String> {
        let armed = matches!(
            &self.state,
            SearchState::Pending { generation, .. } if *generation == ticket.generation
        );
        if !armed || self.text.trim() != ticket.query {
            tracing::debug!(query = %ticket.query, "debounce ticket superseded");
            return None;
        }
        if ticket.query.chars().count() < self.min_len {
            return None;
        }

        self.state = SearchState::Idle;
        self.confirmed = Some(ticket.query.clone());
        Some(ticket.query.clone())
    }

    /// Explicit "search now": skips the quiet period and the length check.
    ///
    /// Empty (or all-whitespace) text is a validation error and changes
    /// nothing.
    pub fn search_now(&mut self, text: impl Into<String>) -> Result<String, CoreError> {
        let text = text.into();
        let query = text.trim().to_string();
        if query.is_empty() {
            return Err(CoreError::Validation("search text cannot be empty".into()));
        }

        self.text = text;
        self.generation += 1;
        self.state = SearchState::Idle;
        self.confirmed = Some(query.clone());
        Ok(query)
    }

    /// Whether results for `query` may still be applied.
    pub fn accepts(&self, query: &str) -> bool {
        self.confirmed.as_deref() == Some(query)
    }
}
