//! Stop-reason aggregation.
//!
//! A single engine iteration can produce several stop reasons at once (the
//! selected step completes the user's target while a breakpoint activates on
//! the next one). [`PauseInformation`] collects them as a tag set plus the
//! breakpoint messages; the reported reason string and description are pure
//! functions of that pair.

use std::collections::BTreeSet;

/// One cause for stopping, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PauseReason {
    /// The client asked for a pause.
    Pause,
    /// Stopped before the first step of the execution.
    Start,
    /// The targeted step completed.
    Step,
    /// More than one step is available; the client must choose.
    Choice,
    /// No steps remain.
    End,
    /// At least one installed breakpoint activated.
    Breakpoint,
}

impl PauseReason {
    fn label(self) -> &'static str {
        match self {
            PauseReason::Pause => "pause",
            PauseReason::Start => "start",
            PauseReason::Step => "step",
            PauseReason::Choice => "choice",
            PauseReason::End => "end",
            PauseReason::Breakpoint => "breakpoint",
        }
    }

    fn headline(self) -> Option<&'static str> {
        match self {
            PauseReason::Pause => Some("Execution paused on demand"),
            PauseReason::Step => Some("Step completed"),
            PauseReason::Choice => Some("Multiple execution steps are available"),
            PauseReason::End => Some("Reached the end of the execution"),
            PauseReason::Start | PauseReason::Breakpoint => None,
        }
    }
}

/// The aggregated reasons and messages of one stop.
#[derive(Debug, Clone, Default)]
pub struct PauseInformation {
    reasons: BTreeSet<PauseReason>,
    messages: Vec<String>,
}

impl PauseInformation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reason tag.
    pub fn add(&mut self, reason: PauseReason) {
        self.reasons.insert(reason);
    }

    /// Record a breakpoint activation, with its message when one was given.
    pub fn add_breakpoint(&mut self, message: Option<String>) {
        self.reasons.insert(PauseReason::Breakpoint);
        if let Some(message) = message {
            self.messages.push(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn contains(&self, reason: PauseReason) -> bool {
        self.reasons.contains(&reason)
    }

    /// The composite reason string, e.g. `"step and breakpoint"`.
    pub fn reason(&self) -> String {
        self.reasons
            .iter()
            .map(|r| r.label())
            .collect::<Vec<_>>()
            .join(" and ")
    }

    /// The human-readable stop description: one line per high-priority
    /// reason, followed by the breakpoint messages. `None` when there is
    /// nothing to say.
    pub fn description(&self) -> Option<String> {
        let mut lines: Vec<&str> = self
            .reasons
            .iter()
            .filter_map(|r| r.headline())
            .collect();
        lines.extend(self.messages.iter().map(String::as_str));

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}
