//! Phase scheduler: ordered debate stages and exchange-count advancement.
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("a phase list needs at least one phase")]
    NoPhases,
    #[error("exchanges_per_phase must be greater than zero")]
    ZeroThreshold,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A named stage of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub description: String,
    /// Nominal duration. Descriptive only: phases advance on exchange
    /// count, never on elapsed time.
    pub time_budget_secs: u32,
}

impl Phase {
    pub fn new(name: &str, description: &str, time_budget_secs: u32) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            time_budget_secs,
        }
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(u64::from(self.time_budget_secs))
    }
}

/// The fixed debate catalog, in order.
pub fn debate_phases() -> Vec<Phase> {
    vec![
        Phase::new(
            "Opening Statements",
            "Each agent presents their initial position",
            60,
        ),
        Phase::new("First Rebuttals", "Agents respond to opposing arguments", 45),
        Phase::new("Cross-Examination", "Direct questioning between agents", 30),
        Phase::new("Final Arguments", "Closing statements and summary", 60),
    ]
}

/// Load a phase list from a RON file.
pub fn load_phases(path: &Path) -> Result<Vec<Phase>, PhaseError> {
    let contents = std::fs::read_to_string(path)?;
    parse_phases(&contents)
}

pub fn parse_phases(input: &str) -> Result<Vec<Phase>, PhaseError> {
    let phases: Vec<Phase> = ron::from_str(input)?;
    if phases.is_empty() {
        return Err(PhaseError::NoPhases);
    }
    Ok(phases)
}

/// Where a phase sits relative to the scheduler's cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseProgress {
    Completed,
    Current,
    Upcoming,
}

/// Owns the phase list and a cursor into it.
///
/// The cursor moves forward by one each time the exchange counter reaches
/// a positive multiple of `exchanges_per_phase`, and stops at the last
/// phase. The phase list is never empty.
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    phases: Vec<Phase>,
    exchanges_per_phase: u32,
    current_phase_index: usize,
    exchanges_since_last_advance: u32,
}

impl PhaseScheduler {
    pub fn new(phases: Vec<Phase>, exchanges_per_phase: u32) -> Result<Self, PhaseError> {
        if phases.is_empty() {
            return Err(PhaseError::NoPhases);
        }
        if exchanges_per_phase == 0 {
            return Err(PhaseError::ZeroThreshold);
        }
        Ok(Self {
            phases,
            exchanges_per_phase,
            current_phase_index: 0,
            exchanges_since_last_advance: 0,
        })
    }

    /// The four debate phases with the default threshold of 8.
    pub fn debate() -> Self {
        Self {
            phases: debate_phases(),
            exchanges_per_phase: 8,
            current_phase_index: 0,
            exchanges_since_last_advance: 0,
        }
    }

    /// The phase under the cursor, or the first phase if the cursor is
    /// somehow out of range.
    pub fn current_phase(&self) -> &Phase {
        self.phases
            .get(self.current_phase_index)
            .unwrap_or(&self.phases[0])
    }

    pub fn first_phase(&self) -> &Phase {
        &self.phases[0]
    }

    /// Count one exchange. Returns true if this exchange moved the cursor.
    pub fn record_exchange(&mut self) -> bool {
        self.exchanges_since_last_advance = self.exchanges_since_last_advance.saturating_add(1);
        let due = self.exchanges_since_last_advance % self.exchanges_per_phase == 0;
        if due && !self.is_final_phase() {
            self.current_phase_index += 1;
            self.exchanges_since_last_advance = 0;
            tracing::info!(
                phase = %self.current_phase().name,
                round = self.current_phase_index + 1,
                "advanced to next phase"
            );
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.current_phase_index = 0;
        self.exchanges_since_last_advance = 0;
    }

    pub fn is_final_phase(&self) -> bool {
        self.current_phase_index + 1 >= self.phases.len()
    }

    pub fn progress(&self, index: usize) -> PhaseProgress {
        match index.cmp(&self.current_phase_index) {
            std::cmp::Ordering::Less => PhaseProgress::Completed,
            std::cmp::Ordering::Equal => PhaseProgress::Current,
            std::cmp::Ordering::Greater => PhaseProgress::Upcoming,
        }
    }

    pub fn current_phase_index(&self) -> usize {
        self.current_phase_index
    }

    pub fn exchanges_since_last_advance(&self) -> u32 {
        self.exchanges_since_last_advance
    }

    pub fn exchanges_per_phase(&self) -> u32 {
        self.exchanges_per_phase
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_opening_statements() {
        let scheduler = PhaseScheduler::debate();
        assert_eq!(scheduler.current_phase_index(), 0);
        assert_eq!(scheduler.current_phase().name, "Opening Statements");
        assert_eq!(scheduler.phases().len(), 4);
    }

    #[test]
    fn final_phase_counter_saturates() {
        let mut scheduler = PhaseScheduler::debate();
        for _ in 0..24 {
            scheduler.record_exchange();
        }
        assert!(scheduler.is_final_phase());
        scheduler.exchanges_since_last_advance = u32::MAX - 1;
        assert!(!scheduler.record_exchange());
        assert!(!scheduler.record_exchange());
        assert_eq!(scheduler.exchanges_since_last_advance(), u32::MAX);
        assert_eq!(scheduler.current_phase().name, "Final Arguments");
    }

    #[test]
    fn advances_once_per_threshold() {
        let mut scheduler = PhaseScheduler::debate();
        for _ in 0..7 {
            assert!(!scheduler.record_exchange());
        }
        assert_eq!(scheduler.exchanges_since_last_advance(), 7);
        assert!(scheduler.record_exchange());
        assert_eq!(scheduler.current_phase_index(), 1);
        assert_eq!(scheduler.exchanges_since_last_advance(), 0);
        assert_eq!(scheduler.current_phase().name, "First Rebuttals");
    }

    #[test]
    fn never_passes_last_phase() {
        let mut scheduler = PhaseScheduler::debate();
        let mut advances = 0;
        for _ in 0..100 {
            if scheduler.record_exchange() {
                advances += 1;
            }
        }
        assert_eq!(advances, 3);
        assert_eq!(scheduler.current_phase_index(), 3);
        assert!(scheduler.is_final_phase());
        assert_eq!(scheduler.current_phase().name, "Final Arguments");
        // 24 exchanges were spent advancing; the rest pile up in the final phase.
        assert_eq!(scheduler.exchanges_since_last_advance(), 76);
    }

    #[test]
    fn reset_rewinds() {
        let mut scheduler = PhaseScheduler::debate();
        for _ in 0..19 {
            scheduler.record_exchange();
        }
        assert_eq!(scheduler.current_phase_index(), 2);
        scheduler.reset();
        assert_eq!(scheduler.current_phase_index(), 0);
        assert_eq!(scheduler.exchanges_since_last_advance(), 0);
    }

    #[test]
    fn progress_marks_phase_strip() {
        let mut scheduler = PhaseScheduler::debate();
        for _ in 0..8 {
            scheduler.record_exchange();
        }
        assert_eq!(scheduler.progress(0), PhaseProgress::Completed);
        assert_eq!(scheduler.progress(1), PhaseProgress::Current);
        assert_eq!(scheduler.progress(3), PhaseProgress::Upcoming);
    }

    #[test]
    fn custom_threshold() {
        let mut scheduler = PhaseScheduler::new(debate_phases(), 2).unwrap();
        scheduler.record_exchange();
        scheduler.record_exchange();
        assert_eq!(scheduler.current_phase_index(), 1);
    }

    #[test]
    fn single_phase_never_advances() {
        let mut scheduler =
            PhaseScheduler::new(vec![Phase::new("Only", "just one", 10)], 1).unwrap();
        for _ in 0..5 {
            assert!(!scheduler.record_exchange());
        }
        assert_eq!(scheduler.current_phase().name, "Only");
    }

    #[test]
    fn rejects_empty_and_zero() {
        assert!(matches!(
            PhaseScheduler::new(Vec::new(), 8),
            Err(PhaseError::NoPhases)
        ));
        assert!(matches!(
            PhaseScheduler::new(debate_phases(), 0),
            Err(PhaseError::ZeroThreshold)
        ));
    }

    #[test]
    fn shipped_phase_file_matches_catalog() {
        let path = std::path::PathBuf::from("arena_data/debate/phases.ron");
        let phases = load_phases(&path).unwrap();
        assert_eq!(phases, debate_phases());
        assert_eq!(phases[2].time_budget(), Duration::from_secs(30));
    }
}
