//! Human-readable network status.

use std::fmt;

use super::eligibility::network_allows;
use super::types::{NetworkSnapshot, PriorityClass};

/// Current network reading plus what each priority does on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkStatusReport {
    /// `None` when the platform exposes no connection information.
    pub network: Option<NetworkSnapshot>,
}

/// One row of the priority ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityLine {
    pub priority: PriorityClass,
    pub description: &'static str,
    /// Whether this priority would prefetch right now.
    pub allowed_now: bool,
}

impl NetworkStatusReport {
    pub fn new(network: Option<NetworkSnapshot>) -> Self {
        Self { network }
    }

    /// Text for the current connection, e.g. `3g (Data Saver)`.
    pub fn connection_label(&self) -> String {
        match &self.network {
            Some(snapshot) => snapshot.to_string(),
            None => "Not available".to_string(),
        }
    }

    /// Ladder rows, highest priority first. An unknown network is treated
    /// as the optimistic default.
    pub fn lines(&self) -> Vec<PriorityLine> {
        let network = self.network.unwrap_or_default();
        PriorityClass::ALL
            .iter()
            .map(|&priority| PriorityLine {
                priority,
                description: priority.network_description(),
                allowed_now: network_allows(&network, priority).is_ok(),
            })
            .collect()
    }
}

impl fmt::Display for NetworkStatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Network: {}", self.connection_label())?;
        for line in self.lines() {
            let marker = if line.allowed_now { "✓" } else { "✗" };
            writeln!(
                f,
                "  {} {} priority links {}",
                marker, line.priority, line.description
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefetch::types::EffectiveClass;

    #[test]
    fn test_unavailable_label() {
        let report = NetworkStatusReport::new(None);
        assert_eq!(report.connection_label(), "Not available");
        assert!(report.lines().iter().all(|l| l.allowed_now));
    }

    #[test]
    fn test_lines_follow_ladder() {
        let report =
            NetworkStatusReport::new(Some(NetworkSnapshot::new(EffectiveClass::ThreeG, false)));
        let allowed: Vec<bool> = report.lines().iter().map(|l| l.allowed_now).collect();
        assert_eq!(allowed, vec![true, true, false]);
    }

    #[test]
    fn test_display_mentions_data_saver() {
        let report =
            NetworkStatusReport::new(Some(NetworkSnapshot::new(EffectiveClass::FourG, true)));
        let text = report.to_string();
        assert!(text.starts_with("Current Network: 4g (Data Saver)"));
        assert!(text.contains("low priority links prefetches only on 4g"));
    }
}
