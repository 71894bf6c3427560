//! The supervisor bridge: owns the current rule snapshot and the one piece
//! of "loop body" logic this crate is responsible for (per item: evaluate
//! each rule in order, dispatch on first match, stop). The actual stream
//! polling, sleeping between rounds, and wiki I/O live in the binary that
//! embeds this crate and implements [`SiteApiClient`].

use std::sync::Arc;
use std::time::Duration;

use crate::actions;
use crate::error::{DispatchError, FacadeError};
use crate::evaluator;
use crate::item::{ItemFacade, ItemKind};
use crate::rule::{sort_rules, Rule, RuleKind};

/// Collaborator contract for pushing the rendered legacy-AutoModerator
/// config back to the site. The real implementation holds the site-API
/// session; this crate only calls through the trait.
pub trait SiteApiClient {
    fn push_automod_config(&mut self, rendered_yaml: &str) -> Result<(), FacadeError>;
}

/// Deserialized from the top-level wiki config page.
#[derive(Debug, Clone, Copy, Default, serde::Deserialize)]
pub struct SupervisorConfig {
    #[serde(default)]
    pub overwrite_automoderator: bool,
}

/// Cadence knobs for the embedding binary's polling loop. Not exercised by
/// any loop in this crate; exists so the binary and its tests share one
/// source of truth for the numbers in SPEC_FULL.md §5/§6.
#[derive(Debug, Clone, Copy)]
pub struct PollingConfig {
    pub round_sleep: Duration,
    pub reload_every_n_rounds: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            round_sleep: Duration::from_millis(500),
            reload_every_n_rounds: 5,
        }
    }
}

fn rule_applies_to_kind(kind: RuleKind, item_kind: ItemKind) -> bool {
    match kind {
        RuleKind::Any => true,
        RuleKind::Submission => item_kind == ItemKind::Submission,
        RuleKind::Comment => item_kind == ItemKind::Comment,
        RuleKind::Modqueue => item_kind == ItemKind::ModqueueEntry,
        RuleKind::Modmail => item_kind == ItemKind::Modmail,
        // Report rules target reported submissions/comments surfaced through
        // the modqueue; they never apply to modmail conversations.
        RuleKind::Report => matches!(
            item_kind,
            ItemKind::Submission | ItemKind::Comment | ItemKind::ModqueueEntry
        ),
    }
}

/// Orchestrates rule snapshot + dispatch. Generic over the site-API
/// collaborator so tests can plug in an in-memory double.
pub struct Supervisor<C: SiteApiClient> {
    rules: Arc<Vec<Rule>>,
    client: C,
    config: SupervisorConfig,
}

impl<C: SiteApiClient> Supervisor<C> {
    pub fn new(client: C, config: SupervisorConfig, rules: Vec<Rule>) -> Self {
        let rules = Arc::new(sort_rules(rules));
        log::info!("supervisor starting with {} rules", rules.len());
        Self { rules, client, config }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Atomically swap in a freshly parsed and sorted rule set.
    pub fn reload(&mut self, rules: Vec<Rule>) {
        let rules = Arc::new(sort_rules(rules));
        log::info!("reloaded rule set: {} rules", rules.len());
        self.rules = rules;
    }

    /// Walk the current rule snapshot for `item`'s kind, evaluating each
    /// rule in order; dispatch and stop on the first match. Returns whether
    /// any rule matched.
    pub fn process_item(&self, item: &mut dyn ItemFacade) -> Result<bool, DispatchError> {
        let snapshot = Arc::clone(&self.rules);
        for rule in snapshot.iter() {
            if !rule_applies_to_kind(rule.kind, item.kind()) {
                continue;
            }
            let (matched, record) = evaluator::evaluate_with_record(rule, item);
            if matched {
                actions::dispatch(rule, item, &record)?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Split the current snapshot into (requires_bam, legacy-renderable).
    pub fn partition_bam(&self) -> (Vec<&Rule>, Vec<&Rule>) {
        self.rules.iter().partition(|r| r.requires_bam)
    }

    /// Render every non-`requires_bam` rule back to legacy AutoModerator
    /// YAML, joined per the §6 wiki-push contract.
    pub fn render_automod_yaml(&self) -> Result<String, serde_yaml::Error> {
        let (_, legacy) = self.partition_bam();
        let docs = legacy
            .iter()
            .map(|r| r.to_reddit_yaml())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(docs.join("\n---\n\n"))
    }

    /// Push the rendered legacy config to the site, if the top-level
    /// config page asked for it.
    pub fn push_config_if_enabled(&mut self) -> Result<(), FacadeError> {
        if !self.config.overwrite_automoderator {
            return Ok(());
        }
        let yaml = self
            .render_automod_yaml()
            .map_err(|e| FacadeError::Collaborator(e.to_string()))?;
        self.client.push_automod_config(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::fakes::FakeItem;
    use crate::rule::parse_rule;

    #[derive(Default)]
    struct RecordingClient {
        pushed: Option<String>,
    }

    impl SiteApiClient for RecordingClient {
        fn push_automod_config(&mut self, rendered_yaml: &str) -> Result<(), FacadeError> {
            self.pushed = Some(rendered_yaml.to_string());
            Ok(())
        }
    }

    fn rule(s: &str) -> Rule {
        parse_rule(serde_yaml::from_str(s).unwrap()).unwrap()
    }

    #[test]
    fn process_item_dispatches_first_matching_rule_and_stops() {
        let rules = vec![
            rule("id: abcde\naction: remove\n"),
            rule("id: abcde\naction: approve\n"),
        ];
        let supervisor = Supervisor::new(RecordingClient::default(), SupervisorConfig::default(), rules);
        let mut item = FakeItem {
            id: "abcde".to_string(),
            ..Default::default()
        };
        let matched = supervisor.process_item(&mut item).unwrap();
        assert!(matched);
        assert!(item.is_removed());
        assert!(!item.is_approved());
    }

    #[test]
    fn process_item_skips_rules_for_the_wrong_kind() {
        let rules = vec![rule("type: comment\nid: abcde\naction: remove\n")];
        let supervisor = Supervisor::new(RecordingClient::default(), SupervisorConfig::default(), rules);
        let mut item = FakeItem {
            kind: Some(ItemKind::Submission),
            id: "abcde".to_string(),
            ..Default::default()
        };
        let matched = supervisor.process_item(&mut item).unwrap();
        assert!(!matched);
        assert!(!item.is_removed());
    }

    #[test]
    fn partition_bam_separates_requires_bam_rules() {
        let rules = vec![rule("type: modmail\naction: approve\n"), rule("id: abcde\naction: remove\n")];
        let supervisor = Supervisor::new(RecordingClient::default(), SupervisorConfig::default(), rules);
        let (bam, legacy) = supervisor.partition_bam();
        assert_eq!(bam.len(), 1);
        assert_eq!(legacy.len(), 1);
    }

    #[test]
    fn push_config_if_enabled_pushes_only_when_configured() {
        let rules = vec![rule("id: abcde\naction: remove\n")];
        let mut supervisor = Supervisor::new(
            RecordingClient::default(),
            SupervisorConfig {
                overwrite_automoderator: false,
            },
            rules,
        );
        supervisor.push_config_if_enabled().unwrap();
        assert!(supervisor.client.pushed.is_none());

        supervisor.config.overwrite_automoderator = true;
        supervisor.push_config_if_enabled().unwrap();
        assert!(supervisor.client.pushed.is_some());
    }

    #[test]
    fn polling_config_defaults_match_documented_cadence() {
        let cfg = PollingConfig::default();
        assert_eq!(cfg.round_sleep, Duration::from_millis(500));
        assert_eq!(cfg.reload_every_n_rounds, 5);
    }
}
