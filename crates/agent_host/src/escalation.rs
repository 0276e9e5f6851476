//! Escalation policy: decides whether a message may be answered by the
//! assistant or has to go to human IT support.
//!
//! Matching is plain case-insensitive substring containment, so
//! "administrator" hits "admin" and "firewalls" hits "firewall". False
//! positives are accepted; a missed escalation is not.

use shared::settings::EscalationSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Escalation {
    Escalate,
    SafeToAnswer,
}

/// Which keyword list produced a hit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscalationKind {
    /// Severity topic (data loss, malware, boot failure, ...)
    Critical,
    /// Needs admin rights or a system change
    AdminRequired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscalationMatch {
    pub keyword: String,
    pub kind: EscalationKind,
}

#[derive(Clone, Debug)]
pub struct EscalationPolicy {
    always_escalate: Vec<String>,
    escalation_triggers: Vec<String>,
}

impl EscalationPolicy {
    pub fn new(settings: &EscalationSettings) -> Self {
        Self {
            always_escalate: normalize(&settings.always_escalate),
            escalation_triggers: normalize(&settings.escalation_triggers),
        }
    }

    pub fn classify(&self, message: &str) -> Escalation {
        if self.find_match(message).is_some() {
            Escalation::Escalate
        } else {
            Escalation::SafeToAnswer
        }
    }

    /// First matching keyword, checking the always-escalate list first.
    pub fn find_match(&self, message: &str) -> Option<EscalationMatch> {
        let lower = message.to_lowercase();

        let hit = |list: &[String], kind| {
            list.iter()
                .find(|kw| lower.contains(kw.as_str()))
                .map(|kw| EscalationMatch {
                    keyword: kw.clone(),
                    kind,
                })
        };

        hit(&self.always_escalate, EscalationKind::Critical)
            .or_else(|| hit(&self.escalation_triggers, EscalationKind::AdminRequired))
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::new(&EscalationSettings::default())
    }
}

// Lowercase once. Surrounding spaces are part of the needle; blank
// needles are dropped since they would match every message.
fn normalize(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .map(|k| k.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_rights_escalates() {
        let policy = EscalationPolicy::default();
        assert_eq!(
            policy.classify("Can you help with admin rights?"),
            Escalation::Escalate
        );
    }

    #[test]
    fn test_flickering_is_safe() {
        let policy = EscalationPolicy::default();
        assert_eq!(
            policy.classify("My screen is flickering"),
            Escalation::SafeToAnswer
        );
    }

    #[test]
    fn test_matching_is_case_insensitive_substring() {
        let policy = EscalationPolicy::default();
        assert_eq!(
            policy.classify("Ask the ADMINISTRATOR"),
            Escalation::Escalate
        );
        assert_eq!(policy.classify("BiOs password"), Escalation::Escalate);
        // Substring, not word match
        assert_eq!(policy.classify("badminton club"), Escalation::Escalate);
    }

    #[test]
    fn test_empty_input_is_safe() {
        let policy = EscalationPolicy::default();
        assert_eq!(policy.classify(""), Escalation::SafeToAnswer);
        assert_eq!(policy.classify("   \n\t"), Escalation::SafeToAnswer);
    }

    #[test]
    fn test_every_default_keyword_escalates() {
        let settings = EscalationSettings::default();
        let policy = EscalationPolicy::new(&settings);
        for kw in settings
            .always_escalate
            .iter()
            .chain(settings.escalation_triggers.iter())
        {
            let msg = format!("hello, I have a {} problem", kw.to_uppercase());
            assert_eq!(policy.classify(&msg), Escalation::Escalate, "{}", kw);
        }
    }

    #[test]
    fn test_always_escalate_list_wins() {
        let policy = EscalationPolicy::default();
        let hit = policy
            .find_match("malware changed my firewall")
            .unwrap();
        assert_eq!(hit.kind, EscalationKind::Critical);
        assert_eq!(hit.keyword, "malware");

        let hit = policy.find_match("need a driver update").unwrap();
        assert_eq!(hit.kind, EscalationKind::AdminRequired);
    }

    #[test]
    fn test_custom_lists_ignore_blank_keywords() {
        let settings = EscalationSettings {
            always_escalate: vec!["  ".into(), "Printer Fire".into()],
            escalation_triggers: vec![String::new()],
        };
        let policy = EscalationPolicy::new(&settings);
        assert_eq!(policy.classify("word document"), Escalation::SafeToAnswer);
        assert_eq!(
            policy.classify("there is a printer fire!"),
            Escalation::Escalate
        );
    }

    #[test]
    fn test_padded_keyword_keeps_its_spaces() {
        let settings = EscalationSettings {
            always_escalate: vec![" RAM ".into()],
            escalation_triggers: Vec::new(),
        };
        let policy = EscalationPolicy::new(&settings);
        assert_eq!(policy.classify("my program froze"), Escalation::SafeToAnswer);
        assert_eq!(
            policy.classify("I think the ram stick is loose"),
            Escalation::Escalate
        );
        assert_eq!(policy.find_match("add more RAM please").unwrap().keyword, " ram ");
    }
}
