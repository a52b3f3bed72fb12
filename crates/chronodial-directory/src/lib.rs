//! Chronodial Directory crate - the static year-key -> persona lookup table.
//!
//! The directory maps a 4-character dialed year to a historical-figure
//! persona and its external conversational-agent id. It is built once at
//! startup and never mutated; queries are exact-key lookups. A persona
//! whose agent id is empty is still present and listable: provisioning is
//! an operational concern, not a data-integrity one.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Required length of a directory key (a zero-padded year).
pub const KEY_LEN: usize = 4;

/// A historical-figure persona reachable by dialing its year key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaRecord {
    /// 4-character numeric key, unique, chronologically sortable.
    pub key: String,
    /// Human-readable persona name.
    pub display_name: String,
    /// Opaque external agent identifier. Empty means not provisioned.
    pub agent_id: String,
    /// Human-readable era label.
    pub era: Option<String>,
    /// Canned opening line shown by the UI; the remote agent supplies its
    /// own spoken opening, so this is cosmetic.
    pub greeting: Option<String>,
}

impl PersonaRecord {
    /// Whether this persona has an agent id and can actually take a call.
    pub fn is_provisioned(&self) -> bool {
        !self.agent_id.is_empty()
    }
}

struct PersonaSeed {
    key: &'static str,
    display_name: &'static str,
    era: &'static str,
    greeting: &'static str,
}

// Cleopatra's 0069 dial code sits before her reign; it is the code the
// keypad has always used, so it stays as-is.
const PERSONA_SEEDS: &[PersonaSeed] = &[
    PersonaSeed {
        key: "0044",
        display_name: "Julius Caesar",
        era: "Roman Empire",
        greeting: "Salve! Who speaks through this strange device?",
    },
    PersonaSeed {
        key: "0069",
        display_name: "Cleopatra",
        era: "Ancient Egypt",
        greeting: "Who dares summon the Queen of the Nile?",
    },
    PersonaSeed {
        key: "0399",
        display_name: "Socrates",
        era: "Ancient Greece",
        greeting: "Ah, a visitor. Tell me, what do you seek to know?",
    },
    PersonaSeed {
        key: "1429",
        display_name: "Joan of Arc",
        era: "Hundred Years' War",
        greeting: "I hear voices... is this another divine message?",
    },
    PersonaSeed {
        key: "1505",
        display_name: "Leonardo da Vinci",
        era: "Renaissance",
        greeting: "Fascinating! What manner of invention is this?",
    },
    PersonaSeed {
        key: "1776",
        display_name: "Benjamin Franklin",
        era: "American Revolution",
        greeting: "By thunder! Is this some form of electrical communication?",
    },
    PersonaSeed {
        key: "1863",
        display_name: "Abraham Lincoln",
        era: "Civil War",
        greeting: "Good day to you. How may I be of service?",
    },
    PersonaSeed {
        key: "1889",
        display_name: "Nikola Tesla",
        era: "Age of Electricity",
        greeting: "Remarkable! Wireless communication, just as I envisioned!",
    },
    PersonaSeed {
        key: "1911",
        display_name: "Marie Curie",
        era: "Radioactivity Research",
        greeting: "Bonjour! How curious... what elements power this device?",
    },
    PersonaSeed {
        key: "1945",
        display_name: "Albert Einstein",
        era: "Modern Physics",
        greeting: "Interesting... time and space continue to surprise me.",
    },
    PersonaSeed {
        key: "1969",
        display_name: "Neil Armstrong",
        era: "Space Age",
        greeting: "Houston, we have... a caller? This is unexpected.",
    },
];

/// Read `AGENT_ID_<year>` environment variables for every built-in year.
///
/// This is the exact format the provisioning tool writes to its generated
/// env file. Unset variables are omitted from the returned map, which the
/// directory then resolves to an empty agent id.
pub fn agent_ids_from_env() -> HashMap<String, String> {
    let mut ids = HashMap::new();
    for seed in PERSONA_SEEDS {
        if let Ok(id) = std::env::var(format!("AGENT_ID_{}", seed.key)) {
            if !id.is_empty() {
                ids.insert(seed.key.to_string(), id);
            }
        }
    }
    ids
}

/// Immutable year-key -> persona directory.
///
/// Built once from the static persona table plus an agent-id map supplied
/// by configuration or environment. Keys iterate in chronological order
/// (`BTreeMap` over zero-padded year strings).
#[derive(Debug, Clone)]
pub struct Directory {
    entries: BTreeMap<String, PersonaRecord>,
}

impl Directory {
    /// Build the directory, resolving each persona's agent id from `agent_ids`.
    ///
    /// Years missing from the map get an empty agent id: the entry stays
    /// present and listable but cannot take a call.
    pub fn with_agent_ids(agent_ids: &HashMap<String, String>) -> Self {
        let mut entries = BTreeMap::new();
        for seed in PERSONA_SEEDS {
            let agent_id = agent_ids.get(seed.key).cloned().unwrap_or_default();
            entries.insert(
                seed.key.to_string(),
                PersonaRecord {
                    key: seed.key.to_string(),
                    display_name: seed.display_name.to_string(),
                    agent_id,
                    era: Some(seed.era.to_string()),
                    greeting: Some(seed.greeting.to_string()),
                },
            );
        }

        let provisioned = entries.values().filter(|p| p.is_provisioned()).count();
        tracing::info!(
            total = entries.len(),
            provisioned,
            "Persona directory built"
        );

        Self { entries }
    }

    /// Build the directory from `AGENT_ID_<year>` environment variables alone.
    pub fn from_env() -> Self {
        Self::with_agent_ids(&agent_ids_from_env())
    }

    /// Exact-match lookup of a 4-character year key.
    ///
    /// Keys of any other length, and keys not in the table, yield `None`.
    pub fn lookup(&self, key: &str) -> Option<&PersonaRecord> {
        if key.len() != KEY_LEN {
            return None;
        }
        self.entries.get(key)
    }

    /// All valid keys in chronological order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The "name • era" hint the keypad displays for a fully-dialed key.
    pub fn hint(&self, key: &str) -> Option<String> {
        self.lookup(key).map(|p| match &p.era {
            Some(era) => format!("{} • {}", p.display_name, era),
            None => p.display_name.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn directory_with(year: &str, agent_id: &str) -> Directory {
        let mut ids = HashMap::new();
        ids.insert(year.to_string(), agent_id.to_string());
        Directory::with_agent_ids(&ids)
    }

    #[test]
    fn test_lookup_hit() {
        let dir = directory_with("1945", "agent-einstein");
        let persona = dir.lookup("1945").unwrap();
        assert_eq!(persona.display_name, "Albert Einstein");
        assert_eq!(persona.agent_id, "agent-einstein");
        assert_eq!(persona.era.as_deref(), Some("Modern Physics"));
        assert!(persona.is_provisioned());
    }

    #[test]
    fn test_lookup_miss_is_none_not_error() {
        let dir = Directory::with_agent_ids(&HashMap::new());
        assert!(dir.lookup("0001").is_none());
        assert!(dir.lookup("9999").is_none());
    }

    #[test]
    fn test_lookup_rejects_wrong_length_keys() {
        let dir = Directory::with_agent_ids(&HashMap::new());
        assert!(dir.lookup("").is_none());
        assert!(dir.lookup("194").is_none());
        assert!(dir.lookup("19455").is_none());
    }

    #[test]
    fn test_unprovisioned_entry_is_present_and_listable() {
        let dir = Directory::with_agent_ids(&HashMap::new());
        let persona = dir.lookup("0044").unwrap();
        assert_eq!(persona.agent_id, "");
        assert!(!persona.is_provisioned());
        assert!(dir.keys().any(|k| k == "0044"));
    }

    #[test]
    fn test_keys_are_chronologically_ordered() {
        let dir = Directory::with_agent_ids(&HashMap::new());
        let keys: Vec<&str> = dir.keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.first().copied(), Some("0044"));
        assert_eq!(keys.last().copied(), Some("1969"));
        assert_eq!(dir.len(), 11);
    }

    #[test]
    fn test_cleopatra_key_preserved_as_dialed() {
        // The 0069 code predates her actual reign; it must not be "fixed".
        let dir = Directory::with_agent_ids(&HashMap::new());
        assert_eq!(dir.lookup("0069").unwrap().display_name, "Cleopatra");
    }

    #[test]
    fn test_hint_format() {
        let dir = Directory::with_agent_ids(&HashMap::new());
        assert_eq!(
            dir.hint("1889").as_deref(),
            Some("Nikola Tesla • Age of Electricity")
        );
        assert!(dir.hint("0000").is_none());
    }

    #[test]
    fn test_agent_ids_from_env() {
        std::env::set_var("AGENT_ID_1969", "agent-armstrong");
        let ids = agent_ids_from_env();
        assert_eq!(
            ids.get("1969").map(String::as_str),
            Some("agent-armstrong")
        );
        std::env::remove_var("AGENT_ID_1969");
    }

    #[test]
    fn test_every_seed_has_greeting_and_era() {
        let dir = Directory::with_agent_ids(&HashMap::new());
        for key in dir.keys().collect::<Vec<_>>() {
            let persona = dir.lookup(key).unwrap();
            assert!(persona.era.is_some());
            assert!(persona.greeting.is_some());
            assert_eq!(persona.key, key);
        }
    }
}
