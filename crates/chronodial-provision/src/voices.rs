//! Voice-style tag to concrete voice id resolution.
//!
//! Persona definitions carry a human-readable style tag; the external
//! service wants one of its voice ids. Unknown tags fall back to a
//! default voice rather than failing the whole persona.

/// Fallback voice id used when a style tag has no mapping.
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Style tag -> voice id, matched by exact tag.
const VOICE_STYLES: &[(&str, &str)] = &[
    ("Male Deep", "ErXwobaYiN019PkySvjV"),
    ("Female Sultry", "21m00Tcm4TlvDq8ikWAM"),
    ("Male Old Scholarly", "TxGEqnHWrfWFTfGW9XjX"),
    ("Female Young Passionate", "AZnzlk1XvdvUeBnXmlld"),
    ("Male Intellectual", "ODq5zmih8GrVes37Dizd"),
    ("Male Witty American", "flq6f7yk4E4fJM5XTYuZ"),
    ("Male Deep American", "VR6AewLTigWg4xSOukaG"),
    ("Male Intense Accent", "MF3mGyEYCl7XYWLGt9L6"),
    ("Female Polish/French Accent", "EXAVITQu4vr4xnSDxMaL"),
    ("Male German Accent", "bVMeCyTHy58xNoL34h3p"),
    ("Male American Astronaut", "JBFqnCBsd6RMkjVDRZzb"),
];

/// Resolve a style tag to a voice id, falling back to [`DEFAULT_VOICE_ID`].
pub fn voice_id_for(style: &str) -> &'static str {
    VOICE_STYLES
        .iter()
        .find(|(tag, _)| *tag == style)
        .map(|(_, id)| *id)
        .unwrap_or(DEFAULT_VOICE_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characters::CHARACTERS;

    #[test]
    fn test_known_style_resolves() {
        assert_eq!(voice_id_for("Male Deep"), "ErXwobaYiN019PkySvjV");
        assert_eq!(voice_id_for("Male German Accent"), "bVMeCyTHy58xNoL34h3p");
    }

    #[test]
    fn test_unknown_style_falls_back() {
        assert_eq!(voice_id_for("Robot Monotone"), DEFAULT_VOICE_ID);
        assert_eq!(voice_id_for(""), DEFAULT_VOICE_ID);
    }

    #[test]
    fn test_every_roster_style_has_a_mapping() {
        // The fallback exists for config drift, but the shipped roster
        // should resolve without it (the one tag that maps to the default
        // id does so explicitly).
        for def in CHARACTERS {
            assert!(
                VOICE_STYLES.iter().any(|(tag, _)| *tag == def.voice_style),
                "style {:?} for {} is unmapped",
                def.voice_style,
                def.name
            );
        }
    }
}
