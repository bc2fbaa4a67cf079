use serde::{Deserialize, Serialize};

/// Capability gated by a global kill-switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    TextGeneration,
    MediaGeneration,
    VoiceSynthesis,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::TextGeneration => "text-generation",
            Capability::MediaGeneration => "media-generation",
            Capability::VoiceSynthesis => "voice-synthesis",
        }
    }
}

/// Process-wide configuration, independent of any single user. Mutated only
/// through the admin path and consulted before every capability dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Per-capability kill-switches
    pub features: FeatureToggles,
    /// When true, everything except read-only views is refused
    pub maintenance_mode: bool,
}

/// Per-capability enable flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureToggles {
    pub text_generation: bool,
    pub media_generation: bool,
    pub voice_synthesis: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            features: FeatureToggles {
                text_generation: true,
                media_generation: true,
                voice_synthesis: true,
            },
            maintenance_mode: false,
        }
    }
}

impl GlobalConfig {
    /// Whether a capability is currently enabled
    pub fn feature_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::TextGeneration => self.features.text_generation,
            Capability::MediaGeneration => self.features.media_generation,
            Capability::VoiceSynthesis => self.features.voice_synthesis,
        }
    }

    /// Merge a partial update over this config. Fields omitted from the
    /// patch are left untouched.
    pub fn apply(&mut self, patch: &GlobalConfigPatch) {
        if let Some(v) = patch.text_generation {
            self.features.text_generation = v;
        }
        if let Some(v) = patch.media_generation {
            self.features.media_generation = v;
        }
        if let Some(v) = patch.voice_synthesis {
            self.features.voice_synthesis = v;
        }
        if let Some(v) = patch.maintenance_mode {
            self.maintenance_mode = v;
        }
    }
}

/// Partial update for the global config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfigPatch {
    pub text_generation: Option<bool>,
    pub media_generation: Option<bool>,
    pub voice_synthesis: Option<bool>,
    pub maintenance_mode: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_everything() {
        let config = GlobalConfig::default();
        assert!(config.feature_enabled(Capability::TextGeneration));
        assert!(config.feature_enabled(Capability::MediaGeneration));
        assert!(config.feature_enabled(Capability::VoiceSynthesis));
        assert!(!config.maintenance_mode);
    }

    #[test]
    fn test_patch_merges_only_provided_fields() {
        let mut config = GlobalConfig::default();
        config.apply(&GlobalConfigPatch {
            voice_synthesis: Some(false),
            ..Default::default()
        });

        assert!(!config.feature_enabled(Capability::VoiceSynthesis));
        assert!(config.feature_enabled(Capability::TextGeneration));
        assert!(config.feature_enabled(Capability::MediaGeneration));
        assert!(!config.maintenance_mode);
    }

    #[test]
    fn test_empty_patch_is_a_no_op() {
        let mut config = GlobalConfig::default();
        config.maintenance_mode = true;
        config.apply(&GlobalConfigPatch::default());
        assert!(config.maintenance_mode);
        assert!(config.feature_enabled(Capability::TextGeneration));
    }

    #[test]
    fn test_capability_serde_uses_kebab_case() {
        let cap: Capability = serde_json::from_str("\"voice-synthesis\"").unwrap();
        assert_eq!(cap, Capability::VoiceSynthesis);
        assert_eq!(cap.as_str(), "voice-synthesis");
    }
}
