use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotColdConfig {
    pub recent_window: usize,
    pub medium_window: usize,
    pub recent_weight: f64,
    pub medium_weight: f64,
    pub all_time_weight: f64,
    /// Half-width of the warm band, in standard deviations of the score
    pub band: f64,
}

impl Default for HotColdConfig {
    fn default() -> Self {
        Self {
            recent_window: 20,
            medium_window: 100,
            recent_weight: 3.0,
            medium_weight: 2.0,
            all_time_weight: 1.0,
            band: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinationConfig {
    pub pair_window: usize,
    pub pair_top: usize,
    /// `None` examines the whole history
    pub triplet_window: Option<usize>,
    pub triplet_top: usize,
    pub quadruplet_window: Option<usize>,
    pub quadruplet_top: usize,
}

impl Default for CombinationConfig {
    fn default() -> Self {
        Self {
            pair_window: 200,
            pair_top: 20,
            triplet_window: None,
            triplet_top: 15,
            quadruplet_window: None,
            quadruplet_top: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    pub pair_window: usize,
    /// Number of top pairs feeding the pair bonus
    pub pair_top: usize,
    pub set_count: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            pair_window: 200,
            pair_top: 100,
            set_count: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub hot_cold: HotColdConfig,
    pub combinations: CombinationConfig,
    pub recommend: RecommendConfig,
}

pub fn save_config(config: &AnalysisConfig, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_config(path: &Path) -> anyhow::Result<AnalysisConfig> {
    let json = std::fs::read_to_string(path)?;
    let config: AnalysisConfig = serde_json::from_str(&json)?;
    Ok(config)
}

/// Defaults when `path` is absent or does not exist.
pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    match path {
        Some(p) if p.exists() => load_config(p),
        Some(p) => {
            log::info!("No config at {}, using defaults", p.display());
            Ok(AnalysisConfig::default())
        }
        None => Ok(AnalysisConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.hot_cold.recent_window, 20);
        assert_eq!(config.hot_cold.medium_window, 100);
        assert_eq!(config.combinations.pair_window, 200);
        assert_eq!(config.combinations.triplet_window, None);
        assert_eq!(config.recommend.set_count, 3);
    }

    #[test]
    fn test_config_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");
        let mut config = AnalysisConfig::default();
        config.hot_cold.recent_window = 30;
        config.combinations.triplet_window = Some(500);

        save_config(&config, &path).unwrap();
        let restored = load_config(&path).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"hot_cold":{"recent_window":10}}"#).unwrap();
        assert_eq!(config.hot_cold.recent_window, 10);
        assert_eq!(config.hot_cold.medium_window, 100);
        assert_eq!(config.recommend, RecommendConfig::default());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(Some(dir.path().join("missing.json").as_path())).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(load_or_default(None).unwrap(), AnalysisConfig::default());
    }
}
