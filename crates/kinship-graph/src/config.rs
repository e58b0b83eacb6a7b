use crate::layout::{HierarchicalLayouter, Layouter, RadialLayouter};
use crate::style::Palette;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Hierarchical,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    /// Horizontal distance between neighbouring slots (hierarchical).
    pub unit_width: f32,
    /// Distance between generations; the base ring spacing in radial mode.
    pub layer_gap: f32,
    /// Empty slots between disjoint root clusters.
    pub cluster_gap: usize,
    pub radial_scale: f32,
    pub child_padding: f32,
    pub depth_padding_scale: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::default(),
            unit_width: HierarchicalLayouter::DEFAULT_UNIT_WIDTH,
            layer_gap: HierarchicalLayouter::DEFAULT_LAYER_GAP,
            cluster_gap: 1,
            radial_scale: RadialLayouter::DEFAULT_RADIAL_SCALE,
            child_padding: RadialLayouter::DEFAULT_CHILD_PADDING,
            depth_padding_scale: RadialLayouter::DEFAULT_DEPTH_PADDING_SCALE,
        }
    }
}

impl LayoutConfig {
    pub fn layouter(&self) -> Box<dyn Layouter + Send + Sync> {
        match self.mode {
            LayoutMode::Hierarchical => Box::new(HierarchicalLayouter {
                unit_width: self.unit_width,
                layer_gap: self.layer_gap,
            }),
            LayoutMode::Radial => Box::new(RadialLayouter {
                layer_gap: self.layer_gap,
                radial_scale: self.radial_scale,
                child_padding: self.child_padding,
                depth_padding_scale: self.depth_padding_scale,
            }),
        }
    }
}

/// Render settings. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub layout: LayoutConfig,
    /// Sibling palette as `#RRGGBB` strings; replaces the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<String>>,
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scene config {}", path.display()))?;
        let config: SceneConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing scene config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// The configured palette, or the built-in one when the configured list
    /// is absent, empty or contains an unparsable entry.
    pub fn palette(&self) -> Palette {
        match &self.palette {
            None => Palette::default(),
            Some(entries) => Palette::from_hex(entries).unwrap_or_else(|| {
                tracing::warn!("Invalid palette in scene config; using the default palette");
                Palette::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("scene.json");
        fs::write(&path, r#"{"layout": {"mode": "radial", "layer_gap": 4.0}}"#)?;

        let config = SceneConfig::load(&path)?;
        assert_eq!(config.layout.mode, LayoutMode::Radial);
        assert_eq!(config.layout.layer_gap, 4.0);
        assert_eq!(config.layout.cluster_gap, 1);
        assert_eq!(config.layout.radial_scale, 0.18);
        assert_eq!(config.palette(), Palette::default());
        Ok(())
    }

    #[test]
    fn test_save_load_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("scene.json");
        let mut config = SceneConfig::default();
        config.layout.unit_width = 80.0;
        config.palette = Some(vec!["#112233".to_string(), "#445566".to_string()]);
        config.save(&path)?;

        let loaded = SceneConfig::load(&path)?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.palette().len(), 2);
        Ok(())
    }

    #[test]
    fn test_invalid_palette_falls_back() {
        let config = SceneConfig {
            palette: Some(vec!["#112233".to_string(), "teal".to_string()]),
            ..SceneConfig::default()
        };
        assert_eq!(config.palette(), Palette::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = SceneConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("reading scene config"));
    }
}
