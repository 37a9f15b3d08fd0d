use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{ScreenLensError, ScreenLensResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Path to the ONNX shape model. Detection is disabled if the file is missing.
    #[serde(default = "default_model_path")]
    pub model_path: String,
    #[serde(default = "default_conf_threshold")]
    pub conf_threshold: f32,
    /// NMS overlap threshold applied per class.
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            conf_threshold: default_conf_threshold(),
            iou_threshold: default_iou_threshold(),
        }
    }
}

fn default_model_path() -> String {
    "models/ui_shapes.onnx".to_string()
}

fn default_conf_threshold() -> f32 {
    0.25
}

fn default_iou_threshold() -> f32 {
    0.45
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// OCR service endpoint. Recognition is disabled when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_ocr_timeout")]
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_ocr_timeout(),
        }
    }
}

fn default_ocr_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn resolve_config_path() -> ScreenLensResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(ScreenLensError::Config(
        "config.toml not found next to executable or in working directory".into(),
    ))
}

pub fn load_config() -> ScreenLensResult<AppConfig> {
    let path = resolve_config_path()?;
    let content = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), model = %config.detection.model_path, "config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.detection.model_path, "models/ui_shapes.onnx");
        assert_eq!(config.ocr.endpoint, None);
        assert!(config.output.pretty);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: AppConfig = toml::from_str(
            "[detection]\nconf_threshold = 0.6\n\n[ocr]\nendpoint = \"http://localhost:9000/ocr\"\n",
        )
        .unwrap();
        assert_eq!(config.detection.conf_threshold, 0.6);
        assert_eq!(config.detection.iou_threshold, 0.45);
        assert_eq!(
            config.ocr.endpoint.as_deref(),
            Some("http://localhost:9000/ocr")
        );
        assert_eq!(config.ocr.timeout_secs, 30);
    }
}
