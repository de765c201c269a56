//! Конфигурация приложения (JSON)

use std::path::Path;

use anyhow::Context;
use qr_codec::{EncoderConfig, ErrorCorrectionLevel, QRToolkit, ReaderConfig, RenderConfig, Version};
use serde::{Deserialize, Serialize};

/// Настройки приложения; отсутствующие поля берутся по умолчанию
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub encoder: EncoderConfig,
    pub render: RenderConfig,
    pub reader: ReaderConfig,
    /// Версия, выбранная в форме при старте
    pub default_version: Version,
    /// Уровень коррекции, выбранный в форме при старте
    pub default_ec_level: ErrorCorrectionLevel,
}

impl AppConfig {
    /// Загрузка из JSON-файла
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Конфигурация из файла или по умолчанию
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn toolkit(&self) -> QRToolkit {
        QRToolkit::with_config(self.encoder.clone(), self.render.clone(), self.reader.clone())
    }
}
