pub mod marks;
pub mod paths;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub use marks::{InstanceKeyAlphabet, MarkConfig};

const MAX_BACKOFF_MULTIPLIER: f64 = 10.0;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub grab: GrabConfig,
    #[serde(default)]
    pub activation: ActivationConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GrabConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActivationConfig {
    pub settle_delay_ms: u64,
}

/// Верхние границы на объём данных одного запуска.
///
/// Всё, что не помещается, отбрасывается молча (окна, группы, метки)
/// или игнорируется (лишние символы в буфере ввода).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    pub max_windows: usize,
    pub max_groups: usize,
    pub max_marks: usize,
    pub max_buffer_len: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay_ms: 10,
            backoff_multiplier: 1.5,
        }
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self { settle_delay_ms: 50 }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_windows: 256,
            max_groups: 128,
            max_marks: 100,
            max_buffer_len: 63,
        }
    }
}

impl GrabConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl ActivationConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Settings {
    /// Значения по умолчанию, затем TOML-файл (если есть), затем `WINLEAP_*`.
    pub fn load<P: AsRef<Path>>(settings_path: P) -> Result<Self> {
        let settings_path = settings_path.as_ref();

        let figment = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(settings_path))
            .merge(Env::prefixed("WINLEAP_").split("__"));

        let settings: Settings = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить настройки из {:?}", settings_path))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "full" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.grab.max_attempts == 0 {
            anyhow::bail!("grab.max_attempts должно быть больше 0");
        }

        let multiplier = self.grab.backoff_multiplier;
        if !(multiplier.is_finite() && (1.0..=MAX_BACKOFF_MULTIPLIER).contains(&multiplier)) {
            anyhow::bail!(
                "grab.backoff_multiplier должно быть в диапазоне 1.0..={}, получено {}",
                MAX_BACKOFF_MULTIPLIER,
                multiplier
            );
        }

        let limits = &self.limits;
        for (name, value) in [
            ("max_windows", limits.max_windows),
            ("max_groups", limits.max_groups),
            ("max_marks", limits.max_marks),
            ("max_buffer_len", limits.max_buffer_len),
        ] {
            if value == 0 {
                anyhow::bail!("limits.{} должно быть больше 0", name);
            }
        }

        Ok(())
    }
}
