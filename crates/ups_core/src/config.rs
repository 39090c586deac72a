//! Configuração unificada via TOML.
//!
//! Thresholds por serviço, override regional (tensão/frequência nominais),
//! aliases de status e opções de saída do checker.

use crate::convert::StatusAliases;
use crate::error::ConfigError;
use crate::services::ServiceGroup;
use crate::thresholds::Bounds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Thresholds do serviço de bateria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryThresholds {
    pub battery_charge: Bounds,
    pub battery_temperature: Bounds,
    /// Autonomia estimada (segundos)
    pub battery_runtime: Bounds,
}

impl Default for BatteryThresholds {
    fn default() -> Self {
        Self {
            battery_charge: Bounds::lower(20.0, 10.0),
            battery_temperature: Bounds::upper(30.0, 35.0),
            battery_runtime: Bounds::lower(600.0, 300.0),
        }
    }
}

/// Thresholds do serviço de potência.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerThresholds {
    pub output_load: Bounds,
    /// Desabilitado por padrão: a tensão nominal depende da região
    pub output_voltage: Bounds,
    pub output_frequency: Bounds,
}

const DEFAULT_FREQUENCY: Bounds = Bounds::upper(52.0, 53.0).with_lower(48.0, 47.0);

impl Default for PowerThresholds {
    fn default() -> Self {
        Self {
            output_load: Bounds::upper(80.0, 90.0),
            output_voltage: Bounds::DISABLED,
            output_frequency: DEFAULT_FREQUENCY,
        }
    }
}

/// Thresholds do serviço de ambiente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentThresholds {
    pub ambient_temperature: Bounds,
}

impl Default for EnvironmentThresholds {
    fn default() -> Self {
        Self {
            ambient_temperature: Bounds::upper(35.0, 40.0),
        }
    }
}

/// Thresholds de todos os serviços.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    pub battery: BatteryThresholds,
    pub power: PowerThresholds,
    pub environment: EnvironmentThresholds,
}

impl ThresholdSettings {
    /// Limites configurados para `metric`; métricas sem binding ficam
    /// desabilitadas.
    pub fn bounds(&self, group: ServiceGroup, metric: &str) -> Bounds {
        match (group, metric) {
            (ServiceGroup::Battery, "battery_charge") => self.battery.battery_charge,
            (ServiceGroup::Battery, "battery_temperature") => self.battery.battery_temperature,
            (ServiceGroup::Battery, "battery_runtime") => self.battery.battery_runtime,
            (ServiceGroup::Power, "output_load") => self.power.output_load,
            (ServiceGroup::Power, "output_voltage") => self.power.output_voltage,
            (ServiceGroup::Power, "output_frequency") => self.power.output_frequency,
            (ServiceGroup::Environment, "ambient_temperature") => {
                self.environment.ambient_temperature
            }
            _ => Bounds::DISABLED,
        }
    }

    fn all(&self) -> [(&'static str, &Bounds); 7] {
        [
            ("battery.battery_charge", &self.battery.battery_charge),
            ("battery.battery_temperature", &self.battery.battery_temperature),
            ("battery.battery_runtime", &self.battery.battery_runtime),
            ("power.output_load", &self.power.output_load),
            ("power.output_voltage", &self.power.output_voltage),
            ("power.output_frequency", &self.power.output_frequency),
            ("environment.ambient_temperature", &self.environment.ambient_temperature),
        ]
    }
}

/// Override regional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Tensão nominal (ex: 230 ou 120). Gera limites de tensão de saída
    /// em ±10%/±15% quando `output_voltage` não foi configurado.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_voltage: Option<f64>,
    /// Frequência nominal (50 ou 60). Recentra os limites padrão em ±2/±3 Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_frequency: Option<f64>,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

impl RegionConfig {
    pub fn voltage_bounds(nominal: f64) -> Bounds {
        Bounds::upper(round1(nominal * 1.10), round1(nominal * 1.15))
            .with_lower(round1(nominal * 0.90), round1(nominal * 0.85))
    }

    pub fn frequency_bounds(nominal: f64) -> Bounds {
        Bounds::upper(nominal + 2.0, nominal + 3.0).with_lower(nominal - 2.0, nominal - 3.0)
    }
}

/// Opções de saída do checker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Arquivo para gravar o frame binário do relatório (vazio = não grava)
    pub frame_path: String,
    /// Mostrar também os vereditos OK informativos
    pub details: bool,
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub thresholds: ThresholdSettings,
    pub region: RegionConfig,
    /// Strings de status extras (texto do firmware → estado)
    pub status_aliases: StatusAliases,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML, usando o padrão se o
    /// arquivo não existir ou for inválido.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match Self::try_load(path) {
                Ok(config) => {
                    info!("Configuração carregada de {}", path.display());
                    return config;
                }
                Err(e) => warn!("Erro ao carregar {}: {}", path.display(), e),
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Interpreta o conteúdo de um config.toml.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Thresholds com o override regional aplicado.
    pub fn effective_thresholds(&self) -> ThresholdSettings {
        let mut t = self.thresholds.clone();
        if let Some(v) = self.region.nominal_voltage {
            if t.power.output_voltage.is_disabled() {
                t.power.output_voltage = RegionConfig::voltage_bounds(v);
            }
        }
        if let Some(f) = self.region.nominal_frequency {
            if t.power.output_frequency == DEFAULT_FREQUENCY {
                t.power.output_frequency = RegionConfig::frequency_bounds(f);
            }
        }
        t
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, b) in self.thresholds.all() {
            if let (Some(w), Some(c)) = (b.warn_upper, b.crit_upper) {
                if w > c {
                    errors.push(format!("{name}: warn_upper ({w}) maior que crit_upper ({c})"));
                }
            }
            if let (Some(w), Some(c)) = (b.warn_lower, b.crit_lower) {
                if w < c {
                    errors.push(format!("{name}: warn_lower ({w}) menor que crit_lower ({c})"));
                }
            }
            let values = [b.warn_upper, b.crit_upper, b.warn_lower, b.crit_lower];
            if values.iter().flatten().any(|v| !v.is_finite()) {
                errors.push(format!("{name}: limite não finito"));
            }
        }

        if let Some(v) = self.region.nominal_voltage {
            if !(v > 0.0 && v.is_finite()) {
                errors.push(format!("Tensão nominal inválida: {v}"));
            }
        }
        if let Some(f) = self.region.nominal_frequency {
            if !(f > 3.0 && f.is_finite()) {
                errors.push(format!("Frequência nominal inválida: {f}"));
            }
        }

        for (raw, state) in &self.status_aliases {
            if raw.trim().is_empty() {
                errors.push(format!("Alias de status vazio para {state}"));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::OperatingState;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
    }

    #[test]
    fn defaults_match_documented_levels() {
        let t = ThresholdSettings::default();
        assert_eq!(t.bounds(ServiceGroup::Battery, "battery_charge"), Bounds::lower(20.0, 10.0));
        assert_eq!(t.bounds(ServiceGroup::Power, "output_load"), Bounds::upper(80.0, 90.0));
        assert!(t.bounds(ServiceGroup::Power, "output_voltage").is_disabled());
        assert!(t.bounds(ServiceGroup::Power, "input_voltage").is_disabled());
        assert!(t.bounds(ServiceGroup::Environment, "battery_charge").is_disabled());
    }

    #[test]
    fn roundtrip_toml() {
        let mut config = AppConfig::default();
        config.region.nominal_voltage = Some(230.0);
        config
            .status_aliases
            .insert("Eco Mode".into(), OperatingState::OnBypass);
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[thresholds.power.output_load]
warn_upper = 70.0
crit_upper = 85.0

[status_aliases]
"Inverter Mode" = "normal"
"#;
        let config = AppConfig::from_toml_str(partial).unwrap();
        assert_eq!(config.thresholds.power.output_load, Bounds::upper(70.0, 85.0));
        // Outros campos devem ter valor padrão
        assert_eq!(config.thresholds.power.output_frequency, DEFAULT_FREQUENCY);
        assert_eq!(config.thresholds.battery, BatteryThresholds::default());
        assert_eq!(
            config.status_aliases.get("Inverter Mode"),
            Some(&OperatingState::Normal)
        );
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = AppConfig::from_toml_str("[thresholds.power.output_load]\nwarn_upper = \"alto\"")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn regional_override() {
        let mut config = AppConfig::default();
        config.region.nominal_voltage = Some(230.0);
        config.region.nominal_frequency = Some(60.0);
        let t = config.effective_thresholds();
        assert_eq!(
            t.power.output_voltage,
            Bounds::upper(253.0, 264.5).with_lower(207.0, 195.5)
        );
        assert_eq!(
            t.power.output_frequency,
            Bounds::upper(62.0, 63.0).with_lower(58.0, 57.0)
        );
    }

    #[test]
    fn explicit_bounds_win_over_region() {
        let mut config = AppConfig::default();
        config.thresholds.power.output_voltage = Bounds::upper(132.0, 138.0);
        config.region.nominal_voltage = Some(230.0);
        let t = config.effective_thresholds();
        assert_eq!(t.power.output_voltage, Bounds::upper(132.0, 138.0));
    }

    #[test]
    fn inconsistent_levels_are_reported() {
        let mut config = AppConfig::default();
        config.thresholds.power.output_load = Bounds::upper(95.0, 90.0);
        config.thresholds.battery.battery_charge = Bounds::lower(5.0, 10.0);
        config.region.nominal_voltage = Some(-1.0);
        config
            .status_aliases
            .insert("  ".into(), OperatingState::Normal);
        let errors = config.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
    }
}
