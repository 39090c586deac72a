//! Biblioteca de conversores – valor bruto SNMP → unidade de engenharia.
//!
//! Cada fonte do catálogo aponta para um [`Converter`]. Os conversores
//! numéricos rejeitam entrada vazia ou não finita com
//! [`EngineError::ConversionFailure`], o que faz o motor consultar o
//! fallback. `"0"` é um valor válido e converte para `0.0`.
//!
//! Os campos de status usam tabelas fechadas ([`StatusTable`]) indexadas
//! tanto pelo código numérico quanto pelo texto do firmware. Valores fora da
//! tabela viram [`OperatingState::Unknown`], nunca erro.

use crate::error::EngineError;
use crate::units::Unit;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

// ──────────────────────────────────────────────
// Estados enumerados
// ──────────────────────────────────────────────

/// Estado operacional normalizado de qualquer campo de status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingState {
    Unknown,
    Startup,
    Normal,
    OnBattery,
    OnBypass,
    Shutdown,
    Booster,
    Reducer,
    Other,
    NoOutput,
    Low,
    Depleted,
}

impl OperatingState {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatingState::Unknown => "unknown",
            OperatingState::Startup => "startup",
            OperatingState::Normal => "normal",
            OperatingState::OnBattery => "on battery",
            OperatingState::OnBypass => "on bypass",
            OperatingState::Shutdown => "shutdown",
            OperatingState::Booster => "booster",
            OperatingState::Reducer => "reducer",
            OperatingState::Other => "other",
            OperatingState::NoOutput => "none",
            OperatingState::Low => "low",
            OperatingState::Depleted => "depleted",
        }
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aliases extras (texto bruto → estado) fornecidos pela configuração.
///
/// Firmwares novos trazem strings que as tabelas internas não conhecem;
/// o operador pode mapeá-las sem recompilar.
pub type StatusAliases = BTreeMap<String, OperatingState>;

pub(crate) static NO_ALIASES: StatusAliases = BTreeMap::new();

// ──────────────────────────────────────────────
// Tabelas de status
// ──────────────────────────────────────────────

/// Tabela de mapeamento de um campo de status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTable {
    /// Status do sistema Liebert (código numérico ou texto GXT5)
    SystemStatus,
    /// Fonte de saída Liebert
    OutputSource,
    /// `upsOutputSource` do RFC1628
    OutputSourceRfc1628,
    /// `upsBatteryStatus` do RFC1628
    BatteryStatusRfc1628,
}

use OperatingState as S;

/// Numeração da MIB Liebert do dispositivo: 1 = startup, 3 = on battery.
const SYSTEM_STATUS: &[(&str, OperatingState)] = &[
    ("0", S::Unknown),
    ("1", S::Startup),
    ("2", S::Normal),
    ("3", S::OnBattery),
    ("4", S::OnBypass),
    ("5", S::Shutdown),
    ("Normal Operation", S::Normal),
    ("Startup", S::Startup),
    ("On Battery", S::OnBattery),
    ("On Bypass", S::OnBypass),
    ("Shutdown", S::Shutdown),
    ("Unknown", S::Unknown),
];

const OUTPUT_SOURCE: &[(&str, OperatingState)] = &[
    ("0", S::Unknown),
    ("1", S::Normal),
    ("2", S::OnBypass),
    ("3", S::OnBattery),
    ("4", S::Booster),
    ("5", S::Reducer),
];

const OUTPUT_SOURCE_RFC1628: &[(&str, OperatingState)] = &[
    ("1", S::Other),
    ("2", S::NoOutput),
    ("3", S::Normal),
    ("4", S::OnBypass),
    ("5", S::OnBattery),
    ("6", S::Booster),
    ("7", S::Reducer),
];

const BATTERY_STATUS_RFC1628: &[(&str, OperatingState)] = &[
    ("1", S::Unknown),
    ("2", S::Normal),
    ("3", S::Low),
    ("4", S::Depleted),
];

impl StatusTable {
    pub fn name(self) -> &'static str {
        match self {
            StatusTable::SystemStatus => "system_status",
            StatusTable::OutputSource => "output_source",
            StatusTable::OutputSourceRfc1628 => "output_source_rfc1628",
            StatusTable::BatteryStatusRfc1628 => "battery_status_rfc1628",
        }
    }

    fn entries(self) -> &'static [(&'static str, OperatingState)] {
        match self {
            StatusTable::SystemStatus => SYSTEM_STATUS,
            StatusTable::OutputSource => OUTPUT_SOURCE,
            StatusTable::OutputSourceRfc1628 => OUTPUT_SOURCE_RFC1628,
            StatusTable::BatteryStatusRfc1628 => BATTERY_STATUS_RFC1628,
        }
    }

    /// Procura o valor bruto na tabela e depois nos aliases.
    pub fn lookup(self, raw: &str, aliases: &StatusAliases) -> Result<OperatingState, EngineError> {
        let key = raw.trim();
        self.entries()
            .iter()
            .find(|(code, _)| *code == key)
            .map(|(_, state)| *state)
            .or_else(|| aliases.get(key).copied())
            .ok_or_else(|| EngineError::UnrecognizedEnumValue {
                raw: raw.to_string(),
                table: self.name(),
            })
    }

    /// Como [`lookup`](Self::lookup), mas degrada para `Unknown`.
    pub fn map(self, raw: &str, aliases: &StatusAliases) -> OperatingState {
        self.lookup(raw, aliases).unwrap_or_else(|e| {
            warn!("{e}");
            OperatingState::Unknown
        })
    }
}

// ──────────────────────────────────────────────
// Valores convertidos
// ──────────────────────────────────────────────

/// Valor de um campo após a conversão.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    State(OperatingState),
    Date(NaiveDate),
    /// Data presente mas em formato não reconhecido
    UnparseableDate(String),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_state(&self) -> Option<OperatingState> {
        match self {
            Value::State(s) => Some(*s),
            _ => None,
        }
    }

    /// Formata o valor para mensagens, usando a unidade para números.
    pub fn render(&self, unit: Unit) -> String {
        match self {
            Value::Number(v) => unit.render(*v),
            Value::State(s) => s.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::UnparseableDate(raw) => format!("unparseable date {raw:?}"),
            Value::Text(t) => t.clone(),
        }
    }
}

// ──────────────────────────────────────────────
// Conversores
// ──────────────────────────────────────────────

/// Referência a um conversor da biblioteca.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Decimal já em unidade final (OIDs Liebert): "231.3" → 231.3
    Float,
    /// Inteiro em décimos (OIDs RFC1628): "2313" → 231.3
    DeciUnits,
    /// Minutos → segundos
    MinutesToSeconds,
    /// Contadores e flags: "3" ou "3.0" → 3
    Integer,
    Status(StatusTable),
    Date,
    /// Sem conversão: guarda a string bruta
    Raw,
}

impl Converter {
    pub fn name(self) -> &'static str {
        match self {
            Converter::Float => "to_float",
            Converter::DeciUnits => "deci_units_to_units",
            Converter::MinutesToSeconds => "minutes_to_seconds",
            Converter::Integer => "to_integer",
            Converter::Status(_) => "status_mapper",
            Converter::Date => "date_parser",
            Converter::Raw => "raw",
        }
    }

    /// Verifica se o conversor produz valores compatíveis com `unit`.
    pub fn compatible_with(self, unit: Unit) -> bool {
        match self {
            Converter::Float | Converter::DeciUnits => unit.is_numeric(),
            Converter::MinutesToSeconds => unit == Unit::Seconds,
            Converter::Integer => unit == Unit::Count,
            Converter::Status(_) => unit == Unit::State,
            Converter::Date => unit == Unit::Date,
            Converter::Raw => unit == Unit::Raw,
        }
    }

    /// Converte usando apenas as tabelas internas de status.
    pub fn convert(self, raw: &str) -> Result<Value, EngineError> {
        self.apply(raw, &NO_ALIASES)
    }

    /// Converte consultando também os aliases configurados.
    pub fn apply(self, raw: &str, aliases: &StatusAliases) -> Result<Value, EngineError> {
        match self {
            Converter::Float => to_float(raw).map(Value::Number),
            Converter::DeciUnits => deci_units_to_units(raw).map(Value::Number),
            Converter::MinutesToSeconds => minutes_to_seconds(raw).map(Value::Number),
            Converter::Integer => to_integer(raw).map(|v| Value::Number(v as f64)),
            Converter::Status(table) => Ok(Value::State(table.map(raw, aliases))),
            Converter::Date => Ok(parse_date(raw)),
            Converter::Raw => Ok(Value::Text(raw.to_string())),
        }
    }
}

/// Decimal sem escala.
pub fn to_float(raw: &str) -> Result<f64, EngineError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EngineError::conversion(raw, Converter::Float.name()))
}

/// Inteiro em décimos de unidade dividido por 10.
pub fn deci_units_to_units(raw: &str) -> Result<f64, EngineError> {
    raw.trim()
        .parse::<i64>()
        .map(|v| v as f64 / 10.0)
        .map_err(|_| EngineError::conversion(raw, Converter::DeciUnits.name()))
}

pub fn minutes_to_seconds(raw: &str) -> Result<f64, EngineError> {
    to_float(raw)
        .map(|minutes| minutes * 60.0)
        .map_err(|_| EngineError::conversion(raw, Converter::MinutesToSeconds.name()))
}

/// Inteiro, aceitando também a forma decimal ("3.0") truncada.
pub fn to_integer(raw: &str) -> Result<i64, EngineError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| to_float(trimmed).ok().map(|v| v.trunc() as i64))
        .ok_or_else(|| EngineError::conversion(raw, Converter::Integer.name()))
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Data reportada pelo dispositivo. Formato desconhecido vira
/// [`Value::UnparseableDate`] em vez de erro.
pub fn parse_date(raw: &str) -> Value {
    let trimmed = raw.trim().trim_matches('"');
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(Value::Date)
        .unwrap_or_else(|| Value::UnparseableDate(raw.to_string()))
}

/// Mapeia um status (código ou texto) usando só a tabela interna.
pub fn status_mapper(table: StatusTable, raw: &str) -> OperatingState {
    table.map(raw, &NO_ALIASES)
}
