//! Catálogo de campos – metadados de cada OID monitorado.
//!
//! A ORDEM importa: é a ordem de resolução, de saída e da lista de OIDs
//! entregue ao transporte SNMP.
//!
//! Cada campo tem uma fonte primária (normalmente a MIB Liebert, que já
//! reporta em unidade final) e opcionalmente um fallback RFC1628 com o
//! **seu próprio** conversor – várias OIDs RFC1628 reportam em décimos.

use crate::alarms::AlarmRule;
use crate::convert::{Converter, StatusTable};
use crate::error::EngineError;
use crate::units::Unit;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Uma OID e o conversor adequado para ela.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireSource {
    pub oid: &'static str,
    pub converter: Converter,
}

/// Qual fonte forneceu o valor resolvido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceUsed {
    Primary,
    Fallback,
}

/// Descritor imutável de um campo; identidade = `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub primary: Option<WireSource>,
    pub fallback: Option<WireSource>,
    pub unit: Unit,
}

impl FieldDescriptor {
    /// Fontes em ordem de preferência.
    pub fn sources(&self) -> impl Iterator<Item = (SourceUsed, &WireSource)> {
        self.primary
            .iter()
            .map(|s| (SourceUsed::Primary, s))
            .chain(self.fallback.iter().map(|s| (SourceUsed::Fallback, s)))
    }
}

// ──────────────────────────────────────────────
// Tabela estática
// ──────────────────────────────────────────────

macro_rules! liebert {
    ($id:literal, $conv:expr) => {
        Some(WireSource {
            oid: concat!("1.3.6.1.4.1.476.1.42.3.9.20.1.20.1.2.1.", $id),
            converter: $conv,
        })
    };
}

macro_rules! rfc1628 {
    ($suffix:literal, $conv:expr) => {
        Some(WireSource {
            oid: concat!("1.3.6.1.2.1.33.1.", $suffix),
            converter: $conv,
        })
    };
}

const fn field(
    name: &'static str,
    label: &'static str,
    unit: Unit,
    primary: Option<WireSource>,
    fallback: Option<WireSource>,
) -> FieldDescriptor {
    FieldDescriptor {
        name,
        label,
        primary,
        fallback,
        unit,
    }
}

use Converter::{DeciUnits, Float, Integer, MinutesToSeconds};

/// Todos os campos do UPS Vertiv/Liebert.
pub static FIELDS: &[FieldDescriptor] = &[
    // ── Sistema ──
    field("model", "Model", Unit::Raw, rfc1628!("1.2.0", Converter::Raw), None),
    field(
        "system_status",
        "System status",
        Unit::State,
        liebert!("4123", Converter::Status(StatusTable::SystemStatus)),
        None,
    ),
    field(
        "output_source",
        "Output source",
        Unit::State,
        liebert!("4872", Converter::Status(StatusTable::OutputSource)),
        rfc1628!("4.1.0", Converter::Status(StatusTable::OutputSourceRfc1628)),
    ),
    field("eco_mode_state", "ECO mode state", Unit::Count, liebert!("5454", Integer), None),
    field("eco_mode_status", "ECO mode status", Unit::Count, liebert!("6198", Integer), None),
    // ── Bateria ──
    field(
        "battery_status",
        "Battery status",
        Unit::State,
        rfc1628!("2.1.0", Converter::Status(StatusTable::BatteryStatusRfc1628)),
        None,
    ),
    field(
        "battery_charge",
        "Battery charge",
        Unit::Percent,
        liebert!("4153", Float),
        rfc1628!("2.4.0", Float),
    ),
    field(
        "battery_voltage",
        "Battery voltage",
        Unit::Volts,
        liebert!("4148", Float),
        rfc1628!("2.5.0", DeciUnits),
    ),
    field(
        "battery_current",
        "Battery current",
        Unit::Amps,
        liebert!("4149", Float),
        rfc1628!("2.6.0", DeciUnits),
    ),
    field(
        "battery_temperature",
        "Battery temperature",
        Unit::Celsius,
        liebert!("4156", Float),
        rfc1628!("2.7.0", Float),
    ),
    field(
        "battery_runtime",
        "Estimated runtime",
        Unit::Seconds,
        liebert!("4150", MinutesToSeconds),
        rfc1628!("2.3.0", MinutesToSeconds),
    ),
    field(
        "battery_replacement_date",
        "Last battery replacement",
        Unit::Date,
        liebert!("4160", Converter::Date),
        None,
    ),
    // ── Entrada ──
    field(
        "input_voltage",
        "Input voltage",
        Unit::Volts,
        liebert!("4096", Float),
        rfc1628!("3.3.1.3.1", Float),
    ),
    field(
        "input_frequency",
        "Input frequency",
        Unit::Hertz,
        liebert!("4105", Float),
        rfc1628!("3.3.1.2.1", DeciUnits),
    ),
    field(
        "input_current",
        "Input current",
        Unit::Amps,
        liebert!("4113", Float),
        rfc1628!("3.3.1.4.1", DeciUnits),
    ),
    field("input_power_factor", "Input power factor", Unit::Ratio, liebert!("4116", Float), None),
    field("input_voltage_max", "Input voltage max", Unit::Volts, liebert!("4106", Float), None),
    field("input_voltage_min", "Input voltage min", Unit::Volts, liebert!("4107", Float), None),
    field("input_blackout_count", "Blackout count", Unit::Count, liebert!("4120", Integer), None),
    // ── Saída ──
    field(
        "output_voltage",
        "Output voltage",
        Unit::Volts,
        rfc1628!("4.4.1.2.1", Float),
        None,
    ),
    field(
        "output_current",
        "Output current",
        Unit::Amps,
        liebert!("4204", Float),
        rfc1628!("4.4.1.3.1", DeciUnits),
    ),
    field(
        "output_power",
        "Output power",
        Unit::Watts,
        liebert!("4208", Float),
        rfc1628!("4.4.1.4.1", Float),
    ),
    field(
        "output_load",
        "Output load",
        Unit::Percent,
        liebert!("4223", Float),
        rfc1628!("4.4.1.5.1", Float),
    ),
    field(
        "output_frequency",
        "Output frequency",
        Unit::Hertz,
        liebert!("4207", Float),
        rfc1628!("4.2.0", DeciUnits),
    ),
    field(
        "output_apparent_power",
        "Output apparent power",
        Unit::VoltAmps,
        liebert!("4209", Float),
        None,
    ),
    field("output_power_factor", "Output power factor", Unit::Ratio, liebert!("4210", Float), None),
    field(
        "output_apparent_power_rating",
        "Rated power",
        Unit::VoltAmps,
        liebert!("4264", Float),
        None,
    ),
    // ── Ambiente ──
    field(
        "ambient_temperature",
        "Inlet air temperature",
        Unit::Celsius,
        liebert!("4291", Float),
        None,
    ),
];

// ──────────────────────────────────────────────
// Catálogo
// ──────────────────────────────────────────────

/// Catálogo somente-leitura de descritores.
#[derive(Debug, Clone)]
pub struct Catalog {
    fields: Vec<FieldDescriptor>,
}

static STANDARD: LazyLock<Catalog> = LazyLock::new(|| Catalog::new(FIELDS.to_vec()));

impl Catalog {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// Catálogo do UPS, construído uma única vez por processo.
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    pub fn lookup(&self, name: &str) -> Result<&FieldDescriptor, EngineError> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| EngineError::UnknownMetric(name.to_string()))
    }

    pub fn all_fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Lista ordenada e sem duplicatas de todas as OIDs a buscar:
    /// primárias e fallbacks na ordem do catálogo, seguidas dos alarmes.
    pub fn fetch_oids<'a>(&self, alarms: impl IntoIterator<Item = &'a AlarmRule>) -> Vec<&'static str> {
        let mut seen = HashSet::new();
        self.fields
            .iter()
            .flat_map(|f| f.sources().map(|(_, s)| s.oid))
            .chain(alarms.into_iter().map(|rule| rule.source_id))
            .filter(|oid| seen.insert(*oid))
            .collect()
    }

    /// Verifica os invariantes do catálogo e retorna a lista de problemas.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();

        for f in &self.fields {
            if !names.insert(f.name) {
                errors.push(format!("Campo duplicado: {}", f.name));
            }
            if f.primary.is_none() && f.fallback.is_none() {
                errors.push(format!("Campo {} sem nenhuma OID", f.name));
            }
            for (used, source) in f.sources() {
                if !source.converter.compatible_with(f.unit) {
                    errors.push(format!(
                        "Campo {}: conversor {} ({:?}) incompatível com unidade {:?}",
                        f.name,
                        source.converter.name(),
                        used,
                        f.unit
                    ));
                }
            }
        }

        errors
    }
}
