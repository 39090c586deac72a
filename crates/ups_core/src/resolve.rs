//! Motor de resolução – snapshot bruto → métricas resolvidas.
//!
//! Para cada campo, na ordem do catálogo:
//! 1. fonte primária presente e conversível → vence (mesmo valendo 0);
//! 2. senão, fallback presente e conversível com o **conversor do fallback**;
//! 3. senão, a métrica é omitida ("não reportada", diferente de zero).
//!
//! Campos sem conversão (`Converter::Raw`) guardam a string bruta.
//! Falhas ficam restritas ao campo e nunca interrompem o ciclo.

use crate::catalog::{Catalog, FieldDescriptor, SourceUsed};
use crate::convert::{NO_ALIASES, OperatingState, StatusAliases, Value};
use crate::error::EngineError;
use crate::snapshot::{RawSnapshot, RawValue};
use crate::units::Unit;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Valor resolvido de uma métrica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetric {
    pub value: Value,
    pub source: SourceUsed,
    pub unit: Unit,
}

/// Amostra numérica para armazenamento em série temporal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub metric: String,
    pub value: f64,
    pub unit: Unit,
}

/// Métricas resolvidas de um ciclo, na ordem do catálogo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedMetrics {
    entries: Vec<(&'static str, ResolvedMetric)>,
    /// Campos presentes no snapshot que nenhuma fonte conseguiu converter
    failures: Vec<(&'static str, EngineError)>,
}

impl ResolvedMetrics {
    /// Erro de conversão de um campo omitido; `None` se o campo foi
    /// resolvido ou simplesmente não veio no snapshot.
    pub fn failure(&self, name: &str) -> Option<&EngineError> {
        self.failures
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, e)| e)
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedMetric> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, m)| m)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|m| m.value.as_number())
    }

    pub fn state(&self, name: &str) -> Option<OperatingState> {
        self.get(name).and_then(|m| m.value.as_state())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ResolvedMetric)> {
        self.entries.iter().map(|(n, m)| (*n, m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Uma amostra por métrica numérica, independente de thresholds.
    pub fn samples(&self) -> Vec<MetricSample> {
        self.iter()
            .filter_map(|(name, m)| {
                m.value.as_number().map(|value| MetricSample {
                    metric: name.to_string(),
                    value,
                    unit: m.unit,
                })
            })
            .collect()
    }
}

/// Resolve snapshots contra um catálogo.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a Catalog,
    aliases: &'a StatusAliases,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            aliases: &NO_ALIASES,
        }
    }

    /// Aliases de status extras vindos da configuração.
    pub fn with_aliases(mut self, aliases: &'a StatusAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn resolve(&self, snapshot: &RawSnapshot) -> ResolvedMetrics {
        let mut entries = Vec::with_capacity(self.catalog.all_fields().len());
        let mut failures = Vec::new();

        for field in self.catalog.all_fields() {
            match self.resolve_field(field, snapshot) {
                Ok(metric) => {
                    debug!(
                        "{} = {:?} ({:?})",
                        field.name, metric.value, metric.source
                    );
                    entries.push((field.name, metric));
                }
                Err(EngineError::FieldAbsent(name)) => debug!("{name}: não reportado"),
                Err(e) => {
                    warn!("{}: {e}", field.name);
                    failures.push((field.name, e));
                }
            }
        }

        ResolvedMetrics { entries, failures }
    }

    /// Resolve um único campo.
    ///
    /// Retorna o último erro de conversão se alguma fonte estava presente
    /// mas nenhuma converteu; `FieldAbsent` se nenhuma estava presente.
    pub fn resolve_field(
        &self,
        field: &FieldDescriptor,
        snapshot: &RawSnapshot,
    ) -> Result<ResolvedMetric, EngineError> {
        let mut last_error = None;

        for (used, source) in field.sources() {
            match snapshot.value(source.oid) {
                RawValue::Present(raw) => match source.converter.apply(raw, self.aliases) {
                    Ok(value) => {
                        return Ok(ResolvedMetric {
                            value,
                            source: used,
                            unit: field.unit,
                        });
                    }
                    Err(e) => {
                        debug!("{} ({:?}): {e}", field.name, used);
                        last_error = Some(e);
                    }
                },
                RawValue::Absent | RawValue::Missing => {}
            }
        }

        Err(last_error.unwrap_or_else(|| EngineError::FieldAbsent(field.name.to_string())))
    }
}

/// Resolve `snapshot` sem aliases extras.
pub fn resolve(snapshot: &RawSnapshot, catalog: &Catalog) -> ResolvedMetrics {
    Resolver::new(catalog).resolve(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::WireSource;
    use crate::convert::{Converter, StatusTable};

    const PRIMARY: &str = "9.1.0";
    const FALLBACK: &str = "9.2.0";

    fn voltage_catalog() -> Catalog {
        Catalog::new(vec![FieldDescriptor {
            name: "battery_voltage",
            label: "Battery voltage",
            primary: Some(WireSource {
                oid: PRIMARY,
                converter: Converter::Float,
            }),
            fallback: Some(WireSource {
                oid: FALLBACK,
                converter: Converter::DeciUnits,
            }),
            unit: Unit::Volts,
        }])
    }

    fn snap(pairs: &[(&str, &str)]) -> RawSnapshot {
        pairs.iter().copied().collect()
    }

    #[test]
    fn primary_wins() {
        let m = resolve(&snap(&[(PRIMARY, "54.2"), (FALLBACK, "999")]), &voltage_catalog());
        let v = m.get("battery_voltage").unwrap();
        assert_eq!(v.value, Value::Number(54.2));
        assert_eq!(v.source, SourceUsed::Primary);
    }

    #[test]
    fn zero_primary_does_not_trigger_fallback() {
        let m = resolve(&snap(&[(PRIMARY, "0"), (FALLBACK, "2313")]), &voltage_catalog());
        let v = m.get("battery_voltage").unwrap();
        assert_eq!(v.value, Value::Number(0.0));
        assert_eq!(v.source, SourceUsed::Primary);
    }

    #[test]
    fn absent_primary_uses_fallback_converter() {
        let m = resolve(&snap(&[(FALLBACK, "2313")]), &voltage_catalog());
        let v = m.get("battery_voltage").unwrap();
        // deci-unidades: 2313 → 231.3, nunca 2313.0
        assert_eq!(v.value, Value::Number(231.3));
        assert_eq!(v.source, SourceUsed::Fallback);
    }

    #[test]
    fn absence_marker_uses_fallback() {
        let mut s = snap(&[(FALLBACK, "480")]);
        s.insert_absent(PRIMARY);
        let m = resolve(&s, &voltage_catalog());
        assert_eq!(m.number("battery_voltage"), Some(48.0));
    }

    #[test]
    fn conversion_failure_falls_through() {
        let m = resolve(&snap(&[(PRIMARY, "n/a"), (FALLBACK, "480")]), &voltage_catalog());
        assert_eq!(m.number("battery_voltage"), Some(48.0));
        assert_eq!(m.get("battery_voltage").unwrap().source, SourceUsed::Fallback);
    }

    #[test]
    fn empty_primary_string_falls_through() {
        let m = resolve(&snap(&[(PRIMARY, ""), (FALLBACK, "480")]), &voltage_catalog());
        assert_eq!(m.number("battery_voltage"), Some(48.0));
    }

    #[test]
    fn nothing_obtainable_is_omitted() {
        let m = resolve(&RawSnapshot::new(), &voltage_catalog());
        assert!(!m.contains("battery_voltage"));
        assert!(m.is_empty());

        let m = resolve(&snap(&[(PRIMARY, "x"), (FALLBACK, "y")]), &voltage_catalog());
        assert!(!m.contains("battery_voltage"));
    }

    #[test]
    fn unconvertible_field_is_remembered() {
        let m = resolve(&RawSnapshot::new(), &voltage_catalog());
        assert_eq!(m.failure("battery_voltage"), None);

        let m = resolve(&snap(&[(PRIMARY, "n/a")]), &voltage_catalog());
        assert_eq!(
            m.failure("battery_voltage"),
            Some(&EngineError::ConversionFailure {
                raw: "n/a".into(),
                converter: "to_float",
            })
        );

        // fallback válido: nada fica registrado
        let m = resolve(&snap(&[(PRIMARY, "n/a"), (FALLBACK, "480")]), &voltage_catalog());
        assert_eq!(m.failure("battery_voltage"), None);
    }

    #[test]
    fn resolve_field_reports_reason() {
        let catalog = voltage_catalog();
        let field = catalog.lookup("battery_voltage").unwrap();
        let resolver = Resolver::new(&catalog);
        assert_eq!(
            resolver.resolve_field(field, &RawSnapshot::new()),
            Err(EngineError::FieldAbsent("battery_voltage".into()))
        );
        assert!(matches!(
            resolver.resolve_field(field, &snap(&[(FALLBACK, "4.8")])),
            Err(EngineError::ConversionFailure { converter: "deci_units_to_units", .. })
        ));
    }

    #[test]
    fn raw_passthrough_keeps_value() {
        let catalog = Catalog::new(vec![FieldDescriptor {
            name: "model",
            label: "Model",
            primary: Some(WireSource {
                oid: PRIMARY,
                converter: Converter::Raw,
            }),
            fallback: None,
            unit: Unit::Raw,
        }]);
        let m = resolve(&snap(&[(PRIMARY, "GXT5-3000")]), &catalog);
        assert_eq!(m.get("model").unwrap().value, Value::Text("GXT5-3000".into()));
    }

    #[test]
    fn status_with_aliases() {
        let catalog = Catalog::new(vec![FieldDescriptor {
            name: "system_status",
            label: "System status",
            primary: Some(WireSource {
                oid: PRIMARY,
                converter: Converter::Status(StatusTable::SystemStatus),
            }),
            fallback: None,
            unit: Unit::State,
        }]);
        let s = snap(&[(PRIMARY, "Inverter On")]);
        assert_eq!(
            resolve(&s, &catalog).state("system_status"),
            Some(OperatingState::Unknown)
        );

        let mut aliases = StatusAliases::new();
        aliases.insert("Inverter On".into(), OperatingState::Normal);
        let m = Resolver::new(&catalog).with_aliases(&aliases).resolve(&s);
        assert_eq!(m.state("system_status"), Some(OperatingState::Normal));
    }

    #[test]
    fn standard_catalog_vendor_vs_standard_sources() {
        let catalog = Catalog::standard();
        let s = snap(&[
            ("1.3.6.1.4.1.476.1.42.3.9.20.1.20.1.2.1.4207", "50.0"),
            ("1.3.6.1.2.1.33.1.4.2.0", "600"),
            ("1.3.6.1.2.1.33.1.3.3.1.2.1", "499"),
            ("1.3.6.1.4.1.476.1.42.3.9.20.1.20.1.2.1.4150", "12"),
        ]);
        let m = resolve(&s, catalog);
        assert_eq!(m.number("output_frequency"), Some(50.0));
        assert_eq!(m.number("input_frequency"), Some(49.9));
        assert_eq!(m.number("battery_runtime"), Some(720.0));
    }

    #[test]
    fn samples_cover_every_numeric_metric() {
        let catalog = Catalog::standard();
        let s = snap(&[
            ("1.3.6.1.2.1.33.1.4.4.1.2.1", "230"),
            ("1.3.6.1.4.1.476.1.42.3.9.20.1.20.1.2.1.4123", "Normal Operation"),
            ("1.3.6.1.4.1.476.1.42.3.9.20.1.20.1.2.1.4153", "100"),
        ]);
        let samples = resolve(&s, catalog).samples();
        assert_eq!(
            samples,
            vec![
                MetricSample {
                    metric: "battery_charge".into(),
                    value: 100.0,
                    unit: Unit::Percent,
                },
                MetricSample {
                    metric: "output_voltage".into(),
                    value: 230.0,
                    unit: Unit::Volts,
                },
            ]
        );
    }
}
