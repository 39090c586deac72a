//! Montadores de serviço – Bateria, Potência e Ambiente.
//!
//! Cada serviço declara seu subconjunto de métricas, os bindings de
//! threshold e os alarmes; a lógica fica nos avaliadores
//! ([`thresholds`](crate::thresholds), [`alarms`](crate::alarms),
//! [`status`](crate::status)). Aqui só há composição.

use crate::alarms::{self, AlarmRule};
use crate::catalog::Catalog;
use crate::config::{AppConfig, ThresholdSettings};
use crate::resolve::{MetricSample, ResolvedMetrics, Resolver};
use crate::snapshot::RawSnapshot;
use crate::status;
use crate::thresholds;
use crate::verdict::{self, Severity, Verdict};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Agrupamento lógico de métricas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceGroup {
    Battery,
    Power,
    Environment,
}

impl ServiceGroup {
    pub const ALL: [ServiceGroup; 3] = [
        ServiceGroup::Battery,
        ServiceGroup::Power,
        ServiceGroup::Environment,
    ];

    pub fn service_name(self) -> &'static str {
        match self {
            ServiceGroup::Battery => "Vertiv UPS Battery",
            ServiceGroup::Power => "Vertiv UPS Power",
            ServiceGroup::Environment => "Vertiv UPS Environment",
        }
    }

    pub fn assembler(self) -> &'static Assembler {
        match self {
            ServiceGroup::Battery => &BATTERY,
            ServiceGroup::Power => &POWER,
            ServiceGroup::Environment => &ENVIRONMENT,
        }
    }
}

/// Como uma métrica contribui para o serviço.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Avaliada contra thresholds; ausente → UNKNOWN
    Required(&'static str),
    /// Avaliada contra thresholds; ausente → nada
    Levels(&'static str),
    /// Veredito OK com o valor, quando presente
    Informational(&'static str),
    SystemStatus,
    BatteryStatus,
}

/// Declaração de um serviço.
#[derive(Debug)]
pub struct Assembler {
    pub group: ServiceGroup,
    pub checks: &'static [Check],
    pub alarms: &'static [AlarmRule],
}

static BATTERY: Assembler = Assembler {
    group: ServiceGroup::Battery,
    checks: &[
        Check::Required("battery_charge"),
        Check::Levels("battery_temperature"),
        Check::Levels("battery_runtime"),
        Check::BatteryStatus,
        Check::Informational("battery_voltage"),
        Check::Informational("battery_current"),
        Check::Informational("battery_replacement_date"),
    ],
    alarms: alarms::BATTERY_ALARMS,
};

static POWER: Assembler = Assembler {
    group: ServiceGroup::Power,
    checks: &[
        Check::SystemStatus,
        Check::Required("output_load"),
        Check::Informational("output_power"),
        Check::Levels("output_voltage"),
        Check::Informational("output_current"),
        Check::Levels("output_frequency"),
        Check::Informational("input_voltage"),
        Check::Informational("input_voltage_max"),
        Check::Informational("input_voltage_min"),
        Check::Informational("input_current"),
        Check::Informational("input_frequency"),
        Check::Informational("input_power_factor"),
        Check::Informational("input_blackout_count"),
        Check::Informational("output_apparent_power"),
        Check::Informational("output_power_factor"),
        Check::Informational("output_apparent_power_rating"),
    ],
    alarms: alarms::POWER_ALARMS,
};

static ENVIRONMENT: Assembler = Assembler {
    group: ServiceGroup::Environment,
    checks: &[Check::Required("ambient_temperature")],
    alarms: &[],
};

/// Resultado de um serviço em um ciclo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceReport {
    pub group: ServiceGroup,
    /// Pior severidade entre `verdicts` e `alarms`
    pub severity: Severity,
    pub verdicts: Vec<Verdict>,
    pub alarms: Vec<Verdict>,
    /// Amostras numéricas do serviço, independentes de threshold
    pub samples: Vec<MetricSample>,
}

impl ServiceReport {
    /// Primeira linha no estilo de plugins: vereditos não-OK primeiro.
    pub fn summary(&self) -> String {
        let mut parts: Vec<&str> = self
            .alarms
            .iter()
            .chain(&self.verdicts)
            .filter(|v| v.severity != Severity::Ok)
            .map(|v| v.message.as_str())
            .collect();
        if parts.is_empty() {
            parts = self.verdicts.iter().take(1).map(|v| v.message.as_str()).collect();
        }
        parts.join(", ")
    }
}

impl Assembler {
    /// Métricas referenciadas por este serviço.
    pub fn metric_names(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .flat_map(|check| match check {
                Check::Required(m) | Check::Levels(m) | Check::Informational(m) => vec![*m],
                Check::SystemStatus => {
                    vec!["system_status", "output_source", "eco_mode_state", "eco_mode_status"]
                }
                Check::BatteryStatus => vec!["battery_status"],
            })
            .collect()
    }

    pub fn assemble(
        &self,
        catalog: &Catalog,
        snapshot: &RawSnapshot,
        metrics: &ResolvedMetrics,
        thresholds: &ThresholdSettings,
    ) -> ServiceReport {
        if snapshot.is_empty() {
            let verdicts = vec![Verdict::unknown("snapshot", "No data from UPS")];
            return ServiceReport {
                group: self.group,
                severity: Severity::Unknown,
                verdicts,
                alarms: Vec::new(),
                samples: Vec::new(),
            };
        }

        let mut verdicts = Vec::new();
        for check in self.checks {
            let name = match *check {
                Check::Required(name) | Check::Levels(name) | Check::Informational(name) => name,
                Check::SystemStatus => {
                    verdicts.extend(status::evaluate_system_status(metrics));
                    continue;
                }
                Check::BatteryStatus => {
                    verdicts.extend(status::evaluate_battery_status(metrics));
                    continue;
                }
            };

            let field = match catalog.lookup(name) {
                Ok(field) => field,
                Err(e) => {
                    error!("{e}");
                    verdicts.push(Verdict::unknown(name, e.to_string()));
                    continue;
                }
            };

            // valor presente mas inconversível nunca passa como OK
            if let Some(err) = metrics.failure(name) {
                verdicts.push(thresholds::unconvertible(field, err));
                continue;
            }

            let metric = metrics.get(name);
            match (*check, metric) {
                (Check::Levels(_), None) | (Check::Informational(_), None) => {}
                (Check::Informational(_), Some(m)) => {
                    let mut v = Verdict::new(
                        name,
                        Severity::Ok,
                        format!("{}: {}", field.label, m.value.render(m.unit)),
                    );
                    if let Some(value) = m.value.as_number() {
                        v = v.with_value(value, m.unit);
                    }
                    verdicts.push(v);
                }
                _ => verdicts.push(thresholds::evaluate_metric(
                    field,
                    metric,
                    &thresholds.bounds(self.group, name),
                )),
            }
        }

        let alarms = alarms::evaluate_alarms(snapshot, self.alarms);
        let severity = verdict::aggregate(verdicts.iter().chain(&alarms));

        let names = self.metric_names();
        let samples = metrics
            .samples()
            .into_iter()
            .filter(|s| names.iter().any(|n| *n == s.metric))
            .collect();

        debug!(
            "{}: {} ({} vereditos, {} alarmes)",
            self.group.service_name(),
            severity,
            verdicts.len(),
            alarms.len()
        );

        ServiceReport {
            group: self.group,
            severity,
            verdicts,
            alarms,
            samples,
        }
    }
}

/// Relatório completo de um ciclo de polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub services: Vec<ServiceReport>,
}

impl CycleReport {
    pub fn severity(&self) -> Severity {
        self.services
            .iter()
            .map(|s| s.severity)
            .max()
            .unwrap_or(Severity::Ok)
    }

    pub fn service(&self, group: ServiceGroup) -> Option<&ServiceReport> {
        self.services.iter().find(|s| s.group == group)
    }
}

/// Executa um ciclo completo: resolução única, depois os três serviços.
pub fn run_cycle(snapshot: &RawSnapshot, config: &AppConfig) -> CycleReport {
    let catalog = Catalog::standard();
    let metrics = Resolver::new(catalog)
        .with_aliases(&config.status_aliases)
        .resolve(snapshot);
    let thresholds = config.effective_thresholds();

    let services = ServiceGroup::ALL
        .iter()
        .map(|g| g.assembler().assemble(catalog, snapshot, &metrics, &thresholds))
        .collect();

    CycleReport { services }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Value;
    use crate::thresholds::Bounds;
    use crate::units::Unit;

    const L: &str = "1.3.6.1.4.1.476.1.42.3.9.20.1.20.1.2.1.";
    const ALARM: &str = "1.3.6.1.4.1.476.1.42.3.9.20.1.10.1.2.100.";

    fn liebert(id: &str) -> String {
        format!("{L}{id}")
    }

    fn healthy() -> RawSnapshot {
        let mut s = RawSnapshot::new();
        s.insert("1.3.6.1.2.1.33.1.1.2.0", "GXT5-3000IRT2UXL");
        s.insert(&liebert("4123"), "Normal Operation");
        s.insert(&liebert("4872"), "1");
        s.insert(&liebert("4153"), "100");
        s.insert(&liebert("4148"), "54.6");
        s.insert(&liebert("4156"), "24.0");
        s.insert(&liebert("4150"), "45");
        s.insert(&liebert("4160"), "2023-05-14");
        s.insert(&liebert("4096"), "231.3");
        s.insert(&liebert("4105"), "50.0");
        s.insert(&liebert("4120"), "0");
        s.insert("1.3.6.1.2.1.33.1.4.4.1.2.1", "230");
        s.insert(&liebert("4223"), "35");
        s.insert(&liebert("4207"), "50.0");
        s.insert(&liebert("4208"), "900");
        s.insert(&liebert("4291"), "22.5");
        s
    }

    #[test]
    fn healthy_ups_is_ok_everywhere() {
        let report = run_cycle(&healthy(), &AppConfig::default());
        assert_eq!(report.services.len(), 3);
        for s in &report.services {
            assert_eq!(s.severity, Severity::Ok, "{:?}", s.verdicts);
            assert!(s.alarms.is_empty());
        }
        let power = report.service(ServiceGroup::Power).unwrap();
        assert_eq!(power.summary(), "System status: normal");
    }

    #[test]
    fn empty_snapshot_is_unknown() {
        let report = run_cycle(&RawSnapshot::new(), &AppConfig::default());
        for s in &report.services {
            assert_eq!(s.severity, Severity::Unknown);
            assert_eq!(s.verdicts[0].message, "No data from UPS");
        }
        assert_eq!(report.severity(), Severity::Unknown);
    }

    #[test]
    fn missing_required_metric_is_unknown_not_crit() {
        let mut s = healthy();
        s.insert_absent(&liebert("4291"));
        let report = run_cycle(&s, &AppConfig::default());
        let env = report.service(ServiceGroup::Environment).unwrap();
        assert_eq!(env.severity, Severity::Unknown);
        assert_eq!(env.verdicts[0].message, "Inlet air temperature data unavailable");
    }

    #[test]
    fn low_charge_and_alarm() {
        let mut s = healthy();
        s.insert(&liebert("4153"), "8");
        s.insert(&format!("{ALARM}4168"), "1");
        let report = run_cycle(&s, &AppConfig::default());
        let battery = report.service(ServiceGroup::Battery).unwrap();
        assert_eq!(battery.severity, Severity::Crit);
        assert_eq!(battery.alarms.len(), 1);
        assert_eq!(battery.alarms[0].severity, Severity::Warn);
        assert_eq!(
            battery.summary(),
            "ALARM: Battery discharging!, Battery charge: 8.0% (warn/crit below 20.0%/10.0%)"
        );
    }

    #[test]
    fn alarms_do_not_suppress_threshold_verdicts() {
        let mut s = healthy();
        s.insert(&liebert("4223"), "95");
        s.insert(&format!("{ALARM}4135"), "1");
        let report = run_cycle(&s, &AppConfig::default());
        let power = report.service(ServiceGroup::Power).unwrap();
        let load = power.verdicts.iter().find(|v| v.metric == "output_load").unwrap();
        assert_eq!(load.severity, Severity::Crit);
        assert_eq!(power.alarms[0].metric, "alarm_bypass_not_available");
        assert_eq!(power.severity, Severity::Crit);
    }

    #[test]
    fn voltage_is_disabled_by_default_but_sampled() {
        let mut s = healthy();
        s.insert("1.3.6.1.2.1.33.1.4.4.1.2.1", "300");
        let report = run_cycle(&s, &AppConfig::default());
        let power = report.service(ServiceGroup::Power).unwrap();
        let v = power.verdicts.iter().find(|v| v.metric == "output_voltage").unwrap();
        assert_eq!(v.severity, Severity::Ok);
        assert!(
            power
                .samples
                .iter()
                .any(|m| m.metric == "output_voltage" && m.value == 300.0 && m.unit == Unit::Volts)
        );

        let mut config = AppConfig::default();
        config.region.nominal_voltage = Some(230.0);
        let report = run_cycle(&s, &config);
        assert_eq!(report.service(ServiceGroup::Power).unwrap().severity, Severity::Crit);
    }

    #[test]
    fn every_numeric_metric_is_sampled_once() {
        let mut config = AppConfig::default();
        config.thresholds.battery.battery_charge = Bounds::DISABLED;
        let report = run_cycle(&healthy(), &config);
        let metrics = Resolver::new(Catalog::standard()).resolve(&healthy());
        let all: Vec<_> = report.services.iter().flat_map(|s| &s.samples).collect();
        for (name, m) in metrics.iter() {
            if let Value::Number(v) = m.value {
                let hits: Vec<_> = all.iter().filter(|s| s.metric == name).collect();
                assert_eq!(hits.len(), 1, "{name}");
                assert_eq!(hits[0].value, v);
                assert_eq!(hits[0].unit, m.unit);
            }
        }
    }

    #[test]
    fn informational_values_include_zero_and_dates() {
        let report = run_cycle(&healthy(), &AppConfig::default());
        let power = report.service(ServiceGroup::Power).unwrap();
        let blackouts = power
            .verdicts
            .iter()
            .find(|v| v.metric == "input_blackout_count")
            .unwrap();
        assert_eq!(blackouts.message, "Blackout count: 0");
        let battery = report.service(ServiceGroup::Battery).unwrap();
        let date = battery
            .verdicts
            .iter()
            .find(|v| v.metric == "battery_replacement_date")
            .unwrap();
        assert_eq!(date.message, "Last battery replacement: 2023-05-14");
        assert_eq!(date.value, None);
    }

    #[test]
    fn runtime_rendered_as_timespan() {
        let mut s = healthy();
        s.insert(&liebert("4150"), "4");
        let report = run_cycle(&s, &AppConfig::default());
        let battery = report.service(ServiceGroup::Battery).unwrap();
        let runtime = battery
            .verdicts
            .iter()
            .find(|v| v.metric == "battery_runtime")
            .unwrap();
        assert_eq!(runtime.severity, Severity::Crit);
        assert_eq!(
            runtime.message,
            "Estimated runtime: 4 minutes 0 seconds (warn/crit below 10 minutes 0 seconds/5 minutes 0 seconds)"
        );
    }

    fn find_verdict<'a>(report: &'a CycleReport, group: ServiceGroup, metric: &str) -> Option<&'a Verdict> {
        report
            .service(group)?
            .verdicts
            .iter()
            .find(|v| v.metric == metric)
    }

    #[test]
    fn unparseable_values_are_unknown_not_ok() {
        let mut s = healthy();
        s.insert(&liebert("4156"), "n/a");
        s.insert(&liebert("4208"), "garbage");
        let report = run_cycle(&s, &AppConfig::default());

        let temp = find_verdict(&report, ServiceGroup::Battery, "battery_temperature").unwrap();
        assert_eq!(temp.severity, Severity::Unknown);
        assert_eq!(temp.message, "Battery temperature: unparseable value \"n/a\"");
        assert_eq!(
            report.service(ServiceGroup::Battery).unwrap().severity,
            Severity::Unknown
        );

        let power = find_verdict(&report, ServiceGroup::Power, "output_power").unwrap();
        assert_eq!(power.severity, Severity::Unknown);
        assert_eq!(power.message, "Output power: unparseable value \"garbage\"");
        assert_eq!(
            report.service(ServiceGroup::Power).unwrap().severity,
            Severity::Unknown
        );
    }

    #[test]
    fn unparseable_required_metric_names_the_value() {
        let mut s = healthy();
        s.insert(&liebert("4291"), "");
        let report = run_cycle(&s, &AppConfig::default());
        let env = find_verdict(&report, ServiceGroup::Environment, "ambient_temperature").unwrap();
        assert_eq!(env.severity, Severity::Unknown);
        assert_eq!(env.message, "Inlet air temperature: unparseable value \"\"");
    }

    #[test]
    fn absent_optional_metrics_stay_silent() {
        let mut s = healthy();
        s.insert_absent(&liebert("4156"));
        s.insert_absent(&liebert("4208"));
        let report = run_cycle(&s, &AppConfig::default());
        assert!(find_verdict(&report, ServiceGroup::Battery, "battery_temperature").is_none());
        assert!(find_verdict(&report, ServiceGroup::Power, "output_power").is_none());
        assert_eq!(report.severity(), Severity::Ok);
    }

    #[test]
    fn unparseable_primary_uses_rfc1628_fallback_scaling() {
        let mut s = healthy();
        s.insert(&liebert("4148"), "n/a");
        s.insert("1.3.6.1.2.1.33.1.2.5.0", "546");
        let report = run_cycle(&s, &AppConfig::default());

        let v = find_verdict(&report, ServiceGroup::Battery, "battery_voltage").unwrap();
        assert_eq!(v.severity, Severity::Ok);
        assert_eq!(v.message, "Battery voltage: 54.6 V");
        let battery = report.service(ServiceGroup::Battery).unwrap();
        assert_eq!(battery.severity, Severity::Ok);
        assert!(
            battery
                .samples
                .iter()
                .any(|m| m.metric == "battery_voltage" && m.value == 54.6)
        );
    }

    #[test]
    fn pipeline_is_idempotent() {
        let s = healthy();
        let config = AppConfig::default();
        assert_eq!(run_cycle(&s, &config), run_cycle(&s, &config));
    }
}
