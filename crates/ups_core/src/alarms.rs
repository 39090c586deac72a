//! Alarmes declarativos.
//!
//! Um alarme dispara quando o valor **bruto** da OID é exatamente igual a
//! `trigger_value`. Alarmes só acrescentam vereditos; nunca suprimem os de
//! threshold.

use crate::snapshot::RawSnapshot;
use crate::verdict::{Severity, Verdict};

/// Regra estática de alarme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmRule {
    pub name: &'static str,
    pub source_id: &'static str,
    pub trigger_value: &'static str,
    pub severity: Severity,
    pub message: &'static str,
}

macro_rules! alarm {
    ($name:literal, $id:literal, $severity:expr, $message:literal) => {
        AlarmRule {
            name: $name,
            source_id: concat!("1.3.6.1.4.1.476.1.42.3.9.20.1.10.1.2.100.", $id),
            trigger_value: "1",
            severity: $severity,
            message: $message,
        }
    };
}

pub static BATTERY_ALARMS: &[AlarmRule] = &[
    alarm!("alarm_battery_low", "4162", Severity::Crit, "ALARM: Battery low!"),
    alarm!(
        "alarm_battery_temp",
        "4219",
        Severity::Crit,
        "ALARM: Battery temperature critical!"
    ),
    alarm!(
        "alarm_battery_discharging",
        "4168",
        Severity::Warn,
        "ALARM: Battery discharging!"
    ),
    alarm!("alarm_replace_battery", "6182", Severity::Warn, "ALARM: Replace battery!"),
];

pub static POWER_ALARMS: &[AlarmRule] = &[
    alarm!(
        "alarm_input_problem",
        "4122",
        Severity::Warn,
        "ALARM: Input power problem detected!"
    ),
    alarm!("alarm_overload", "5806", Severity::Crit, "ALARM: Output overload!"),
    alarm!(
        "alarm_bypass_not_available",
        "4135",
        Severity::Warn,
        "ALARM: Bypass not available!"
    ),
    alarm!("alarm_output_off", "4215", Severity::Crit, "ALARM: System output off!"),
    alarm!("alarm_inverter_failure", "4233", Severity::Crit, "ALARM: Inverter failure!"),
];

/// Todas as regras, na ordem bateria → potência.
pub fn all_rules() -> impl Iterator<Item = &'static AlarmRule> {
    BATTERY_ALARMS.iter().chain(POWER_ALARMS)
}

/// Avalia as regras contra o snapshot bruto, na ordem das regras.
pub fn evaluate_alarms<'a>(
    snapshot: &RawSnapshot,
    rules: impl IntoIterator<Item = &'a AlarmRule>,
) -> Vec<Verdict> {
    rules
        .into_iter()
        .filter(|rule| snapshot.get(rule.source_id) == Some(rule.trigger_value))
        .map(|rule| Verdict::new(rule.name, rule.severity, rule.message))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATTERY_STATUS: AlarmRule = AlarmRule {
        name: "battery_status_alarm",
        source_id: "battery.status",
        trigger_value: "2",
        severity: Severity::Crit,
        message: "Battery failed",
    };

    #[test]
    fn matching_value_fires_once() {
        let snapshot: RawSnapshot = [("battery.status", "2")].into_iter().collect();
        let verdicts = evaluate_alarms(&snapshot, [&BATTERY_STATUS]);
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].severity, Severity::Crit);
        assert_eq!(verdicts[0].message, "Battery failed");
    }

    #[test]
    fn missing_or_different_value_is_silent() {
        assert!(evaluate_alarms(&RawSnapshot::new(), [&BATTERY_STATUS]).is_empty());

        let other: RawSnapshot = [("battery.status", "1")].into_iter().collect();
        assert!(evaluate_alarms(&other, [&BATTERY_STATUS]).is_empty());

        // comparação exata com a representação bruta
        let padded: RawSnapshot = [("battery.status", "2.0")].into_iter().collect();
        assert!(evaluate_alarms(&padded, [&BATTERY_STATUS]).is_empty());

        let mut absent = RawSnapshot::new();
        absent.insert_absent("battery.status");
        assert!(evaluate_alarms(&absent, [&BATTERY_STATUS]).is_empty());
    }

    #[test]
    fn nine_alarms_with_unique_sources() {
        let rules: Vec<_> = all_rules().collect();
        assert_eq!(rules.len(), 9);
        let mut ids: Vec<_> = rules.iter().map(|r| r.source_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 9);
    }

    #[test]
    fn standard_rules_fire_in_rule_order() {
        let snapshot: RawSnapshot = [
            ("1.3.6.1.4.1.476.1.42.3.9.20.1.10.1.2.100.6182", "1"),
            ("1.3.6.1.4.1.476.1.42.3.9.20.1.10.1.2.100.4162", "1"),
            ("1.3.6.1.4.1.476.1.42.3.9.20.1.10.1.2.100.4168", "0"),
        ]
        .into_iter()
        .collect();
        let verdicts = evaluate_alarms(&snapshot, BATTERY_ALARMS);
        let names: Vec<_> = verdicts.iter().map(|v| v.metric.as_str()).collect();
        assert_eq!(names, ["alarm_battery_low", "alarm_replace_battery"]);
    }
}
