//! Avaliação dos estados operacionais (status do sistema e da bateria).

use crate::convert::OperatingState;
use crate::resolve::ResolvedMetrics;
use crate::verdict::{Severity, Verdict};

/// Status do sistema, usando a fonte de saída para desambiguar.
///
/// Bypass (modo ECO) é operação normal. Um status `unknown` com a saída em
/// rede ou bypass também é tratado como normal.
pub fn evaluate_system_status(metrics: &ResolvedMetrics) -> Vec<Verdict> {
    use OperatingState as S;

    let status = metrics.state("system_status").unwrap_or(S::Unknown);
    let source = metrics.state("output_source");
    let on_bypass_source = source == Some(S::OnBypass);

    let (severity, text) = match status {
        S::Normal => (Severity::Ok, "normal".to_string()),
        S::OnBypass if on_bypass_source => (Severity::Ok, "bypass (ECO mode)".to_string()),
        S::OnBypass => (Severity::Ok, "on bypass".to_string()),
        _ if on_bypass_source => (Severity::Ok, "bypass (ECO mode)".to_string()),
        S::OnBattery => (Severity::Warn, "on battery".to_string()),
        S::Shutdown => (Severity::Crit, "shutdown".to_string()),
        S::Startup => (Severity::Ok, "startup".to_string()),
        S::Unknown if source == Some(S::Normal) => {
            (Severity::Ok, "operating (normal mode)".to_string())
        }
        other => (Severity::Unknown, format!("{other} (please verify)")),
    };

    let mut verdicts = vec![Verdict::new(
        "system_status",
        severity,
        format!("System status: {text}"),
    )];

    let eco_flag = |name| metrics.number(name).is_some_and(|v| v > 0.0);
    if on_bypass_source && (eco_flag("eco_mode_state") || eco_flag("eco_mode_status")) {
        verdicts.push(Verdict::new(
            "eco_mode",
            Severity::Ok,
            "ECO mode enabled for energy efficiency",
        ));
    }

    verdicts
}

/// Status da bateria (RFC1628); ausente não gera veredito.
pub fn evaluate_battery_status(metrics: &ResolvedMetrics) -> Option<Verdict> {
    let state = metrics.state("battery_status")?;
    let severity = match state {
        OperatingState::Normal => Severity::Ok,
        OperatingState::Low => Severity::Warn,
        OperatingState::Depleted => Severity::Crit,
        _ => Severity::Unknown,
    };
    Some(Verdict::new(
        "battery_status",
        severity,
        format!("Battery status: {state}"),
    ))
}
