//! Formatação da saída no estilo de plugins de monitoramento.
//!
//! ```text
//! CRIT - Vertiv UPS Battery: Battery charge: 8.0% (warn/crit below 20.0%/10.0%) | battery_charge=8%
//! ```

use std::fmt::Write;
use ups_core::resolve::MetricSample;
use ups_core::{ServiceReport, Severity};

/// Valor de performance data: número + símbolo da unidade.
fn perf_value(sample: &MetricSample) -> String {
    let symbol = match sample.unit.symbol() {
        // sem símbolos não-ASCII na perf data
        "°C" => "",
        s => s,
    };
    format!("{}={}{}", sample.metric, sample.value, symbol)
}

/// Linha de resumo de um serviço, com perf data.
pub fn service_line(report: &ServiceReport) -> String {
    let mut line = format!(
        "{} - {}: {}",
        report.severity,
        report.group.service_name(),
        report.summary()
    );
    if !report.samples.is_empty() {
        let perf: Vec<String> = report.samples.iter().map(perf_value).collect();
        let _ = write!(line, " | {}", perf.join(" "));
    }
    line
}

/// Uma linha por veredito; com `all = false` só os não-OK.
pub fn detail_lines(report: &ServiceReport, all: bool) -> Vec<String> {
    report
        .verdicts
        .iter()
        .chain(&report.alarms)
        .filter(|v| all || v.severity != Severity::Ok)
        .map(|v| format!("  [{}] {}", v.severity, v.message))
        .collect()
}
