//! Severidades e vereditos.

use crate::units::Unit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severidade de um veredito.
///
/// A ordem das variantes é a ordem de "pior estado" do framework de
/// monitoramento: `Unknown` tem posto próprio entre `Warn` e `Crit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Ok,
    Warn,
    Unknown,
    Crit,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Ok => "OK",
            Severity::Warn => "WARN",
            Severity::Unknown => "UNKNOWN",
            Severity::Crit => "CRIT",
        }
    }

    /// Código de saída no padrão de plugins de monitoramento.
    pub fn exit_code(self) -> i32 {
        match self {
            Severity::Ok => 0,
            Severity::Warn => 1,
            Severity::Crit => 2,
            Severity::Unknown => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resultado da avaliação de uma métrica, estado ou alarme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub metric: String,
    pub severity: Severity,
    pub message: String,
    pub value: Option<f64>,
    pub unit: Option<Unit>,
}

impl Verdict {
    pub fn new(metric: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            metric: metric.to_string(),
            severity,
            message: message.into(),
            value: None,
            unit: None,
        }
    }

    pub fn unknown(metric: &str, message: impl Into<String>) -> Self {
        Self::new(metric, Severity::Unknown, message)
    }

    pub fn with_value(mut self, value: f64, unit: Unit) -> Self {
        self.value = Some(value);
        self.unit = Some(unit);
        self
    }
}

/// Pior severidade entre os vereditos; lista vazia é `Ok`.
pub fn aggregate<'a>(verdicts: impl IntoIterator<Item = &'a Verdict>) -> Severity {
    verdicts
        .into_iter()
        .map(|v| v.severity)
        .max()
        .unwrap_or(Severity::Ok)
}
