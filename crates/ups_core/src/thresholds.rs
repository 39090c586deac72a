//! Avaliação de thresholds – níveis warn/crit superiores e inferiores.

use crate::catalog::FieldDescriptor;
use crate::error::EngineError;
use crate::resolve::ResolvedMetric;
use crate::units::Unit;
use crate::verdict::{Severity, Verdict};
use serde::{Deserialize, Serialize};

/// Quatro limites independentes; `None` = desabilitado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn_upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crit_upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn_lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crit_lower: Option<f64>,
}

impl Bounds {
    /// Todos os limites desabilitados.
    pub const DISABLED: Bounds = Bounds {
        warn_upper: None,
        crit_upper: None,
        warn_lower: None,
        crit_lower: None,
    };

    pub const fn upper(warn: f64, crit: f64) -> Self {
        Self {
            warn_upper: Some(warn),
            crit_upper: Some(crit),
            warn_lower: None,
            crit_lower: None,
        }
    }

    pub const fn lower(warn: f64, crit: f64) -> Self {
        Self {
            warn_upper: None,
            crit_upper: None,
            warn_lower: Some(warn),
            crit_lower: Some(crit),
        }
    }

    pub const fn with_lower(mut self, warn: f64, crit: f64) -> Self {
        self.warn_lower = Some(warn);
        self.crit_lower = Some(crit);
        self
    }

    pub fn is_disabled(&self) -> bool {
        *self == Self::DISABLED
    }

    /// Severidade de `value`; limites desabilitados não participam.
    pub fn level_for_value(&self, value: f64) -> Severity {
        let at_or_above = |bound: Option<f64>| bound.is_some_and(|b| value >= b);
        let at_or_below = |bound: Option<f64>| bound.is_some_and(|b| value <= b);

        if at_or_above(self.crit_upper) || at_or_below(self.crit_lower) {
            Severity::Crit
        } else if at_or_above(self.warn_upper) || at_or_below(self.warn_lower) {
            Severity::Warn
        } else {
            Severity::Ok
        }
    }

    /// Limites violados, no formato "(warn/crit at W/C)".
    fn describe(&self, value: f64, unit: Unit) -> String {
        let upper_hit = [self.warn_upper, self.crit_upper]
            .iter()
            .flatten()
            .any(|b| value >= *b);
        let (warn, crit, word) = if upper_hit {
            (self.warn_upper, self.crit_upper, "at")
        } else {
            (self.warn_lower, self.crit_lower, "below")
        };
        let render = |b: Option<f64>| b.map_or_else(|| "-".to_string(), |b| unit.render(b));
        format!("(warn/crit {word} {}/{})", render(warn), render(crit))
    }
}

/// Avalia um valor numérico contra `bounds`.
///
/// Valores não finitos viram `Unknown` – nunca `Ok` nem `Crit` por padrão.
pub fn evaluate(metric: &str, label: &str, value: f64, unit: Unit, bounds: &Bounds) -> Verdict {
    if !value.is_finite() {
        return Verdict::unknown(metric, format!("{label}: invalid value {value}"));
    }

    let severity = bounds.level_for_value(value);
    let mut message = format!("{label}: {}", unit.render(value));
    if severity != Severity::Ok {
        message.push(' ');
        message.push_str(&bounds.describe(value, unit));
    }

    Verdict::new(metric, severity, message).with_value(value, unit)
}

/// Avalia uma métrica resolvida (ou ausente) contra `bounds`.
pub fn evaluate_metric(
    field: &FieldDescriptor,
    metric: Option<&ResolvedMetric>,
    bounds: &Bounds,
) -> Verdict {
    match metric {
        None => Verdict::unknown(field.name, format!("{} data unavailable", field.label)),
        Some(m) => match m.value.as_number() {
            Some(value) => evaluate(field.name, field.label, value, m.unit, bounds),
            None => Verdict::unknown(
                field.name,
                format!("{}: non-numeric value {}", field.label, m.value.render(m.unit)),
            ),
        },
    }
}

/// Veredito para um campo presente no snapshot mas sem conversão possível.
pub fn unconvertible(field: &FieldDescriptor, err: &EngineError) -> Verdict {
    let message = match err {
        EngineError::ConversionFailure { raw, .. } => {
            format!("{}: unparseable value {raw:?}", field.label)
        }
        other => format!("{}: {other}", field.label),
    };
    Verdict::unknown(field.name, message)
}
