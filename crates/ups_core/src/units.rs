//! Unidades de engenharia e formatação de valores para mensagens.

use serde::{Deserialize, Serialize};

/// Unidade declarada de um campo do catálogo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Volts,
    Amps,
    Hertz,
    Percent,
    Celsius,
    Seconds,
    Watts,
    VoltAmps,
    Count,
    /// Grandeza adimensional (fator de potência)
    Ratio,
    Date,
    State,
    Raw,
}

impl Unit {
    /// Símbolo usado nas mensagens e nas amostras de série temporal.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Volts => "V",
            Unit::Amps => "A",
            Unit::Hertz => "Hz",
            Unit::Percent => "%",
            Unit::Celsius => "°C",
            Unit::Seconds => "s",
            Unit::Watts => "W",
            Unit::VoltAmps => "VA",
            Unit::Count | Unit::Ratio | Unit::Date | Unit::State | Unit::Raw => "",
        }
    }

    /// `true` para unidades cujo valor convertido é um número.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Unit::Date | Unit::State | Unit::Raw)
    }

    /// Formata um valor numérico nesta unidade.
    pub fn render(self, value: f64) -> String {
        match self {
            Unit::Volts | Unit::Amps | Unit::Hertz => format!("{value:.1} {}", self.symbol()),
            Unit::Celsius => format!("{value:.1} °C"),
            Unit::Percent => format!("{value:.1}%"),
            Unit::Watts | Unit::VoltAmps => format!("{value:.0} {}", self.symbol()),
            Unit::Seconds => render_timespan(value),
            Unit::Ratio => format!("{value:.2}"),
            Unit::Count => format!("{value:.0}"),
            Unit::Date | Unit::State | Unit::Raw => format!("{value}"),
        }
    }
}

/// Duração legível: "1 hours 5 minutes", "10 minutes 0 seconds", "42 seconds".
pub fn render_timespan(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours} hours {minutes} minutes")
    } else if minutes > 0 {
        format!("{minutes} minutes {secs} seconds")
    } else {
        format!("{secs} seconds")
    }
}
