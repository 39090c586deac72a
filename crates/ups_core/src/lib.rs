//! # UPS Core
//!
//! Motor de monitoramento de UPS Vertiv/Liebert via SNMP: catálogo de OIDs,
//! conversão de unidades, resolução com fallback RFC1628, thresholds,
//! alarmes e montagem dos serviços Bateria/Potência/Ambiente.
//!
//! O transporte SNMP fica de fora: a entrada é um [`RawSnapshot`] já
//! coletado e a saída um [`CycleReport`].
//!
//! ## Módulos
//! - [`catalog`] – Descritores de campo (OID primária, fallback, unidade)
//! - [`convert`] – Conversores e tabelas de status
//! - [`snapshot`] – Snapshot bruto com presença explícita
//! - [`resolve`] – Snapshot → métricas resolvidas
//! - [`thresholds`] – Níveis warn/crit superiores e inferiores
//! - [`alarms`] – Alarmes declarativos por valor bruto
//! - [`status`] – Status do sistema e da bateria
//! - [`services`] – Montadores de serviço e ciclo completo
//! - [`config`] – Configuração unificada via TOML
//! - [`protocol`] – Frame binário do relatório (bincode)

pub mod error;
pub mod units;
pub mod convert;
pub mod catalog;
pub mod snapshot;
pub mod verdict;
pub mod resolve;
pub mod thresholds;
pub mod alarms;
pub mod status;
pub mod services;
pub mod config;
pub mod protocol;

// Re-exports convenientes
pub use catalog::Catalog;
pub use config::AppConfig;
pub use protocol::{decode_report, encode_report, PROTOCOL_VERSION};
pub use services::{run_cycle, CycleReport, ServiceGroup, ServiceReport};
pub use snapshot::RawSnapshot;
pub use verdict::{Severity, Verdict};
