//! Frame binário do relatório de ciclo.
//!
//! O checker avalia um snapshot e termina; quem arquiva o histórico e
//! desenha os gráficos é outro processo. Este frame é o contrato entre os
//! dois: carrega o [`CycleReport`] inteiro (severidade por serviço,
//! vereditos, alarmes e as amostras numéricas para séries temporais), de
//! modo que o consumidor não precise reavaliar nada nem conhecer o
//! catálogo de OIDs. Com o mesmo snapshot e a mesma configuração os bytes
//! são idênticos, o que permite deduplicar ciclos repetidos.
//!
//! Formato do frame:
//!
//! ```text
//! ┌──────────┬─────────┬──────────────┐
//! │ Magic(1) │ Ver.(1) │ Payload (N)  │
//! └──────────┴─────────┴──────────────┘
//! ```
//!
//! - Magic byte `0x55` ('U') identifica um relatório de UPS
//! - Versão do protocolo (1 byte)
//! - [`CycleReport`] serializado com bincode

use crate::services::CycleReport;

/// Magic byte que identifica frames de relatório.
pub const MAGIC_BYTE: u8 = 0x55; // 'U'

/// Versão atual do protocolo.
pub const PROTOCOL_VERSION: u8 = 1;

/// Tamanho do header (magic + version).
const HEADER_SIZE: usize = 2;

/// Erros do protocolo.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Frame muito curto ({0} bytes, mínimo {HEADER_SIZE})")]
    TooShort(usize),

    #[error("Magic byte inválido: 0x{0:02X} (esperado 0x{MAGIC_BYTE:02X})")]
    InvalidMagic(u8),

    #[error("Versão incompatível: {0} (suportada: {PROTOCOL_VERSION})")]
    VersionMismatch(u8),

    #[error("Erro de serialização: {0}")]
    Serialize(String),

    #[error("Erro de deserialização: {0}")]
    Deserialize(String),
}

/// Codifica um [`CycleReport`] como `[MAGIC][VERSION][bincode...]`.
pub fn encode_report(report: &CycleReport) -> Result<Vec<u8>, ProtocolError> {
    let body = bincode::serialize(report).map_err(|e| ProtocolError::Serialize(e.to_string()))?;

    let mut frame = Vec::with_capacity(HEADER_SIZE + body.len());
    frame.push(MAGIC_BYTE);
    frame.push(PROTOCOL_VERSION);
    frame.extend_from_slice(&body);

    Ok(frame)
}

/// Decodifica um frame, validando magic e versão antes do payload.
///
/// Um frame de versão diferente é rejeitado: o layout bincode não carrega
/// nomes de campo, então não há leitura tolerante entre versões.
pub fn decode_report(data: &[u8]) -> Result<CycleReport, ProtocolError> {
    let [magic, version, body @ ..] = data else {
        return Err(ProtocolError::TooShort(data.len()));
    };

    if *magic != MAGIC_BYTE {
        return Err(ProtocolError::InvalidMagic(*magic));
    }
    if *version != PROTOCOL_VERSION {
        return Err(ProtocolError::VersionMismatch(*version));
    }

    bincode::deserialize(body).map_err(|e| ProtocolError::Deserialize(e.to_string()))
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
