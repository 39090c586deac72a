//! Erros do motor de resolução e avaliação.
//!
//! Apenas [`EngineError::UnknownMetric`] indica erro de programação; os
//! demais são tratados localmente (fallback, métrica omitida ou estado
//! `unknown`) e nunca abortam a avaliação de um serviço.

/// Erros do motor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Campo ausente no snapshot: {0}")]
    FieldAbsent(String),

    #[error("Falha de conversão ({converter}): {raw:?}")]
    ConversionFailure {
        raw: String,
        converter: &'static str,
    },

    #[error("Métrica desconhecida: {0}")]
    UnknownMetric(String),

    #[error("Valor não reconhecido na tabela {table}: {raw:?}")]
    UnrecognizedEnumValue { raw: String, table: &'static str },
}

impl EngineError {
    pub(crate) fn conversion(raw: &str, converter: &'static str) -> Self {
        Self::ConversionFailure {
            raw: raw.to_string(),
            converter,
        }
    }
}

/// Erros de leitura/escrita da configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Erro ao gerar TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}
