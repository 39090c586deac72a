//! Snapshot bruto de um ciclo de polling.
//!
//! Entregue pronto pelo transporte SNMP. A presença de cada valor é
//! explícita ([`RawValue`]): `"0"` e `""` são valores presentes; só o
//! marcador de ausência do transporte (ou a chave faltando) conta como
//! ausente.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Valor de uma OID no snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'a> {
    Present(&'a str),
    /// O transporte respondeu sem valor para a OID
    Absent,
    /// A OID nem aparece no snapshot
    Missing,
}

impl<'a> RawValue<'a> {
    pub fn present(self) -> Option<&'a str> {
        match self {
            RawValue::Present(v) => Some(v),
            RawValue::Absent | RawValue::Missing => None,
        }
    }
}

/// Mapeamento OID → valor bruto opcional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSnapshot {
    values: BTreeMap<String, Option<String>>,
}

/// OIDs são comparadas sem o ponto inicial (`.1.3.6…` == `1.3.6…`).
fn normalize(id: &str) -> &str {
    id.trim().trim_start_matches('.')
}

impl RawSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, value: impl Into<String>) {
        self.values.insert(normalize(id).to_string(), Some(value.into()));
    }

    /// Registra o marcador de ausência do transporte para `id`.
    pub fn insert_absent(&mut self, id: &str) {
        self.values.insert(normalize(id).to_string(), None);
    }

    pub fn value(&self, id: &str) -> RawValue<'_> {
        match self.values.get(normalize(id)) {
            Some(Some(v)) => RawValue::Present(v),
            Some(None) => RawValue::Absent,
            None => RawValue::Missing,
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.value(id).present()
    }

    /// Quantidade de OIDs com valor presente.
    pub fn present_count(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }

    /// `true` quando nenhuma OID trouxe valor (timeout, host inacessível…).
    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }

    /// Monta o snapshot a partir da linha posicional do transporte, na
    /// ordem de `oids`. String vazia é o marcador de ausência; valores
    /// excedentes são ignorados.
    pub fn from_row<S: AsRef<str>>(oids: &[&str], row: &[S]) -> Self {
        let mut snapshot = Self::new();
        for (oid, value) in oids.iter().zip(row) {
            let value = value.as_ref();
            if value.is_empty() {
                snapshot.insert_absent(oid);
            } else {
                snapshot.insert(oid, value);
            }
        }
        snapshot
    }

    /// Lê um snapshot no formato TOML:
    ///
    /// ```toml
    /// absent = ["1.3.6.1.2.1.33.1.2.7.0"]
    /// row = []            # opcional: valores na ordem de `fetch_oids`
    ///
    /// [values]
    /// "1.3.6.1.2.1.33.1.2.4.0" = "100"
    /// ```
    pub fn from_toml_str(text: &str, fetch_oids: &[&str]) -> Result<Self, toml::de::Error> {
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct SnapshotFile {
            values: BTreeMap<String, String>,
            absent: Vec<String>,
            row: Vec<String>,
        }

        let file: SnapshotFile = toml::from_str(text)?;
        let mut snapshot = Self::from_row(fetch_oids, file.row.as_slice());
        for (oid, value) in &file.values {
            snapshot.insert(oid, value.as_str());
        }
        for oid in &file.absent {
            snapshot.insert_absent(oid);
        }
        Ok(snapshot)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (k, v) in iter {
            snapshot.insert(k.as_ref(), v);
        }
        snapshot
    }
}
