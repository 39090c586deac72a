//! # UPS Check
//!
//! Avalia um snapshot SNMP de um UPS Vertiv/Liebert e reporta os serviços
//! Bateria, Potência e Ambiente. O código de saída segue o padrão de
//! plugins de monitoramento (0 OK, 1 WARN, 2 CRIT, 3 UNKNOWN).
//!
//! ## Uso
//! ```bash
//! ups_check snapshot.toml                      # Avalia com config.toml ao lado do executável
//! ups_check snapshot.toml --config ups.toml    # Config explícita
//! ups_check snapshot.toml --frame report.bin   # Grava o frame binário do relatório
//! ups_check --decode report.bin                # Mostra um relatório gravado
//! ups_check --oids                             # Lista as OIDs a buscar, na ordem do `row`
//! ups_check --init-config ups.toml             # Grava a configuração padrão
//! ```

mod output;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use ups_core::{alarms, decode_report, encode_report, run_cycle};
use ups_core::{AppConfig, Catalog, CycleReport, RawSnapshot, Severity};

/// Avalia um snapshot SNMP de um UPS Vertiv/Liebert.
#[derive(Parser, Debug)]
#[command(name = "ups_check", version, about, long_about = None)]
struct Args {
    /// Snapshot TOML entregue pelo transporte SNMP
    snapshot: Option<PathBuf>,

    /// Arquivo de configuração (padrão: config.toml ao lado do executável)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grava o frame binário do relatório neste arquivo
    #[arg(long)]
    frame: Option<PathBuf>,

    /// Mostra um relatório gravado com --frame
    #[arg(long, conflicts_with = "snapshot")]
    decode: Option<PathBuf>,

    /// Grava a configuração padrão e sai
    #[arg(long)]
    init_config: Option<PathBuf>,

    /// Mostra também os vereditos OK
    #[arg(long)]
    details: bool,

    /// Lista as OIDs a buscar, na ordem do `row` do snapshot
    #[arg(long)]
    oids: bool,
}

fn unknown() -> ExitCode {
    ExitCode::from(Severity::Unknown.exit_code() as u8)
}

fn main() -> ExitCode {
    // ── Logging (stderr; stdout é do relatório) ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help / --version
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return unknown();
        }
    };

    let oids = Catalog::standard().fetch_oids(alarms::all_rules());

    if args.oids {
        for oid in &oids {
            println!("{oid}");
        }
        return ExitCode::SUCCESS;
    }

    if let Some(path) = &args.init_config {
        return match AppConfig::default().save(path) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Não foi possível salvar config: {e}");
                unknown()
            }
        };
    }

    if let Some(path) = &args.decode {
        return match read_frame(path) {
            Ok(report) => print_report(&report, true),
            Err(e) => {
                error!("{e}");
                unknown()
            }
        };
    }

    // ── Config ──
    let config_path = args.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path);
    for problem in config.validate() {
        warn!("Config: {problem}");
    }

    // ── Snapshot ──
    let Some(snapshot_path) = &args.snapshot else {
        error!("Nenhum snapshot informado (veja --help)");
        return unknown();
    };
    let snapshot = match std::fs::read_to_string(snapshot_path) {
        Ok(text) => match RawSnapshot::from_toml_str(&text, &oids) {
            Ok(s) => s,
            Err(e) => {
                error!("Snapshot inválido {}: {e}", snapshot_path.display());
                return unknown();
            }
        },
        Err(e) => {
            error!("Erro ao ler {}: {e}", snapshot_path.display());
            return unknown();
        }
    };
    info!(
        "Snapshot: {} OIDs com valor de {}",
        snapshot.present_count(),
        oids.len()
    );

    // ── Ciclo ──
    let report = run_cycle(&snapshot, &config);

    let frame_path = args.frame.clone().or_else(|| {
        (!config.output.frame_path.is_empty()).then(|| PathBuf::from(&config.output.frame_path))
    });
    if let Some(path) = frame_path {
        match encode_report(&report) {
            Ok(frame) => match std::fs::write(&path, &frame) {
                Ok(()) => info!("→ {} bytes em {}", frame.len(), path.display()),
                Err(e) => error!("Erro ao gravar {}: {e}", path.display()),
            },
            Err(e) => error!("Erro ao serializar relatório: {e}"),
        }
    }

    print_report(&report, args.details || config.output.details)
}

fn read_frame(path: &Path) -> Result<CycleReport, String> {
    let data = std::fs::read(path).map_err(|e| format!("Erro ao ler {}: {e}", path.display()))?;
    decode_report(&data).map_err(|e| format!("Frame inválido {}: {e}", path.display()))
}

fn print_report(report: &CycleReport, details: bool) -> ExitCode {
    for service in &report.services {
        println!("{}", output::service_line(service));
        for line in output::detail_lines(service, details) {
            println!("{line}");
        }
    }
    ExitCode::from(report.severity().exit_code() as u8)
}
