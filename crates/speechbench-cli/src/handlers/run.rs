//! Run command handler: execute a single benchmark run from the command
//! line and block until it reaches a terminal status.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use speechbench_axum::AxumContext;
use speechbench_core::domain::{ChainPairing, RunConfig, RunItemStatus, RunMode, RunStatus, ServiceType};
use speechbench_core::ports::Repository;

use crate::commands::{RunModeArg, ServiceTypeArg};

impl From<RunModeArg> for RunMode {
    fn from(arg: RunModeArg) -> Self {
        match arg {
            RunModeArg::Isolated => Self::Isolated,
            RunModeArg::Chained => Self::Chained,
        }
    }
}

impl From<ServiceTypeArg> for ServiceType {
    fn from(arg: ServiceTypeArg) -> Self {
        match arg {
            ServiceTypeArg::Tts => Self::Tts,
            ServiceTypeArg::Stt => Self::Stt,
        }
    }
}

/// Arguments the `run` subcommand was invoked with, already detached from
/// `clap`'s `Commands` enum so the handler signature stays stable as flags
/// are added.
pub struct RunArgs {
    pub mode: RunModeArg,
    pub service: Option<ServiceTypeArg>,
    pub chain: Option<String>,
    pub vendors: Vec<String>,
    pub input: Option<std::path::PathBuf>,
    pub texts: Vec<String>,
    pub voice_id: Option<String>,
    pub language: Option<String>,
    pub poll_interval_ms: u64,
}

#[allow(clippy::too_many_lines)]
pub async fn execute(ctx: &AxumContext, args: RunArgs) -> Result<()> {
    let inputs = resolve_inputs(&args)?;
    if inputs.is_empty() {
        bail!("no input text given; pass --text or --input");
    }

    let mode: RunMode = args.mode.into();
    let (vendors, config) = match mode {
        RunMode::Isolated => {
            if args.vendors.is_empty() {
                bail!("--vendors is required in isolated mode");
            }
            let service = args
                .service
                .context("--service is required in isolated mode")?
                .into();
            let config = RunConfig {
                service: Some(service),
                voice_id: args.voice_id.clone(),
                language: args.language.clone(),
                ..RunConfig::default()
            };
            (args.vendors.clone(), config)
        }
        RunMode::Chained => {
            let chain = args.chain.as_deref().context("--chain is required in chained mode")?;
            let (tts_vendor, stt_vendor) = chain
                .split_once(':')
                .context("--chain must be of the form tts_vendor:stt_vendor")?;
            let vendors = vec![tts_vendor.to_string(), stt_vendor.to_string()];
            let config = RunConfig {
                chain: Some(ChainPairing {
                    tts_vendor: tts_vendor.to_string(),
                    stt_vendor: stt_vendor.to_string(),
                }),
                voice_id: args.voice_id.clone(),
                language: args.language.clone(),
                ..RunConfig::default()
            };
            (vendors, config)
        }
    };

    let run_id = ctx.engine.create_run(mode, vendors, inputs, config).await?;
    println!("run {run_id} accepted, waiting for completion...");

    let poll_interval = Duration::from_millis(args.poll_interval_ms.max(50));
    let run = loop {
        let run = ctx.repository.get_run(run_id).await?;
        if run.status.is_terminal() {
            break run;
        }
        tokio::time::sleep(poll_interval).await;
    };

    println!("run {run_id} finished with status {:?}", run.status);

    let items = ctx.repository.list_items_by_run(run_id).await?;
    for item in &items {
        let marker = match item.status {
            RunItemStatus::Completed => "ok",
            RunItemStatus::Failed => "FAILED",
            RunItemStatus::Pending | RunItemStatus::Running => "stuck",
        };
        println!(
            "  [{marker}] {} :: {}",
            item.vendor_label,
            item.failure_reason.as_deref().unwrap_or("-")
        );
    }

    if run.status == RunStatus::Failed {
        bail!("run {run_id} failed");
    }
    Ok(())
}

fn resolve_inputs(args: &RunArgs) -> Result<Vec<String>> {
    if !args.texts.is_empty() {
        return Ok(args.texts.clone());
    }
    let Some(path) = args.input.as_deref() else {
        return Ok(Vec::new());
    };
    read_lines(path)
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args() -> RunArgs {
        RunArgs {
            mode: RunModeArg::Isolated,
            service: None,
            chain: None,
            vendors: Vec::new(),
            input: None,
            texts: Vec::new(),
            voice_id: None,
            language: None,
            poll_interval_ms: 500,
        }
    }

    #[test]
    fn inline_texts_take_precedence_over_input_file() {
        let mut args = bare_args();
        args.texts = vec!["hello".to_string()];
        args.input = Some(std::path::PathBuf::from("/does/not/exist.txt"));
        let inputs = resolve_inputs(&args).unwrap();
        assert_eq!(inputs, vec!["hello".to_string()]);
    }

    #[test]
    fn input_file_lines_are_trimmed_and_blanks_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.txt");
        std::fs::write(&path, "  hello \n\nworld\n").unwrap();

        let mut args = bare_args();
        args.input = Some(path);
        let inputs = resolve_inputs(&args).unwrap();
        assert_eq!(inputs, vec!["hello".to_string(), "world".to_string()]);
    }

    #[test]
    fn no_texts_and_no_input_yields_empty() {
        let inputs = resolve_inputs(&bare_args()).unwrap();
        assert!(inputs.is_empty());
    }
}
