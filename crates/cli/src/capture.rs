use ferrous_capture_application::ports::{CaptureSource, RecordEncoder};
use ferrous_capture_application::use_cases::RunCapturePipelineUseCase;
use ferrous_capture_domain::{CaptureStats, Config, DomainError};
use ferrous_capture_infrastructure::capture::{PacketFilter, PcapFileSource};
use ferrous_capture_infrastructure::dns::HickoryDnsParser;
use ferrous_capture_infrastructure::output::build_encoder;
use ferrous_capture_infrastructure::wire::WireDecoder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info};

#[cfg(feature = "live")]
use ferrous_capture_infrastructure::capture::LiveCaptureSource;

pub enum Input {
    Files(Vec<String>),
    #[cfg(feature = "live")]
    Interface(String),
}

impl Input {
    fn is_live(&self) -> bool {
        match self {
            Input::Files(_) => false,
            #[cfg(feature = "live")]
            Input::Interface(_) => true,
        }
    }
}

/// Counters of a finished run and how it ended.
pub struct CaptureOutcome {
    pub stats: CaptureStats,
    pub result: Result<(), DomainError>,
}

/// Runs the capture pipeline on a blocking thread until every input is
/// exhausted. Live captures stop on Ctrl-C.
///
/// Failures before the first packet (bad filter, missing file) are returned
/// as `Err`; failures after it come back in the outcome along with the
/// counters gathered so far.
pub async fn run(config: Config, input: Input) -> anyhow::Result<CaptureOutcome> {
    let format = config.output_format()?;
    let encoder = build_encoder(format, &config, &Handle::current())?;

    let stop = Arc::new(AtomicBool::new(false));
    if input.is_live() {
        watch_interrupt(stop.clone());
    }

    let outcome =
        tokio::task::spawn_blocking(move || run_pipeline(&config, input, encoder, stop)).await??;
    Ok(outcome)
}

fn run_pipeline(
    config: &Config,
    input: Input,
    encoder: Box<dyn RecordEncoder>,
    stop: Arc<AtomicBool>,
) -> Result<CaptureOutcome, DomainError> {
    let mut sources = open_sources(config, input, stop)?;

    let mut pipeline = RunCapturePipelineUseCase::new(
        Arc::new(WireDecoder::new()),
        HickoryDnsParser::new(),
        encoder,
        config,
    );

    let processed = pipeline.start().and_then(|()| {
        sources
            .iter_mut()
            .try_for_each(|source| pipeline.process_source(source.as_mut()))
    });

    let outcome = match processed {
        Ok(()) => {
            let stats = *pipeline.stats();
            CaptureOutcome {
                stats,
                result: pipeline.finish().map(|_| ()),
            }
        }
        Err(e) => {
            error!(error = %e, "Capture pipeline failed");
            CaptureOutcome {
                stats: pipeline.abort(),
                result: Err(e),
            }
        }
    };
    Ok(outcome)
}

fn watch_interrupt(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping capture");
                stop.store(true, Ordering::Relaxed);
            }
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}

/// Opens every input up front so that a missing file aborts the run before
/// any record is written.
fn open_sources(
    config: &Config,
    input: Input,
    #[cfg_attr(not(feature = "live"), allow(unused_variables))] stop: Arc<AtomicBool>,
) -> Result<Vec<Box<dyn CaptureSource>>, DomainError> {
    match input {
        Input::Files(files) => {
            let filter = config
                .capture
                .bpf_filter
                .as_deref()
                .map(PacketFilter::compile)
                .transpose()?;

            files
                .iter()
                .map(|path| {
                    PcapFileSource::open(path, filter.clone())
                        .map(|source| Box::new(source) as Box<dyn CaptureSource>)
                })
                .collect()
        }
        #[cfg(feature = "live")]
        Input::Interface(interface) => {
            let source = LiveCaptureSource::open(&interface, &config.capture, stop)?;
            Ok(vec![Box::new(source) as Box<dyn CaptureSource>])
        }
    }
}
