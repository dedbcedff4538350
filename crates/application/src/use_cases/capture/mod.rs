mod run_pipeline;

pub use run_pipeline::RunCapturePipelineUseCase;
