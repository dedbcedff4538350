pub mod capture;

pub use capture::RunCapturePipelineUseCase;
