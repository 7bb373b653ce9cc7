pub mod artifact;
pub mod response;
pub mod resume;

pub use artifact::{Artifact, ArtifactKind};
pub use resume::{ProcessingOutcome, RenderedOutput, ResumeUpload};
