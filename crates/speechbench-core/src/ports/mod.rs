//! Port traits: the seams between domain logic and adapters.

pub mod artifact_store;
pub mod repository;
pub mod script_repository;
pub mod vendor;

pub use artifact_store::ArtifactStore;
pub use repository::{Repository, TimeWindow};
pub use script_repository::ScriptRepository;
pub use vendor::{
    SttAdapter, SynthesizeConfig, SynthesizeOutput, TranscribeConfig, TranscribeOutput, TtsAdapter,
};
