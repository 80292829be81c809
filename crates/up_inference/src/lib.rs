pub mod models;
pub mod prompt;
pub mod queue;
pub mod response;

pub use models::create_model;
pub use prompt::build_enhancement_prompt;
pub use queue::{Generation, ModelQueue};
pub use response::ModelResponse;

pub mod prelude {
    pub use super::models::{create_model, DummyModel, GeminiModel};
    pub use super::{Generation, ModelQueue, ModelResponse};
    pub use up_core::{Error, Result, TextModel};
}
