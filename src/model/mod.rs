pub mod config;
pub mod construct;
pub mod dataset;
pub mod items;

pub use config::{InnerScheme, ScoringConfig};
pub use construct::{ConstructId, ModelError, StructuralModel};
pub use dataset::{Dataset, DatasetError};
pub use items::{Questionnaire, QuestionnaireError};
