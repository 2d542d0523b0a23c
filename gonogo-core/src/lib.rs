pub mod log;
pub mod screen;
pub mod stimulus;
pub mod summary;
pub mod trial;

pub use log::{LogError, ResultLog};
pub use screen::Screen;
pub use stimulus::StimulusKind;
pub use summary::{summarize, Summary};
pub use trial::{RunState, TrialOutcome, TrialSpec};
