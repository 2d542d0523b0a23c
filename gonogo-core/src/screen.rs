/// Top-level screens of the task application
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    /// Instructions and the entry button.
    #[default]
    Profile,
    /// Start button, then the trial run itself.
    Task,
    /// Summary of the finished run.
    Result,
}

impl Screen {
    /// Forward navigation. The result screen leads back to the profile.
    pub fn next(&self) -> Self {
        use Screen::*;
        match self {
            Profile => Task,
            Task => Result,
            Result => Profile,
        }
    }
}
