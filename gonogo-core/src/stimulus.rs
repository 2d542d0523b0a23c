use serde::Serialize;

/// Which action a stimulus asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusKind {
    /// Respond (click) as fast as possible.
    Go,
    /// Withhold any response.
    NoGo,
}

impl StimulusKind {
    pub fn is_go(&self) -> bool {
        matches!(self, StimulusKind::Go)
    }

    /// Whether `responded` is the right reaction to this stimulus.
    pub fn is_correct(&self, responded: bool) -> bool {
        match self {
            StimulusKind::Go => responded,
            StimulusKind::NoGo => !responded,
        }
    }

    /// Display colour as straight RGBA: blue for go, red for nogo.
    pub fn color(&self) -> [u8; 4] {
        match self {
            StimulusKind::Go => [59, 130, 246, 255],
            StimulusKind::NoGo => [239, 68, 68, 255],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StimulusKind::Go => "GO",
            StimulusKind::NoGo => "NOGO",
        }
    }
}

impl std::fmt::Display for StimulusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}
