/// Everything that can go wrong while turning parameters into rib outlines.
///
/// Per-rib variants carry the rib index so a driver can report every failed
/// rib at once instead of stopping at the first.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RibError {
    #[error("parameter `{name}` is not a finite number ({value})")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("rib {rib}: degenerate profile ({reason})")]
    DegenerateProfile { rib: usize, reason: String },

    #[error("rib {rib}: tabs {first_start}..{first_end} and {second_start}..{second_end} overlap")]
    OverlappingTabSpans {
        rib: usize,
        first_start: f64,
        first_end: f64,
        second_start: f64,
        second_end: f64,
    },

    #[error("tabs requested but no tab span lies inside the rib; tabs disabled")]
    EmptyTabConfiguration,

    #[error("could not parse tab center `{0}`")]
    TabCenterParse(String),
}

impl RibError {
    pub fn degenerate(rib: usize, reason: impl Into<String>) -> Self {
        Self::DegenerateProfile { rib, reason: reason.into() }
    }

    /// The rib this error belongs to, if it is a per-rib failure.
    pub fn rib(&self) -> Option<usize> {
        match self {
            Self::DegenerateProfile { rib, .. } | Self::OverlappingTabSpans { rib, .. } => {
                Some(*rib)
            }
            _ => None,
        }
    }
}
