//! Display title of the running game.

/// Title used when the running game does not report one.
pub const UNKNOWN_TITLE: &str = "Unknown Game";

/// Width of the title field in an executable certificate, in UTF-16 units.
pub const CERT_TITLE_UNITS: usize = 40;

/// Source of the title of the game currently loaded in the VM.
pub trait TitleSource {
    fn current_title(&self) -> Option<String>;
}

/// A fixed title, for hosts that already know it.
#[derive(Debug, Clone, Default)]
pub struct StaticTitle(pub Option<String>);

impl StaticTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(Some(title.into()))
    }
}

impl TitleSource for StaticTitle {
    fn current_title(&self) -> Option<String> {
        self.0.clone()
    }
}

/// The raw title field of the loaded executable's certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertTitle(pub [u16; CERT_TITLE_UNITS]);

impl CertTitle {
    /// Copy a certificate title field; shorter input is NUL-padded.
    pub fn from_units(units: &[u16]) -> Self {
        let mut field = [0; CERT_TITLE_UNITS];
        let len = units.len().min(CERT_TITLE_UNITS);
        field[..len].copy_from_slice(&units[..len]);
        Self(field)
    }
}

impl TitleSource for CertTitle {
    fn current_title(&self) -> Option<String> {
        title_from_cert_utf16(&self.0)
    }
}

impl<F> TitleSource for F
where
    F: Fn() -> Option<String>,
{
    fn current_title(&self) -> Option<String> {
        self()
    }
}

/// The trimmed title from `source`, or `fallback` when missing or blank.
pub fn resolve_title<T: TitleSource + ?Sized>(source: &T, fallback: &str) -> String {
    source
        .current_title()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Decode the fixed-width UTF-16 title field of an executable certificate.
///
/// Stops at the first NUL or after [`CERT_TITLE_UNITS`] units; unpaired
/// surrogates are replaced. Returns `None` for a blank title.
pub fn title_from_cert_utf16(units: &[u16]) -> Option<String> {
    let field = &units[..units.len().min(CERT_TITLE_UNITS)];
    let end = field.iter().position(|&u| u == 0).unwrap_or(field.len());
    let title = String::from_utf16_lossy(&field[..end]);
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}
