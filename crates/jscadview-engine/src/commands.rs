//! Palette commands contributed to the host

/// Commands the user can run from the host's command palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Open the preview panel, or reveal it if already open
    OpenPreview,

    /// Export the active document as STL with the external tool
    ExportAsStl,

    /// Insert a polygon read from an SVG file at the cursor
    ImportPathFromSvg,
}

impl Command {
    /// Every command, in palette order
    pub const ALL: [Command; 3] = [Self::OpenPreview, Self::ExportAsStl, Self::ImportPathFromSvg];

    /// Host-side command identifier
    pub fn id(&self) -> &'static str {
        match self {
            Self::OpenPreview => "jscadEditor.openPreview",
            Self::ExportAsStl => "jscadEditor.exportAsSTL",
            Self::ImportPathFromSvg => "jscadEditor.importPathFromSVG",
        }
    }

    /// Human-readable palette label
    pub fn title(&self) -> &'static str {
        match self {
            Self::OpenPreview => "JSCAD: Open Preview",
            Self::ExportAsStl => "JSCAD: Export as STL",
            Self::ImportPathFromSvg => "JSCAD: Import Path from SVG",
        }
    }

    /// Parse a command from its identifier
    ///
    /// The `jscadEditor.` prefix is optional and matching is
    /// case-insensitive, so `openPreview` and `jscadeditor.openpreview` both
    /// work.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        let name = lower.strip_prefix("jscadeditor.").unwrap_or(&lower);
        match name {
            "openpreview" => Some(Self::OpenPreview),
            "exportasstl" => Some(Self::ExportAsStl),
            "importpathfromsvg" => Some(Self::ImportPathFromSvg),
            _ => None,
        }
    }

    /// All command identifiers
    pub fn all_ids() -> Vec<&'static str> {
        Self::ALL.iter().map(Command::id).collect()
    }
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("Unknown command '{}'. Valid commands: {}", s, Self::all_ids().join(", "))
        })
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
