//! Completion and signature-help catalogue for modeling scripts
//!
//! The catalogue is static: every request returns the same list, and
//! resolving an item is a lookup by label.

/// Kind of a completion entry, as shown by the host's icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionKind {
    Function,
    #[default]
    Text,
}

/// One completion entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: &'static str,
    pub detail: Option<&'static str>,
    pub documentation: &'static str,
    pub kind: CompletionKind,
}

impl CompletionItem {
    const fn new(label: &'static str, documentation: &'static str) -> Self {
        Self {
            label,
            detail: None,
            documentation,
            kind: CompletionKind::Text,
        }
    }
}

/// A parameter in a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub label: &'static str,
    pub documentation: &'static str,
}

/// A callable signature offered after its trigger character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub label: &'static str,
    pub documentation: &'static str,
    pub parameters: Vec<ParameterInfo>,
}

const STANDARD_ITEMS: &[CompletionItem] = &[
    CompletionItem {
        label: "cube",
        detail: Some("@param {object} options Object with options for this cube"),
        documentation: "Create a cube",
        kind: CompletionKind::Function,
    },
    CompletionItem::new("cylinder", "A cylinder"),
    CompletionItem::new(
        "rotate",
        "Rotate the object according to given vector (expects array with vector)",
    ),
    CompletionItem::new("rotateX", "Rotate the object around the X axis (expects number)"),
    CompletionItem::new("rotateY", "Rotate the object around the Y axis (expects number)"),
    CompletionItem::new("rotateZ", "Rotate the object around the Z axis (expects number)"),
    CompletionItem::new("sphere", "Create a sphere"),
    CompletionItem::new(
        "translate",
        "Move the object according to given vector (expects array)",
    ),
];

/// Static completion provider
#[derive(Debug, Clone)]
pub struct CompletionProvider {
    items: Vec<CompletionItem>,
}

impl Default for CompletionProvider {
    fn default() -> Self {
        Self::standard()
    }
}

impl CompletionProvider {
    /// Characters that open signature help
    pub const SIGNATURE_TRIGGERS: &'static [char] = &['('];

    /// The built-in modeling API catalogue
    pub fn standard() -> Self {
        Self {
            items: STANDARD_ITEMS.to_vec(),
        }
    }

    /// Every completion item, independent of cursor position
    pub fn provide(&self) -> &[CompletionItem] {
        &self.items
    }

    /// Full entry for a label picked from the list
    pub fn resolve(&self, label: &str) -> Option<&CompletionItem> {
        self.items.iter().find(|item| item.label == label)
    }

    /// Whether typing `c` should open signature help
    pub fn triggers_signature_help(c: char) -> bool {
        Self::SIGNATURE_TRIGGERS.contains(&c)
    }

    /// Signatures offered after a trigger character
    pub fn signature_help(&self) -> Vec<SignatureInfo> {
        vec![SignatureInfo {
            label: "cube",
            documentation: "Create new cube",
            parameters: vec![
                ParameterInfo {
                    label: "x:string",
                    documentation: "x position",
                },
                ParameterInfo {
                    label: "y:string",
                    documentation: "y position",
                },
                ParameterInfo {
                    label: "z:string",
                    documentation: "z position",
                },
            ],
        }]
    }
}
