//! Mode configuration
//!
//! `Config` is built once by the CLI layer from parsed arguments layered
//! over the documented defaults, then passed explicitly into the state
//! machine and emitter. There is no process-global mutable mode state:
//! every function in the file shares the same `Config` value, but it is
//! an ordinary argument, not a singleton.

/// Context-handling code-generation strategy (§4.2, §9 "Dual code generation").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMode {
    /// Context variables are hoisted to function scope; save/restore
    /// happens only on the blocking path.
    Optimized,
    /// Context variables keep their original declaration scope, so the
    /// C compiler flags uses after a scope-crossing wait.
    Checked,
}

impl Default for ContextMode {
    fn default() -> Self {
        ContextMode::Checked
    }
}

/// The three `PDEVT_*` sizing constants, overridable via `-v NAME=INT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroSizes {
    pub scratch_bytes: usize,
    pub merge_size: usize,
    pub list_size: usize,
}

impl Default for MacroSizes {
    fn default() -> Self {
        Self { scratch_bytes: 1024, merge_size: 4, list_size: 4 }
    }
}

/// Name of a `-v` settable macro, used by the CLI layer to validate
/// `-v NAME=INT` and to route the value into `MacroSizes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroName {
    ScratchBytes,
    MergeSize,
    ListSize,
}

impl MacroName {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "PDEVT_SCRATCH_BYTES" => Some(Self::ScratchBytes),
            "PDEVT_MERGE_SIZE" => Some(Self::MergeSize),
            "PDEVT_LIST_SIZE" => Some(Self::ListSize),
            _ => None,
        }
    }
}

impl MacroSizes {
    pub fn set(&mut self, name: MacroName, value: usize) {
        match name {
            MacroName::ScratchBytes => self.scratch_bytes = value,
            MacroName::MergeSize => self.merge_size = value,
            MacroName::ListSize => self.list_size = value,
        }
    }
}

/// Fixed-after-parsing configuration applied globally to every function
/// in the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub context_mode: ContextMode,
    pub trace: bool,
    pub scratch_bytes: usize,
    pub merge_size: usize,
    pub list_size: usize,
}

impl Config {
    pub fn from_sizes(sizes: MacroSizes) -> Self {
        Self {
            context_mode: ContextMode::default(),
            trace: true,
            scratch_bytes: sizes.scratch_bytes,
            merge_size: sizes.merge_size,
            list_size: sizes.list_size,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_sizes(MacroSizes::default())
    }
}
