/// Which artifact to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    Ast,
    Ir,
    /// Run the whole pipeline but print nothing.
    None,
}

/// How to print the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Source-like text.
    Text,
    /// Pretty-printed JSON, keyed by node kind.
    Json,
}

/// Pipeline configuration. Built by the caller; the pipeline never reads the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub emit: Emit,
    pub format: Format,
    /// Overrides the module name taken from the source. The CLI defaults it to the file stem.
    pub module_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emit: Emit::Ir,
            format: Format::Text,
            module_name: None,
        }
    }
}
