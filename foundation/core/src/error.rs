#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{name} must be a JSON array of strings, got {found}")]
    InvalidSequence { name: String, found: &'static str },

    #[error("{name}[{index}] must be a string, got {found}")]
    InvalidElement {
        name: String,
        index: usize,
        found: &'static str,
    },
}
