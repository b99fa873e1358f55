/// A window of document text, addressed by its position in the split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    /// Offset of the first character, counted in chars.
    pub offset: usize,
}

impl Chunk {
    pub fn new(index: usize, text: String, offset: usize) -> Self {
        Self {
            index,
            text,
            offset,
        }
    }
}
