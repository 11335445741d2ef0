
use std::io;

use common::constants::{MAX_IMAGE_BYTES, MEM_WORDS, WORD_SIZE};
use common::mem::words_from_be_bytes;
use common::misc::IsEven;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("image is empty")]
    Empty,

    #[error("image is {len} byte(s), too short to hold an origin")]
    MissingOrigin { len: usize },

    #[error("image is {len} bytes, more than the {} allowed", MAX_IMAGE_BYTES)]
    TooLarge { len: usize },

    #[error("image body is {len} bytes, not a whole number of words")]
    OddLength { len: usize },

    #[error("{words} words at origin {origin:#06x} run past the end of memory")]
    Overflow { origin: u16, words: usize },

    #[error("can't read image: {0}")]
    Io(#[from] io::Error),
}

// A parsed image: a big-endian origin word, then big-endian words to place
// contiguously from there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub origin: u16,
    pub words: Vec<u16>,
}

impl Image {
    pub fn parse(input: &[u8]) -> Result<Image, LoadError> {
        let len = input.len();
        if len == 0 {
            return Err(LoadError::Empty);
        }
        if len > MAX_IMAGE_BYTES {
            return Err(LoadError::TooLarge{len});
        }
        if len < WORD_SIZE as usize {
            return Err(LoadError::MissingOrigin{len});
        }

        let (header, body) = input.split_at(WORD_SIZE as usize);
        if !body.len().is_even() {
            return Err(LoadError::OddLength{len: body.len()});
        }

        let origin = u16::from_be_bytes([header[0], header[1]]);
        let words = words_from_be_bytes(body);
        if origin as usize + words.len() > MEM_WORDS {
            return Err(LoadError::Overflow{origin, words: words.len()});
        }

        Ok(Image{origin, words})
    }
}
