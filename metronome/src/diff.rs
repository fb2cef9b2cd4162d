//! # Diff Module - Positional Comparison of Input and Source Text
//!
//! The diff engine compares the whole input against the source text, position by
//! position, every time the input changes. It keeps no state between calls, so
//! edits in the middle of the input (or any other rewrite of it) are handled the
//! same way as appending a character.
//!
//! Data layout example, source `"hello"` and input `"hex"`:
//! ```text
//! Source:         [h][e][l][l][o]
//! Input:          [h][e][x]
//! Classification: [C][C][I][U][U]
//! Cursor:                  ^ (index 3)
//! ```
//!
//! Input typed past the end of the source has no classification slot. It is
//! reported separately through [`Classification::overflow`].

/// Classification of a single source position
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// Not reached by the input yet
    #[default]
    Untyped,
    /// The input holds the same character at this position
    Correct,
    /// The input holds a different character at this position
    Incorrect,
}

/// The result of one classification pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    classes: Vec<CharClass>,
    cursor: usize,
    typed: usize,
    correct: usize,
    incorrect: usize,
}

impl Classification {
    /// A classification where every position of a text of `len` characters is untyped
    pub fn untyped(len: usize) -> Self {
        Self {
            classes: vec![CharClass::Untyped; len],
            ..Self::default()
        }
    }

    /// Classify every position of `source` against `input`
    ///
    /// # Performance
    ///
    /// - Time complexity: O(n) where n is the length of `source`
    /// - Space complexity: O(n) for the classification
    pub fn compute(source: &[char], input: &[char]) -> Self {
        let mut correct = 0;
        let mut incorrect = 0;

        let classes = source
            .iter()
            .enumerate()
            .map(|(index, expected)| match input.get(index) {
                None => CharClass::Untyped,
                Some(typed) if typed == expected => {
                    correct += 1;
                    CharClass::Correct
                }
                Some(_) => {
                    incorrect += 1;
                    CharClass::Incorrect
                }
            })
            .collect();

        Self {
            classes,
            cursor: input.len().min(source.len()),
            typed: input.len(),
            correct,
            incorrect,
        }
    }

    /// Per-position classes, one for each source character
    pub fn classes(&self) -> &[CharClass] {
        &self.classes
    }

    /// Class of the source character at `index`
    pub fn get(&self, index: usize) -> Option<CharClass> {
        self.classes.get(index).copied()
    }

    /// Index of the next character to type, clamped to the source length
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// The position carrying the cursor marker, if the input hasn't reached the end
    pub fn cursor_marker(&self) -> Option<usize> {
        (self.cursor < self.classes.len()).then_some(self.cursor)
    }

    /// Length of the input this classification was computed from
    pub const fn typed(&self) -> usize {
        self.typed
    }

    pub const fn correct(&self) -> usize {
        self.correct
    }

    pub const fn incorrect(&self) -> usize {
        self.incorrect
    }

    /// Source positions the input hasn't reached
    pub fn untyped_count(&self) -> usize {
        self.classes.len() - self.correct - self.incorrect
    }

    /// Input characters past the end of the source
    pub const fn overflow(&self) -> usize {
        self.typed - self.correct - self.incorrect
    }

    /// Returns true if every source position is correct
    pub fn is_complete(&self) -> bool {
        !self.classes.is_empty() && self.correct == self.classes.len()
    }

    /// Length of the source text
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
