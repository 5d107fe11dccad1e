use super::error::FormatError;
use super::layout;

/// Bounds-checked access to one data-item instance.
pub struct ItemReader<'a> {
    data: &'a [u8],
}

impl<'a> ItemReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), FormatError> {
        if self.data.len() < needed {
            return Err(FormatError::TooShort {
                needed,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, FormatError> {
        self.data.get(offset).copied().ok_or(FormatError::TooShort {
            needed: offset + 1,
            actual: self.data.len(),
        })
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], FormatError> {
        self.data.get(range.clone()).ok_or(FormatError::TooShort {
            needed: range.end,
            actual: self.data.len(),
        })
    }

    pub fn read_repetition_count(&self) -> Result<u8, FormatError> {
        self.read_u8(layout::REPETITION_COUNT_OFFSET)
    }

    /// Slice of the `index`-th fixed-size element following the count byte.
    pub fn element(&self, index: usize, element_len: usize) -> Result<&'a [u8], FormatError> {
        let start = layout::ELEMENTS_OFFSET + index * element_len;
        self.read_slice(start..start + element_len)
    }
}

#[cfg(test)]
mod tests {
    use super::ItemReader;

    #[test]
    fn read_u8_out_of_bounds() {
        let reader = ItemReader::new(&[0x01]);
        let err = reader.read_u8(1).unwrap_err();
        assert!(err.to_string().contains("need 2 bytes, got 1"));
    }

    #[test]
    fn elements_follow_count_byte() {
        let data = [0x02, 0x01, 0x02, 0x03, 0x04];
        let reader = ItemReader::new(&data);
        assert_eq!(reader.read_repetition_count().unwrap(), 2);
        assert_eq!(reader.element(0, 2).unwrap(), &[0x01, 0x02]);
        assert_eq!(reader.element(1, 2).unwrap(), &[0x03, 0x04]);
    }

    #[test]
    fn element_past_buffer_end_fails() {
        let data = [0x03, 0x01, 0x02, 0x03, 0x04];
        let reader = ItemReader::new(&data);
        let err = reader.element(2, 2).unwrap_err();
        assert!(err.to_string().contains("need 7 bytes, got 5"));
    }
}
