//! Fixed-width record layout
//!
//! A [`FieldLayout`] is an ordered list of `(name, width)` pairs. The generic
//! slicer walks a line left to right, cutting one field per entry, so changing
//! field widths only means changing the list.
//!
//! Offsets are counted in characters, not bytes. For the ASCII files the
//! clearing houses produce the two are identical.

/// Name of the transaction id field
pub const FIELD_ID: &str = "id";
/// Name of the originating bank code field
pub const FIELD_ORIGIN: &str = "origin";
/// Name of the destination bank code field
pub const FIELD_DESTINY: &str = "destiny";
/// Name of the amount field (minor units, zero-padded)
pub const FIELD_AMOUNT: &str = "amount";

/// One positional field: its name and width in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub width: usize,
}

impl FieldSpec {
    pub const fn new(name: &'static str, width: usize) -> Self {
        Self { name, width }
    }
}

/// Ordered field layout of a positional record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    fields: Vec<FieldSpec>,
}

impl FieldLayout {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// The clearing file layout
    ///
    /// | Field   | Offset | Width |
    /// |---------|--------|-------|
    /// | id      | 0–36   | 36    |
    /// | origin  | 36–40  | 4     |
    /// | destiny | 40–44  | 4     |
    /// | amount  | 44–54  | 10    |
    pub fn clearing() -> Self {
        Self::new(vec![
            FieldSpec::new(FIELD_ID, 36),
            FieldSpec::new(FIELD_ORIGIN, 4),
            FieldSpec::new(FIELD_DESTINY, 4),
            FieldSpec::new(FIELD_AMOUNT, 10),
        ])
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Minimum number of characters a line needs to hold every field
    pub fn record_len(&self) -> usize {
        self.fields.iter().map(|field| field.width).sum()
    }

    /// Width of the named field, if the layout has it
    pub fn width_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.width)
    }

    /// Cut a line into its fields, trimming surrounding whitespace
    ///
    /// Returns `None` when the line runs out of characters before the last
    /// field is complete. Characters past the end of the layout are ignored.
    pub fn slice<'a>(&self, line: &'a str) -> Option<PositionalFields<'a>> {
        let mut values = Vec::with_capacity(self.fields.len());
        let mut chars = line.char_indices();
        let mut start = 0;

        for field in &self.fields {
            let mut end = start;
            for _ in 0..field.width {
                let (idx, ch) = chars.next()?;
                end = idx + ch.len_utf8();
            }
            values.push((field.name, line[start..end].trim()));
            start = end;
        }

        Some(PositionalFields { values })
    }
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self::clearing()
    }
}

/// Trimmed field values of one line, in layout order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalFields<'a> {
    values: Vec<(&'static str, &'a str)>,
}

impl<'a> PositionalFields<'a> {
    /// Value of the named field
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
