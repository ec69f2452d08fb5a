//! Decode, encode and JSON options.

/// Limits and policies applied while decoding binary CBOR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting of arrays, maps and tags.
    pub max_depth: usize,
    /// Maximum entries in each shared-value or string-reference table.
    pub max_references: usize,
    /// Accept repeated map keys, keeping the last value.
    pub allow_duplicate_keys: bool,
    /// Resolve shared values (tags 28/29) and string references (tags
    /// 256/25). When off they decode as ordinary tagged items.
    pub resolve_references: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 500,
            max_references: 1 << 20,
            allow_duplicate_keys: false,
            resolve_references: true,
        }
    }
}

impl DecodeOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_references(mut self, max_references: usize) -> Self {
        self.max_references = max_references;
        self
    }

    pub fn with_allow_duplicate_keys(mut self, allow: bool) -> Self {
        self.allow_duplicate_keys = allow;
        self
    }

    pub fn with_resolve_references(mut self, resolve: bool) -> Self {
        self.resolve_references = resolve;
        self
    }
}

/// Width used for floating-point values on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatWidth {
    /// Shortest of half, single and double that holds the value exactly.
    #[default]
    Shortest,
    /// Always eight bytes.
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Sort map entries by their encoded keys (RFC 8949 §4.2.1).
    pub canonical: bool,
    pub float_width: FloatWidth,
}

impl EncodeOptions {
    pub fn with_canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    pub fn with_float_width(mut self, float_width: FloatWidth) -> Self {
        self.float_width = float_width;
        self
    }
}

/// How JSON numbers become CBOR values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberMode {
    /// Integers stay integers and everything else becomes an exact decimal
    /// fraction.
    #[default]
    Exact,
    /// Non-integer literals round to the nearest double.
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonOptions {
    pub number_mode: NumberMode,
    pub max_depth: usize,
    pub allow_duplicate_keys: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            number_mode: NumberMode::Exact,
            max_depth: 500,
            allow_duplicate_keys: false,
        }
    }
}

impl JsonOptions {
    pub fn with_number_mode(mut self, number_mode: NumberMode) -> Self {
        self.number_mode = number_mode;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_allow_duplicate_keys(mut self, allow: bool) -> Self {
        self.allow_duplicate_keys = allow;
        self
    }
}
