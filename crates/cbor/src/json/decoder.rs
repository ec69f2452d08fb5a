//! `JsonDecoder`: strict JSON text to [`CborObject`], keeping numbers exact.

use cbor_exact_numbers::EDecimal;
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::{CborError, DecodeReason};
use crate::number::CborNumber;
use crate::object::CborObject;
use crate::options::{JsonOptions, NumberMode};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Integral decimals with at most this many digits become integers.
const INTEGRAL_DIGITS_LIMIT: usize = 20;

pub(crate) struct JsonDecoder<'a, 'o> {
    data: &'a [u8],
    x: usize,
    options: &'o JsonOptions,
    depth: usize,
}

impl<'a, 'o> JsonDecoder<'a, 'o> {
    pub fn new(data: &'a [u8], options: &'o JsonOptions) -> Self {
        Self {
            data,
            x: 0,
            options,
            depth: 0,
        }
    }

    /// One document, optionally preceded by a byte-order mark.
    pub fn decode(&mut self) -> Result<CborObject, CborError> {
        if self.data.starts_with(BOM) {
            self.x = BOM.len();
        }
        let value = self.read_any()?;
        self.skip_whitespace();
        if self.x < self.data.len() {
            return Err(self.invalid("trailing characters after the document"));
        }
        Ok(value)
    }

    fn invalid(&self, message: &'static str) -> CborError {
        CborError::decode(self.x, DecodeReason::Json(message))
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.x).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.x += 1;
        }
    }

    fn read_any(&mut self) -> Result<CborObject, CborError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'"') => Ok(CborObject::text(self.read_str()?)),
            Some(b'[') => self.read_arr(),
            Some(b'{') => self.read_obj(),
            Some(b't') => self.read_literal(b"true", CborObject::boolean(true)),
            Some(b'f') => self.read_literal(b"false", CborObject::boolean(false)),
            Some(b'n') => self.read_literal(b"null", CborObject::null()),
            Some(b'-' | b'0'..=b'9') => self.read_num(),
            Some(_) => Err(self.invalid("unexpected character")),
            None => Err(self.invalid("unexpected end of input")),
        }
    }

    fn read_literal(&mut self, literal: &[u8], value: CborObject) -> Result<CborObject, CborError> {
        if !self.data[self.x..].starts_with(literal) {
            return Err(self.invalid("invalid literal"));
        }
        self.x += literal.len();
        Ok(value)
    }

    fn read_digits(&mut self) -> usize {
        let start = self.x;
        while let Some(b'0'..=b'9') = self.peek() {
            self.x += 1;
        }
        self.x - start
    }

    fn read_num(&mut self) -> Result<CborObject, CborError> {
        let start = self.x;
        let negative = self.peek() == Some(b'-');
        if negative {
            self.x += 1;
        }
        let int_start = self.x;
        match self.read_digits() {
            0 => return Err(self.invalid("expected a digit")),
            n if n > 1 && self.data[int_start] == b'0' => {
                return Err(CborError::decode(int_start, DecodeReason::Json("leading zero")))
            }
            _ => {}
        }
        let int_end = self.x;
        let mut fraction = (self.x, self.x);
        if self.peek() == Some(b'.') {
            self.x += 1;
            let frac_start = self.x;
            if self.read_digits() == 0 {
                return Err(self.invalid("expected a digit after the decimal point"));
            }
            fraction = (frac_start, self.x);
        }
        let mut exponent = None;
        if let Some(b'e' | b'E') = self.peek() {
            self.x += 1;
            let exp_start = self.x;
            if let Some(b'+' | b'-') = self.peek() {
                self.x += 1;
            }
            if self.read_digits() == 0 {
                return Err(self.invalid("expected a digit in the exponent"));
            }
            exponent = Some((exp_start, self.x));
        }
        let token = self.text(start, self.x);

        if self.options.number_mode == NumberMode::Double {
            let value: f64 = token
                .parse()
                .map_err(|_| CborError::decode(start, DecodeReason::Json("invalid number")))?;
            return Ok(CborObject::from_f64(value));
        }

        let plain = fraction.0 == fraction.1 && exponent.is_none();
        let mut digits = String::with_capacity(token.len());
        digits.push_str(self.text(int_start, int_end));
        digits.push_str(self.text(fraction.0, fraction.1));
        let mut mantissa: BigInt = digits
            .parse()
            .map_err(|_| CborError::decode(start, DecodeReason::Json("invalid number")))?;
        if mantissa.is_zero() && negative {
            return Ok(CborObject::from_f64(-0.0));
        }
        if negative {
            mantissa = -mantissa;
        }
        if plain {
            return Ok(CborNumber::from_bigint(mantissa).to_cbor());
        }
        let mut scale = match exponent {
            Some((from, to)) => self.text(from, to).parse::<BigInt>().map_err(|_| {
                CborError::decode(start, DecodeReason::Json("invalid exponent"))
            })?,
            None => BigInt::zero(),
        };
        scale -= fraction.1 - fraction.0;
        Ok(integral(&mantissa, &scale)
            .map(|value| CborNumber::from_bigint(value).to_cbor())
            .unwrap_or_else(|| CborObject::from_edecimal(&EDecimal::create(mantissa, scale))))
    }

    /// ASCII slice of the input; only called on validated number bytes.
    fn text(&self, from: usize, to: usize) -> &'a str {
        std::str::from_utf8(&self.data[from..to]).unwrap_or_default()
    }

    fn read_str(&mut self) -> Result<String, CborError> {
        let start = self.x;
        self.x += 1;
        let body_start = self.x;
        let mut escaped = false;
        loop {
            match self.peek() {
                None => return Err(self.invalid("unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => {
                    escaped = true;
                    self.x += 2;
                }
                Some(0x00..=0x1f) => return Err(self.invalid("control character in string")),
                Some(_) => self.x += 1,
            }
        }
        let body_end = self.x;
        self.x += 1;
        let body = &self.data[body_start..body_end];
        if !escaped {
            return std::str::from_utf8(body)
                .map(str::to_owned)
                .map_err(|_| CborError::decode(start, DecodeReason::InvalidUtf8));
        }
        // serde_json applies the escape and surrogate-pair rules.
        serde_json::from_slice::<String>(&self.data[start..self.x])
            .map_err(|_| CborError::decode(start, DecodeReason::Json("invalid string escape")))
    }

    fn enter(&mut self) -> Result<(), CborError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(CborError::decode(self.x, DecodeReason::NestingTooDeep));
        }
        Ok(())
    }

    fn read_arr(&mut self) -> Result<CborObject, CborError> {
        self.enter()?;
        self.x += 1;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.x += 1;
        } else {
            loop {
                items.push(self.read_any()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(b',') => self.x += 1,
                    Some(b']') => {
                        self.x += 1;
                        break;
                    }
                    _ => return Err(self.invalid("expected ',' or ']'")),
                }
            }
        }
        self.depth -= 1;
        Ok(CborObject::array_from(items))
    }

    fn read_obj(&mut self) -> Result<CborObject, CborError> {
        self.enter()?;
        self.x += 1;
        let mut entries = IndexMap::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.x += 1;
        } else {
            loop {
                self.skip_whitespace();
                let key_offset = self.x;
                if self.peek() != Some(b'"') {
                    return Err(self.invalid("expected a string key"));
                }
                let key = CborObject::text(self.read_str()?);
                self.skip_whitespace();
                if self.peek() != Some(b':') {
                    return Err(self.invalid("expected ':'"));
                }
                self.x += 1;
                let value = self.read_any()?;
                if entries.insert(key, value).is_some() && !self.options.allow_duplicate_keys {
                    return Err(CborError::decode(key_offset, DecodeReason::DuplicateKey));
                }
                self.skip_whitespace();
                match self.peek() {
                    Some(b',') => self.x += 1,
                    Some(b'}') => {
                        self.x += 1;
                        break;
                    }
                    _ => return Err(self.invalid("expected ',' or '}'")),
                }
            }
        }
        self.depth -= 1;
        Ok(CborObject::map_from_index(entries))
    }
}

/// `mantissa × 10^scale` as an integer, when it is one of moderate size.
fn integral(mantissa: &BigInt, scale: &BigInt) -> Option<BigInt> {
    let mut mantissa = mantissa.clone();
    let mut scale = scale.clone();
    let ten = BigInt::from(10);
    while scale < BigInt::zero() {
        if mantissa.is_zero() {
            return Some(mantissa);
        }
        if !(&mantissa % &ten).is_zero() {
            return None;
        }
        mantissa /= &ten;
        scale += 1;
    }
    let scale = usize::try_from(scale).ok()?;
    let digits = mantissa.magnitude().to_string().len();
    if mantissa.is_zero() {
        return Some(mantissa);
    }
    if digits + scale > INTEGRAL_DIGITS_LIMIT {
        return None;
    }
    Some(mantissa * ten.pow(scale as u32))
}
