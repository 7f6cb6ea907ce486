use crate::eval::EvalError;
use crate::types::IntegerType;

impl IntegerType {
    /// Parse a decimal literal the way the type's input function does.
    ///
    /// Surrounding whitespace is ignored and a leading `+` is accepted. Any `-`
    /// in an unsigned literal is a syntax error, not a range error.
    pub fn parse_literal(&self, input: &str) -> Result<i128, EvalError> {
        let syntax_error = || EvalError::InvalidSyntax {
            ty: *self,
            input: input.to_string(),
        };
        let range_error = || EvalError::LiteralOutOfRange {
            ty: *self,
            input: input.to_string(),
        };

        let trimmed = input.trim_matches(|c: char| c.is_ascii_whitespace());
        if trimmed.is_empty() || (!self.is_signed() && trimmed.contains('-')) {
            return Err(syntax_error());
        }

        let (negative, digits) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(syntax_error());
        }

        let magnitude: i128 = digits.parse().map_err(|_| range_error())?;
        let value = if negative { -magnitude } else { magnitude };
        if self.contains(value) {
            Ok(value)
        } else {
            Err(range_error())
        }
    }
}
