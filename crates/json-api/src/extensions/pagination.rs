//! Lenient `page` / `limit` query parsing.

use salvo::oapi::extract::QueryParam;

use orderly_app::domain::pagination::{DEFAULT_LIMIT, PageRequest};

/// Reads a query value the forgiving way: the leading integer of the string,
/// `0` when there is none, `default` when the parameter is absent.
pub(crate) trait LenientQueryExt {
    fn lenient_u32_or(self, default: u32) -> u32;
}

impl LenientQueryExt for QueryParam<String, false> {
    fn lenient_u32_or(self, default: u32) -> u32 {
        self.into_inner()
            .map_or(default, |value| leading_integer(&value))
    }
}

/// Build a [`PageRequest`] from raw `page` and `limit` parameters.
pub(crate) fn page_request(
    page: QueryParam<String, false>,
    limit: QueryParam<String, false>,
) -> PageRequest {
    PageRequest::new(page.lenient_u32_or(1), limit.lenient_u32_or(DEFAULT_LIMIT))
}

fn leading_integer(value: &str) -> u32 {
    let trimmed = value.trim_start();

    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, trimmed.get(1..).unwrap_or_default()),
        Some(b'+') => (false, trimmed.get(1..).unwrap_or_default()),
        _ => (false, trimmed),
    };

    if negative {
        return 0;
    }

    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_u32, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u32::from(digit - b'0'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers_parse() {
        assert_eq!(leading_integer("3"), 3);
        assert_eq!(leading_integer("  25"), 25);
        assert_eq!(leading_integer("+7"), 7);
    }

    #[test]
    fn trailing_garbage_is_ignored() {
        assert_eq!(leading_integer("5abc"), 5);
        assert_eq!(leading_integer("12.9"), 12);
    }

    #[test]
    fn garbage_and_negatives_are_zero() {
        assert_eq!(leading_integer("abc"), 0);
        assert_eq!(leading_integer(""), 0);
        assert_eq!(leading_integer("-4"), 0);
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(leading_integer("99999999999999999999"), u32::MAX);
    }
}
