#![deny(rust_2018_idioms)]

pub mod normalize;
pub use normalize::function::normalize;

pub mod pegs;
pub mod table;

/// A number in scientific notation with a single significant digit, like `2e+02` for `150`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scientific {
    /// The only significant digit, carrying the sign of the original number.
    pub mantissa: i8,
    pub exponent: u32,
}

impl std::fmt::Display for Scientific {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}e+{:02}", self.mantissa, self.exponent)
    }
}

/// Round `number` to one significant digit, with ties going to the even digit.
///
/// Rounding is exact on the integer, so magnitudes beyond what an `f64` represents exactly, like
/// `2500000000000000001`, round up where a float conversion would have produced `2e+18`.
/// Negative numbers keep their sign on the mantissa.
pub fn scientific_notation(number: i64) -> Scientific {
    let digits = number.unsigned_abs().to_string();
    let digits = digits.as_bytes();
    let mut mantissa = (digits[0] - b'0') as i8;
    let mut exponent = (digits.len() - 1) as u32;
    if let Some((next, tail)) = digits[1..].split_first() {
        let round_up = match next.cmp(&b'5') {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => {
                tail.iter().any(|b| *b != b'0') || mantissa % 2 == 1
            }
        };
        if round_up {
            mantissa += 1;
            if mantissa == 10 {
                mantissa = 1;
                exponent += 1;
            }
        }
    }
    Scientific {
        mantissa: if number < 0 { -mantissa } else { mantissa },
        exponent,
    }
}
