use crate::errors::Error;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// How to display negative values
#[derive(Clone, Copy, Default)]
pub enum Negative {
    #[default]
    MinusSign, // £ -123
    Parenthesis,  // £ (123)
    SeparateSign, // -£ 123
}

impl FromStr for Negative {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minus" => Ok(Negative::MinusSign),
            "parenthesis" => Ok(Negative::Parenthesis),
            "separate" => Ok(Negative::SeparateSign),
            _ => Err(Error::Str(format!(
                "invalid negative style {s:?}, expected minus, parenthesis or separate"
            ))),
        }
    }
}

/// How to display large numbers
#[derive(Clone, Copy)]
pub enum Separators {
    None,              // no special formatting    1234456.789
    Every3Digit(char), // char every 3 digits      1,234,456.789
}
impl Default for Separators {
    fn default() -> Self {
        Separators::Every3Digit(',')
    }
}

/// "none", or the single character to insert between groups of 3 digits
impl FromStr for Separators {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "none" {
            return Ok(Separators::None);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Separators::Every3Digit(c)),
            (None, _) | (Some(_), Some(_)) => Err(Error::Str(format!(
                "invalid separator {s:?}, expected a single character or none"
            ))),
        }
    }
}

/// How to display zero values
#[derive(Clone)]
pub enum Zero {
    Empty,           // display nothing
    Replace(String), // display a specific text instead (e.g. "-")
    Value,           // display as any other value
}

/// "" hides zeros, "value" shows them as numbers, anything else replaces them
impl FromStr for Zero {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "" => Zero::Empty,
            "value" => Zero::Value,
            _ => Zero::Replace(s.to_string()),
        })
    }
}

/// Display money amounts.  All accounts share a single currency.
#[derive(Clone)]
pub struct Formatter {
    pub symbol: Option<String>,
    pub symbol_after: bool,
    pub negative: Negative,
    pub separators: Separators,
    pub comma: char,
    pub zero: Zero,
    pub precision: u32,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            symbol: None,
            symbol_after: false,
            negative: Negative::default(),
            separators: Separators::default(),
            comma: '.',
            zero: Zero::Empty,
            precision: 2,
        }
    }
}

impl Formatter {
    /// Display the absolute value of value
    fn push_abs_num(&self, into: &mut String, value: Decimal) {
        let rounded = value.abs().round_dp_with_strategy(
            self.precision,
            RoundingStrategy::MidpointAwayFromZero,
        );
        let text = rounded.to_string();
        let (int_part, frac_part) =
            text.split_once('.').unwrap_or((text.as_str(), ""));

        match self.separators {
            Separators::None => into.push_str(int_part),
            Separators::Every3Digit(sep) => {
                let len = int_part.len();
                for (idx, p) in int_part.chars().enumerate() {
                    if idx > 0 && (len - idx) % 3 == 0 {
                        into.push(sep);
                    }
                    into.push(p);
                }
            }
        }

        if self.precision > 0 {
            into.push(self.comma);
            into.push_str(frac_part);
            for _ in frac_part.len()..self.precision as usize {
                into.push('0');
            }
        }
    }

    fn push_symbol(&self, into: &mut String, before_space: bool) {
        if let Some(sym) = &self.symbol {
            if !before_space {
                into.push(' ');
            }
            into.push_str(sym);
            if before_space {
                into.push(' ');
            }
        }
    }

    pub fn push_zero(&self, into: &mut String) {
        match &self.zero {
            Zero::Empty => {}
            Zero::Replace(z) => into.push_str(z),
            Zero::Value => self.push_value(into, Decimal::ZERO),
        }
    }

    pub fn push(&self, into: &mut String, value: Decimal) {
        if value.is_zero() {
            self.push_zero(into);
        } else {
            self.push_value(into, value);
        }
    }

    fn push_value(&self, into: &mut String, value: Decimal) {
        let negative = value.is_sign_negative() && !value.is_zero();

        if self.symbol_after {
            if negative {
                match self.negative {
                    Negative::SeparateSign | Negative::MinusSign => {
                        into.push('-');
                        self.push_abs_num(into, value);
                    }
                    Negative::Parenthesis => {
                        into.push('(');
                        self.push_abs_num(into, value);
                        into.push(')');
                    }
                }
            } else {
                self.push_abs_num(into, value);
            }
            self.push_symbol(into, false);
        } else if negative {
            match self.negative {
                Negative::SeparateSign => {
                    into.push('-');
                    self.push_symbol(into, true);
                    self.push_abs_num(into, value);
                }
                Negative::MinusSign => {
                    self.push_symbol(into, true);
                    into.push('-');
                    self.push_abs_num(into, value);
                }
                Negative::Parenthesis => {
                    self.push_symbol(into, true);
                    into.push('(');
                    self.push_abs_num(into, value);
                    into.push(')');
                }
            }
        } else {
            self.push_symbol(into, true);
            self.push_abs_num(into, value);
        }
    }

    #[must_use]
    pub fn display(&self, value: Decimal) -> String {
        let mut buffer = String::new();
        self.push(&mut buffer, value);
        buffer
    }

    /// Display a percentage, with one decimal digit
    #[must_use]
    pub fn display_percent(&self, percent: Option<Decimal>) -> String {
        match percent {
            None => String::new(),
            Some(p) => format!(
                "{:.1}%",
                p.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::errors::Result;
    use crate::formatters::{Formatter, Negative, Separators, Zero};
    use rust_decimal_macros::dec;

    #[test]
    fn test_display() {
        let f = Formatter::default();

        // check no leading ',' is added
        assert_eq!(f.display(dec!(234567)), "234,567.00");
        assert_eq!(f.display(dec!(1234567.238)), "1,234,567.24");
        assert_eq!(f.display(dec!(-1234567.238)), "-1,234,567.24");
        assert_eq!(f.display(dec!(0)), "");

        // Check rounding
        assert_eq!(f.display(dec!(0.234)), "0.23");
        assert_eq!(f.display(dec!(0.235)), "0.24");
        assert_eq!(f.display(dec!(-0.235)), "-0.24");
        assert_eq!(f.display(dec!(1)), "1.00");
        assert_eq!(f.display(dec!(12.5)), "12.50");

        let pound = Formatter {
            symbol: Some("£".into()),
            ..Formatter::default()
        };
        assert_eq!(pound.display(dec!(2087.5)), "£ 2,087.50");
        assert_eq!(pound.display(dec!(-12.5)), "£ -12.50");

        let f = Formatter {
            negative: Negative::Parenthesis,
            ..pound.clone()
        };
        assert_eq!(f.display(dec!(-1234567.238)), "£ (1,234,567.24)");

        let f = Formatter {
            negative: Negative::SeparateSign,
            ..pound.clone()
        };
        assert_eq!(f.display(dec!(-1234567.238)), "-£ 1,234,567.24");

        let f = Formatter {
            comma: ',',
            separators: Separators::Every3Digit(' '),
            symbol: Some("EUR".into()),
            symbol_after: true,
            ..Formatter::default()
        };
        assert_eq!(f.display(dec!(1234567.238)), "1 234 567,24 EUR");
        assert_eq!(f.display(dec!(-1234567.238)), "-1 234 567,24 EUR");

        let f = Formatter {
            separators: Separators::None,
            zero: Zero::Replace("-".into()),
            ..Formatter::default()
        };
        assert_eq!(f.display(dec!(1234567.238)), "1234567.24");
        assert_eq!(f.display(dec!(0)), "-");

        let f = Formatter {
            zero: Zero::Value,
            ..pound
        };
        assert_eq!(f.display(dec!(0.00)), "£ 0.00");
    }

    #[test]
    fn test_parse_options() -> Result<()> {
        let f = Formatter {
            negative: "parenthesis".parse()?,
            separators: "none".parse()?,
            zero: "n/a".parse()?,
            ..Formatter::default()
        };
        assert_eq!(f.display(dec!(-1234.5)), "(1234.50)");
        assert_eq!(f.display(dec!(0)), "n/a");

        let f = Formatter {
            negative: "separate".parse()?,
            separators: "'".parse()?,
            zero: "value".parse()?,
            symbol: Some("CHF".into()),
            ..Formatter::default()
        };
        assert_eq!(f.display(dec!(-1234.5)), "-CHF 1'234.50");
        assert_eq!(f.display(dec!(0)), "CHF 0.00");

        assert!(matches!("".parse::<Zero>()?, Zero::Empty));
        assert!(matches!("minus".parse::<Negative>()?, Negative::MinusSign));
        assert!("brackets".parse::<Negative>().is_err());
        assert!("".parse::<Separators>().is_err());
        assert!("--".parse::<Separators>().is_err());
        Ok(())
    }

    #[test]
    fn test_precision() {
        let f = Formatter {
            precision: 0,
            ..Formatter::default()
        };
        assert_eq!(f.display(dec!(1234.5)), "1,235");
        let f = Formatter {
            precision: 3,
            ..Formatter::default()
        };
        assert_eq!(f.display(dec!(-2.5)), "-2.500");
    }

    #[test]
    fn test_percent() {
        let f = Formatter::default();
        assert_eq!(f.display_percent(Some(dec!(25))), "25.0%");
        assert_eq!(f.display_percent(Some(dec!(33.3333))), "33.3%");
        assert_eq!(f.display_percent(None), "");
    }
}
