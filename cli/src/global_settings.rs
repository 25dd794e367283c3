use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Arg, ArgAction, ArgMatches, arg};
use std::path::PathBuf;
use tally_lib::formatters::Formatter;
use tally_lib::snapshots::OverridePolicy;
use tally_lib::times::{DateRange, Instant};

pub struct GlobalSettings {
    // Where the snapshots are stored
    pub data_dir: PathBuf,

    pub range: DateRange,
    pub policy: OverridePolicy,

    // Whether overrides that could not be resolved may be lost on save
    pub drop_unresolved: bool,

    pub table: crate::tables::Settings,

    // How to display numbers
    pub format: Formatter,

    // Reference day for all relative dates ("a year ago").
    pub today: NaiveDate,
}

impl GlobalSettings {
    /// Return the command line switches to configure the global settings
    pub fn cli() -> impl IntoIterator<Item = Arg> {
        [
            arg!(--"data-dir" [DIR] "Where the ledgers and categories are stored")
                .env("TALLY_DIR")
                .global(true),
            arg!(--from [DATE] "Ignore transactions before this date (2024-01-31, 30d, 3m, 1y)")
                .global(true),
            arg!(--to [DATE] "Ignore transactions after this date")
                .global(true),
            arg!(--strict "Fail when a transaction refers to an unknown category")
                .action(ArgAction::SetTrue)
                .global(true),
            arg!(--"drop-unresolved" "Allow saving even if some category overrides could not be loaded, losing them")
                .action(ArgAction::SetTrue)
                .global(true),
            arg!(--currency [SYMBOL] "Currency symbol to display with amounts")
                .global(true),
            arg!(--"symbol-after" "Show the currency symbol after amounts")
                .action(ArgAction::SetTrue)
                .global(true),
            arg!(--negative [STYLE] "How to show negative amounts")
                .value_parser(["minus", "parenthesis", "separate"])
                .global(true),
            arg!(--separator [CHAR] "Thousands separator, or none")
                .global(true),
            arg!(--comma [CHAR] "Decimal separator")
                .value_parser(clap::value_parser!(char))
                .global(true),
            arg!(--zero [TEXT] "Text shown for zero amounts, or \"value\" to show them as numbers")
                .global(true),
            arg!(--precision [DIGITS] "Number of decimal digits")
                .value_parser(clap::value_parser!(u32))
                .global(true),
        ]
    }

    /// Create the settings from the command line arguments.
    pub fn new(args: &ArgMatches) -> Result<Self> {
        let today = Local::now().date_naive();
        let date = |name: &str| -> Result<Option<NaiveDate>> {
            args.get_one::<String>(name)
                .map(|s| Instant::parse(s).and_then(|i| i.to_date(today)))
                .transpose()
                .with_context(|| format!("--{name}"))
        };

        Ok(GlobalSettings {
            data_dir: match args.get_one::<String>("data-dir") {
                Some(dir) => PathBuf::from(dir),
                None => default_data_dir()?,
            },
            range: DateRange::new(date("from")?, date("to")?),
            policy: if args.get_flag("strict") {
                OverridePolicy::Strict
            } else {
                OverridePolicy::Discard
            },
            today,
            drop_unresolved: args.get_flag("drop-unresolved"),
            format: formatter(args)?,
            table: crate::tables::Settings {
                colsep: "│".to_string(),
                indent_size: 2,
            },
        })
    }
}

fn formatter(args: &ArgMatches) -> Result<Formatter> {
    let mut format = Formatter {
        symbol: args.get_one::<String>("currency").cloned(),
        symbol_after: args.get_flag("symbol-after"),
        ..Formatter::default()
    };
    if let Some(n) = args.get_one::<String>("negative") {
        format.negative = n.parse()?;
    }
    if let Some(sep) = args.get_one::<String>("separator") {
        format.separators = sep.parse().context("--separator")?;
    }
    if let Some(comma) = args.get_one::<char>("comma") {
        format.comma = *comma;
    }
    if let Some(zero) = args.get_one::<String>("zero") {
        format.zero = zero.parse()?;
    }
    if let Some(precision) = args.get_one::<u32>("precision") {
        format.precision = *precision;
    }
    Ok(format)
}

fn default_data_dir() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .context("no data directory, use --data-dir or set $TALLY_DIR")?;
    Ok(PathBuf::from(home).join(".tally"))
}

#[cfg(test)]
mod test {
    use crate::args::build_cli;
    use crate::global_settings::GlobalSettings;
    use anyhow::Result;
    use rust_decimal_macros::dec;

    #[test]
    fn test_number_format() -> Result<()> {
        let args = build_cli().try_get_matches_from([
            "tally",
            "--data-dir",
            "/tmp/tally",
            "--currency",
            "EUR",
            "--symbol-after",
            "--negative",
            "parenthesis",
            "--separator",
            " ",
            "--comma",
            ",",
            "--zero",
            "-",
            "--precision",
            "1",
            "net",
        ])?;
        let settings = GlobalSettings::new(&args)?;
        assert_eq!(settings.format.display(dec!(-1234.56)), "(1 234,6) EUR");
        assert_eq!(settings.format.display(dec!(0)), "-");
        assert!(!settings.drop_unresolved);

        let args = build_cli().try_get_matches_from([
            "tally",
            "--data-dir",
            "/tmp/tally",
            "--drop-unresolved",
            "net",
        ])?;
        let settings = GlobalSettings::new(&args)?;
        assert_eq!(settings.format.display(dec!(-1234.56)), "-1,234.56");
        assert!(settings.drop_unresolved);

        let args = build_cli().try_get_matches_from([
            "tally",
            "--data-dir",
            "/tmp/tally",
            "--separator",
            "ab",
            "net",
        ])?;
        assert!(GlobalSettings::new(&args).is_err());
        assert!(
            build_cli()
                .try_get_matches_from(["tally", "--negative", "red", "net"])
                .is_err()
        );
        Ok(())
    }
}
