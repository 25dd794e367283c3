use crate::global_settings::GlobalSettings;
use clap::{Arg, ArgAction, Command, arg};

pub(crate) fn build_cli() -> Command {
    Command::new("tally")
        .version("0.1")
        .about("Reconcile and categorize bank transactions")
        .subcommand_required(true)
        .subcommand_precedence_over_arg(true) // --x val1 val2 subcommand
        .flatten_help(true) // show help for all subcommands
        .arg_required_else_help(true) // show full help if nothing given
        .args(GlobalSettings::cli())
        .subcommand(Command::new("accounts").about("List accounts and balances"))
        .subcommand(
            Command::new("transactions")
                .about("Show the ledger of an account")
                .arg(arg!(<ACCOUNT> "Name of the account")),
        )
        .subcommand(
            Command::new("history")
                .about("Show the evolution of an account's balance")
                .arg(arg!(<ACCOUNT> "Name of the account")),
        )
        .subcommand(
            Command::new("breakdown")
                .about("Show income and spending per category"),
        )
        .subcommand(
            Command::new("net").about("Show total income, spending and net"),
        )
        .subcommand(
            Command::new("unknowns")
                .about("List descriptions and counterparties with no category"),
        )
        .subcommand(
            Command::new("import")
                .about("Merge transactions downloaded from a bank")
                .arg(
                    arg!(<FILE> ... "JSON file with a list of accounts")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(Command::new("categories").about("Show the category tree"))
        .subcommand(
            Command::new("category")
                .about("Edit the category tree")
                .subcommand_required(true)
                .flatten_help(true)
                .subcommand(
                    Command::new("new")
                        .about("Create a category, e.g. Food--Groceries")
                        .arg(arg!(<NAME> "Full name of the category")),
                )
                .subcommand(
                    Command::new("describe")
                        .about("Match transactions whose description starts with PREFIX")
                        .arg(arg!(<NAME> "Full name of the category"))
                        .arg(arg!(<PREFIX> "Start of the description")),
                )
                .subcommand(
                    Command::new("counterpart")
                        .about("Match transactions with this counterparty")
                        .arg(arg!(<NAME> "Full name of the category"))
                        .arg(arg!(<COUNTERPARTY> "Exact counterparty")),
                )
                .subcommand(
                    Command::new("diff")
                        .about("Net income and spending of the category")
                        .arg(arg!(<NAME> "Full name of the category"))
                        .arg(
                            arg!(--off "Stop netting")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(
            Command::new("override")
                .about("Pin the category of one transaction")
                .arg(arg!(<ACCOUNT> "Name of the account"))
                .arg(
                    arg!(<INDEX> "Index of the transaction, as shown by 'transactions'")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!([CATEGORY] "Full name of the category")
                        .required_unless_present("clear"),
                )
                .arg(
                    arg!(--clear "Remove the pinned category")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            // Use    eval "$(tally completions zsh)"
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .value_name("SHELL")
                        .help("The shell to generate the completions for")
                        .required(true)
                        .value_parser(clap::builder::EnumValueParser::<
                            clap_complete_command::Shell,
                        >::new()),
                ),
        )
}

#[cfg(test)]
mod test {
    use crate::args::build_cli;

    #[test]
    fn test_cli() {
        build_cli().debug_assert();

        let m = build_cli()
            .try_get_matches_from(["tally", "--from", "3m", "override", "current", "4", "Food"])
            .unwrap();
        assert_eq!(m.get_one::<String>("from").map(String::as_str), Some("3m"));
        let (name, sub) = m.subcommand().unwrap();
        assert_eq!(name, "override");
        assert_eq!(sub.get_one::<usize>("INDEX"), Some(&4));

        assert!(build_cli()
            .try_get_matches_from(["tally", "override", "current", "4"])
            .is_err());
        assert!(build_cli()
            .try_get_matches_from(["tally", "override", "current", "4", "--clear"])
            .is_ok());
    }
}
