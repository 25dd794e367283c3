mod args;
mod breakdown_view;
mod categories_view;
mod global_settings;
mod ledger_view;
mod tables;

use crate::args::build_cli;
use crate::breakdown_view::{breakdown_view, net_view, unknowns_view};
use crate::categories_view::categories_view;
use crate::global_settings::GlobalSettings;
use crate::ledger_view::{accounts_view, history_view, transactions_view};
use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use console::Term;
use log::warn;
use std::path::PathBuf;
use tally_lib::importers::{BatchFileImporter, Importer};
use tally_lib::sessions::Session;

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    )
    .init();

    let args = build_cli().get_matches();

    if let Some(("completions", sub)) = args.subcommand() {
        if let Some(shell) =
            sub.get_one::<clap_complete_command::Shell>("shell")
        {
            shell.generate(&mut build_cli(), &mut std::io::stdout());
        }
        return Ok(());
    }

    let settings = GlobalSettings::new(&args)?;
    let mut session = Session::load(&settings.data_dir, settings.policy)
        .with_context(|| format!("loading {}", settings.data_dir.display()))?;
    let dropped = session.unresolved_overrides().len();
    if dropped > 0 && settings.drop_unresolved {
        warn!("{dropped} category overrides refer to unknown categories and will be lost");
        session.forget_unresolved_overrides();
    } else if dropped > 0 {
        warn!(
            "{dropped} category overrides refer to unknown categories, \
             changes cannot be saved without --drop-unresolved"
        );
    }

    let width = Term::stdout().size().1 as usize;
    let modified = match args.subcommand() {
        Some(("accounts", _)) => {
            print!("{}", accounts_view(&session, &settings, width)?);
            false
        }
        Some(("transactions", sub)) => {
            let acc = find_account(&session, sub)?;
            print!(
                "{}",
                transactions_view(acc, &session.categories, &settings, width)?
            );
            false
        }
        Some(("history", sub)) => {
            let acc = find_account(&session, sub)?;
            print!("{}", history_view(acc, &settings, width)?);
            false
        }
        Some(("breakdown", _)) => {
            let b = session.breakdown(&settings.range)?;
            print!(
                "{}",
                breakdown_view(&b, &session.categories, &settings, width)
            );
            false
        }
        Some(("net", _)) => {
            print!("{}", net_view(&session.totals(&settings.range)?, &settings));
            false
        }
        Some(("unknowns", _)) => {
            print!("{}", unknowns_view(&session.unknowns(&settings.range)?));
            false
        }
        Some(("categories", _)) => {
            print!("{}", categories_view(&session.categories, &settings, width));
            false
        }
        Some(("import", sub)) => {
            let mut importers: Vec<Box<dyn Importer>> = sub
                .get_many::<String>("FILE")
                .into_iter()
                .flatten()
                .map(|f| {
                    Box::new(BatchFileImporter::new(&PathBuf::from(f)))
                        as Box<dyn Importer>
                })
                .collect();
            let added = session.update(&mut importers, &settings.range)?;
            println!("{added} new transactions");
            added > 0
        }
        Some(("category", sub)) => {
            edit_category(&mut session, sub)?;
            true
        }
        Some(("override", sub)) => {
            override_category(&mut session, sub)?;
            true
        }
        Some((cmd, _)) => bail!("unsupported command {cmd}"),
        None => false,
    };

    if modified {
        session
            .save(&settings.data_dir)
            .with_context(|| format!("saving {}", settings.data_dir.display()))?;
    }
    Ok(())
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a String> {
    args.get_one::<String>(name)
        .with_context(|| format!("missing {name}"))
}

fn find_account<'a>(
    session: &'a Session,
    args: &ArgMatches,
) -> Result<&'a tally_lib::accounts::Account> {
    let name = required(args, "ACCOUNT")?;
    session
        .get_account(name)
        .with_context(|| format!("no account named {name:?}"))
}

fn edit_category(session: &mut Session, args: &ArgMatches) -> Result<()> {
    let Some((cmd, sub)) = args.subcommand() else {
        bail!("missing category command");
    };
    let name = required(sub, "NAME")?;
    if cmd == "new" {
        session.create_category(name)?;
        return Ok(());
    }

    let id = session.categories.expect_category(name)?;
    let Some(cat) = session.categories.get_mut(id) else {
        bail!("no category {name:?}");
    };
    match cmd {
        "describe" => cat.add_description(required(sub, "PREFIX")?),
        "counterpart" => cat.add_counterpart(required(sub, "COUNTERPARTY")?),
        "diff" => cat.diff = !sub.get_flag("off"),
        _ => bail!("unsupported command category {cmd}"),
    }
    Ok(())
}

fn override_category(session: &mut Session, args: &ArgMatches) -> Result<()> {
    let category = if args.get_flag("clear") {
        None
    } else {
        Some(session.categories.expect_category(required(args, "CATEGORY")?)?)
    };
    let name = required(args, "ACCOUNT")?;
    let index = *args
        .get_one::<usize>("INDEX")
        .context("missing INDEX")?;
    let acc = session
        .get_account_mut(name)
        .with_context(|| format!("no account named {name:?}"))?;
    let Some(tx) = acc.iter_transactions_mut().nth(index) else {
        bail!("{name} has no transaction #{index}");
    };
    match category {
        Some(id) => tx.set_category_override(id),
        None => tx.clear_category_override(),
    }
    Ok(())
}
