//! # Kredi CLI
//!
//! Terminal front end for the kredi calculation engine: quote a loan,
//! compute a deposit's return, compare every bank's offer from a catalog
//! file, and maintain that catalog.
//!
//! Run without a subcommand for an interactive quick quote.

mod commands;
mod config;
mod report;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kredi_core::calculations::loan::{calculate, LoanInput};
use kredi_core::products::{CardType, Currency, VehicleCondition};
use kredi_core::{KrediError, LoanKind, TaxRates};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "kredi", version, about = "Kredi ve mevduat hesaplama aracı")]
struct Cli {
    /// Catalog file (defaults to $KREDI_CATALOG or catalog.krd)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Quote a loan from an explicit rate
    Quote {
        /// Amount in TL ("250.000" is fine)
        #[arg(long)]
        amount: String,
        /// Monthly interest rate in percent
        #[arg(long)]
        rate: f64,
        /// Term in months
        #[arg(long)]
        term: String,
        /// Loan kind, selects default BSMV/KKDF
        #[arg(long, default_value = "consumer")]
        kind: LoanKind,
        /// BSMV as a fraction; 0 or missing uses the kind default
        #[arg(long)]
        bsmv: Option<f64>,
        /// KKDF as a fraction; 0 or missing uses the kind default
        #[arg(long)]
        kkdf: Option<f64>,
        /// Print the month-by-month schedule
        #[arg(long)]
        schedule: bool,
        #[arg(long)]
        json: bool,
    },

    /// Return on a time deposit
    Deposit {
        #[arg(long)]
        amount: String,
        /// Annual rate in percent
        #[arg(long)]
        rate: f64,
        /// Term in days
        #[arg(long)]
        days: u32,
        /// Withholding tax in percent
        #[arg(long, default_value_t = kredi_core::calculations::deposit::DEFAULT_WITHHOLDING_PERCENT)]
        withholding: f64,
        #[arg(long)]
        json: bool,
    },

    /// Compare every catalog product of a loan kind
    Compare {
        #[arg(long)]
        kind: LoanKind,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        term: String,
        /// Vehicle loans only: new or used
        #[arg(long)]
        condition: Option<VehicleCondition>,
        #[arg(long)]
        json: bool,
    },

    /// Rank catalog deposit products by rate
    Deposits {
        #[arg(long)]
        amount: String,
        #[arg(long)]
        days: u32,
        #[arg(long, default_value = "TL")]
        currency: Currency,
        #[arg(long)]
        json: bool,
    },

    /// List active credit cards of one type
    Cards {
        /// extra, fee_free, student or commercial
        #[arg(long = "type")]
        card_type: CardType,
        #[arg(long)]
        json: bool,
    },

    /// List zero-interest campaigns
    Campaigns {
        #[arg(long)]
        json: bool,
    },

    /// Maintain the catalog file
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand, Debug)]
enum CatalogAction {
    /// Create an empty catalog file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// List banks and their products
    List {
        #[arg(long)]
        json: bool,
    },
    AddBank {
        #[arg(long)]
        name: String,
        #[arg(long)]
        bsmv: Option<f64>,
        #[arg(long)]
        kkdf: Option<f64>,
        #[arg(long)]
        logo: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    AddLoan {
        /// Bank name as listed in the catalog
        #[arg(long)]
        bank: String,
        #[arg(long)]
        kind: LoanKind,
        #[arg(long)]
        name: String,
        /// Monthly rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        max_amount: Option<f64>,
        #[arg(long)]
        max_term: Option<u32>,
        #[arg(long)]
        condition: Option<VehicleCondition>,
        #[arg(long)]
        url: Option<String>,
    },
    AddDeposit {
        #[arg(long)]
        bank: String,
        #[arg(long = "try")]
        rate_try: f64,
        #[arg(long = "usd", default_value_t = 0.0)]
        rate_usd: f64,
        #[arg(long = "eur", default_value_t = 0.0)]
        rate_eur: f64,
    },
    /// Change a bank's name, tax rates or branding; omitted flags keep their value
    UpdateBank {
        /// Current bank name
        #[arg(long)]
        bank: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bsmv: Option<f64>,
        #[arg(long)]
        kkdf: Option<f64>,
        #[arg(long)]
        logo: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    RemoveBank {
        #[arg(long)]
        bank: String,
    },
    RemoveLoan {
        id: Uuid,
    },
    /// Change a deposit product's rates; omitted flags keep their value
    UpdateDeposit {
        id: Uuid,
        #[arg(long = "try")]
        rate_try: Option<f64>,
        #[arg(long = "usd")]
        rate_usd: Option<f64>,
        #[arg(long = "eur")]
        rate_eur: Option<f64>,
    },
    RemoveDeposit {
        id: Uuid,
    },
    AddCard {
        #[arg(long)]
        bank: String,
        #[arg(long = "type")]
        card_type: CardType,
        #[arg(long)]
        name: String,
        #[arg(long)]
        annual_fee: Option<f64>,
        /// Monthly purchase interest in percent
        #[arg(long)]
        interest_rate: Option<f64>,
        #[arg(long)]
        advantage: Option<String>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// Feature shown on the card tile (repeatable, at most 3)
        #[arg(long)]
        primary: Vec<String>,
        /// Feature shown on the detail view only (repeatable)
        #[arg(long)]
        feature: Vec<String>,
        /// Store the card without listing it
        #[arg(long)]
        inactive: bool,
    },
    RemoveCard {
        id: Uuid,
    },
    /// Add a zero-interest campaign
    AddCampaign {
        /// Bank name; branding is copied when the bank is in the catalog
        #[arg(long)]
        bank: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        criteria: Option<String>,
    },
    RemoveCampaign {
        id: Uuid,
    },
    /// Update site-wide settings
    Settings {
        /// Deposit withholding tax in percent
        #[arg(long)]
        withholding: Option<f64>,
        /// Comma separated term options, e.g. 12,24,36
        #[arg(long, value_delimiter = ',')]
        terms: Option<Vec<u32>>,
    },
}

fn prompt(prompt: &str, default: &str) -> String {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default.to_string();
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() || input.trim().is_empty() {
        return default.to_string();
    }
    input.trim().to_string()
}

/// Prompt-driven quick quote for when no subcommand is given.
fn interactive() -> Result<(), KrediError> {
    println!("Kredi Hesaplama");
    println!("===============");
    println!();

    let kind: LoanKind = prompt("Kredi türü (consumer/housing/vehicle/commercial) [consumer]: ", "consumer").parse()?;
    let (amount, term) = kredi_core::input::parse_request(
        &prompt("Kredi tutarı (TL) [100.000]: ", "100000"),
        &prompt("Vade (ay) [12]: ", "12"),
    )?;
    let rate_raw = prompt("Aylık faiz (%) [2,5]: ", "2.5");
    let rate: f64 = rate_raw
        .replace(',', ".")
        .parse()
        .map_err(|_| KrediError::invalid_input("monthly_rate_percent", rate_raw.as_str(), "Not a number"))?;

    let input = LoanInput {
        principal: amount,
        monthly_rate_percent: rate,
        term_months: term,
        taxes: TaxRates::resolve(None, None, kind),
    };
    input.validate()?;

    println!();
    report::print_quote(&calculate(&input), false);
    Ok(())
}

fn run(cli: Cli) -> Result<(), KrediError> {
    let config = Config::load(cli.catalog);
    debug!(catalog = %config.catalog_path.display(), user = %config.user_id, "configuration loaded");

    match cli.command {
        None => interactive(),
        Some(Command::Quote {
            amount,
            rate,
            term,
            kind,
            bsmv,
            kkdf,
            schedule,
            json,
        }) => commands::quote(&amount, rate, &term, kind, bsmv, kkdf, schedule, json),
        Some(Command::Deposit {
            amount,
            rate,
            days,
            withholding,
            json,
        }) => commands::deposit(&amount, rate, days, withholding, json),
        Some(Command::Compare {
            kind,
            amount,
            term,
            condition,
            json,
        }) => commands::compare(&config, kind, &amount, &term, condition, json),
        Some(Command::Deposits {
            amount,
            days,
            currency,
            json,
        }) => commands::deposits(&config, &amount, days, currency, json),
        Some(Command::Cards { card_type, json }) => commands::cards(&config, card_type, json),
        Some(Command::Campaigns { json }) => commands::campaigns(&config, json),
        Some(Command::Catalog { action }) => commands::catalog(&config, action),
    }
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_quote() {
        let cli = Cli::try_parse_from([
            "kredi", "quote", "--amount", "100.000", "--rate", "2", "--term", "12", "--kind", "konut",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Quote { kind, rate, .. }) => {
                assert_eq!(kind, LoanKind::Housing);
                assert_eq!(rate, 2.0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_compare_with_condition() {
        let cli = Cli::try_parse_from([
            "kredi", "--catalog", "x.krd", "compare", "--kind", "vehicle", "--amount", "500000", "--term", "24",
            "--condition", "used",
        ])
        .unwrap();
        assert_eq!(cli.catalog, Some(PathBuf::from("x.krd")));
        match cli.command {
            Some(Command::Compare { condition, .. }) => assert_eq!(condition, Some(VehicleCondition::Used)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = Cli::try_parse_from(["kredi", "compare", "--kind", "card", "--amount", "1", "--term", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_add_card_features() {
        let cli = Cli::try_parse_from([
            "kredi", "catalog", "add-card", "--bank", "Örnek Bank", "--type", "aidatsiz", "--name", "Kart",
            "--primary", "Aidatsız", "--primary", "Mil", "--feature", "Nakit avans",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Catalog {
                action:
                    CatalogAction::AddCard {
                        card_type,
                        primary,
                        feature,
                        inactive,
                        ..
                    },
            }) => {
                assert_eq!(card_type, CardType::FeeFree);
                assert_eq!(primary, vec!["Aidatsız", "Mil"]);
                assert_eq!(feature, vec!["Nakit avans"]);
                assert!(!inactive);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_update_bank_keeps_omitted_fields_empty() {
        let cli = Cli::try_parse_from(["kredi", "catalog", "update-bank", "--bank", "A Bank", "--kkdf", "0.1"]).unwrap();
        match cli.command {
            Some(Command::Catalog {
                action: CatalogAction::UpdateBank { name, bsmv, kkdf, .. },
            }) => {
                assert_eq!(name, None);
                assert_eq!(bsmv, None);
                assert_eq!(kkdf, Some(0.1));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_settings_terms_list() {
        let cli = Cli::try_parse_from(["kredi", "catalog", "settings", "--terms", "12,24,36"]).unwrap();
        match cli.command {
            Some(Command::Catalog {
                action: CatalogAction::Settings { terms, .. },
            }) => assert_eq!(terms, Some(vec![12, 24, 36])),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
