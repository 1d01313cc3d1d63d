//! Subcommand handlers. Each returns a `KrediResult` so `main` can report
//! failures uniformly.

use kredi_core::calculations::comparison::{compare_loans, OfferRequest};
use kredi_core::calculations::deposit::{self as deposit_calc, rank_deposits, DepositInput};
use kredi_core::calculations::loan::{calculate, LoanInput};
use kredi_core::file_io::{load_catalog, save_catalog, FileLock};
use kredi_core::input::{parse_amount, parse_request};
use kredi_core::products::{
    Bank, CardType, CreditCard, Currency, DepositProduct, LoanProduct, VehicleCondition, ZeroInterestOffer,
};
use kredi_core::{Catalog, KrediError, KrediResult, LoanKind, TaxRates};
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::report;
use crate::CatalogAction;

#[allow(clippy::too_many_arguments)]
pub fn quote(
    amount: &str,
    rate: f64,
    term: &str,
    kind: LoanKind,
    bsmv: Option<f64>,
    kkdf: Option<f64>,
    with_schedule: bool,
    json: bool,
) -> KrediResult<()> {
    let (principal, term_months) = parse_request(amount, term)?;
    let input = LoanInput {
        principal,
        monthly_rate_percent: rate,
        term_months,
        taxes: TaxRates::resolve(bsmv, kkdf, kind),
    };
    input.validate()?;

    let quote = calculate(&input);
    if json {
        report::print_json(&quote);
    } else {
        report::print_quote(&quote, with_schedule);
    }
    Ok(())
}

pub fn deposit(amount: &str, rate: f64, days: u32, withholding: f64, json: bool) -> KrediResult<()> {
    let input = DepositInput::new(parse_amount(amount)?, rate, days).with_withholding(withholding);
    input.validate()?;

    let result = deposit_calc::calculate(&input);
    if json {
        report::print_json(&result);
    } else {
        report::print_deposit(&input, &result);
    }
    Ok(())
}

pub fn compare(
    config: &Config,
    kind: LoanKind,
    amount: &str,
    term: &str,
    condition: Option<VehicleCondition>,
    json: bool,
) -> KrediResult<()> {
    let (amount, term_months) = parse_request(amount, term)?;
    let mut request = OfferRequest::new(kind, amount, term_months);
    if let Some(condition) = condition {
        request = request.with_vehicle_condition(condition);
    }

    let catalog = load_catalog(&config.catalog_path)?;
    let offers = compare_loans(&catalog, &request)?;

    if json {
        report::print_json(&offers);
    } else {
        println!("{} - {} teklif", kind.display_name(), offers.len());
        println!();
        report::print_offers(&offers);
    }
    Ok(())
}

pub fn deposits(config: &Config, amount: &str, days: u32, currency: Currency, json: bool) -> KrediResult<()> {
    let catalog = load_catalog(&config.catalog_path)?;
    let offers = rank_deposits(&catalog, parse_amount(amount)?, days, currency)?;

    if json {
        report::print_json(&offers);
    } else {
        report::print_deposit_offers(&offers);
    }
    Ok(())
}

pub fn cards(config: &Config, card_type: CardType, json: bool) -> KrediResult<()> {
    let catalog = load_catalog(&config.catalog_path)?;
    let mut cards: Vec<_> = catalog.active_cards_of(card_type).collect();
    cards.sort_by(|a, b| a.1.name.cmp(&b.1.name));

    if json {
        let cards: Vec<_> = cards.into_iter().map(|(_, card)| card).collect();
        report::print_json(&cards);
    } else {
        report::print_cards(&catalog, card_type, &cards);
    }
    Ok(())
}

pub fn campaigns(config: &Config, json: bool) -> KrediResult<()> {
    let catalog = load_catalog(&config.catalog_path)?;
    let mut offers: Vec<_> = catalog.zero_interest_offers.values().collect();
    offers.sort_by(|a, b| a.bank_name.cmp(&b.bank_name));

    if json {
        report::print_json(&offers);
    } else {
        report::print_campaigns(&offers);
    }
    Ok(())
}

pub(crate) fn catalog(config: &Config, action: CatalogAction) -> KrediResult<()> {
    match action {
        CatalogAction::Init { force } => init_catalog(config, force),
        CatalogAction::List { json } => {
            let catalog = load_catalog(&config.catalog_path)?;
            if json {
                report::print_json(&catalog);
            } else {
                report::print_catalog(&catalog);
            }
            Ok(())
        }
        CatalogAction::AddBank {
            name,
            bsmv,
            kkdf,
            logo,
            color,
        } => edit_catalog(config, |catalog| {
            let mut bank = Bank::new(name).with_branding(logo, color);
            bank.bsmv_rate = bsmv;
            bank.kkdf_rate = kkdf;
            let id = catalog.add_bank(bank)?;
            println!("Banka eklendi: {}", id);
            Ok(())
        }),
        CatalogAction::UpdateBank {
            bank,
            name,
            bsmv,
            kkdf,
            logo,
            color,
        } => edit_catalog(config, |catalog| {
            let bank_id = bank_id_by_name(catalog, &bank)?;
            let mut updated = catalog
                .get_bank(&bank_id)
                .cloned()
                .ok_or_else(|| KrediError::not_found("Bank", bank_id))?
                .with_branding(logo, color);
            if let Some(name) = name {
                updated.name = name;
            }
            if bsmv.is_some() {
                updated.bsmv_rate = bsmv;
            }
            if kkdf.is_some() {
                updated.kkdf_rate = kkdf;
            }
            catalog.update_bank(&bank_id, updated)?;
            println!("Banka güncellendi: {}", bank_id);
            Ok(())
        }),
        CatalogAction::AddLoan {
            bank,
            kind,
            name,
            rate,
            max_amount,
            max_term,
            condition,
            url,
        } => edit_catalog(config, |catalog| {
            let bank_id = bank_id_by_name(catalog, &bank)?;
            let mut product = LoanProduct::new(bank_id, kind, name, rate).with_limits(max_amount, max_term);
            if let Some(condition) = condition {
                product = product.with_vehicle_condition(condition);
            }
            if let Some(url) = url {
                product = product.with_application_url(url);
            }
            let id = catalog.add_loan_product(product)?;
            println!("Kredi ürünü eklendi: {}", id);
            Ok(())
        }),
        CatalogAction::AddDeposit {
            bank,
            rate_try,
            rate_usd,
            rate_eur,
        } => edit_catalog(config, |catalog| {
            let bank_id = bank_id_by_name(catalog, &bank)?;
            let id = catalog.add_deposit_product(DepositProduct::new(bank_id, rate_try, rate_usd, rate_eur))?;
            println!("Mevduat ürünü eklendi: {}", id);
            Ok(())
        }),
        CatalogAction::RemoveBank { bank } => edit_catalog(config, |catalog| {
            let bank_id = bank_id_by_name(catalog, &bank)?;
            let removed = catalog.remove_bank(&bank_id)?;
            println!("Banka silindi: {}", removed.name);
            Ok(())
        }),
        CatalogAction::RemoveLoan { id } => edit_catalog(config, |catalog| {
            let removed = catalog.remove_loan_product(&id)?;
            println!("Kredi ürünü silindi: {}", removed.name);
            Ok(())
        }),
        CatalogAction::UpdateDeposit {
            id,
            rate_try,
            rate_usd,
            rate_eur,
        } => edit_catalog(config, |catalog| {
            let mut updated = catalog
                .deposit_products
                .get(&id)
                .cloned()
                .ok_or_else(|| KrediError::not_found("DepositProduct", id))?;
            updated.rate_try = rate_try.unwrap_or(updated.rate_try);
            updated.rate_usd = rate_usd.unwrap_or(updated.rate_usd);
            updated.rate_eur = rate_eur.unwrap_or(updated.rate_eur);
            catalog.update_deposit_product(&id, updated)?;
            println!("Mevduat ürünü güncellendi: {}", id);
            Ok(())
        }),
        CatalogAction::RemoveDeposit { id } => edit_catalog(config, |catalog| {
            catalog.remove_deposit_product(&id)?;
            println!("Mevduat ürünü silindi: {}", id);
            Ok(())
        }),
        CatalogAction::AddCard {
            bank,
            card_type,
            name,
            annual_fee,
            interest_rate,
            advantage,
            image,
            url,
            primary,
            feature,
            inactive,
        } => edit_catalog(config, |catalog| {
            let bank_id = bank_id_by_name(catalog, &bank)?;
            let mut card = CreditCard::new(bank_id, card_type, name);
            card.annual_fee = annual_fee;
            card.interest_rate = interest_rate;
            card.extra_advantage = advantage;
            card.image_url = image;
            card.apply_url = url;
            card.is_active = !inactive;
            for text in primary {
                card = card.with_feature(text, true);
            }
            for text in feature {
                card = card.with_feature(text, false);
            }
            let id = catalog.add_credit_card(card)?;
            println!("Kredi kartı eklendi: {}", id);
            Ok(())
        }),
        CatalogAction::RemoveCard { id } => edit_catalog(config, |catalog| {
            let removed = catalog.remove_credit_card(&id)?;
            println!("Kredi kartı silindi: {}", removed.name);
            Ok(())
        }),
        CatalogAction::AddCampaign {
            bank,
            description,
            link,
            criteria,
        } => edit_catalog(config, |catalog| {
            let mut offer = match catalog.find_bank_by_name(&bank) {
                Some((_, known)) => ZeroInterestOffer::new(known.name.as_str(), description).with_bank_branding(known),
                None => ZeroInterestOffer::new(bank, description),
            };
            offer.offer_link = link;
            offer.criteria = criteria;
            let id = catalog.add_zero_interest_offer(offer)?;
            println!("Faizsiz kampanya eklendi: {}", id);
            Ok(())
        }),
        CatalogAction::RemoveCampaign { id } => edit_catalog(config, |catalog| {
            let removed = catalog.remove_zero_interest_offer(&id)?;
            println!("Faizsiz kampanya silindi: {}", removed.bank_name);
            Ok(())
        }),
        CatalogAction::Settings { withholding, terms } => edit_catalog(config, |catalog| {
            if let Some(withholding) = withholding {
                // validate the same way deposit quotes do
                DepositInput::new(1.0, 0.0, 1).with_withholding(withholding).validate()?;
                catalog.settings.deposit_withholding_percent = withholding;
            }
            if let Some(terms) = terms {
                if terms.is_empty() || terms.contains(&0) {
                    return Err(KrediError::invalid_input(
                        "term_options",
                        format!("{:?}", terms),
                        "Term options must be positive month counts",
                    ));
                }
                catalog.settings.term_options = terms;
            }
            catalog.touch();
            Ok(())
        }),
    }
}

fn init_catalog(config: &Config, force: bool) -> KrediResult<()> {
    let path = &config.catalog_path;
    if path.exists() && !force {
        return Err(KrediError::file_error(
            "init",
            path.display().to_string(),
            "Catalog already exists (use --force to overwrite)",
        ));
    }

    let _lock = FileLock::acquire(path, config.user_id.as_str())?;
    save_catalog(&Catalog::new(config.user_id.as_str()), path)?;
    info!(path = %path.display(), "catalog initialized");
    println!("Katalog oluşturuldu: {}", path.display());
    Ok(())
}

/// Lock, load, apply `edit`, save. Nothing is written when `edit` fails.
fn edit_catalog<F>(config: &Config, edit: F) -> KrediResult<()>
where
    F: FnOnce(&mut Catalog) -> KrediResult<()>,
{
    let path = &config.catalog_path;
    let _lock = FileLock::acquire(path, config.user_id.as_str())?;

    let mut catalog = load_catalog(path)?;
    edit(&mut catalog)?;
    save_catalog(&catalog, path)
}

fn bank_id_by_name(catalog: &Catalog, name: &str) -> KrediResult<Uuid> {
    catalog
        .find_bank_by_name(name)
        .map(|(id, _)| id)
        .ok_or_else(|| KrediError::not_found("Bank", name))
}
