//! Plain-text rendering of quotes, offers and catalog listings.

use kredi_core::calculations::{DepositInput, DepositOffer, DepositResult, LoanOffer, LoanQuote};
use kredi_core::format::{format_currency, format_lira, format_percent};
use kredi_core::products::{CardType, CreditCard, ZeroInterestOffer};
use kredi_core::{Catalog, LoanKind};
use serde::Serialize;
use uuid::Uuid;

const RULE: &str = "═══════════════════════════════════════";

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: could not serialize output: {}", e),
    }
}

pub fn print_quote(quote: &LoanQuote, with_schedule: bool) {
    println!("{}", RULE);
    println!("  KREDİ HESAPLAMA SONUCU");
    println!("{}", RULE);
    println!();
    println!("Girdi:");
    println!("  Tutar:      {}", format_lira(quote.principal));
    println!("  Faiz:       {} (aylık)", format_percent(quote.monthly_rate_percent));
    println!("  Vade:       {} ay", quote.term_months);
    println!(
        "  BSMV/KKDF:  {} / {}",
        format_percent(quote.taxes.bsmv * 100.0),
        format_percent(quote.taxes.kkdf * 100.0)
    );
    println!();
    println!("Taksit:");
    println!("  Aylık taksit:            {}", format_lira(quote.monthly_payment));
    println!("  Vergiler dahil taksit:   {}", format_lira(quote.monthly_payment_with_taxes));
    println!();
    println!("Toplam:");
    for (label, value) in quote.cost_breakdown() {
        println!("  {:<24} {}", format!("{}:", label), format_lira(value));
    }
    println!("  {:<24} {}", "Toplam Geri Ödeme:", format_lira(quote.total_payment));
    println!("{}", RULE);

    if with_schedule && !quote.schedule.is_empty() {
        println!();
        print_schedule(quote);
    }
}

fn print_schedule(quote: &LoanQuote) {
    println!("{:>4}  {:>16}  {:>16}  {:>18}", "Ay", "Ana Para", "Faiz", "Kalan Borç");
    for entry in &quote.schedule {
        println!(
            "{:>4}  {:>16}  {:>16}  {:>18}",
            entry.month,
            format_currency(entry.principal),
            format_currency(entry.interest),
            format_currency(entry.remaining_balance)
        );
    }
}

pub fn print_offers(offers: &[LoanOffer]) {
    if offers.is_empty() {
        println!("Kriterlerinize uygun kredi bulunamadı.");
        return;
    }

    for (rank, offer) in offers.iter().enumerate() {
        let quote = &offer.quote;
        println!("{}. {} - {}", rank + 1, offer.bank_name, offer.product_name);
        println!(
            "   {} / {} ay, faiz {}{}",
            format_lira(quote.principal),
            quote.term_months,
            format_percent(quote.monthly_rate_percent),
            if offer.clamped { " (ürün limitine göre)" } else { "" }
        );
        println!(
            "   Aylık taksit: {}   Toplam: {}",
            format_lira(quote.monthly_payment_with_taxes),
            format_lira(quote.total_payment)
        );
        if let Some(url) = &offer.application_url {
            println!("   Başvur: {}", url);
        }
    }
}

pub fn print_deposit(input: &DepositInput, result: &DepositResult) {
    println!("{}", RULE);
    println!("  MEVDUAT GETİRİSİ");
    println!("{}", RULE);
    println!("  Tutar:          {}", format_lira(input.principal));
    println!("  Yıllık faiz:    {}", format_percent(input.annual_rate_percent));
    println!("  Vade:           {} gün", input.term_days);
    println!("  Brüt faiz:      {}", format_lira(result.gross_interest));
    println!(
        "  Stopaj ({}):  {}",
        format_percent(input.withholding_percent),
        format_lira(result.withholding_tax)
    );
    println!("  Net kazanç:     {}", format_lira(result.net_interest));
    println!("  Vade sonu:      {}", format_lira(result.net_total));
    println!("{}", RULE);
}

pub fn print_deposit_offers(offers: &[DepositOffer]) {
    if offers.is_empty() {
        println!("Listelenecek mevduat ürünü yok.");
        return;
    }
    for (rank, offer) in offers.iter().enumerate() {
        println!(
            "{}. {:<24} {:>8}   net {} {}",
            rank + 1,
            offer.bank_name,
            format_percent(offer.annual_rate_percent),
            format_currency(offer.result.net_interest),
            offer.currency
        );
    }
}

pub fn print_catalog(catalog: &Catalog) {
    println!(
        "Katalog (sahibi: {}, güncelleme: {})",
        catalog.meta.owner,
        catalog.meta.modified.format("%Y-%m-%d %H:%M")
    );

    let mut banks: Vec<_> = catalog.banks.iter().collect();
    banks.sort_by(|a, b| a.1.name.cmp(&b.1.name));

    for (bank_id, bank) in banks {
        println!();
        println!("{}  [{}]", bank.name, bank_id);

        for kind in LoanKind::ALL {
            let mut products: Vec<_> = catalog
                .loan_products_of(kind)
                .filter(|(_, p)| p.bank_id == *bank_id)
                .collect();
            products.sort_by(|a, b| a.1.name.cmp(&b.1.name));

            for (id, product) in products {
                println!(
                    "  {:<11} {:<28} {:>8}  [{}]",
                    kind.slug(),
                    product.name,
                    format_percent(product.monthly_rate_percent),
                    id
                );
            }
        }

        for (id, deposit) in catalog.deposit_products.iter().filter(|(_, d)| d.bank_id == *bank_id) {
            println!(
                "  {:<11} TL {} / USD {} / EUR {}  [{}]",
                "deposit",
                format_percent(deposit.rate_try),
                format_percent(deposit.rate_usd),
                format_percent(deposit.rate_eur),
                id
            );
        }

        for (id, card) in catalog.credit_cards.iter().filter(|(_, c)| c.bank_id == *bank_id) {
            println!(
                "  {:<11} {:<28} {:>8}  [{}]",
                "card",
                card.name,
                if card.is_active { "aktif" } else { "pasif" },
                id
            );
        }
    }

    if !catalog.zero_interest_offers.is_empty() {
        println!();
        println!("Faizsiz kampanyalar");
        for (id, offer) in &catalog.zero_interest_offers {
            println!("  {:<24} {}  [{}]", offer.bank_name, offer.offer_description, id);
        }
    }
}

pub fn print_cards(catalog: &Catalog, card_type: CardType, cards: &[(&Uuid, &CreditCard)]) {
    println!("{} - {} kart", card_type, cards.len());
    if cards.is_empty() {
        return;
    }

    for (_, card) in cards {
        let bank = catalog.get_bank(&card.bank_id).map_or("?", |b| b.name.as_str());
        println!();
        println!("{} - {}", bank, card.name);
        match card.annual_fee {
            Some(fee) if fee > 0.0 => println!("   Yıllık aidat: {}", format_lira(fee)),
            _ => println!("   Aidatsız"),
        }
        if let Some(rate) = card.interest_rate {
            println!("   Alışveriş faizi: {}", format_percent(rate));
        }
        for feature in card.primary_features() {
            println!("   * {}", feature.feature);
        }
        if let Some(advantage) = &card.extra_advantage {
            println!("   {}", advantage);
        }
        if let Some(url) = &card.apply_url {
            println!("   Başvur: {}", url);
        }
    }
}

pub fn print_campaigns(offers: &[&ZeroInterestOffer]) {
    if offers.is_empty() {
        println!("Aktif faizsiz kampanya yok.");
        return;
    }
    for offer in offers {
        println!("{}: {}", offer.bank_name, offer.offer_description);
        if let Some(criteria) = &offer.criteria {
            println!("   Kriterler: {}", criteria);
        }
        if let Some(link) = &offer.offer_link {
            println!("   Detay: {}", link);
        }
    }
}
