//! End-to-end checkout through the domain: catalog products into a persisted cart, a promotion
//! decoded from its API record, order assembly and the printed invoice.
//!
//! Cart used throughout:
//!
//! - Lomo Saltado, S/ 45.00
//! - Ceviche, S/ 50.00 x2
//! - Chicha Morada, S/ 6.50

use jiff::{Zoned, civil::date, tz::TimeZone};
use rust_decimal::Decimal;
use testresult::TestResult;

use sanisidro::{
    cart::CartStore,
    discounts::Totals,
    orders::{Customer, InvoiceNumber, build_order},
    payments::{PaymentDetails, PaymentMethod},
    pricing::{soles, zero},
    products::{Product, ProductId},
    promotions::{AppliedPromotion, EligibilityError, Promotion, PromotionRecord},
    receipt::Invoice,
    storage::MemoryStorage,
};

const MENU: &str = r#"[
    {"id": 1, "nombre": "Lomo Saltado", "precio": 45.0, "categoria": "platos", "disponible": true},
    {"id": 2, "nombre": "Ceviche", "precio": 50.0, "categoria": "entradas", "disponible": true},
    {"id": 3, "nombre": "Chicha Morada", "precio": 6.5, "categoria": "bebidas"}
]"#;

fn menu() -> TestResult<Vec<Product>> {
    Ok(serde_json::from_str(MENU)?)
}

fn product(menu: &[Product], id: i64) -> TestResult<&Product> {
    Ok(menu
        .iter()
        .find(|product| product.id == ProductId(id))
        .ok_or("product missing from menu")?)
}

fn promotion(json: &str) -> TestResult<Promotion> {
    let record: PromotionRecord = serde_json::from_str(json)?;

    Ok(Promotion::try_from(record)?)
}

fn now() -> TestResult<Zoned> {
    Ok(date(2026, 10, 18)
        .at(13, 4, 59, 0)
        .to_zoned(TimeZone::fixed(jiff::tz::offset(-5)))?)
}

fn card() -> PaymentDetails {
    PaymentDetails {
        method: PaymentMethod::Card,
        holder_name: "Ana Quispe".to_string(),
        phone: None,
    }
}

fn is_invoice_number(number: &InvoiceNumber) -> bool {
    let (day, time) = number.as_str().split_once('-').unwrap_or_default();

    day.len() == 8
        && time.len() == 6
        && day.chars().all(|c| c.is_ascii_digit())
        && time.chars().all(|c| c.is_ascii_digit())
}

#[test]
fn single_dish_without_promotion() -> TestResult {
    let menu = menu()?;
    let mut store = CartStore::load(MemoryStorage::new());

    store.add_item(product(&menu, 1)?)?;

    let payment = card();
    let order = build_order(
        store.cart(),
        &AppliedPromotion::new(),
        &payment,
        &Customer::resolve(&payment, None),
        &now()?,
    )?;

    assert_eq!(order.subtotal, Decimal::new(4500, 2));
    assert_eq!(order.discount, Decimal::ZERO);
    assert_eq!(order.total, Decimal::new(4500, 2));
    assert!(is_invoice_number(&order.invoice_number));
    assert_eq!(order.invoice_number.as_str(), "20261018-130459");

    Ok(())
}

#[test]
fn product_promotion_discounts_only_matching_lines() -> TestResult {
    let menu = menu()?;
    let mut store = CartStore::load(MemoryStorage::new());

    store.add_item(product(&menu, 2)?)?;
    store.add_item(product(&menu, 2)?)?;
    store.add_item(product(&menu, 3)?)?;

    let ceviche = promotion(
        r#"{
            "id": 8,
            "codigo": "CEVICHE20",
            "titulo": "Ceviche con 20%",
            "descuento": 20,
            "tipoPromocion": "producto",
            "productosAplicables": "2",
            "activa": true,
            "fechaInicio": [2026, 10, 1],
            "fechaFin": "2026-10-31"
        }"#,
    )?;

    let mut applied = AppliedPromotion::new();

    applied.apply(ceviche, store.cart(), date(2026, 10, 18))?;

    let totals = Totals::for_cart(store.cart(), applied.promotion())?;

    assert_eq!(totals.subtotal, soles(10_650));
    assert_eq!(totals.discount, soles(2000));
    assert_eq!(totals.total, soles(8650));

    let payment = card();
    let order = build_order(
        store.cart(),
        &applied,
        &payment,
        &Customer::resolve(&payment, None),
        &now()?,
    )?;
    let invoice = Invoice::from_order(&order)?;

    assert_eq!(invoice.promo_code.as_deref(), Some("CEVICHE20"));
    assert_eq!(invoice.lines.len(), 2);
    assert_eq!(invoice.total, soles(8650));

    let mut printed = Vec::new();

    invoice.write_to(&mut printed)?;

    let printed = String::from_utf8(printed)?;

    assert!(printed.contains("Ceviche"));
    assert!(printed.contains("S/ 86.50"));

    Ok(())
}

#[test]
fn expired_promotion_is_rejected_and_cart_is_unchanged() -> TestResult {
    let menu = menu()?;
    let mut store = CartStore::load(MemoryStorage::new());

    store.add_item(product(&menu, 1)?)?;

    let before = store.cart().clone();
    let mut applied = AppliedPromotion::new();

    let result = applied.apply(
        promotion(
            r#"{"codigo": "SEPTIEMBRE", "descuento": 10, "activa": true, "fechaFin": "2026-09-30"}"#,
        )?,
        store.cart(),
        date(2026, 10, 18),
    );

    assert!(matches!(result, Err(EligibilityError::Expired { .. })));
    assert_eq!(
        applied.error().map(ToString::to_string).as_deref(),
        Some("Esta promoción ha expirado")
    );
    assert_eq!(store.cart(), &before);
    assert_eq!(
        Totals::for_cart(store.cart(), applied.promotion())?.discount,
        zero()
    );

    Ok(())
}

#[test]
fn minimum_amount_is_enforced() -> TestResult {
    let menu = menu()?;
    let mut store = CartStore::load(MemoryStorage::new());

    store.add_item(product(&menu, 2)?)?;
    store.add_item(product(&menu, 2)?)?;

    let mut applied = AppliedPromotion::new();
    let result = applied.apply(
        promotion(r#"{"codigo": "GRANDE", "descuento": 15, "activa": true, "montoMinimo": 150}"#)?,
        store.cart(),
        date(2026, 10, 18),
    );

    assert!(matches!(result, Err(EligibilityError::BelowMinAmount { .. })));
    assert_eq!(
        result.err().map(|error| error.to_string()).as_deref(),
        Some("Monto mínimo requerido: S/ 150.00")
    );

    Ok(())
}

#[test]
fn persisted_cart_reloads_identically() -> TestResult {
    let menu = menu()?;
    let mut store = CartStore::load(MemoryStorage::new());

    store.add_item(product(&menu, 1)?)?;
    store.add_item(product(&menu, 3)?)?;
    store.add_item(product(&menu, 3)?)?;
    store.update_comment(ProductId(1), "término medio")?;

    let reloaded = CartStore::load(store.storage().clone());

    assert_eq!(reloaded.cart(), store.cart());
    assert_eq!(reloaded.cart().item_count(), 3);

    Ok(())
}
