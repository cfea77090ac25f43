//! Core pricing calculation functions.
//!
//! Pure functions for quote math - no database access. Handlers resolve a
//! catalog snapshot and pass it in; the engine never touches live state.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

use crate::models::{CatalogSnapshot, Service, ServiceKind};

use super::models::{CarSize, QuoteTotals, Selection};

/// Fixed multiplicative surcharge for XL vehicles (0.30)
pub const XL_MARKUP: Decimal = Decimal::from_parts(30, 0, 0, false, 2);

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Compute quote totals for a selection against a catalog snapshot.
///
/// Deterministic and total: unresolved ids contribute 0, out-of-range
/// numeric inputs degrade to 0, and the function never errors. All service
/// terms are additive, so iteration order does not matter.
///
/// Steps:
/// 1. Sum per-service contributions (variant price > hourly rate x hours > flat price).
/// 2. Add package snapshot prices (stored price, never recomputed).
/// 3. Apply the XL surcharge to the pre-discount subtotal.
/// 4. Subtract the percentage discount, clamped to [0, 100].
/// 5. Add extra charges (never discounted; negative amounts contribute 0).
pub fn compute_totals(selection: &Selection, catalog: &CatalogSnapshot) -> QuoteTotals {
    let unique_ids: HashSet<Uuid> = selection.service_ids.iter().copied().collect();

    let services_sum: Decimal = unique_ids
        .iter()
        .filter_map(|id| catalog.service(*id))
        .map(|service| service_contribution(service, selection))
        .sum();

    let packages_sum: Decimal = selection
        .packages
        .values()
        .map(|snapshot| snapshot.price.max(Decimal::ZERO))
        .sum();

    let mut subtotal = services_sum + packages_sum;
    if selection.car_size == CarSize::Xl {
        subtotal *= Decimal::ONE + XL_MARKUP;
    }

    let discount_amount = subtotal * clamp_discount(selection.discount_pct) / Decimal::ONE_HUNDRED;

    let extras_total: Decimal = selection
        .extra_charges
        .iter()
        .map(|charge| charge.amount.max(Decimal::ZERO))
        .sum();

    QuoteTotals {
        subtotal,
        discount_amount,
        extras_total,
        final_total: subtotal - discount_amount + extras_total,
    }
}

/// Contribution of a single selected service.
///
/// A variant-bearing service counts only when a variant is chosen and
/// resolves; its parent record carries no price of its own. Hourly services
/// default to 1 hour when no entry exists.
pub(crate) fn service_contribution(service: &Service, selection: &Selection) -> Decimal {
    match &service.kind {
        ServiceKind::Variants { .. } => selection
            .variants
            .get(&service.id)
            .and_then(|variant_id| service.variant(*variant_id))
            .map(|variant| variant.price)
            .unwrap_or(Decimal::ZERO),
        ServiceKind::Hourly { rate_per_hour } => {
            let hours = selection
                .hours
                .get(&service.id)
                .copied()
                .unwrap_or(Decimal::ONE)
                .max(Decimal::ZERO);
            *rate_per_hour * hours
        }
        ServiceKind::Flat { price } => *price,
    }
}

/// Clamp a discount percentage to [0, 100]
fn clamp_discount(pct: Decimal) -> Decimal {
    pct.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED)
}

/// Advertised discount of a package: round((1 - price / services_sum) * 100).
///
/// Returns 0 when the member services sum to nothing (nothing meaningful to
/// advertise) or when the bundle costs more than its parts.
pub fn package_discount_pct(price: Decimal, services_sum: Decimal) -> Decimal {
    if services_sum <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let pct = (Decimal::ONE - price / services_sum) * Decimal::ONE_HUNDRED;
    pct.max(Decimal::ZERO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MainCategory, ServiceVariant};
    use crate::pricing::models::{ExtraCharge, PackageSnapshot};
    use rust_decimal_macros::dec;

    fn flat(id: Uuid, price: Decimal) -> Service {
        Service {
            id,
            name: "Hand wash".to_string(),
            main_category: MainCategory::Exterior,
            subcategory: None,
            kind: ServiceKind::Flat { price },
        }
    }

    fn hourly(id: Uuid, rate: Decimal) -> Service {
        Service {
            id,
            name: "Polishing".to_string(),
            main_category: MainCategory::Exterior,
            subcategory: None,
            kind: ServiceKind::Hourly { rate_per_hour: rate },
        }
    }

    fn with_variants(id: Uuid, options: Vec<(Uuid, Decimal)>) -> Service {
        Service {
            id,
            name: "Ceramic coating".to_string(),
            main_category: MainCategory::Exterior,
            subcategory: None,
            kind: ServiceKind::Variants {
                options: options
                    .into_iter()
                    .enumerate()
                    .map(|(i, (vid, price))| ServiceVariant {
                        id: vid,
                        name: format!("Option {}", i + 1),
                        price,
                    })
                    .collect(),
            },
        }
    }

    fn snapshot(services: Vec<Service>) -> CatalogSnapshot {
        CatalogSnapshot::new(services, vec![])
    }

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
    }

    // ==================== compute_totals tests ====================

    #[test]
    fn test_empty_selection_is_zero_regardless_of_discount() {
        let selection = Selection {
            discount_pct: dec!(40),
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![]));

        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.discount_amount, Decimal::ZERO);
        assert_eq!(totals.final_total, Decimal::ZERO);
    }

    #[test]
    fn test_discount_is_exact_fraction_of_subtotal() {
        // subtotal 1000, discount 15 -> discount amount 150
        let id = Uuid::new_v4();
        let selection = Selection {
            service_ids: vec![id],
            discount_pct: dec!(15),
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![flat(id, dec!(1000))]));

        assert_eq!(totals.subtotal, dec!(1000));
        assert_eq!(totals.discount_amount, dec!(150));
        assert_eq!(totals.final_total, dec!(850));
    }

    #[test]
    fn test_xl_multiplies_pre_discount_subtotal() {
        // one non-hourly service priced 1000, XL -> subtotal 1300
        let id = Uuid::new_v4();
        let selection = Selection {
            service_ids: vec![id],
            car_size: CarSize::Xl,
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![flat(id, dec!(1000))]));

        assert_eq!(totals.subtotal, dec!(1300.00));
        assert_eq!(totals.final_total, dec!(1300.00));
    }

    #[test]
    fn test_xl_applies_before_discount() {
        // 1000 -> 1300 XL, 10% of 1300 = 130 -> 1170
        let id = Uuid::new_v4();
        let selection = Selection {
            service_ids: vec![id],
            car_size: CarSize::Xl,
            discount_pct: dec!(10),
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![flat(id, dec!(1000))]));

        assert_eq!(totals.subtotal, dec!(1300.00));
        assert_eq!(totals.discount_amount, dec!(130.000));
        assert_eq!(totals.final_total, dec!(1170.000));
    }

    #[test]
    fn test_size_m_leaves_subtotal_unchanged() {
        let id = Uuid::new_v4();
        let selection = Selection {
            service_ids: vec![id],
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![flat(id, dec!(1000))]));

        assert_eq!(totals.subtotal, dec!(1000));
    }

    #[test]
    fn test_hourly_service_multiplies_rate_by_hours() {
        // 500/h at 2.5 hours contributes exactly 1250
        let id = Uuid::new_v4();
        let mut selection = Selection {
            service_ids: vec![id],
            ..Default::default()
        };
        selection.hours.insert(id, dec!(2.5));

        let totals = compute_totals(&selection, &snapshot(vec![hourly(id, dec!(500))]));

        assert_eq!(totals.subtotal, dec!(1250.0));
    }

    #[test]
    fn test_hourly_service_defaults_to_one_hour() {
        let id = Uuid::new_v4();
        let selection = Selection {
            service_ids: vec![id],
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![hourly(id, dec!(500))]));

        assert_eq!(totals.subtotal, dec!(500));
    }

    #[test]
    fn test_negative_hours_contribute_zero() {
        let id = Uuid::new_v4();
        let mut selection = Selection {
            service_ids: vec![id],
            ..Default::default()
        };
        selection.hours.insert(id, dec!(-3));

        let totals = compute_totals(&selection, &snapshot(vec![hourly(id, dec!(500))]));

        assert_eq!(totals.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_chosen_variant_price_is_used() {
        // variant price 2000 contributes exactly 2000
        let id = Uuid::new_v4();
        let variant_id = Uuid::new_v4();
        let mut selection = Selection {
            service_ids: vec![id],
            ..Default::default()
        };
        selection.variants.insert(id, variant_id);

        let catalog = snapshot(vec![with_variants(
            id,
            vec![(variant_id, dec!(2000)), (Uuid::new_v4(), dec!(3500))],
        )]);
        let totals = compute_totals(&selection, &catalog);

        assert_eq!(totals.subtotal, dec!(2000));
    }

    #[test]
    fn test_variant_service_without_choice_contributes_zero() {
        let id = Uuid::new_v4();
        let selection = Selection {
            service_ids: vec![id],
            ..Default::default()
        };

        let catalog = snapshot(vec![with_variants(id, vec![(Uuid::new_v4(), dec!(2000))])]);
        let totals = compute_totals(&selection, &catalog);

        assert_eq!(totals.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_unknown_variant_choice_contributes_zero() {
        let id = Uuid::new_v4();
        let mut selection = Selection {
            service_ids: vec![id],
            ..Default::default()
        };
        selection.variants.insert(id, Uuid::new_v4());

        let catalog = snapshot(vec![with_variants(id, vec![(Uuid::new_v4(), dec!(2000))])]);
        let totals = compute_totals(&selection, &catalog);

        assert_eq!(totals.subtotal, Decimal::ZERO);
    }

    #[test]
    fn test_unresolved_service_id_contributes_zero() {
        let known = Uuid::new_v4();
        let selection = Selection {
            service_ids: vec![known, Uuid::new_v4()],
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![flat(known, dec!(300))]));

        assert_eq!(totals.subtotal, dec!(300));
    }

    #[test]
    fn test_duplicate_service_ids_count_once() {
        let id = Uuid::new_v4();
        let selection = Selection {
            service_ids: vec![id, id, id],
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![flat(id, dec!(300))]));

        assert_eq!(totals.subtotal, dec!(300));
    }

    #[test]
    fn test_package_snapshot_price_is_summed_not_recomputed() {
        let package_id = Uuid::new_v4();
        let mut selection = Selection::default();
        selection
            .packages
            .insert(package_id, PackageSnapshot { price: dec!(4990) });

        let totals = compute_totals(&selection, &snapshot(vec![]));

        assert_eq!(totals.subtotal, dec!(4990));
    }

    #[test]
    fn test_extra_charges_added_after_discount() {
        // subtotal 1000, discount 10%, charge +200 -> 1000 - 100 + 200 = 1100
        let id = Uuid::new_v4();
        let selection = Selection {
            service_ids: vec![id],
            discount_pct: dec!(10),
            extra_charges: vec![ExtraCharge {
                description: "Engine bay".to_string(),
                amount: dec!(200),
            }],
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![flat(id, dec!(1000))]));

        assert_eq!(totals.subtotal, dec!(1000));
        assert_eq!(totals.discount_amount, dec!(100));
        assert_eq!(totals.extras_total, dec!(200));
        assert_eq!(totals.final_total, dec!(1100));
    }

    #[test]
    fn test_negative_extra_charge_contributes_zero() {
        let selection = Selection {
            extra_charges: vec![
                ExtraCharge {
                    description: "Valid".to_string(),
                    amount: dec!(150),
                },
                ExtraCharge {
                    description: "Bogus".to_string(),
                    amount: dec!(-500),
                },
            ],
            ..Default::default()
        };

        let totals = compute_totals(&selection, &snapshot(vec![]));

        assert_eq!(totals.extras_total, dec!(150));
        assert_eq!(totals.final_total, dec!(150));
    }

    #[test]
    fn test_discount_clamped_to_valid_range() {
        let id = Uuid::new_v4();
        let catalog = snapshot(vec![flat(id, dec!(1000))]);

        let over = Selection {
            service_ids: vec![id],
            discount_pct: dec!(150),
            ..Default::default()
        };
        assert_eq!(compute_totals(&over, &catalog).final_total, Decimal::ZERO);

        let under = Selection {
            service_ids: vec![id],
            discount_pct: dec!(-20),
            ..Default::default()
        };
        assert_eq!(compute_totals(&under, &catalog).final_total, dec!(1000));
    }

    #[test]
    fn test_end_to_end_flat_plus_hourly() {
        // A(300 flat) + B(500/h, hours=2), discount 0, size M
        // -> subtotal 1300, discount 0, final 1300
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut selection = Selection {
            service_ids: vec![a, b],
            ..Default::default()
        };
        selection.hours.insert(b, dec!(2));

        let catalog = snapshot(vec![flat(a, dec!(300)), hourly(b, dec!(500))]);
        let totals = compute_totals(&selection, &catalog);

        assert_eq!(totals.subtotal, dec!(1300));
        assert_eq!(totals.discount_amount, Decimal::ZERO);
        assert_eq!(totals.final_total, dec!(1300));
    }

    // ==================== package_discount_pct tests ====================

    #[test]
    fn test_package_discount_pct() {
        // bundle 800 vs parts 1000 -> 20%
        assert_eq!(package_discount_pct(dec!(800), dec!(1000)), dec!(20));
        // bundle 667 vs parts 1000 -> 33.3 rounds to 33
        assert_eq!(package_discount_pct(dec!(667), dec!(1000)), dec!(33));
        // bundle 665 vs parts 1000 -> 33.5 rounds to 34
        assert_eq!(package_discount_pct(dec!(665), dec!(1000)), dec!(34));
    }

    #[test]
    fn test_package_discount_pct_degenerate_inputs() {
        assert_eq!(package_discount_pct(dec!(800), Decimal::ZERO), Decimal::ZERO);
        // bundle dearer than its parts advertises no discount
        assert_eq!(package_discount_pct(dec!(1200), dec!(1000)), Decimal::ZERO);
    }

    #[test]
    fn test_xl_markup_constant() {
        assert_eq!(XL_MARKUP, dec!(0.30));
    }
}
