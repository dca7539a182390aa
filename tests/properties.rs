use std::collections::BTreeMap;

use proptest::prelude::*;

use geoh2::core::annuity::{annual_component_cost, AnnuitizationMethod};
use geoh2::core::transport::{road_cost, road_tier, RoadTier};
use geoh2::core::water::WaterCostModel;
use geoh2::models::component::ComponentKind;
use geoh2::models::cost_record::CostBreakdown;
use geoh2::models::parameters::{FinancingTerms, InfrastructureParameters, RoadTariff, WaterParameters};
use geoh2::models::site::{Site, SiteDistances};
use geoh2::utils::geometry::{GeoPoint, Geometry};

fn component() -> impl Strategy<Value = ComponentKind> {
    prop::sample::select(ComponentKind::ALL.to_vec())
}

fn method() -> impl Strategy<Value = AnnuitizationMethod> {
    prop_oneof![Just(AnnuitizationMethod::StraightLine), Just(AnnuitizationMethod::CapitalRecovery)]
}

fn water_parameters() -> impl Strategy<Value = WaterParameters> {
    (0.0..5.0f64, 0.0..10.0f64, 0.0..50.0f64, 0.0..5.0f64, 1.0..40.0f64).prop_map(
        |(fresh, ocean, transport, specific, litres)| WaterParameters {
            freshwater_treatment_kwh_per_m3: fresh,
            ocean_treatment_kwh_per_m3: ocean,
            transport_cost_per_100km_m3: transport,
            specific_cost_per_m3: specific,
            demand_litres_per_kg_h2: litres,
        },
    )
}

/// Long-road tariff at least as expensive as the short one, term by term
fn ordered_tariffs() -> impl Strategy<Value = InfrastructureParameters> {
    (0.0..1e4f64, 0.0..1e3f64, 0.0..1e4f64, 0.0..1e3f64).prop_map(|(capex, opex, extra_capex, extra_opex)| {
        InfrastructureParameters {
            short_road: RoadTariff { capex_per_km: capex, opex_per_km: opex },
            long_road: RoadTariff { capex_per_km: capex + extra_capex, opex_per_km: opex + extra_opex },
        }
    })
}

proptest! {
    #[test]
    fn annual_cost_is_non_negative(
        component in component(),
        method in method(),
        capacity in 0.0..1e6f64,
        capex in 0.0..10.0f64,
        interest in 0.0..0.25f64,
        lifetime in 1.0..60.0f64,
    ) {
        let terms = FinancingTerms::new(interest, lifetime);
        let annual = annual_component_cost(component, capacity, capex, &terms, &method).unwrap();
        prop_assert!(annual >= 0.0);
        prop_assert!(annual.is_finite());
    }

    #[test]
    fn selected_water_cost_is_the_minimum(
        water in water_parameters(),
        waterbody in 0.0..500.0f64,
        waterway in 0.0..500.0f64,
        ocean in 0.0..500.0f64,
        price in 0.0..0.5f64,
    ) {
        let site = Site::new(
            1,
            Geometry::Point(GeoPoint::new(0.0, 0.0)),
            "NA",
            SiteDistances { waterbody: Some(waterbody), waterway: Some(waterway), ocean: Some(ocean), ..Default::default() },
        );
        let selection = WaterCostModel::standard().evaluate(&site, &water, price).unwrap();
        let candidates = selection.candidates();

        prop_assert!(candidates.iter().all(|c| c.cost.is_finite()));
        prop_assert_eq!(selection.lowest_cost(), candidates[0].cost.min(candidates[1].cost));
    }

    #[test]
    fn total_is_the_sum_of_listed_terms(
        costs in prop::collection::vec(0.0..1e6f64, 5),
        water_unit in 0.0..10.0f64,
        transport in 0.0..1e7f64,
        demand in 1.0..1e7f64,
    ) {
        let components: BTreeMap<ComponentKind, f64> = ComponentKind::ALL.iter().copied().zip(costs).collect();
        let expected = components.values().sum::<f64>() + water_unit * demand + transport;

        let breakdown = CostBreakdown::new(components, water_unit, transport, "Port", demand).unwrap();
        prop_assert_eq!(breakdown.total_cost(), expected);
        prop_assert_eq!(breakdown.levelized_cost(), breakdown.total_cost() / demand);
    }

    #[test]
    fn non_positive_demand_has_no_levelized_cost(demand in -1e6..=0.0f64) {
        let result = CostBreakdown::new(BTreeMap::new(), 1.0, 100.0, "Port", demand);
        prop_assert!(result.is_err());
    }

    #[test]
    fn road_cost_never_decreases_with_distance(
        infra in ordered_tariffs(),
        a in 0.0..100.0f64,
        b in 0.0..100.0f64,
    ) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let near_cost = road_cost(near, &infra, 10.0).unwrap();
        let far_cost = road_cost(far, &infra, 10.0).unwrap();
        prop_assert!(near_cost <= far_cost, "{} km -> {}, {} km -> {}", near, near_cost, far, far_cost);
    }

    #[test]
    fn tier_choice_is_consistent_around_the_threshold(threshold in 1.0..100.0f64, offset in 1e-6..1.0f64) {
        prop_assert_eq!(road_tier(threshold - offset, threshold), RoadTier::Short);
        prop_assert_eq!(road_tier(threshold, threshold), RoadTier::Long);
        prop_assert_eq!(road_tier(threshold + offset, threshold), RoadTier::Long);
    }
}
