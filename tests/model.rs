use h2sizing::model::Model;
use h2sizing::scenario::Country;
use h2sizing::variant::ModelVariant;
use rstest::rstest;
use std::path::{Path, PathBuf};

/// Get the path to a demo model.
fn get_model_dir(name: &str) -> PathBuf {
    Path::new(file!())
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
        .join(name)
}

/// An integration test which attempts to load each demo model
#[rstest]
#[case("quick", ModelVariant::Baseload, 24)]
#[case("pay_as_produced", ModelVariant::PayAsProduced, 15)]
#[case("battery_dispatch", ModelVariant::BatteryDispatch, 16)]
fn test_model_from_path(
    #[case] name: &str,
    #[case] variant: ModelVariant,
    #[case] num_scenarios: usize,
) {
    let model = Model::from_path(get_model_dir(name)).unwrap();
    assert_eq!(model.parameters.variant, variant);
    assert_eq!(model.num_scenarios(), num_scenarios);

    // Every scenario has series of the right length
    for scenario in model.iter_scenarios() {
        let series = model.time_series_for(&scenario).unwrap();
        assert_eq!(
            series.wind_capacity_factor.len(),
            model.parameters.horizon_hours
        );
    }
}

#[test]
fn test_sweep_order() {
    let model = Model::from_path(get_model_dir("quick")).unwrap();
    let first: Vec<_> = model.iter_scenarios().take(8).collect();
    assert!(first.iter().all(|scenario| scenario.country == Country::Finland));
}
