use sitepack_model::BuildData;

/// Sample project used across the crate's tests.
pub fn sample_build() -> BuildData {
    BuildData::from_json(include_str!("../fixtures/build.json")).unwrap()
}
