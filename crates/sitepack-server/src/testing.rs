use sitepack_model::BuildData;

/// Sample project shared with the export pipeline's tests.
pub fn sample_build() -> BuildData {
    BuildData::from_json(include_str!("../../sitepack-export/fixtures/build.json")).unwrap()
}
