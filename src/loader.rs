use crate::error::LoadError;
use crate::types::{CandidateSite, DistrictTotals, RawSiteRow, RawTehsilRow, RegionInput};
use crate::util::{parse_f64_safe, parse_text};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub aggregate_rows: usize,
    pub parse_errors: usize,
    pub district: Option<DistrictTotals>,
}

/// Rows such as `Lahore District Total` summarise the whole district and
/// must not be scored alongside the tehsils.
fn is_aggregate(name: &str) -> bool {
    name.trim().to_ascii_lowercase().ends_with("total")
}

pub fn load_census(path: impl AsRef<Path>) -> Result<(Vec<RegionInput>, LoadReport), LoadError> {
    let path = path.as_ref();
    log::debug!("Reading census table from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_census(file)
}

pub fn read_census<R: Read>(reader: R) -> Result<(Vec<RegionInput>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let mut report = LoadReport::default();
    let mut regions: Vec<RegionInput> = Vec::new();

    for result in rdr.deserialize::<RawTehsilRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping unreadable census row {}: {}", report.total_rows, e);
                report.parse_errors += 1;
                continue;
            }
        };

        let region = match RegionInput::from_raw(&row) {
            Ok(r) if !r.name.is_empty() => r,
            Ok(_) => {
                log::warn!("Skipping census row {} with no tehsil name", report.total_rows);
                report.parse_errors += 1;
                continue;
            }
            Err(e) => {
                log::warn!("Skipping census row {}: {}", report.total_rows, e);
                report.parse_errors += 1;
                continue;
            }
        };

        if is_aggregate(&region.name) {
            report.aggregate_rows += 1;
            // The first aggregate row wins; later ones are only counted.
            if report.district.is_none() {
                report.district = Some(DistrictTotals {
                    name: region.name,
                    population: region.population,
                    area: region.area,
                    density: region.density,
                    growth_rate: region.growth_rate,
                });
            }
            continue;
        }
        regions.push(region);
    }

    report.loaded_rows = regions.len();
    Ok((regions, report))
}

/// Returns the parsed sites and the number of rows skipped.
pub fn load_sites(path: impl AsRef<Path>) -> Result<(Vec<CandidateSite>, usize), LoadError> {
    let path = path.as_ref();
    log::debug!("Reading candidate sites from {}", path.display());
    let file = std::fs::File::open(path)?;
    read_sites(file)
}

pub fn read_sites<R: Read>(reader: R) -> Result<(Vec<CandidateSite>, usize), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let mut sites = Vec::new();
    let mut skipped = 0usize;

    for (idx, result) in rdr.deserialize::<RawSiteRow>().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping unreadable site row {}: {}", idx + 1, e);
                skipped += 1;
                continue;
            }
        };
        let tehsil = parse_text(row.tehsil.as_deref());
        let name = parse_text(row.site_name.as_deref());
        let lat = parse_f64_safe(row.latitude.as_deref());
        let lon = parse_f64_safe(row.longitude.as_deref());
        let (Some(tehsil), Some(name), Some(lat), Some(lon)) = (tehsil, name, lat, lon) else {
            log::warn!("Skipping site row {}: missing tehsil, name or coordinates", idx + 1);
            skipped += 1;
            continue;
        };
        sites.push(CandidateSite {
            tehsil,
            name,
            lat,
            lon,
            site_type: parse_text(row.site_type.as_deref())
                .unwrap_or_else(|| "Unspecified".to_string()),
        });
    }
    Ok((sites, skipped))
}
