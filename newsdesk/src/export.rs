//! CSV export of the ad library.

use crate::types::{NewsdeskError, PoliticalAd, Result};
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

pub const EXPORT_FILENAME: &str = "political-ads.csv";
pub const EXPORT_MIME: &str = "text/csv";

pub const HEADER: [&str; 9] = [
    "ID",
    "Advertiser",
    "Candidate",
    "Platform",
    "Format",
    "Amount Spent",
    "Impressions",
    "Start Date",
    "End Date",
];

fn record(ad: &PoliticalAd) -> [String; 9] {
    [
        ad.id.clone(),
        ad.advertiser.clone(),
        ad.candidate.clone(),
        ad.platform.clone(),
        ad.format.clone(),
        ad.amount_spent.to_string(),
        ad.impressions.to_string(),
        ad.start_date.format("%Y-%m-%d").to_string(),
        ad.end_date.format("%Y-%m-%d").to_string(),
    ]
}

/// Writes the header and one row per ad, in the order given. Fields holding
/// a comma, quote or line break are quoted with inner quotes doubled.
pub fn export_to_writer<W: Write>(ads: &[PoliticalAd], writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for ad in ads {
        csv_writer.write_record(record(ad))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_to_string(ads: &[PoliticalAd]) -> Result<String> {
    let mut buffer = Vec::new();
    export_to_writer(ads, &mut buffer)?;
    String::from_utf8(buffer).map_err(|err| NewsdeskError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Writes the export into `dir` under [`EXPORT_FILENAME`] and returns the path.
pub fn export_to_dir(ads: &[PoliticalAd], dir: &Path) -> Result<std::path::PathBuf> {
    let path = dir.join(EXPORT_FILENAME);
    let file = std::fs::File::create(&path)?;
    export_to_writer(ads, std::io::BufWriter::new(file))?;
    info!("Exported {} ads to {}", ads.len(), path.display());
    Ok(path)
}
