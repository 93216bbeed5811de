//! Row filter flags shared by `build`, `export`, `show` and `points`.

use clap::Args;
use digimv_engine::{CareType, MasterFilter};

use crate::CliError;

/// Revenue flags are given in millions of euros.
const MILLION: f64 = 1_000_000.0;

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive match on name or place, or a KVK number fragment
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Care type (VVT, GGZ, GHZ, MSI). Repeatable; a row passes if any matches
    #[arg(long = "type", value_name = "TYPE", value_parser = parse_care_type)]
    pub care_types: Vec<CareType>,

    /// Province name. Repeatable
    #[arg(long = "province", value_name = "NAME")]
    pub provinces: Vec<String>,

    /// Minimum total revenue, millions of euros (inclusive)
    #[arg(long, value_name = "M_EUR")]
    pub revenue_min: Option<f64>,

    /// Maximum total revenue, millions of euros (inclusive)
    #[arg(long, value_name = "M_EUR")]
    pub revenue_max: Option<f64>,

    /// Only rows whose FTE figure is plausible for their revenue
    #[arg(long)]
    pub reliable_fte: bool,
}

fn parse_care_type(s: &str) -> Result<CareType, String> {
    s.parse()
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<MasterFilter, CliError> {
        if let (Some(min), Some(max)) = (self.revenue_min, self.revenue_max) {
            if min > max {
                return Err(CliError::usage(format!("--revenue-min ({min}) exceeds --revenue-max ({max})")));
            }
        }
        Ok(MasterFilter {
            search: self.search.clone(),
            care_types: self.care_types.clone(),
            provinces: self.provinces.clone(),
            revenue_min: self.revenue_min.map(|m| m * MILLION),
            revenue_max: self.revenue_max.map(|m| m * MILLION),
            reliable_fte_only: self.reliable_fte,
        })
    }
}
