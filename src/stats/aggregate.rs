use super::round2;
use crate::data::Dataset;
use crate::error::StatsError;
use std::collections::BTreeMap;

/// Homicide totals for one department
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentSummary {
    pub department: String,
    pub homicides: u64,
    pub population: u64,
    /// Population-weighted rate, `sum(homicides) / sum(population) * 100000`
    pub rate: Result<f64, StatsError>,
}

fn weighted_rate(department: &str, homicides: u64, population: u64) -> Result<f64, StatsError> {
    if population == 0 {
        return Err(StatsError::DivisionUndefined(department.to_string()));
    }
    Ok(round2(homicides as f64 / population as f64 * 100_000.0))
}

impl Dataset {
    /// Sum-based department rate, rounded to two decimals
    pub fn department_rate(&self, department: &str) -> Result<f64, StatsError> {
        let (homicides, population) = self
            .in_department(department)
            .fold((0u64, 0u64), |(h, p), r| (h + r.homicides, p + r.population));
        weighted_rate(department.trim(), homicides, population)
    }

    /// Unweighted mean of the department's municipal rates
    pub fn department_mean_rate(&self, department: &str) -> Result<f64, StatsError> {
        let (sum, count) = self
            .in_department(department)
            .fold((0.0, 0usize), |(s, n), r| (s + r.rate, n + 1));
        if count == 0 {
            return Err(StatsError::EmptyResult(department.trim().to_string()));
        }
        Ok(sum / count as f64)
    }

    /// Unweighted mean of every municipal rate. Independent of any selection.
    pub fn national_mean_rate(&self) -> f64 {
        let records = self.records();
        records.iter().map(|r| r.rate).sum::<f64>() / records.len() as f64
    }

    /// Highest municipal rate in the dataset
    pub fn max_rate(&self) -> f64 {
        self.records()
            .iter()
            .map(|r| r.rate)
            .fold(0.0, f64::max)
    }

    /// Sums and weighted rate per department, ordered by department name
    pub fn department_summaries(&self) -> Vec<DepartmentSummary> {
        let mut groups: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
        for record in self.records() {
            let entry = groups.entry(record.department_key()).or_default();
            entry.0 += record.homicides;
            entry.1 += record.population;
        }

        groups
            .into_iter()
            .map(|(department, (homicides, population))| DepartmentSummary {
                department: department.to_string(),
                homicides,
                population,
                rate: weighted_rate(department, homicides, population),
            })
            .collect()
    }

    /// Total homicides per department, ordered by department name
    pub fn department_totals(&self) -> Vec<(String, u64)> {
        self.department_summaries()
            .into_iter()
            .map(|s| (s.department, s.homicides))
            .collect()
    }
}
