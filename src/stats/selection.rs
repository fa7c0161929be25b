use crate::data::{Dataset, MunicipalRecord};
use crate::error::StatsError;
use std::collections::BTreeSet;
use tracing::debug;

impl Dataset {
    /// Distinct department names, ascending
    pub fn list_departments(&self) -> Vec<String> {
        self.records()
            .iter()
            .map(|r| r.department_key())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Distinct municipality names within a department, ascending
    pub fn list_municipalities(&self, department: &str) -> Result<Vec<String>, StatsError> {
        let names: BTreeSet<&str> = self
            .in_department(department)
            .map(|r| r.municipality_key())
            .collect();

        if names.is_empty() {
            return Err(StatsError::EmptyResult(department.trim().to_string()));
        }

        Ok(names.into_iter().map(str::to_string).collect())
    }

    /// The single record for a (department, municipality) pair. Both names
    /// are compared trimmed.
    pub fn resolve_record(
        &self,
        department: &str,
        municipality: &str,
    ) -> Result<&MunicipalRecord, StatsError> {
        let municipality = municipality.trim();
        let mut matches = self
            .in_department(department)
            .filter(|r| r.municipality_key() == municipality);

        let first = matches.next().ok_or_else(|| StatsError::NotFound {
            department: department.trim().to_string(),
            municipality: municipality.to_string(),
        })?;

        let extra = matches.count();
        if extra > 0 {
            return Err(StatsError::AmbiguousMatch {
                department: department.trim().to_string(),
                municipality: municipality.to_string(),
                count: extra + 1,
            });
        }

        Ok(first)
    }
}

/// Current department/municipality choice. Each dashboard session owns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    department: String,
    municipality: String,
    municipalities: Vec<String>,
}

impl Selection {
    /// First department alphabetically and its first municipality
    pub fn first(dataset: &Dataset) -> Result<Self, StatsError> {
        let department = dataset
            .list_departments()
            .into_iter()
            .next()
            .ok_or_else(|| StatsError::EmptyResult(String::new()))?;
        Self::for_department(dataset, &department)
    }

    /// Select a department and its first municipality
    pub fn for_department(dataset: &Dataset, department: &str) -> Result<Self, StatsError> {
        let municipalities = dataset.list_municipalities(department)?;
        let municipality = municipalities[0].clone();
        Ok(Self {
            department: department.trim().to_string(),
            municipality,
            municipalities,
        })
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn municipality(&self) -> &str {
        &self.municipality
    }

    /// Municipalities of the current department, ascending
    pub fn municipalities(&self) -> &[String] {
        &self.municipalities
    }

    /// Switch department. The municipality survives only if the new
    /// department has one with the same name; otherwise it resets to the first.
    pub fn set_department(&mut self, dataset: &Dataset, department: &str) -> Result<(), StatsError> {
        let municipalities = dataset.list_municipalities(department)?;

        if !municipalities.contains(&self.municipality) {
            self.municipality = municipalities[0].clone();
        }
        self.department = department.trim().to_string();
        self.municipalities = municipalities;

        debug!(department = %self.department, municipality = %self.municipality, "department selected");
        Ok(())
    }

    /// Pick a municipality from the current department's list
    pub fn set_municipality(&mut self, municipality: &str) -> Result<(), StatsError> {
        let municipality = municipality.trim();
        if !self.municipalities.iter().any(|m| m == municipality) {
            return Err(StatsError::NotFound {
                department: self.department.clone(),
                municipality: municipality.to_string(),
            });
        }
        self.municipality = municipality.to_string();

        debug!(department = %self.department, municipality = %self.municipality, "municipality selected");
        Ok(())
    }

    /// Resolve the selected record
    pub fn record<'a>(&self, dataset: &'a Dataset) -> Result<&'a MunicipalRecord, StatsError> {
        dataset.resolve_record(&self.department, &self.municipality)
    }
}
