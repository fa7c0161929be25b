use crate::data::{Dataset, MunicipalRecord};
use crate::error::StatsError;
use crate::stats::{DepartmentSummary, RankingAxis, Selection};
use std::fmt;
use std::num::NonZeroUsize;

/// The three rates shown side by side for the selected municipality
#[derive(Debug, Clone, PartialEq)]
pub struct RateComparison {
    pub municipal: Result<f64, StatsError>,
    /// Unweighted mean of the department's municipal rates (what the chart shows)
    pub department_mean: Result<f64, StatsError>,
    /// Population-weighted department rate
    pub department_weighted: Result<f64, StatsError>,
    pub national: f64,
}

/// Everything the presentation layer draws for one selection
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub department: &'a str,
    pub municipality: &'a str,
    pub record: Result<&'a MunicipalRecord, StatsError>,
    pub comparison: RateComparison,
    pub axis: RankingAxis,
    pub n: NonZeroUsize,
    pub top: Vec<&'a MunicipalRecord>,
    pub bottom: Vec<&'a MunicipalRecord>,
    /// Department totals, most homicides first
    pub departments: Vec<DepartmentSummary>,
    pub max_rate: f64,
}

impl<'a> DashboardView<'a> {
    /// Derive every view from the dataset and the current selection
    pub fn build(
        dataset: &'a Dataset,
        selection: &'a Selection,
        axis: RankingAxis,
        n: NonZeroUsize,
    ) -> Self {
        let department = selection.department();
        let record = selection.record(dataset);

        let comparison = RateComparison {
            municipal: record.clone().map(|r| r.rate),
            department_mean: dataset.department_mean_rate(department),
            department_weighted: dataset.department_rate(department),
            national: dataset.national_mean_rate(),
        };

        let (top, bottom) = dataset.extremes(axis, n);

        let mut departments = dataset.department_summaries();
        departments.sort_by(|a, b| b.homicides.cmp(&a.homicides));

        Self {
            department,
            municipality: selection.municipality(),
            record,
            comparison,
            axis,
            n,
            top,
            bottom,
            departments,
            max_rate: dataset.max_rate(),
        }
    }

    /// Municipal rate as a fraction of the highest rate in the country
    pub fn gauge_ratio(&self) -> Option<f64> {
        let rate = self.comparison.municipal.as_ref().ok()?;
        if self.max_rate <= 0.0 {
            return Some(0.0);
        }
        Some((rate / self.max_rate).clamp(0.0, 1.0))
    }
}

/// Two-decimal rate, or a message when it cannot be computed
pub fn format_rate(rate: &Result<f64, StatsError>) -> String {
    match rate {
        Ok(value) => format!("{:.2}", value),
        Err(StatsError::DivisionUndefined(_)) => "rate unavailable".to_string(),
        Err(e) => e.to_string(),
    }
}

/// Plain-text rendering of a view, used by the `report` subcommand
pub fn render_report(view: &DashboardView) -> String {
    view.to_string()
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Homicides 2024: {} / {}", self.department, self.municipality)?;
        writeln!(f)?;

        let c = &self.comparison;
        writeln!(f, "Rate per 100,000 inhabitants")?;
        writeln!(f, "  {:<22}{:>12}", "Municipality", format_rate(&c.municipal))?;
        writeln!(f, "  {:<22}{:>12}", "Department (mean)", format_rate(&c.department_mean))?;
        writeln!(f, "  {:<22}{:>12}", "Department (weighted)", format_rate(&c.department_weighted))?;
        writeln!(f, "  {:<22}{:>12.2}", "National (mean)", c.national)?;

        if let Ok(record) = &self.record {
            writeln!(
                f,
                "  {} homicides, population {}",
                record.homicides, record.population
            )?;
        }

        let sections = [("Most", &self.top), ("Fewest", &self.bottom)];
        for (title, records) in sections {
            writeln!(f)?;
            writeln!(f, "{} {} (top {})", title, self.axis.label(), self.n)?;
            for (rank, record) in records.iter().enumerate() {
                writeln!(
                    f,
                    "  {:>3}. {:<28}{:<22}{:>7}{:>10.2}",
                    rank + 1,
                    record.municipality_key(),
                    record.department_key(),
                    record.homicides,
                    record.rate
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Homicides by department")?;
        for summary in &self.departments {
            writeln!(
                f,
                "  {:<28}{:>7}{:>18}",
                summary.department,
                summary.homicides,
                format_rate(&summary.rate)
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MunicipalRecord;
    use crate::stats::fixtures::{colombia, example};

    fn n(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).unwrap()
    }

    #[test]
    fn test_comparison_for_example() {
        let dataset = example();
        let selection = Selection::first(&dataset).unwrap();
        let view = DashboardView::build(&dataset, &selection, RankingAxis::Count, n(2));

        assert_eq!(view.comparison.municipal, Ok(10.0));
        assert_eq!(view.comparison.department_mean, Ok(20.0));
        assert_eq!(view.comparison.department_weighted, Ok(20.0));
        assert!((view.comparison.national - 16.666_666).abs() < 1e-3);
    }

    #[test]
    fn test_national_rate_independent_of_selection() {
        let dataset = colombia();
        let mut selection = Selection::first(&dataset).unwrap();
        let before = DashboardView::build(&dataset, &selection, RankingAxis::Count, n(3))
            .comparison
            .national;

        selection.set_department(&dataset, "Caldas").unwrap();
        selection.set_municipality("Marulanda").unwrap();
        let after = DashboardView::build(&dataset, &selection, RankingAxis::Rate, n(5))
            .comparison
            .national;

        assert_eq!(before, after);
    }

    #[test]
    fn test_departments_sorted_by_homicides() {
        let dataset = colombia();
        let selection = Selection::first(&dataset).unwrap();
        let view = DashboardView::build(&dataset, &selection, RankingAxis::Count, n(3));
        let order: Vec<&str> = view.departments.iter().map(|d| d.department.as_str()).collect();
        assert_eq!(order, vec!["Valle del Cauca", "Antioquia", "Caldas", "Boyacá"]);
    }

    #[test]
    fn test_ambiguous_record_only_affects_municipal_view() {
        let dataset = Dataset::new(vec![
            MunicipalRecord::new("DeptA", "Mun1", 10, 100_000, 10.0),
            MunicipalRecord::new("DeptA", "Mun1", 20, 100_000, 20.0),
        ])
        .unwrap();
        let selection = Selection::first(&dataset).unwrap();
        let view = DashboardView::build(&dataset, &selection, RankingAxis::Count, n(1));

        assert!(matches!(view.record, Err(StatsError::AmbiguousMatch { count: 2, .. })));
        assert!(view.comparison.municipal.is_err());
        assert_eq!(view.gauge_ratio(), None);
        assert_eq!(view.comparison.department_weighted, Ok(15.0));
        assert_eq!(view.top.len(), 1);
    }

    #[test]
    fn test_gauge_ratio() {
        let dataset = colombia();
        let mut selection = Selection::first(&dataset).unwrap();
        selection.set_department(&dataset, "Valle del Cauca").unwrap();
        selection.set_municipality("Jamundí").unwrap();
        let view = DashboardView::build(&dataset, &selection, RankingAxis::Count, n(3));
        assert_eq!(view.gauge_ratio(), Some(1.0));
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(&Ok(16.666)), "16.67");
        assert_eq!(
            format_rate(&Err(StatsError::DivisionUndefined("X".to_string()))),
            "rate unavailable"
        );
    }

    #[test]
    fn test_report_mentions_selection_and_rankings() {
        let dataset = colombia();
        let selection = Selection::first(&dataset).unwrap();
        let view = DashboardView::build(&dataset, &selection, RankingAxis::Count, n(2));
        let report = render_report(&view);

        assert!(report.starts_with("Homicides 2024: Antioquia / Abejorral"));
        assert!(report.contains("Most homicides (top 2)"));
        assert!(report.contains("Cali"));
        assert!(report.contains("Marulanda"));
        assert!(report.contains("Valle del Cauca"));
    }

    #[test]
    fn test_report_writes_into_any_formatter() {
        let dataset = Dataset::new(vec![
            MunicipalRecord::new("Caldas", " Manizales ", 40, 450_000, 8.9),
            MunicipalRecord::new("Caldas", "Marulanda", 5, 3_000, 166.7),
        ])
        .unwrap();
        let selection = Selection::first(&dataset).unwrap();
        let view = DashboardView::build(&dataset, &selection, RankingAxis::Count, n(2));

        let mut written = String::new();
        fmt::write(&mut written, format_args!("{}", view)).unwrap();
        assert_eq!(written, render_report(&view));
        assert!(written.starts_with("Homicides 2024: Caldas / Manizales\n"));
        assert!(written.contains("    1. Manizales"));
        assert!(!written.contains("1.  Manizales"));
        assert!(written.ends_with('\n'));
    }
}
