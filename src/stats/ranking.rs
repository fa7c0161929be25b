use crate::data::{Dataset, MunicipalRecord};
use std::cmp::Ordering;
use std::num::NonZeroUsize;

/// Which figure the ranking panels order municipalities by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingAxis {
    #[default]
    Count,
    Rate,
}

impl RankingAxis {
    pub fn toggle(self) -> Self {
        match self {
            RankingAxis::Count => RankingAxis::Rate,
            RankingAxis::Rate => RankingAxis::Count,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RankingAxis::Count => "homicides",
            RankingAxis::Rate => "rate per 100k",
        }
    }
}

impl Dataset {
    /// Municipalities with the most homicides, ties in source order
    pub fn top_by_count(&self, n: NonZeroUsize) -> Vec<&MunicipalRecord> {
        self.ranked(n, |a, b| b.homicides.cmp(&a.homicides))
    }

    /// Municipalities with the fewest homicides, ties in source order
    pub fn bottom_by_count(&self, n: NonZeroUsize) -> Vec<&MunicipalRecord> {
        self.ranked(n, |a, b| a.homicides.cmp(&b.homicides))
    }

    /// Municipalities with the highest rate, ties in source order
    pub fn top_by_rate(&self, n: NonZeroUsize) -> Vec<&MunicipalRecord> {
        self.ranked(n, |a, b| b.rate.total_cmp(&a.rate))
    }

    /// Municipalities with the lowest rate, ties in source order
    pub fn bottom_by_rate(&self, n: NonZeroUsize) -> Vec<&MunicipalRecord> {
        self.ranked(n, |a, b| a.rate.total_cmp(&b.rate))
    }

    /// (top, bottom) along the given axis
    pub fn extremes(&self, axis: RankingAxis, n: NonZeroUsize) -> (Vec<&MunicipalRecord>, Vec<&MunicipalRecord>) {
        match axis {
            RankingAxis::Count => (self.top_by_count(n), self.bottom_by_count(n)),
            RankingAxis::Rate => (self.top_by_rate(n), self.bottom_by_rate(n)),
        }
    }

    /// Stable sort by `order`, keeping at most `n` records
    fn ranked<F>(&self, n: NonZeroUsize, mut order: F) -> Vec<&MunicipalRecord>
    where
        F: FnMut(&MunicipalRecord, &MunicipalRecord) -> Ordering,
    {
        let mut sorted: Vec<&MunicipalRecord> = self.records().iter().collect();
        // Must stay stable: ties keep source order
        sorted.sort_by(|a, b| order(*a, *b));
        sorted.truncate(n.get());
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::colombia;
    use std::collections::HashSet;

    fn n(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).unwrap()
    }

    fn names(records: &[&MunicipalRecord]) -> Vec<String> {
        records.iter().map(|r| r.municipality.clone()).collect()
    }

    #[test]
    fn test_top_by_count() {
        let dataset = colombia();
        assert_eq!(
            names(&dataset.top_by_count(n(3))),
            vec!["Cali", "Medellín", "Jamundí"]
        );
    }

    #[test]
    fn test_ties_keep_source_order() {
        let dataset = colombia();
        // Bello and Buga both have 62; Bello comes first in the file
        let top = dataset.top_by_count(n(5));
        assert_eq!(names(&top[3..5]), vec!["Bello", "Buga"]);

        // Abejorral and Sogamoso both have 2
        let bottom = dataset.bottom_by_count(n(3));
        assert_eq!(names(&bottom), vec!["Marulanda", "Abejorral", "Sogamoso"]);
    }

    #[test]
    fn test_by_rate() {
        let dataset = colombia();
        assert_eq!(names(&dataset.top_by_rate(n(2))), vec!["Jamundí", "Buga"]);
        assert_eq!(names(&dataset.bottom_by_rate(n(2))), vec!["Marulanda", "Sogamoso"]);
    }

    #[test]
    fn test_n_clamped_to_record_count() {
        let dataset = colombia();
        assert_eq!(dataset.top_by_count(n(50)).len(), 10);
        assert_eq!(dataset.bottom_by_rate(n(11)).len(), 10);
    }

    #[test]
    fn test_rankings_deterministic() {
        let dataset = colombia();
        assert_eq!(dataset.top_by_count(n(5)), dataset.top_by_count(n(5)));
        assert_eq!(dataset.bottom_by_rate(n(5)), dataset.bottom_by_rate(n(5)));
    }

    #[test]
    fn test_top_and_bottom_disjoint() {
        let dataset = colombia();
        for k in 1..=5 {
            let top = dataset.top_by_count(n(k));
            let bottom = dataset.bottom_by_count(n(k));
            let union: HashSet<*const MunicipalRecord> = top
                .iter()
                .chain(bottom.iter())
                .map(|r| *r as *const MunicipalRecord)
                .collect();
            assert_eq!(union.len(), 2 * k, "overlap at n = {k}");
        }
    }

    #[test]
    fn test_extremes_follow_axis() {
        let dataset = colombia();
        let (top, bottom) = dataset.extremes(RankingAxis::Rate, n(1));
        assert_eq!(top[0].municipality, "Jamundí");
        assert_eq!(bottom[0].municipality, "Marulanda");
        assert_eq!(RankingAxis::Count.toggle(), RankingAxis::Rate);
    }
}
