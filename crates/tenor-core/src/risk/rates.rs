use crate::types::RiskFreeRate;

/// Approximate 10-year Treasury rates by era, one observation per year in
/// `[start_year, end_year]` inclusive.
pub fn historical_risk_free_rates(start_year: i32, end_year: i32) -> Vec<RiskFreeRate> {
    (start_year..=end_year)
        .map(|year| {
            let rate = if year < 1980 {
                0.04
            } else if year < 2000 {
                0.07
            } else if year < 2010 {
                0.05
            } else if year < 2020 {
                0.03
            } else {
                0.02
            };
            RiskFreeRate { year, rate }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_era_boundaries() {
        let rates = historical_risk_free_rates(1979, 2021);
        let lookup = |y: i32| rates.iter().find(|r| r.year == y).unwrap().rate;
        assert_eq!(lookup(1979), 0.04);
        assert_eq!(lookup(1980), 0.07);
        assert_eq!(lookup(1999), 0.07);
        assert_eq!(lookup(2000), 0.05);
        assert_eq!(lookup(2010), 0.03);
        assert_eq!(lookup(2020), 0.02);
    }

    #[test]
    fn test_inclusive_span() {
        let rates = historical_risk_free_rates(2000, 2004);
        assert_eq!(rates.len(), 5);
        assert_eq!(rates[0].year, 2000);
        assert_eq!(rates[4].year, 2004);
    }
}
