// Bus listings and catalog search

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::availability::{AvailabilityChecker, AvailabilityError, AvailabilitySet};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate bus id: {0}")]
    DuplicateBus(String),
}

// Sample listings shipped with the crate
pub const SAMPLE_BUSES_PATH: &str = "samples/buses.json";
const SAMPLE_BUSES_JSON: &str = include_str!("../samples/buses.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusType {
    #[serde(rename = "2x2 Sleeper")]
    Sleeper2x2,
    #[serde(rename = "3x2 Seater")]
    Seater3x2,
    #[serde(rename = "2x1 Luxury")]
    Luxury2x1,
    #[serde(rename = "Mini Bus")]
    MiniBus,
}

impl BusType {
    pub const ALL: [BusType; 4] = [
        BusType::Sleeper2x2,
        BusType::Seater3x2,
        BusType::Luxury2x1,
        BusType::MiniBus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BusType::Sleeper2x2 => "2x2 Sleeper",
            BusType::Seater3x2 => "3x2 Seater",
            BusType::Luxury2x1 => "2x1 Luxury",
            BusType::MiniBus => "Mini Bus",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub bus_type: BusType,
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub price_per_day: i64,
    pub price_per_km: i64,
    pub location: String,
    pub available_dates: AvailabilitySet,
    pub is_approved: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

impl Bus {
    pub fn is_available_for(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, AvailabilityError> {
        self.available_dates.scan().is_range_available(start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    #[default]
    Recommended,
    PriceLowToHigh,
    PriceHighToLow,
    Rating,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_capacity: Option<u32>,
    pub bus_type: Option<BusType>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: SortOption,
}

#[derive(Debug, Clone, Default)]
pub struct BusCatalog {
    buses: Vec<Bus>,
}

impl BusCatalog {
    pub fn new(buses: Vec<Bus>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for bus in &buses {
            if !seen.insert(bus.id.as_str()) {
                return Err(CatalogError::DuplicateBus(bus.id.clone()));
            }
        }
        Ok(Self { buses })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let buses: Vec<Bus> = serde_json::from_str(json)?;
        Self::new(buses)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    // Helper method to load the sample listings from disk
    pub fn load_sample() -> Result<Self, CatalogError> {
        Self::load(SAMPLE_BUSES_PATH)
    }

    /// The sample listings compiled into the crate.
    pub fn sample() -> Result<Self, CatalogError> {
        Self::from_json_str(SAMPLE_BUSES_JSON)
    }

    pub fn len(&self) -> usize {
        self.buses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buses.is_empty()
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn get(&self, id: &str) -> Option<&Bus> {
        self.buses.iter().find(|bus| bus.id == id)
    }

    pub fn by_owner(&self, owner_id: &str) -> Vec<&Bus> {
        self.buses
            .iter()
            .filter(|bus| bus.owner_id == owner_id)
            .collect()
    }

    /// Distinct locations in listing order.
    pub fn locations(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.buses
            .iter()
            .map(|bus| bus.location.as_str())
            .filter(|location| seen.insert(*location))
            .collect()
    }

    /// Approved buses matching every set filter. A reversed date range is
    /// an error, not an empty result.
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<&Bus>, AvailabilityError> {
        // Dates only filter when both ends are known
        let dates = match (criteria.start_date, criteria.end_date) {
            (Some(start), Some(end)) if end < start => {
                return Err(AvailabilityError::InvalidRange { start, end });
            }
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        };

        let mut results = Vec::new();
        for bus in self
            .buses
            .iter()
            .filter(|bus| bus.is_approved)
            .filter(|bus| Self::matches(bus, criteria))
        {
            if let Some((start, end)) = dates {
                if !bus.is_available_for(start, end)? {
                    continue;
                }
            }
            results.push(bus);
        }

        match criteria.sort {
            SortOption::Recommended => {}
            SortOption::PriceLowToHigh => results.sort_by_key(|bus| bus.price_per_day),
            SortOption::PriceHighToLow => {
                results.sort_by(|a, b| b.price_per_day.cmp(&a.price_per_day))
            }
            SortOption::Rating => results.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }

        debug!(
            matched = results.len(),
            total = self.buses.len(),
            "Catalog search finished"
        );
        Ok(results)
    }

    fn matches(bus: &Bus, criteria: &SearchCriteria) -> bool {
        if !criteria
            .location
            .as_ref()
            .map_or(true, |location| &bus.location == location)
        {
            return false;
        }

        if !criteria
            .min_capacity
            .map_or(true, |capacity| bus.capacity >= capacity)
        {
            return false;
        }

        if !criteria
            .bus_type
            .map_or(true, |bus_type| bus.bus_type == bus_type)
        {
            return false;
        }

        if !criteria.min_price.map_or(true, |min| bus.price_per_day >= min)
            || !criteria.max_price.map_or(true, |max| bus.price_per_day <= max)
        {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn ids(buses: &[&Bus]) -> Vec<String> {
        buses.iter().map(|bus| bus.id.clone()).collect()
    }

    #[test]
    fn test_sample_catalog_loads() {
        let catalog = BusCatalog::sample().unwrap();
        assert_eq!(catalog.len(), 5);

        let cruiser = catalog.get("bus1").unwrap();
        assert_eq!(cruiser.name, "Royal Cruiser");
        assert_eq!(cruiser.bus_type, BusType::Sleeper2x2);
        assert_eq!(cruiser.available_dates.intervals().len(), 2);
        assert!(catalog.get("bus99").is_none());
    }

    #[test]
    fn test_load_sample_from_disk() {
        let catalog = BusCatalog::load_sample().unwrap();
        assert_eq!(catalog.len(), BusCatalog::sample().unwrap().len());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let catalog = BusCatalog::sample().unwrap();
        let mut buses = catalog.buses().to_vec();
        buses.push(buses[0].clone());
        let err = BusCatalog::new(buses).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateBus(id) if id == "bus1"));
    }

    #[test]
    fn test_locations_and_owners() {
        let catalog = BusCatalog::sample().unwrap();
        assert_eq!(
            catalog.locations(),
            vec!["Mumbai", "Delhi", "Shimla", "Bangalore", "Goa"]
        );
        assert_eq!(ids(&catalog.by_owner("owner2")), vec!["bus3", "bus5"]);
    }

    #[test_case(SearchCriteria { location: Some("Goa".to_string()), ..Default::default() },
        vec!["bus5"]; "#1 Filter by location")]
    #[test_case(SearchCriteria { min_capacity: Some(33), ..Default::default() },
        vec!["bus1", "bus2"]; "#2 Filter by capacity")]
    #[test_case(SearchCriteria { bus_type: Some(BusType::Sleeper2x2), ..Default::default() },
        vec!["bus1", "bus3"]; "#3 Filter by bus type")]
    #[test_case(SearchCriteria { min_price: Some(10_000), max_price: Some(18_000), ..Default::default() },
        vec!["bus1", "bus2", "bus3"]; "#4 Filter by price band")]
    #[test_case(SearchCriteria { start_date: Some(day(5, 14)), end_date: Some(day(5, 21)), ..Default::default() },
        vec!["bus2", "bus3", "bus4"]; "#5 Filter by dates across a gap")]
    #[test_case(SearchCriteria { start_date: Some(day(5, 14)), ..Default::default() },
        vec!["bus1", "bus2", "bus3", "bus4", "bus5"]; "#6 Half a date range does not filter")]
    #[test_case(SearchCriteria { sort: SortOption::PriceLowToHigh, ..Default::default() },
        vec!["bus4", "bus2", "bus1", "bus3", "bus5"]; "#7 Sort by price ascending")]
    #[test_case(SearchCriteria { sort: SortOption::Rating, max_price: Some(20_000), ..Default::default() },
        vec!["bus3", "bus1", "bus4", "bus2"]; "#8 Sort by rating with price cap")]
    fn test_search(criteria: SearchCriteria, expected_ids: Vec<&str>) {
        let catalog = BusCatalog::sample().unwrap();
        let results = catalog.search(&criteria).unwrap();
        assert_eq!(ids(&results), expected_ids);
    }

    #[test_case(day(5, 7), day(5, 5); "#1 Reversed range inside availability")]
    #[test_case(day(6, 1), day(5, 1); "#2 Reversed range outside availability")]
    fn test_search_reversed_dates_fails(start: NaiveDate, end: NaiveDate) {
        let catalog = BusCatalog::sample().unwrap();
        let err = catalog
            .search(&SearchCriteria {
                start_date: Some(start),
                end_date: Some(end),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, AvailabilityError::InvalidRange { start, end });
    }

    #[test]
    fn test_bus_availability_reports_reversed_range() {
        let catalog = BusCatalog::sample().unwrap();
        let bus = catalog.get("bus1").unwrap();
        assert_eq!(bus.is_available_for(day(5, 5), day(5, 7)), Ok(true));
        assert!(bus.is_available_for(day(5, 7), day(5, 5)).is_err());
    }

    #[test]
    fn test_search_skips_unapproved() {
        let catalog = BusCatalog::sample().unwrap();
        let mut buses = catalog.buses().to_vec();
        buses[0].is_approved = false;
        let catalog = BusCatalog::new(buses).unwrap();

        let results = catalog
            .search(&SearchCriteria {
                location: Some("Mumbai".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(results.is_empty());
        // Direct lookup still works for the owner's dashboard
        assert!(catalog.get("bus1").is_some());
    }

    #[test]
    fn test_bus_type_labels_round_trip_serde() {
        for bus_type in BusType::ALL {
            let json = serde_json::to_string(&bus_type).unwrap();
            assert_eq!(json, format!("\"{}\"", bus_type.label()));
        }
    }
}
