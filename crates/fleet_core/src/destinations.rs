//! Fixed pool of Toronto-area drop-off points offered by the dispatcher UI.

use crate::geo::Coordinate;
use crate::model::Destination;

pub const DEMO_DESTINATIONS: [(&str, f64, f64); 8] = [
    ("Pearson Airport", 43.6777, -79.6248),
    ("Scarborough Town Centre", 43.7764, -79.2318),
    ("Etobicoke Civic Centre", 43.6465, -79.5565),
    ("North York Centre", 43.7615, -79.4111),
    ("Mississauga City Hall", 43.5890, -79.6441),
    ("Markham Civic Centre", 43.8601, -79.3370),
    ("Brampton Gateway", 43.6855, -79.7598),
    ("Ajax GO Station", 43.8510, -79.0255),
];

pub fn demo_destinations() -> Vec<Destination> {
    DEMO_DESTINATIONS
        .iter()
        .map(|(name, lat, lng)| Destination {
            name: (*name).to_string(),
            coordinate: Coordinate::new(*lat, *lng),
        })
        .collect()
}

/// Case-insensitive lookup by name.
pub fn find_demo_destination(name: &str) -> Option<Destination> {
    let wanted = name.trim();
    demo_destinations()
        .into_iter()
        .find(|destination| destination.name.eq_ignore_ascii_case(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_has_eight_valid_destinations() {
        let pool = demo_destinations();
        assert_eq!(pool.len(), 8);
        assert!(pool.iter().all(|d| d.coordinate.is_valid()));
    }

    #[test]
    fn lookup_ignores_case_and_padding() {
        let found = find_demo_destination("  pearson airport ").expect("pearson");
        assert_eq!(found.coordinate, Coordinate::new(43.6777, -79.6248));
        assert!(find_demo_destination("Union Station").is_none());
    }
}
