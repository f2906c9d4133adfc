use crate::geo::LatLon;

/// A city the map knows how to place
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub coord: LatLon,
}

const fn city(name: &'static str, lat: f64, lon: f64) -> City {
    City {
        name,
        coord: LatLon::new(lat, lon),
    }
}

/// Fixed marker positions. Rows for cities outside this table are never drawn on the map.
pub const CITIES: [City; 31] = [
    city("New York City", 40.71, -74.01),
    city("San Francisco Bay Area", 37.77, -122.42),
    city("Los Angeles", 34.05, -118.24),
    city("Chicago", 41.88, -87.63),
    city("Houston", 29.76, -95.36),
    city("London", 51.50, -0.12),
    city("Vancouver", 49.28, -123.12),
    city("Toronto", 43.65, -79.38),
    city("Tijuana", 32.51, -117.03),
    city("Toulouse", 43.60, 1.44),
    city("Paris", 48.85, 2.35),
    city("Amsterdam", 52.37, 4.90),
    city("Bern", 46.95, 7.44),
    city("Zurich", 47.37, 8.54),
    city("Istanbul", 41.01, 28.97),
    city("Tel Aviv", 32.09, 34.78),
    city("Stockholm", 59.33, 18.07),
    city("Dubai", 25.20, 55.27),
    city("Bangalore", 12.97, 77.59),
    city("Mumbai", 19.07, 72.88),
    city("Chennai", 13.08, 80.27),
    city("Gurugram", 28.46, 77.03),
    city("Delhi", 28.61, 77.21),
    city("Ahmedabad", 23.03, 72.58),
    city("Manila", 14.60, 120.98),
    city("Singapore", 1.35, 103.82),
    city("Tokyo", 35.68, 139.69),
    city("Osaka", 34.69, 135.50),
    city("Fukuoka", 33.59, 130.40),
    city("Shanghai", 31.23, 121.47),
    city("Hong Kong", 22.32, 114.17),
];

/// Look up a known city by exact name
pub fn find(name: &str) -> Option<&'static City> {
    CITIES.iter().find(|c| c.name == name)
}

/// Known cities in alphabetical order (dropdown order)
pub fn sorted() -> Vec<&'static City> {
    let mut cities: Vec<&'static City> = CITIES.iter().collect();
    cities.sort_by(|a, b| a.name.cmp(b.name));
    cities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_known_city() {
        let houston = find("Houston").unwrap();
        assert_eq!(houston.coord, LatLon::new(29.76, -95.36));
        assert!(find("Atlantis").is_none());
    }

    #[test]
    fn test_sorted_is_alphabetical() {
        let names: Vec<&str> = sorted().iter().map(|c| c.name).collect();
        assert_eq!(names.first(), Some(&"Ahmedabad"));
        assert_eq!(names.last(), Some(&"Zurich"));
        assert_eq!(names.len(), CITIES.len());
    }
}
