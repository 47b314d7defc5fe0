//! Fixed monitoring station registry and nearest-station lookup.

use serde::Serialize;

use crate::spatial::haversine_km;

/// A fixed monitoring station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Station {
    pub id: &'static str,
    pub lat: f64,
    pub lon: f64,
}

/// Reference deployment stations, in model index order.
pub const STATIONS: [Station; 4] = [
    Station { id: "station_0", lat: 23.51905342888936, lon: 87.34565136450719 },
    Station { id: "station_1", lat: 23.564018931392827, lon: 87.31123928017463 },
    Station { id: "station_2", lat: 23.5391718044899, lon: 87.30401858752859 },
    Station { id: "station_3", lat: 23.554806202241476, lon: 87.24681601086061 },
];

/// Read-only station registry.
///
/// Iteration order is significant: a station's position is the index the
/// forecasting model was trained with.
#[derive(Debug, Clone, Copy)]
pub struct StationDirectory {
    stations: &'static [Station],
}

impl Default for StationDirectory {
    fn default() -> Self {
        Self::new(&STATIONS)
    }
}

impl StationDirectory {
    pub const fn new(stations: &'static [Station]) -> Self {
        Self { stations }
    }

    pub fn stations(&self) -> &'static [Station] {
        self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'static Station> {
        self.stations.iter().find(|station| station.id == id)
    }

    /// Model index of a station.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.stations.iter().position(|station| station.id == id)
    }

    /// Nearest station by great-circle distance.
    ///
    /// Exhaustive scan; the first station at the minimum distance wins ties.
    /// Returns `None` only for an empty registry.
    pub fn nearest(&self, lat: f64, lon: f64) -> Option<&'static Station> {
        let mut best: Option<(&'static Station, f64)> = None;
        for station in self.stations {
            let distance = haversine_km(lat, lon, station.lat, station.lon);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((station, distance)),
            }
        }
        best.map(|(station, _)| station)
    }
}
