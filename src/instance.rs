//! Module for loading and representing symmetric TSP instances.
//!
//! This module handles TSP-LIB `NODE_COORD_SECTION` files and plain `x,y` CSV files.
//! Distances are Euclidean 2D and precomputed once into an immutable [`DistanceMatrix`].

use crate::error::{AcoError, AcoResult};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A city of the instance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// City index (0..n-1)
    pub id: usize,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl City {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        City { id, x, y }
    }

    /// Euclidean distance to another city
    #[inline]
    pub fn distance_to(&self, other: &City) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }
}

/// Precomputed pairwise Euclidean distances.
///
/// Symmetric with a zero diagonal. There is no mutable access once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistanceMatrix {
    matrix: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Compute the full matrix from a set of cities.
    pub fn build(cities: &[City]) -> AcoResult<Self> {
        let n = cities.len();
        if n < 2 {
            return Err(AcoError::InvalidInput(format!(
                "at least 2 cities are required, got {}",
                n
            )));
        }

        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = cities[i].distance_to(&cities[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        Ok(DistanceMatrix { matrix })
    }

    /// Distance between city `i` and city `j`
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.matrix[i][j]
    }

    /// Number of cities
    #[inline]
    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    /// Cyclic tour length, including the closing edge from the last city back to the first.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }

        let n = tour.len();
        (0..n)
            .map(|i| self.distance(tour[i], tour[(i + 1) % n]))
            .sum()
    }

    /// Row-major view of the matrix
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.matrix
    }
}

/// A complete symmetric TSP instance
#[derive(Debug, Clone, Serialize)]
pub struct TSPInstance {
    /// Name of the instance
    pub name: String,
    /// Comment/description
    pub comment: String,
    /// Number of cities
    pub dimension: usize,
    /// List of all cities
    pub cities: Vec<City>,
    /// Precomputed distance matrix
    #[serde(skip)]
    distances: DistanceMatrix,
}

impl TSPInstance {
    /// Build an instance from raw coordinates. Cities are numbered in input order.
    pub fn from_coords(name: &str, coords: Vec<(f64, f64)>) -> AcoResult<Self> {
        let cities: Vec<City> = coords
            .into_iter()
            .enumerate()
            .map(|(id, (x, y))| City::new(id, x, y))
            .collect();

        if let Some(bad) = cities.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(AcoError::InvalidInput(format!(
                "city {} has non-finite coordinates ({}, {})",
                bad.id, bad.x, bad.y
            )));
        }

        let distances = DistanceMatrix::build(&cities)?;

        Ok(TSPInstance {
            name: name.to_string(),
            comment: String::new(),
            dimension: cities.len(),
            cities,
            distances,
        })
    }

    /// Load an instance from a file. `.csv` files are read as `x,y` rows,
    /// everything else as TSP-LIB.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AcoResult<Self> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        if is_csv {
            Self::from_csv(path, &name)
        } else {
            Self::from_tsplib(path, &name)
        }
    }

    fn from_csv(path: &Path, name: &str) -> AcoResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut coords = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() < 2 {
                return Err(AcoError::Parse {
                    line: idx + 1,
                    message: "expected two columns x,y".to_string(),
                });
            }

            let x = record[0].parse::<f64>();
            let y = record[1].parse::<f64>();
            match (x, y) {
                (Ok(x), Ok(y)) => coords.push((x, y)),
                // header row
                _ if idx == 0 => continue,
                _ => {
                    return Err(AcoError::Parse {
                        line: idx + 1,
                        message: format!("invalid coordinates '{}', '{}'", &record[0], &record[1]),
                    })
                }
            }
        }

        Self::from_coords(name, coords)
    }

    fn from_tsplib(path: &Path, default_name: &str) -> AcoResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut name = default_name.to_string();
        let mut comment = String::new();
        let mut dimension: Option<usize> = None;
        let mut coords: Vec<(f64, f64)> = Vec::new();
        let mut in_coords = false;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line == "EOF" {
                continue;
            }

            if line.starts_with("NODE_COORD_SECTION") {
                in_coords = true;
                continue;
            }
            if line.ends_with("_SECTION") {
                in_coords = false;
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim();
                match key.trim() {
                    "NAME" => name = value.to_string(),
                    "COMMENT" => comment = value.to_string(),
                    "DIMENSION" => {
                        dimension = Some(value.parse().map_err(|_| AcoError::Parse {
                            line: line_no,
                            message: format!("invalid dimension '{}'", value),
                        })?);
                    }
                    "EDGE_WEIGHT_TYPE" if value != "EUC_2D" => {
                        return Err(AcoError::InvalidInput(format!(
                            "unsupported edge weight type '{}'",
                            value
                        )));
                    }
                    _ => {}
                }
                continue;
            }

            if in_coords {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < 3 {
                    return Err(AcoError::Parse {
                        line: line_no,
                        message: "expected 'id x y'".to_string(),
                    });
                }
                let parse = |s: &str, what: &str| {
                    s.parse::<f64>().map_err(|_| AcoError::Parse {
                        line: line_no,
                        message: format!("invalid {} coordinate '{}'", what, s),
                    })
                };
                coords.push((parse(parts[1], "x")?, parse(parts[2], "y")?));
            }
        }

        if let Some(dim) = dimension {
            if dim != coords.len() {
                return Err(AcoError::InvalidInput(format!(
                    "DIMENSION is {} but {} coordinates were read",
                    dim,
                    coords.len()
                )));
            }
        }

        let mut instance = Self::from_coords(&name, coords)?;
        instance.comment = comment;
        Ok(instance)
    }

    /// Get the distance between two cities
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances.distance(i, j)
    }

    /// The precomputed distance matrix
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Calculate total cyclic tour length
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        self.distances.tour_length(tour)
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut distances: Vec<f64> = Vec::new();
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                distances.push(self.distance(i, j));
            }
        }

        let avg_distance = distances.iter().sum::<f64>() / distances.len().max(1) as f64;
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);
        let min_distance = distances
            .iter()
            .filter(|&&d| d > 0.0)
            .map(|&d| OrderedFloat(d))
            .min()
            .map(|d| d.0)
            .unwrap_or(0.0);
        let coincident_pairs = distances.iter().filter(|&&d| d == 0.0).count();

        let min_x = self.cities.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
        let max_x = self.cities.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = self.cities.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
        let max_y = self.cities.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max);

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            bounds: (min_x, max_x, min_y, max_y),
            avg_distance,
            min_distance,
            max_distance,
            coincident_pairs,
        }
    }
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    /// (min_x, max_x, min_y, max_y)
    pub bounds: (f64, f64, f64, f64),
    pub avg_distance: f64,
    /// Smallest non-zero pairwise distance
    pub min_distance: f64,
    pub max_distance: f64,
    /// Pairs of cities sharing the same coordinates
    pub coincident_pairs: usize,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (min_x, max_x, min_y, max_y) = self.bounds;
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.dimension)?;
        writeln!(f, "  Bounds: x [{:.2}, {:.2}], y [{:.2}, {:.2}]", min_x, max_x, min_y, max_y)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)?;
        writeln!(f, "  Coincident pairs: {}", self.coincident_pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_distance_calculation() {
        let cities = vec![City::new(0, 0.0, 0.0), City::new(1, 3.0, 4.0)];
        let matrix = DistanceMatrix::build(&cities).unwrap();

        assert!((matrix.distance(0, 1) - 5.0).abs() < 1e-10);
        assert!((matrix.distance(1, 0) - 5.0).abs() < 1e-10);
        assert_eq!(matrix.distance(0, 0), 0.0);
        assert_eq!(matrix.distance(1, 1), 0.0);
    }

    #[test]
    fn test_distance_with_huge_coordinates_stays_finite() {
        let inst =
            TSPInstance::from_coords("huge", vec![(1e200, 0.0), (-1e200, 0.0), (0.0, 1e200)]).unwrap();

        assert_eq!(inst.distance(0, 1), 2e200);
        assert!((inst.distance(0, 2) / (2f64.sqrt() * 1e200) - 1.0).abs() < 1e-12);
        assert!(inst.tour_length(&[0, 1, 2]).is_finite());
    }

    #[test]
    fn test_matrix_is_symmetric() {
        let instance = TSPInstance::from_coords(
            "tri",
            vec![(0.0, 0.0), (2.5, 1.0), (-1.0, 7.0), (4.0, 4.0)],
        )
        .unwrap();
        let n = instance.dimension;
        for i in 0..n {
            assert_eq!(instance.distance(i, i), 0.0);
            for j in 0..n {
                assert_eq!(instance.distance(i, j), instance.distance(j, i));
            }
        }
    }

    #[test]
    fn test_too_few_cities() {
        let err = DistanceMatrix::build(&[City::new(0, 1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput(_)));

        let err = TSPInstance::from_coords("empty", Vec::new()).unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_coordinates_rejected() {
        let err = TSPInstance::from_coords("nan", vec![(0.0, 0.0), (f64::NAN, 1.0)]).unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput(_)));
    }

    #[test]
    fn test_coincident_cities_have_zero_distance() {
        let instance =
            TSPInstance::from_coords("dup", vec![(1.0, 1.0), (1.0, 1.0), (4.0, 5.0)]).unwrap();
        assert_eq!(instance.distance(0, 1), 0.0);
        assert_eq!(instance.statistics().coincident_pairs, 1);
        assert!((instance.statistics().min_distance - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_tour_length_is_cyclic() {
        let instance = TSPInstance::from_coords(
            "square",
            vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
        )
        .unwrap();
        assert!((instance.tour_length(&[0, 1, 2, 3]) - 4.0).abs() < 1e-10);
        let crossed = 2.0 + 2.0 * 2f64.sqrt();
        assert!((instance.tour_length(&[0, 2, 1, 3]) - crossed).abs() < 1e-10);
    }

    #[test]
    fn test_parse_tsplib() {
        let mut file = tempfile::Builder::new().suffix(".tsp").tempfile().unwrap();
        writeln!(
            file,
            "NAME: tiny\nCOMMENT: four corners\nTYPE: TSP\nDIMENSION: 4\nEDGE_WEIGHT_TYPE: EUC_2D\nNODE_COORD_SECTION\n1 0 0\n2 1 0\n3 1 1\n4 0 1\nEOF"
        )
        .unwrap();

        let instance = TSPInstance::from_file(file.path()).unwrap();
        assert_eq!(instance.name, "tiny");
        assert_eq!(instance.comment, "four corners");
        assert_eq!(instance.dimension, 4);
        assert_eq!(instance.cities[2], City::new(2, 1.0, 1.0));
    }

    #[test]
    fn test_parse_tsplib_dimension_mismatch() {
        let mut file = tempfile::Builder::new().suffix(".tsp").tempfile().unwrap();
        writeln!(file, "DIMENSION: 3\nNODE_COORD_SECTION\n1 0 0\n2 1 0\nEOF").unwrap();

        let err = TSPInstance::from_file(file.path()).unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_csv_with_header() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "x,y\n0,0\n3,4\n6,0").unwrap();

        let instance = TSPInstance::from_file(file.path()).unwrap();
        assert_eq!(instance.dimension, 3);
        assert!((instance.distance(0, 1) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_parse_csv_bad_row() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "0,0\n1,oops\n2,2").unwrap();

        let err = TSPInstance::from_file(file.path()).unwrap_err();
        assert!(matches!(err, AcoError::Parse { line: 2, .. }));
    }
}
