//! Geographic grouping of cards.
//!
//! The grouping is a deterministic greedy pass, not an optimal partition:
//! the first unassigned point seeds a cluster, its nearest neighbours within
//! the radius fill it up to the size cap, and whatever stays below the
//! minimum size is reported as an outlier instead of being merged elsewhere.

use std::collections::VecDeque;

use crate::error::{AppError, Result};
use crate::models::{ClusterMember, Coordinates};

pub const EARTH_RADIUS_MILES: f64 = 3958.8;

pub const DEFAULT_MAX_DISTANCE_MILES: f64 = 2.0;
pub const DEFAULT_MIN_SIZE: usize = 5;
pub const DEFAULT_MAX_SIZE: usize = 12;

/// Great-circle distance in miles (haversine).
pub fn distance_miles(a: Coordinates, b: Coordinates) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Anything with a known position can be clustered.
pub trait Located {
    fn location(&self) -> Coordinates;
}

impl Located for ClusterMember {
    fn location(&self) -> Coordinates {
        Coordinates {
            lat: self.latitude,
            lng: self.longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    pub max_distance: f64,
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE_MILES,
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl ClusterParams {
    /// Builds parameters from optional request values, falling back to the
    /// defaults for anything omitted.
    pub fn new(max_distance: Option<f64>, min_size: Option<usize>, max_size: Option<usize>) -> Result<Self> {
        let defaults = Self::default();
        let params = Self {
            max_distance: max_distance.unwrap_or(defaults.max_distance),
            min_size: min_size.unwrap_or(defaults.min_size),
            max_size: max_size.unwrap_or(defaults.max_size),
        };

        if !params.max_distance.is_finite() || params.max_distance < 0.0 {
            return Err(AppError::Validation(
                "max_distance must be a non-negative number of miles".to_string(),
            ));
        }
        if params.max_size == 0 {
            return Err(AppError::Validation("max_size must be at least 1".to_string()));
        }
        if params.min_size == 0 || params.min_size > params.max_size {
            return Err(AppError::Validation(
                "min_size must be between 1 and max_size".to_string(),
            ));
        }

        Ok(params)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cluster<T> {
    /// Position of the seed point, not a centroid.
    pub center: Coordinates,
    pub members: Vec<T>,
    pub is_outlier: bool,
}

impl<T> Cluster<T> {
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// Partitions `points` into clusters. Every input point ends up in exactly
/// one cluster; output order follows seed order.
pub fn create_clusters<T: Located>(points: Vec<T>, params: &ClusterParams) -> Vec<Cluster<T>> {
    let mut unassigned: VecDeque<T> = points.into();
    let mut clusters = Vec::new();

    while let Some(seed) = unassigned.pop_front() {
        let center = seed.location();

        let mut nearby: Vec<(f64, usize)> = unassigned
            .iter()
            .enumerate()
            .map(|(i, p)| (distance_miles(center, p.location()), i))
            .filter(|(d, _)| *d <= params.max_distance)
            .collect();
        // Stable: equal distances keep unassigned order.
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearby.truncate(params.max_size.saturating_sub(1));

        let mut slots: Vec<Option<T>> = unassigned.drain(..).map(Some).collect();
        let mut members = Vec::with_capacity(nearby.len() + 1);
        members.push(seed);
        members.extend(nearby.iter().filter_map(|&(_, i)| slots[i].take()));
        unassigned = slots.into_iter().flatten().collect();

        let is_outlier = members.len() < params.min_size;
        clusters.push(Cluster {
            center,
            members,
            is_outlier,
        });
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Point(u32, f64, f64);

    impl Located for Point {
        fn location(&self) -> Coordinates {
            Coordinates {
                lat: self.1,
                lng: self.2,
            }
        }
    }

    fn params(max_distance: f64, min_size: usize, max_size: usize) -> ClusterParams {
        ClusterParams::new(Some(max_distance), Some(min_size), Some(max_size)).unwrap()
    }

    fn ids<T>(cluster: &Cluster<T>, id: impl Fn(&T) -> u32) -> Vec<u32> {
        cluster.members.iter().map(id).collect()
    }

    #[test]
    fn distance_to_self_is_zero() {
        let origin = Coordinates { lat: 0.0, lng: 0.0 };
        assert_eq!(distance_miles(origin, origin), 0.0);
    }

    #[test]
    fn one_mile_north_is_one_mile() {
        let a = Coordinates {
            lat: 40.0,
            lng: -74.0,
        };
        let b = Coordinates {
            lat: 40.0 + (1.0 / EARTH_RADIUS_MILES).to_degrees(),
            lng: -74.0,
        };
        assert!((distance_miles(a, b) - 1.0).abs() < 0.01);
    }

    #[test]
    fn two_distant_pairs_form_two_clusters() {
        let points = vec![
            Point(1, 0.001, 0.001),
            Point(2, 0.002, 0.002),
            Point(3, 10.0, 10.0),
            Point(4, 10.001, 10.001),
        ];

        let clusters = create_clusters(points, &params(5.0, 2, 12));

        assert_eq!(clusters.len(), 2);
        assert_eq!(ids(&clusters[0], |p| p.0), vec![1, 2]);
        assert_eq!(ids(&clusters[1], |p| p.0), vec![3, 4]);
        assert!(clusters.iter().all(|c| !c.is_outlier && c.count() == 2));
        assert_eq!(clusters[1].center, Coordinates { lat: 10.0, lng: 10.0 });
    }

    #[test]
    fn isolated_point_becomes_singleton_outlier() {
        let points = vec![
            Point(1, 0.0, 0.0),
            Point(2, 0.0, 0.001),
            Point(3, 45.0, 45.0),
        ];

        let clusters = create_clusters(points, &params(1.0, 2, 5));

        assert_eq!(clusters.len(), 2);
        assert!(!clusters[0].is_outlier);
        assert_eq!(ids(&clusters[1], |p| p.0), vec![3]);
        assert!(clusters[1].is_outlier);
    }

    #[test]
    fn nearest_neighbours_win_when_cluster_is_full() {
        let points = vec![
            Point(1, 0.0, 0.0),
            Point(2, 0.0, 0.003),
            Point(3, 0.0, 0.001),
            Point(4, 0.0, 0.002),
        ];

        let clusters = create_clusters(points, &params(5.0, 1, 3));

        assert_eq!(ids(&clusters[0], |p| p.0), vec![1, 3, 4]);
        assert_eq!(ids(&clusters[1], |p| p.0), vec![2]);
    }

    #[test]
    fn equal_distances_keep_input_order() {
        let points = vec![
            Point(1, 0.0, 0.0),
            Point(2, 0.0, 0.001),
            Point(3, 0.0, -0.001),
            Point(4, 0.001, 0.0),
        ];

        let clusters = create_clusters(points, &params(5.0, 1, 3));

        assert_eq!(ids(&clusters[0], |p| p.0), vec![1, 2, 3]);
    }

    #[test]
    fn clusters_respect_bounds_and_partition_the_input() {
        // Deterministic scatter over a small area.
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % 10_000) as f64 / 10_000.0
        };
        let points: Vec<Point> = (0..200)
            .map(|i| Point(i, 34.0 + next() * 0.5, -118.0 + next() * 0.5))
            .collect();

        let p = params(3.0, 4, 7);
        let clusters = create_clusters(points, &p);

        let mut seen: Vec<u32> = clusters.iter().flat_map(|c| ids(c, |p| p.0)).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..200).collect::<Vec<_>>());

        for cluster in &clusters {
            assert!(cluster.count() >= 1 && cluster.count() <= p.max_size);
            assert_eq!(cluster.is_outlier, cluster.count() < p.min_size);
            for member in &cluster.members {
                assert!(distance_miles(cluster.center, member.location()) <= p.max_distance);
            }
        }
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        assert!(create_clusters(Vec::<Point>::new(), &ClusterParams::default()).is_empty());
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(ClusterParams::new(Some(-1.0), None, None).is_err());
        assert!(ClusterParams::new(Some(f64::NAN), None, None).is_err());
        assert!(ClusterParams::new(None, None, Some(0)).is_err());
        assert!(ClusterParams::new(None, Some(6), Some(5)).is_err());
        assert_eq!(ClusterParams::new(None, None, None).unwrap(), ClusterParams::default());
    }
}
