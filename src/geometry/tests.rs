//! Geometry Module Tests
//!
//! Validates the pure zone predicates the overlay protocol is built on.
//!
//! ## Test Scopes
//! - **Containment**: half-open boundaries.
//! - **Adjacency**: directional predicates and their symmetry.
//! - **Split**: alternation, exact reassembly, repeated halving.
//! - **Keyword placement**: determinism and range.

#[cfg(test)]
mod tests {
    use crate::geometry::{
        Adjacency, Direction, HEIGHT_MAX, SplitKind, WIDTH_MAX, Zone, keyword_point,
    };

    // ============================================================
    // CONTAINMENT TESTS
    // ============================================================

    #[test]
    fn test_contains_min_corner_but_not_max_edge() {
        let zones = [
            Zone::full(),
            Zone::new(0.0, 0.0, 5.0, 10.0),
            Zone::new(5.0, 5.0, 2.5, 5.0),
            Zone::new(1.25, 3.75, 1.25, 0.625),
        ];

        for zone in zones {
            assert!(zone.contains_point(zone.x, zone.y), "{} owns its corner", zone);
            assert!(!zone.contains_point(zone.x + zone.width, zone.y));
            assert!(!zone.contains_point(zone.x, zone.y + zone.height));
        }
    }

    #[test]
    fn test_contains_interior_point() {
        let zone = Zone::new(0.0, 0.0, 5.0, 10.0);
        assert!(zone.contains_point(4.99, 9.99));
        assert!(!zone.contains_point(5.0, 3.0));
        assert!(!zone.contains_point(-0.1, 3.0));
    }

    #[test]
    fn test_full_zone_covers_space() {
        let full = Zone::full();
        assert_eq!(full.area(), WIDTH_MAX * HEIGHT_MAX);
        assert!(full.is_within_space());
        assert!(full.contains_point(0.0, 0.0));
        assert!(full.contains_point(9.999, 9.999));
    }

    // ============================================================
    // ADJACENCY TESTS
    // ============================================================

    #[test]
    fn test_side_by_side_zones_are_left_right_neighbors() {
        let left = Zone::new(0.0, 0.0, 5.0, 10.0);
        let right = Zone::new(5.0, 0.0, 5.0, 10.0);

        assert!(left.is_right_neighbor(&right));
        assert!(right.is_left_neighbor(&left));
        assert!(!left.is_left_neighbor(&right));
        assert!(!left.is_top_neighbor(&right));
        assert!(!left.is_bottom_neighbor(&right));
    }

    #[test]
    fn test_stacked_zones_are_top_bottom_neighbors() {
        let lower = Zone::new(0.0, 0.0, 10.0, 5.0);
        let upper = Zone::new(0.0, 5.0, 10.0, 5.0);

        assert!(lower.is_top_neighbor(&upper));
        assert!(upper.is_bottom_neighbor(&lower));
        assert_eq!(lower.neighbor_direction(&upper), Some(Direction::Top));
        assert_eq!(upper.neighbor_direction(&lower), Some(Direction::Bottom));
    }

    #[test]
    fn test_partial_overlap_counts_as_neighbor() {
        // Upper zone is narrower and starts inside the lower zone's span
        let lower = Zone::new(0.0, 0.0, 5.0, 5.0);
        let upper = Zone::new(2.5, 5.0, 5.0, 5.0);
        assert!(lower.is_top_neighbor(&upper));

        // Upper zone starts before and covers the lower zone's start
        let upper_wide = Zone::new(0.0, 5.0, 10.0, 5.0);
        let lower_inner = Zone::new(2.5, 0.0, 2.5, 5.0);
        assert!(lower_inner.is_top_neighbor(&upper_wide));
    }

    #[test]
    fn test_corner_contact_is_not_adjacency() {
        let a = Zone::new(0.0, 0.0, 5.0, 5.0);
        let diagonal = Zone::new(5.0, 5.0, 5.0, 5.0);

        assert!(!a.is_neighbor(&diagonal));
        assert!(!diagonal.is_neighbor(&a));
    }

    #[test]
    fn test_adjacency_is_symmetric_under_opposite_direction() {
        let zones = [
            Zone::new(0.0, 0.0, 5.0, 5.0),
            Zone::new(5.0, 0.0, 5.0, 2.5),
            Zone::new(5.0, 2.5, 5.0, 2.5),
            Zone::new(0.0, 5.0, 10.0, 5.0),
            Zone::new(2.5, 5.0, 2.5, 2.5),
        ];

        for a in &zones {
            for b in &zones {
                for direction in Direction::ALL {
                    assert_eq!(
                        a.is_neighbor_in(b, direction),
                        b.is_neighbor_in(a, direction.opposite()),
                        "{} vs {} in {}",
                        a,
                        b,
                        direction
                    );
                }
            }
        }
    }

    #[test]
    fn test_adjacency_tolerates_rounding_on_shared_edge() {
        let left = Zone::new(0.0, 0.0, 0.1 + 0.2, 1.0);
        let right = Zone::new(0.3, 0.0, 1.0, 1.0);
        assert!(left.is_right_neighbor(&right));
    }

    #[test]
    fn test_matches_any_and_side() {
        let left = Zone::new(0.0, 0.0, 5.0, 10.0);
        let right = Zone::new(5.0, 0.0, 5.0, 10.0);

        assert!(left.matches(&right, Adjacency::Any));
        assert!(left.matches(&right, Adjacency::Side(Direction::Right)));
        assert!(!left.matches(&right, Adjacency::Side(Direction::Top)));
    }

    #[test]
    fn test_adjacency_parses_from_str() {
        assert_eq!("any".parse::<Adjacency>(), Ok(Adjacency::Any));
        assert_eq!(
            "bottom".parse::<Adjacency>(),
            Ok(Adjacency::Side(Direction::Bottom))
        );
        assert!("diagonal".parse::<Adjacency>().is_err());
    }

    // ============================================================
    // SPLIT TESTS
    // ============================================================

    #[test]
    fn test_square_splits_vertically() {
        let mut zone = Zone::full();
        let (kind, sibling) = zone.split();

        assert_eq!(kind, SplitKind::Vertical);
        assert_eq!(zone, Zone::new(0.0, 0.0, 5.0, 10.0));
        assert_eq!(sibling, Zone::new(5.0, 0.0, 5.0, 10.0));
        assert!(zone.is_right_neighbor(&sibling));
    }

    #[test]
    fn test_tall_zone_splits_horizontally() {
        let mut zone = Zone::new(0.0, 0.0, 5.0, 10.0);
        let (kind, sibling) = zone.split();

        assert_eq!(kind, SplitKind::Horizontal);
        assert_eq!(zone, Zone::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(sibling, Zone::new(0.0, 5.0, 5.0, 5.0));
        assert!(zone.is_top_neighbor(&sibling));
        assert_eq!(kind.sibling_side(), Direction::Top);
    }

    #[test]
    fn test_split_reassembles_exactly() {
        let mut zone = Zone::new(2.5, 5.0, 2.5, 5.0);
        let before = zone;

        for _ in 0..12 {
            let original = zone;
            let (_, sibling) = zone.split();

            assert_eq!(zone.area() + sibling.area(), original.area());
            assert!(!zone.overlaps(&sibling));

            let min_x = zone.x.min(sibling.x);
            let min_y = zone.y.min(sibling.y);
            let max_x = (zone.x + zone.width).max(sibling.x + sibling.width);
            let max_y = (zone.y + zone.height).max(sibling.y + sibling.height);
            assert_eq!(Zone::new(min_x, min_y, max_x - min_x, max_y - min_y), original);
            assert!(zone.is_neighbor(&sibling));
        }

        assert!(zone.area() < before.area());
    }

    #[test]
    fn test_splits_alternate_direction() {
        let mut zone = Zone::full();
        let kinds: Vec<SplitKind> = (0..4).map(|_| zone.split().0).collect();

        assert_eq!(
            kinds,
            vec![
                SplitKind::Vertical,
                SplitKind::Horizontal,
                SplitKind::Vertical,
                SplitKind::Horizontal
            ]
        );
        assert_eq!(zone, Zone::new(0.0, 0.0, 2.5, 2.5));
    }

    #[test]
    fn test_centroid_distance() {
        let zone = Zone::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(zone.centroid_distance(1.0, 1.0), 0.0);
        assert!((zone.centroid_distance(4.0, 5.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zone_display() {
        let zone = Zone::new(0.0, 5.0, 5.0, 5.0);
        assert_eq!(zone.to_string(), "X(0.00 - 5.00) Y(5.00 - 10.00)");
    }

    #[test]
    fn test_edge_distance_is_zero_inside_and_on_boundary() {
        let zone = Zone::new(0.0, 0.0, 5.0, 5.0);
        assert_eq!(zone.edge_distance(2.0, 3.0), 0.0);
        assert_eq!(zone.edge_distance(5.0, 5.0), 0.0);
        assert_eq!(zone.edge_distance(8.0, 9.0), 5.0);
        assert_eq!(zone.edge_distance(7.0, 1.0), 2.0);
    }

    #[test]
    fn test_containing_zone_is_closest() {
        let owner = Zone::new(5.0, 0.0, 2.5, 5.0);
        let touching = Zone::new(2.5, 2.5, 2.5, 2.5);

        // (5.0, 4.9) lies on the touching zone's max edge, inside the owner
        let to_owner = owner.distance_to(5.0, 4.9);
        let to_touching = touching.distance_to(5.0, 4.9);
        assert!(to_owner.contains);
        assert!(!to_touching.contains);
        assert!(to_owner.closer_than(&to_touching));
        assert!(!to_touching.closer_than(&to_owner));
    }

    #[test]
    fn test_rectangle_distance_beats_centroid_distance() {
        // The larger zone's centroid is farther away, but its edge is nearer
        let large = Zone::new(5.0, 0.0, 2.5, 5.0);
        let small = Zone::new(2.5, 5.0, 2.5, 2.5);
        let (px, py) = (5.3, 5.1);

        assert!(large.centroid_distance(px, py) > small.centroid_distance(px, py));
        assert!(large.distance_to(px, py).closer_than(&small.distance_to(px, py)));
    }

    #[test]
    fn test_equal_distances_are_not_closer() {
        let zone = Zone::new(0.0, 0.0, 2.5, 2.5);
        let d = zone.distance_to(6.0, 6.0);
        assert!(!d.closer_than(&d));
    }

    #[test]
    fn test_distance_reports_centroid_distance() {
        let zone = Zone::new(0.0, 0.0, 5.0, 10.0);
        let d = zone.distance_to(8.5, 1.0);
        assert_eq!(d.to_centroid, zone.centroid_distance(8.5, 1.0));
        assert_eq!(d.to_centroid, 6.0_f64.hypot(4.0));
    }

    // ============================================================
    // KEYWORD PLACEMENT TESTS
    // ============================================================

    #[test]
    fn test_keyword_point_is_deterministic() {
        assert_eq!(keyword_point("hello"), keyword_point("hello"));
    }

    #[test]
    fn test_keyword_point_digit_sums() {
        // "1234": odd positions 2 + 4 = 6, even positions 1 + 3 = 4
        assert_eq!(keyword_point("1234"), (6.0, 4.0));
        // Letters count by base-36 value: a = 10, b = 11
        assert_eq!(keyword_point("ab"), (1.0, 0.0));
        assert_eq!(keyword_point("AB"), keyword_point("ab"));
    }

    #[test]
    fn test_keyword_point_stays_in_space() {
        for keyword in ["", "-", "!!!", "hello.txt", "zzzzzzzzzzzz", "a-b_c d"] {
            let (x, y) = keyword_point(keyword);
            assert!((0.0..WIDTH_MAX).contains(&x), "{} -> x={}", keyword, x);
            assert!((0.0..HEIGHT_MAX).contains(&y), "{} -> y={}", keyword, y);
            assert!(Zone::full().contains_point(x, y));
        }
    }
}
